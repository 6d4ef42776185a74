//! Disk side of a download: `.part` temp file, sequential writes, fsync and
//! atomic finalize (rename from `.part` to the final name).
//!
//! The final filename only ever appears once the whole body is on disk.

mod writer;

pub use writer::PartFile;

use crate::error::GrabError;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `index.js` → `index.js.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Creates `dir` and its parents; succeeds if it already exists.
pub fn ensure_dir(dir: &Path) -> Result<(), GrabError> {
    std::fs::create_dir_all(dir).map_err(|e| GrabError::io(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("index.js"));
        assert_eq!(p.to_string_lossy(), "index.js.part");
        let p2 = temp_path(Path::new("/tmp/out/index-ab12.js"));
        assert_eq!(p2.to_string_lossy(), "/tmp/out/index-ab12.js.part");
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn ensure_dir_fails_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"x").unwrap();
        let err = ensure_dir(&file.join("sub")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
