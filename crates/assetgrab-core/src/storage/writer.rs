//! Sequential writer for a `.part` download file.

use crate::error::GrabError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Open `.part` file receiving a streamed body. Either [`finalize`](Self::finalize)
/// or [`discard`](Self::discard) it; dropping it leaves the temp file behind.
#[derive(Debug)]
pub struct PartFile {
    file: File,
    temp_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Create (or truncate) the temp file at `temp_path`.
    pub fn create(temp_path: &Path) -> Result<Self, GrabError> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .map_err(|e| GrabError::io(temp_path, e))?;
        Ok(PartFile {
            file,
            temp_path: temp_path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), GrabError> {
        self.file
            .write_all(data)
            .map_err(|e| GrabError::io(&self.temp_path, e))?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Sync, close and atomically rename the temp file to `final_path`.
    /// On failure the temp file is removed.
    pub fn finalize(self, final_path: &Path) -> Result<u64, GrabError> {
        let PartFile {
            file,
            temp_path,
            written,
        } = self;
        if let Err(e) = file.sync_all() {
            drop(file);
            remove_quietly(&temp_path);
            return Err(GrabError::io(&temp_path, e));
        }
        drop(file);

        if let Err(e) = std::fs::rename(&temp_path, final_path) {
            remove_quietly(&temp_path);
            return Err(GrabError::io(final_path, e));
        }
        Ok(written)
    }

    /// Close and delete the temp file (interrupted or rejected download).
    pub fn discard(self) {
        let PartFile {
            file, temp_path, ..
        } = self;
        drop(file);
        remove_quietly(&temp_path);
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), "failed to remove temp file: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::temp_path;

    #[test]
    fn write_then_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("index.js");
        let tp = temp_path(&final_path);

        let mut part = PartFile::create(&tp).unwrap();
        part.write_chunk(b"console.").unwrap();
        part.write_chunk(b"log(1)").unwrap();
        assert_eq!(part.written(), 14);
        assert!(tp.exists());
        assert!(!final_path.exists());

        assert_eq!(part.finalize(&final_path).unwrap(), 14);
        assert!(!tp.exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"console.log(1)");
    }

    #[test]
    fn discard_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let tp = dir.path().join("index.js.part");
        let mut part = PartFile::create(&tp).unwrap();
        part.write_chunk(b"half").unwrap();
        part.discard();
        assert!(!tp.exists());
        assert!(!dir.path().join("index.js").exists());
    }

    #[test]
    fn finalize_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("index.js");
        std::fs::write(&final_path, b"old build").unwrap();
        let mut part = PartFile::create(&temp_path(&final_path)).unwrap();
        part.write_chunk(b"new").unwrap();
        part.finalize(&final_path).unwrap();
        assert_eq!(std::fs::read(&final_path).unwrap(), b"new");
    }

    #[test]
    fn create_truncates_stale_part() {
        let dir = tempfile::tempdir().unwrap();
        let tp = dir.path().join("x.js.part");
        std::fs::write(&tp, b"stale stale stale").unwrap();
        let mut part = PartFile::create(&tp).unwrap();
        part.write_chunk(b"ok").unwrap();
        part.finalize(&dir.path().join("x.js")).unwrap();
        assert_eq!(std::fs::read(dir.path().join("x.js")).unwrap(), b"ok");
    }
}
