//! Manifest file: the discovered filenames, one per line, in resolution order.

use crate::error::GrabError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes `filenames` to `path` exactly in the given order, each followed by `\n`.
/// Overwrites any existing file. The parent directory must already exist.
pub fn save(filenames: &[String], path: &Path) -> Result<(), GrabError> {
    let mut file = fs::File::create(path).map_err(|e| GrabError::io(path, e))?;
    let mut body = String::with_capacity(filenames.iter().map(|f| f.len() + 1).sum());
    for name in filenames {
        body.push_str(name);
        body.push('\n');
    }
    file.write_all(body.as_bytes())
        .map_err(|e| GrabError::io(path, e))?;
    file.sync_all().map_err(|e| GrabError::io(path, e))?;
    tracing::debug!(path = %path.display(), count = filenames.len(), "manifest saved");
    Ok(())
}

/// Reads a manifest written by [`save`]. Blank lines are skipped.
pub fn load(path: &Path) -> Result<Vec<String>, GrabError> {
    let data = fs::read_to_string(path).map_err(|e| GrabError::io(path, e))?;
    Ok(data
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Compares `current` with the manifest at `path`. A missing or unreadable
/// previous manifest counts as changed.
pub fn has_changed(current: &[String], path: &Path) -> bool {
    match load(path) {
        Ok(previous) => previous != current,
        Err(e) => {
            tracing::debug!(error = %e, "no previous manifest");
            true
        }
    }
}
