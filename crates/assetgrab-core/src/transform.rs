//! Destination filename transforms, applied before a download is written.
//! A transform only renames; the bytes written are never touched.

use crate::error::GrabError;

/// Maps a discovered basename to the name written under the output directory.
pub trait FilenameTransform: Send + Sync {
    fn rename(&self, basename: &str) -> String;
}

/// Keeps the discovered name.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl FilenameTransform for Identity {
    fn rename(&self, basename: &str) -> String {
        basename.to_string()
    }
}

/// Forces a different extension, e.g. `index-ab12.js` -> `index-ab12.cgi`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRemap {
    extension: String,
}

impl ExtensionRemap {
    /// Accepts `cgi` or `.cgi`; rejects empty values and anything containing a
    /// separator or a further dot.
    pub fn new(extension: &str) -> Result<Self, GrabError> {
        let ext = extension.trim().trim_start_matches('.');
        if ext.is_empty()
            || ext.contains(['/', '\\', '.', '\0'])
            || ext.chars().any(|c| c.is_control() || c.is_whitespace())
        {
            return Err(GrabError::InvalidExtension(extension.to_string()));
        }
        Ok(Self {
            extension: ext.to_string(),
        })
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl FilenameTransform for ExtensionRemap {
    fn rename(&self, basename: &str) -> String {
        match basename.rfind('.') {
            Some(dot) if dot > 0 => format!("{}.{}", &basename[..dot], self.extension),
            _ => format!("{}.{}", basename, self.extension),
        }
    }
}

/// Builds the transform for an optional remap extension.
pub fn from_extension(extension: Option<&str>) -> Result<Box<dyn FilenameTransform>, GrabError> {
    Ok(match extension {
        Some(ext) => Box::new(ExtensionRemap::new(ext)?),
        None => Box::new(Identity),
    })
}
