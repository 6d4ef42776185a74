//! Page source backed by a page saved to disk.
//!
//! Pages that only expose their script tags after client-side rendering can be
//! captured by an external headless browser and fed in here; the base URL is still
//! used to resolve the references found in the saved markup.

use super::PageSource;
use crate::error::GrabError;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone)]
pub struct SavedPage {
    path: PathBuf,
}

impl SavedPage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PageSource for SavedPage {
    fn fetch_page(&self, url: &Url) -> Result<String, GrabError> {
        let bytes = std::fs::read(&self.path).map_err(|e| GrabError::io(&self.path, e))?;
        tracing::debug!(
            path = %self.path.display(),
            base = %url,
            bytes = bytes.len(),
            "loaded saved page"
        );
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
