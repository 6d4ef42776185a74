//! Batch outcome types.

use crate::download::{DownloadFailure, DownloadSuccess};
use crate::resolve::{Rejected, Resolution};
use serde::Serialize;
use std::path::PathBuf;
use url::Url;

/// Result of fetch + extract + resolve, before anything is downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    pub page_url: Url,
    /// Distinct attribute values that matched the pattern.
    pub matched: usize,
    pub resolution: Resolution,
}

impl Discovery {
    /// Local filenames in download order.
    pub fn filenames(&self) -> Vec<String> {
        self.resolution.filenames()
    }

    pub fn is_empty(&self) -> bool {
        self.resolution.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ManifestOutcome {
    NotRequested,
    Saved { path: PathBuf, count: usize },
    Failed { path: PathBuf, error: String },
}

/// Per-item outcomes of one batch. Counts never include skipped tasks.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub page_url: Url,
    /// Filenames in resolution order (what the manifest records).
    pub discovered: Vec<String>,
    pub succeeded: Vec<DownloadSuccess>,
    pub failed: Vec<DownloadFailure>,
    pub rejected: Vec<Rejected>,
    /// Tasks not attempted because the batch was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
    pub manifest: ManifestOutcome,
}

impl BatchReport {
    pub(crate) fn new(discovery: &Discovery) -> Self {
        Self {
            page_url: discovery.page_url.clone(),
            discovered: discovery.filenames(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            rejected: discovery.resolution.rejected.clone(),
            skipped: 0,
            cancelled: false,
            manifest: ManifestOutcome::NotRequested,
        }
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// True when every discovered asset was downloaded and the manifest (if any) saved.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
            && !self.cancelled
            && !matches!(self.manifest, ManifestOutcome::Failed { .. })
    }

    pub fn summary(&self) -> String {
        let mut s = format!(
            "{} attempted, {} succeeded, {} failed",
            self.attempted(),
            self.succeeded.len(),
            self.failed.len()
        );
        if self.cancelled {
            s.push_str(&format!(", {} skipped (cancelled)", self.skipped));
        }
        s
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", content = "report", rename_all = "snake_case")]
pub enum BatchResult {
    /// The page had no matching (resolvable) references. Not an error.
    NothingFound,
    Completed(BatchReport),
}

impl BatchResult {
    pub fn report(&self) -> Option<&BatchReport> {
        match self {
            BatchResult::NothingFound => None,
            BatchResult::Completed(r) => Some(r),
        }
    }
}
