//! Orchestrates fetch, extract, resolve and download for one page.
//!
//! Only the base page fetch can fail the batch. Every per-asset error becomes a
//! failure entry in the [`BatchReport`] and the loop moves on to the next asset.

mod batch;

pub use batch::{BatchReport, BatchResult, Discovery, ManifestOutcome};

use crate::control::CancelToken;
use crate::download::{DownloadResult, DownloadTask, Downloader, NoProgress, ProgressSink};
use crate::error::GrabError;
use crate::extract::{extract, AssetPattern};
use crate::fetch::{HttpFetcher, PageSource};
use crate::manifest;
use crate::report::{Event, Reporter, TracingReporter};
use crate::resolve::resolve_with;
use crate::transform::FilenameTransform;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

pub struct Pipeline {
    source: Box<dyn PageSource + Send>,
    downloader: Downloader,
    reporter: Arc<dyn Reporter>,
    progress: Box<dyn ProgressSink + Send>,
    manifest: Option<PathBuf>,
    cancel: CancelToken,
}

impl Pipeline {
    /// Pipeline that reads the page and downloads assets with `fetcher`.
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self {
            source: Box::new(fetcher.clone()),
            downloader: Downloader::new(fetcher),
            reporter: Arc::new(TracingReporter),
            progress: Box::new(NoProgress),
            manifest: None,
            cancel: CancelToken::new(),
        }
    }

    /// Replace where the page text comes from (e.g. a [`crate::fetch::SavedPage`]).
    pub fn with_source(mut self, source: Box<dyn PageSource + Send>) -> Self {
        self.source = source;
        self
    }

    pub fn with_transform(mut self, transform: Box<dyn FilenameTransform>) -> Self {
        self.downloader = self.downloader.with_transform(transform);
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressSink + Send>) -> Self {
        self.progress = progress;
        self
    }

    /// Save the discovered filenames to `path` after the downloads.
    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest = Some(path.into());
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fetches `base_url`, extracts matching references and resolves them. Nothing
    /// is written to disk.
    pub fn discover(&self, base_url: &Url, pattern: &AssetPattern) -> Result<Discovery, GrabError> {
        self.reporter
            .report(Event::info(format!("Fetching base URL: {base_url}")).with_url(base_url));
        let page = match self.source.fetch_page(base_url) {
            Ok(page) => page,
            Err(e) => {
                self.reporter.report(
                    Event::error(format!("Error fetching the base URL: {e}")).with_url(base_url),
                );
                return Err(e);
            }
        };

        let raw = extract(&page, pattern);
        tracing::debug!(
            url = %base_url,
            page_bytes = page.len(),
            matched = raw.len(),
            attribute = pattern.attribute(),
            pattern = pattern.value_pattern(),
            "extracted references"
        );
        if !raw.is_empty() {
            self.reporter.info(&format!(
                "Found {} asset references matching the pattern.",
                raw.len()
            ));
        }
        let matched = raw.len();
        let resolution = resolve_with(raw, base_url, self.downloader.transform());
        for r in &resolution.rejected {
            self.reporter
                .warning(&format!("Skipping reference {:?}: {}", r.raw, r.reason));
        }
        Ok(Discovery {
            page_url: base_url.clone(),
            matched,
            resolution,
        })
    }

    /// Discovers assets on `base_url` and downloads each into `output_dir`, in
    /// resolution order.
    ///
    /// Returns `Err` only when the base page cannot be fetched. A page without
    /// matching references yields [`BatchResult::NothingFound`].
    pub fn run(
        &mut self,
        base_url: &Url,
        output_dir: &Path,
        pattern: &AssetPattern,
    ) -> Result<BatchResult, GrabError> {
        let discovery = self.discover(base_url, pattern)?;
        if discovery.is_empty() {
            self.reporter.warning("No matching assets found.");
            return Ok(BatchResult::NothingFound);
        }

        let mut report = BatchReport::new(&discovery);
        let assets = discovery.resolution.assets;
        let total = assets.len();

        for (i, asset) in assets.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                report.skipped = total - i;
                self.reporter.warning(&format!(
                    "Cancelled: {} of {} downloads not attempted.",
                    report.skipped, total
                ));
                break;
            }

            self.reporter
                .report(Event::info(format!("Starting download: {}", asset.url)).with_url(&asset.url));
            let task = DownloadTask::new(asset, output_dir);
            match self.downloader.download(&task, self.progress.as_mut()) {
                DownloadResult::Success(ok) => {
                    self.reporter.report(
                        Event::info(format!(
                            "Successfully downloaded and saved: {}",
                            ok.path.display()
                        ))
                        .with_url(&ok.url)
                        .with_bytes(ok.bytes, Some(ok.bytes)),
                    );
                    report.succeeded.push(ok);
                }
                DownloadResult::Failure(failure) => {
                    let mut event = Event::error(format!(
                        "Failed to download {}: {}",
                        failure.url, failure.error
                    ))
                    .with_url(&failure.url);
                    if let GrabError::Transfer {
                        received, expected, ..
                    } = &failure.error
                    {
                        event = event.with_bytes(*received, *expected);
                    }
                    self.reporter.report(event);
                    report.failed.push(failure);
                }
            }
        }

        if let Some(path) = &self.manifest {
            report.manifest = self.save_manifest(&report.discovered, path);
        }

        tracing::info!(url = %base_url, "batch finished: {}", report.summary());
        Ok(BatchResult::Completed(report))
    }

    fn save_manifest(&self, filenames: &[String], path: &Path) -> ManifestOutcome {
        match manifest::save(filenames, path) {
            Ok(()) => {
                self.reporter.info(&format!(
                    "Saved {} filenames to {} in resolution order.",
                    filenames.len(),
                    path.display()
                ));
                ManifestOutcome::Saved {
                    path: path.to_path_buf(),
                    count: filenames.len(),
                }
            }
            Err(e) => {
                self.reporter
                    .error(&format!("Failed to save filenames to {}: {e}", path.display()));
                ManifestOutcome::Failed {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                }
            }
        }
    }
}
