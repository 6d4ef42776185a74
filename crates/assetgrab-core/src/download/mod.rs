//! Streams one resolved asset into the output directory.
//!
//! The body goes to `<name>.part` chunk by chunk and is renamed to `<name>` only
//! after the whole body arrived and was synced. Non-2xx responses never create a
//! file; interrupted transfers remove their `.part` file.

mod progress;
mod sink;

pub use progress::{NoProgress, ProgressSink, ProgressState};

use crate::error::{ErrorKind, GrabError};
use crate::fetch::HttpFetcher;
use crate::resolve::AssetReference;
use crate::transform::{FilenameTransform, Identity};
use crate::url_model::is_plain_filename;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use sink::FileSink;
use std::path::{Path, PathBuf};
use url::Url;

/// One asset to fetch into one directory. Used once, then dropped.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub asset: AssetReference,
    pub output_dir: PathBuf,
}

impl DownloadTask {
    pub fn new(asset: AssetReference, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            asset,
            output_dir: output_dir.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadSuccess {
    pub url: Url,
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug)]
pub struct DownloadFailure {
    pub url: Url,
    pub filename: String,
    pub error: GrabError,
}

impl DownloadFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl Serialize for DownloadFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DownloadFailure", 5)?;
        s.serialize_field("url", self.url.as_str())?;
        s.serialize_field("filename", &self.filename)?;
        s.serialize_field("kind", &self.error.kind())?;
        s.serialize_field("message", &self.error.to_string())?;
        s.serialize_field("bytes_transferred", &self.error.bytes_transferred())?;
        s.end()
    }
}

#[derive(Debug)]
pub enum DownloadResult {
    Success(DownloadSuccess),
    Failure(DownloadFailure),
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadResult::Success(_))
    }
}

pub struct Downloader {
    fetcher: HttpFetcher,
    transform: Box<dyn FilenameTransform>,
}

impl Downloader {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self {
            fetcher,
            transform: Box::new(Identity),
        }
    }

    /// Rename destinations (e.g. extension remap); the bytes are written unchanged.
    pub fn with_transform(mut self, transform: Box<dyn FilenameTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn transform(&self) -> &dyn FilenameTransform {
        self.transform.as_ref()
    }

    /// Final path for `task`: the transformed basename directly under `output_dir`.
    pub fn destination(&self, task: &DownloadTask) -> Result<PathBuf, GrabError> {
        destination_in(
            &task.output_dir,
            &self.transform.rename(&task.asset.filename),
        )
    }

    /// Downloads `task`, reporting chunk progress to `progress`. Never panics or
    /// propagates: every failure comes back as [`DownloadResult::Failure`].
    pub fn download(&self, task: &DownloadTask, progress: &mut dyn ProgressSink) -> DownloadResult {
        match self.try_download(task, progress) {
            Ok(success) => DownloadResult::Success(success),
            Err(error) => {
                tracing::debug!(url = %task.asset.url, error = %error, "download failed");
                DownloadResult::Failure(DownloadFailure {
                    url: task.asset.url.clone(),
                    filename: task.asset.filename.clone(),
                    error,
                })
            }
        }
    }

    fn try_download(
        &self,
        task: &DownloadTask,
        progress: &mut dyn ProgressSink,
    ) -> Result<DownloadSuccess, GrabError> {
        let final_path = self.destination(task)?;
        let name = final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let url = &task.asset.url;

        let mut sink = FileSink::new(url, &task.output_dir, &final_path, &name, progress);
        let streamed = self.fetcher.stream(url, &mut sink);
        let part = sink.part.take();

        let outcome = match (streamed, part) {
            (Ok(_), Some(part)) => part.finalize(&final_path),
            (Ok(bytes), None) => Err(GrabError::Transfer {
                url: url.to_string(),
                received: bytes,
                expected: sink.state.total,
                reason: "response finished without a body sink".to_string(),
            }),
            (Err(e), part) => {
                if let Some(part) = part {
                    tracing::debug!(
                        temp = %part.temp_path().display(),
                        written = part.written(),
                        "discarding partial download"
                    );
                    part.discard();
                }
                Err(e)
            }
        };

        sink.finish(outcome.is_ok());
        let bytes = outcome?;
        tracing::debug!(url = %url, path = %final_path.display(), bytes, "download complete");
        Ok(DownloadSuccess {
            url: url.clone(),
            path: final_path,
            bytes,
        })
    }
}

fn destination_in(output_dir: &Path, name: &str) -> Result<PathBuf, GrabError> {
    if !is_plain_filename(name) {
        return Err(GrabError::UnsafeFilename {
            filename: name.to_string(),
            dir: output_dir.to_path_buf(),
        });
    }
    Ok(output_dir.join(name))
}
