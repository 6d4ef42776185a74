//! Stream sink that writes a response body into a `.part` file.

use super::progress::{ProgressSink, ProgressState};
use crate::error::GrabError;
use crate::fetch::{ResponseHead, StreamSink};
use crate::storage::{self, PartFile};
use std::path::{Path, PathBuf};
use url::Url;

pub(super) struct FileSink<'a> {
    url: &'a Url,
    output_dir: &'a Path,
    temp_path: PathBuf,
    name: &'a str,
    progress: &'a mut dyn ProgressSink,
    pub(super) part: Option<PartFile>,
    pub(super) state: ProgressState,
    pub(super) started: bool,
}

impl<'a> FileSink<'a> {
    pub(super) fn new(
        url: &'a Url,
        output_dir: &'a Path,
        final_path: &Path,
        name: &'a str,
        progress: &'a mut dyn ProgressSink,
    ) -> Self {
        Self {
            url,
            output_dir,
            temp_path: storage::temp_path(final_path),
            name,
            progress,
            part: None,
            state: ProgressState::default(),
            started: false,
        }
    }

    /// Closes the progress display opened by `begin`; no-op if it never began.
    pub(super) fn finish(&mut self, ok: bool) {
        if self.started {
            self.progress.on_finish(self.name, &self.state, ok);
        }
    }
}

impl StreamSink for FileSink<'_> {
    fn begin(&mut self, head: &ResponseHead) -> Result<(), GrabError> {
        self.state = ProgressState::new(head.content_length);
        storage::ensure_dir(self.output_dir)?;
        self.part = Some(PartFile::create(&self.temp_path)?);
        tracing::debug!(
            url = %self.url,
            temp = %self.temp_path.display(),
            total = ?head.content_length,
            "writing body"
        );
        self.started = true;
        self.progress.on_start(self.name, &self.state);
        Ok(())
    }

    fn chunk(&mut self, data: &[u8]) -> Result<(), GrabError> {
        if let Some(left) = self.state.remaining() {
            if data.len() as u64 > left {
                return Err(GrabError::Transfer {
                    url: self.url.to_string(),
                    received: self.state.received,
                    expected: self.state.total,
                    reason: "body exceeds the declared Content-Length".to_string(),
                });
            }
        }
        let Some(part) = self.part.as_mut() else {
            return Err(GrabError::Transfer {
                url: self.url.to_string(),
                received: self.state.received,
                expected: self.state.total,
                reason: "body chunk arrived before the response head".to_string(),
            });
        };
        part.write_chunk(data)?;
        self.state.record(data.len());
        self.progress.on_progress(&self.state);
        Ok(())
    }
}
