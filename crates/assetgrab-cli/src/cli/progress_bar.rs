//! Single-line terminal progress bar, redrawn in place with `\r`.
//!
//! Known size: `[#####.....]  42%`. Unknown size: a cycling run of `#` plus
//! `Chunks: N`.

use assetgrab_core::download::{ProgressSink, ProgressState};
use std::io::{self, Write};

pub const BAR_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Percent(u8),
    Chunks(u64),
}

fn mark(state: &ProgressState) -> Mark {
    match state.percent() {
        Some(p) => Mark::Percent(p),
        None => Mark::Chunks(state.chunks),
    }
}

pub fn render(state: &ProgressState) -> String {
    match state.percent() {
        Some(p) => {
            let filled = p as usize * BAR_WIDTH / 100;
            format!(
                "[{}{}] {:3}%",
                "#".repeat(filled),
                ".".repeat(BAR_WIDTH - filled),
                p
            )
        }
        None => {
            let n = (state.chunks % BAR_WIDTH as u64) as usize;
            format!(
                "[{:<width$}] Chunks: {}",
                "#".repeat(n),
                state.chunks,
                width = BAR_WIDTH
            )
        }
    }
}

pub fn render_complete(state: &ProgressState) -> String {
    let bar = "#".repeat(BAR_WIDTH);
    if state.total.is_some() {
        format!("[{bar}] 100% - Download complete!")
    } else {
        format!("[{bar}] Download complete!")
    }
}

pub struct ProgressBar<W: Write> {
    out: W,
    last: Option<Mark>,
}

impl ProgressBar<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> ProgressBar<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

// Terminal writes are best effort; a closed stderr must not fail the download.
impl<W: Write> ProgressSink for ProgressBar<W> {
    fn on_start(&mut self, name: &str, _state: &ProgressState) {
        self.last = None;
        let _ = writeln!(self.out, "Downloading {name}...");
    }

    fn on_progress(&mut self, state: &ProgressState) {
        let m = mark(state);
        if self.last == Some(m) {
            return;
        }
        self.last = Some(m);
        let _ = write!(self.out, "\r{}", render(state));
        let _ = self.out.flush();
    }

    fn on_finish(&mut self, _name: &str, state: &ProgressState, ok: bool) {
        if ok {
            let _ = writeln!(self.out, "\r{}", render_complete(state));
        } else if self.last.is_some() {
            let _ = writeln!(self.out);
        }
        let _ = self.out.flush();
        self.last = None;
    }
}
