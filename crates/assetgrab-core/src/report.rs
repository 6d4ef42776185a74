//! User-facing events emitted by the pipeline.
//!
//! The core owns no formatting: it builds [`Event`]s and hands them to an injected
//! [`Reporter`]. Internals still log through `tracing` directly.

use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub level: Level,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl Event {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            url: None,
            bytes: None,
            total: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn with_url(mut self, url: impl fmt::Display) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_bytes(mut self, bytes: u64, total: Option<u64>) -> Self {
        self.bytes = Some(bytes);
        self.total = total;
        self
    }
}

/// Sink for pipeline events. Implementations decide presentation.
pub trait Reporter: Send + Sync {
    fn report(&self, event: Event);

    fn info(&self, message: &str) {
        self.report(Event::info(message));
    }

    fn warning(&self, message: &str) {
        self.report(Event::warning(message));
    }

    fn error(&self, message: &str) {
        self.report(Event::error(message));
    }
}

/// Forwards events to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: Event) {
        let url = event.url.as_deref().unwrap_or("");
        match event.level {
            Level::Info => {
                tracing::info!(url, bytes = ?event.bytes, total = ?event.total, "{}", event.message)
            }
            Level::Warning => {
                tracing::warn!(url, bytes = ?event.bytes, total = ?event.total, "{}", event.message)
            }
            Level::Error => {
                tracing::error!(url, bytes = ?event.bytes, total = ?event.total, "{}", event.message)
            }
        }
    }
}

/// Keeps every event in memory, in order. Useful for tests and batch summaries.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|e| e.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: Event) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
