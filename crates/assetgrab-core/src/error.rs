//! Error taxonomy for fetching, resolving and downloading assets.
//!
//! Every per-item failure is one of these variants; the pipeline turns them into
//! failure entries instead of propagating them (only the base page fetch is fatal).

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Network-level failure class, derived from the libcurl error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    /// Connect or read timed out (includes the low-speed abort).
    Timeout,
    /// Host (or proxy) name could not be resolved.
    Dns,
    /// TCP/TLS connection could not be established or was dropped before a response.
    Connect,
    /// Anything else curl reported before a response head arrived.
    Other,
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkKind::Timeout => write!(f, "timeout"),
            NetworkKind::Dns => write!(f, "DNS failure"),
            NetworkKind::Connect => write!(f, "connection failure"),
            NetworkKind::Other => write!(f, "network error"),
        }
    }
}

/// Flat classification of a [`GrabError`], used in batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    HttpStatus,
    Transfer,
    Io,
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Network => "NetworkError",
            ErrorKind::HttpStatus => "HTTPStatusError",
            ErrorKind::Transfer => "TransferError",
            ErrorKind::Io => "IOError",
            ErrorKind::InvalidInput => "InvalidInput",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum GrabError {
    /// Connection, DNS or timeout failure before any body byte arrived.
    #[error("{url}: {kind}: {source}")]
    Network {
        url: String,
        kind: NetworkKind,
        #[source]
        source: curl::Error,
    },

    /// Final response (after redirects) was not 2xx.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u32 },

    /// Body stream broke off after the response head was accepted.
    #[error(
        "transfer of {url} interrupted after {received} bytes{}: {reason}",
        .expected.map(|t| format!(" of {t}")).unwrap_or_default()
    )]
    Transfer {
        url: String,
        received: u64,
        expected: Option<u64>,
        reason: String,
    },

    /// Local filesystem failure.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid URL {input:?}: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid asset pattern {pattern:?}: {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("invalid extension {0:?}")]
    InvalidExtension(String),

    #[error("refusing to write {filename:?} outside {}", .dir.display())]
    UnsafeFilename { filename: String, dir: PathBuf },
}

impl GrabError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GrabError::Network { .. } => ErrorKind::Network,
            GrabError::HttpStatus { .. } => ErrorKind::HttpStatus,
            GrabError::Transfer { .. } => ErrorKind::Transfer,
            GrabError::Io { .. } => ErrorKind::Io,
            GrabError::InvalidUrl { .. }
            | GrabError::Pattern { .. }
            | GrabError::InvalidExtension(_)
            | GrabError::UnsafeFilename { .. } => ErrorKind::InvalidInput,
        }
    }

    /// Bytes received before a transfer broke off, if this is a transfer error.
    pub fn bytes_transferred(&self) -> Option<u64> {
        match self {
            GrabError::Transfer { received, .. } => Some(*received),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GrabError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Parses `input` as an absolute URL.
pub fn parse_url(input: &str) -> Result<url::Url, GrabError> {
    url::Url::parse(input.trim()).map_err(|source| GrabError::InvalidUrl {
        input: input.to_string(),
        source,
    })
}
