//! Discovers build-hashed assets on a web page and downloads them safely.

pub mod config;
pub mod control;
pub mod download;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod storage;
pub mod transform;
pub mod url_model;

pub use error::{ErrorKind, GrabError};
