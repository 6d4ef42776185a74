//! Turns raw references into absolute, deduplicated, deterministically ordered assets.
//!
//! Order: descending length of the raw reference (in characters), ties broken by
//! ascending lexicographic order of the raw text. The longest (most specific) path
//! is tried first; the rule is kept as-is so runs are reproducible.

use crate::transform::{FilenameTransform, Identity};
use crate::url_model::derive_filename;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// A discovered asset, immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetReference {
    /// Text as it appeared in the page.
    pub raw: String,
    /// Absolute URL (fragment removed).
    pub url: Url,
    /// Local basename, unique within one resolution.
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Could not be joined against the base URL.
    InvalidUrl,
    /// Resolved to something other than http(s).
    UnsupportedScheme,
    /// Path has no usable last segment.
    NoFilename,
    /// An earlier (longer or lexicographically smaller) reference already writes to
    /// the same destination filename.
    DuplicateFilename,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidUrl => write!(f, "not a valid URL reference"),
            RejectReason::UnsupportedScheme => write!(f, "not an http(s) URL"),
            RejectReason::NoFilename => write!(f, "no filename in URL path"),
            RejectReason::DuplicateFilename => write!(f, "filename already taken by another asset"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejected {
    pub raw: String,
    pub reason: RejectReason,
}

/// Output of [`resolve`]: assets in download order plus references that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub assets: Vec<AssetReference>,
    pub rejected: Vec<Rejected>,
}

impl Resolution {
    pub fn filenames(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.filename.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Longest raw reference first, then lexicographic.
pub fn reference_order(a: &str, b: &str) -> Ordering {
    b.chars()
        .count()
        .cmp(&a.chars().count())
        .then_with(|| a.cmp(b))
}

/// Sorts raw references with [`reference_order`] and drops exact duplicates.
pub fn order_references<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut refs: Vec<String> = raw.into_iter().map(Into::into).collect();
    refs.sort_by(|a, b| reference_order(a, b));
    refs.dedup();
    refs
}

/// Resolves `raw` references against `base`.
///
/// Duplicate absolute URLs collapse onto the first reference in order; filenames
/// are unique across the returned assets.
pub fn resolve<I, S>(raw: I, base: &Url) -> Resolution
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    resolve_with(raw, base, &Identity)
}

/// Like [`resolve`], but uniqueness is checked on the name `transform` will
/// write, so two assets never share a destination file.
pub fn resolve_with<I, S>(raw: I, base: &Url, transform: &dyn FilenameTransform) -> Resolution
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut resolution = Resolution::default();
    let mut seen_urls: HashSet<Url> = HashSet::new();
    let mut seen_names: HashSet<String> = HashSet::new();

    for raw in order_references(raw) {
        let mut url = match base.join(&raw) {
            Ok(u) => u,
            Err(e) => {
                tracing::debug!(raw = %raw, error = %e, "reference does not resolve");
                resolution.rejected.push(Rejected {
                    raw,
                    reason: RejectReason::InvalidUrl,
                });
                continue;
            }
        };
        url.set_fragment(None);
        if !matches!(url.scheme(), "http" | "https") {
            resolution.rejected.push(Rejected {
                raw,
                reason: RejectReason::UnsupportedScheme,
            });
            continue;
        }
        if !seen_urls.insert(url.clone()) {
            tracing::trace!(raw = %raw, url = %url, "duplicate asset URL");
            continue;
        }
        let Some(filename) = derive_filename(&url) else {
            resolution.rejected.push(Rejected {
                raw,
                reason: RejectReason::NoFilename,
            });
            continue;
        };
        let destination = transform.rename(&filename);
        if !seen_names.insert(destination) {
            tracing::debug!(raw = %raw, filename = %filename, "destination filename already taken");
            resolution.rejected.push(Rejected {
                raw,
                reason: RejectReason::DuplicateFilename,
            });
            continue;
        }
        resolution.assets.push(AssetReference { raw, url, filename });
    }
    resolution
}
