//! Local filename derivation for resolved asset URLs.
//!
//! The filename is the last path segment of the URL as the URL parser normalized
//! it. Segments that could name anything but a plain file directly inside the
//! output directory are rejected.

mod path;
mod validate;

pub use path::filename_from_url_path;
pub use validate::{validate_filename, UnsafeName, NAME_MAX};

use url::Url;

/// Derives a safe local filename for `url`, or `None` when the path has no usable
/// last segment (e.g. `https://example.com/` or `.../..`).
///
/// # Examples
///
/// - `https://example.com/static/index-ab12.js` → `"index-ab12.js"`
/// - `https://example.com/a/b/index.js?v=3` → `"index.js"`
pub fn derive_filename(url: &Url) -> Option<String> {
    let name = filename_from_url_path(url)?;
    match validate_filename(&name) {
        Ok(()) => Some(name),
        Err(reason) => {
            tracing::debug!(url = %url, name = %name, %reason, "unusable filename");
            None
        }
    }
}

/// True if `name` is a single normal path component that passes [`validate_filename`].
pub fn is_plain_filename(name: &str) -> bool {
    let mut components = std::path::Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    ) && validate_filename(name).is_ok()
}
