//! Filename extraction from URL path.

use url::Url;

/// Extracts the last path segment of `url` (its basename) as a filename hint.
///
/// Returns `None` if the path ends in `/`, is empty, or the segment is `.` / `..`.
pub fn filename_from_url_path(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Option<String> {
        filename_from_url_path(&Url::parse(s).unwrap())
    }

    #[test]
    fn normal() {
        assert_eq!(
            name("https://example.com/a/b/index-99.js").as_deref(),
            Some("index-99.js")
        );
        assert_eq!(name("https://example.com/single").as_deref(), Some("single"));
    }

    #[test]
    fn trailing_slash_has_no_basename() {
        assert_eq!(name("https://example.com/static/"), None);
    }

    #[test]
    fn root_or_empty() {
        assert_eq!(name("https://example.com/"), None);
        assert_eq!(name("https://example.com"), None);
    }

    #[test]
    fn with_query() {
        assert_eq!(
            name("https://example.com/index.js?token=abc").as_deref(),
            Some("index.js")
        );
    }

    #[test]
    fn cannot_be_a_base() {
        assert_eq!(name("data:text/javascript,alert(1)"), None);
    }
}
