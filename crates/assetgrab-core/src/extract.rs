//! Attribute-scoped asset reference extraction.
//!
//! Only the values of the configured attribute inside start tags are considered,
//! and the value pattern must match the whole value. Text outside tags (inline
//! script bodies, comments, prose) never produces a reference.
//!
//! Start tags are read one attribute at a time, so a quoted value is always
//! skipped as a whole: a `>` or `src='...'` inside another attribute's value is
//! just text.

use crate::error::GrabError;
use regex::Regex;
use std::collections::BTreeSet;

/// Attribute scanned by default.
pub const DEFAULT_ATTRIBUTE: &str = "src";

/// Matches rooted paths to an `index*.js` bundle, e.g. `/static/index-ab12.js`.
pub const DEFAULT_VALUE_PATTERN: &str = r"/.*?/index.*?\.js";

#[derive(Debug, Clone)]
pub struct AssetPattern {
    attribute: String,
    value_pattern: String,
    value: Regex,
    tag_open: Regex,
    attr: Regex,
    comment: Regex,
}

impl AssetPattern {
    /// `attribute` is matched case-insensitively; `value_pattern` is a regex that
    /// must match an attribute value in full.
    pub fn new(attribute: &str, value_pattern: &str) -> Result<Self, GrabError> {
        let attribute = attribute.trim();
        if attribute.is_empty() || attribute.contains(|c: char| c.is_whitespace() || c == '=') {
            return Err(GrabError::Pattern {
                pattern: attribute.to_string(),
                reason: "attribute name must be a single non-empty token".to_string(),
            });
        }
        let value = Regex::new(&format!("^(?:{value_pattern})$"))
            .map_err(|e| pattern_error(value_pattern, e))?;
        let tag_open =
            Regex::new(r"<[A-Za-z][^\s/>]*").map_err(|e| pattern_error("<tag", e))?;
        // One `name`, `name=value`, `name="value"` or `name='value'` at the cursor.
        let attr = Regex::new(
            r#"^[\s/]*([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'<>=`]+)))?"#,
        )
        .map_err(|e| pattern_error("attribute", e))?;
        let comment = Regex::new(r"(?s)<!--.*?-->").map_err(|e| pattern_error("<!-- -->", e))?;
        Ok(Self {
            attribute: attribute.to_string(),
            value_pattern: value_pattern.to_string(),
            value,
            tag_open,
            attr,
            comment,
        })
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn value_pattern(&self) -> &str {
        &self.value_pattern
    }

    /// True if `value` (an attribute value) is a candidate reference.
    pub fn matches_value(&self, value: &str) -> bool {
        self.value.is_match(value)
    }
}

impl Default for AssetPattern {
    fn default() -> Self {
        Self::new(DEFAULT_ATTRIBUTE, DEFAULT_VALUE_PATTERN).expect("default asset pattern")
    }
}

fn pattern_error(pattern: &str, e: regex::Error) -> GrabError {
    GrabError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    }
}

/// Returns every distinct attribute value in `page` matching `pattern`.
/// An empty set means nothing matched; that is not an error.
pub fn extract(page: &str, pattern: &AssetPattern) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let page = pattern.comment.replace_all(page, " ");
    let mut rest: &str = &page;
    while let Some(open) = pattern.tag_open.find(rest) {
        rest = scan_attributes(&rest[open.end()..], pattern, &mut found);
    }
    tracing::trace!(
        attribute = pattern.attribute(),
        matches = found.len(),
        "extracted asset references"
    );
    found
}

/// Walks the attributes of one start tag, collecting matching values of the
/// configured attribute. Returns the text after the last attribute read.
fn scan_attributes<'a>(
    mut tag: &'a str,
    pattern: &AssetPattern,
    found: &mut BTreeSet<String>,
) -> &'a str {
    while let Some(caps) = pattern.attr.captures(tag) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        if name.as_str().eq_ignore_ascii_case(&pattern.attribute) {
            let raw = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4));
            if let Some(raw) = raw {
                let value = decode_entities(raw.as_str().trim());
                if pattern.matches_value(&value) {
                    found.insert(value);
                }
            }
        }
        tag = &tag[whole.end()..];
    }
    tag
}

/// Minimal entity decoding for URL-ish attribute values.
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&#x2F;", "/")
        .replace("&#47;", "/")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
