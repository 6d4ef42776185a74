//! Rules a basename must satisfy before it is written under the output directory.
//!
//! Names are rejected, never rewritten: a rewritten name could silently collide
//! with another asset's name.

use std::fmt;

/// Linux NAME_MAX.
pub const NAME_MAX: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafeName {
    Empty,
    /// `.` or `..`.
    DotSegment,
    /// Starts with `.`; would be hidden or look like a dot segment.
    Hidden,
    /// Contains `/`, `\` or NUL.
    Separator,
    /// Contains a control character.
    Control,
    /// Longer than [`NAME_MAX`] bytes.
    TooLong,
}

impl fmt::Display for UnsafeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnsafeName::Empty => "empty name",
            UnsafeName::DotSegment => "dot segment",
            UnsafeName::Hidden => "leading dot",
            UnsafeName::Separator => "path separator or NUL",
            UnsafeName::Control => "control character",
            UnsafeName::TooLong => "longer than 255 bytes",
        };
        f.write_str(s)
    }
}

/// Checks that `name` is a single plain file name.
pub fn validate_filename(name: &str) -> Result<(), UnsafeName> {
    if name.is_empty() {
        return Err(UnsafeName::Empty);
    }
    if name == "." || name == ".." {
        return Err(UnsafeName::DotSegment);
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(UnsafeName::Separator);
    }
    if name.chars().any(char::is_control) {
        return Err(UnsafeName::Control);
    }
    if name.starts_with('.') {
        return Err(UnsafeName::Hidden);
    }
    if name.len() > NAME_MAX {
        return Err(UnsafeName::TooLong);
    }
    Ok(())
}
