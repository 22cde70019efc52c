//! Error codes for the PhyloSVG diagnostic system.
//!
//! All codes belong to the document parser:
//! - `E001` is fatal
//! - `E002`..`E006` are warnings

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Missing element id.
    ///
    /// A `text`, `path` or `rect` tag has no `id` attribute, so the element
    /// could not be referenced when the document is written back.
    E001,

    /// Duplicate element id.
    ///
    /// The later element is kept as literal text.
    E002,

    /// Unterminated element.
    ///
    /// The input ended while a multi-line element was still open.
    E003,

    /// Abandoned element.
    ///
    /// A new element opener was found while another element was still open.
    E004,

    /// Malformed style declaration.
    ///
    /// A `style` declaration has no `:` separator.
    E005,

    /// Unresolved nested tag.
    ///
    /// A nested tag inside an element has no matching closing tag.
    E006,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E006 => "E006",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "missing element id",
            ErrorCode::E002 => "duplicate element id",
            ErrorCode::E003 => "unterminated element",
            ErrorCode::E004 => "abandoned element",
            ErrorCode::E005 => "malformed style declaration",
            ErrorCode::E006 => "unresolved nested tag",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
