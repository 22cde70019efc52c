//! Error types for PhyloSVG operations.
//!
//! This module provides the main error type [`PhyloSvgError`] which wraps
//! the fatal conditions that can occur while reading, editing and writing a
//! tree image. Recoverable problems are logged and reported through typed
//! warning values instead.

use std::io;

use thiserror::Error;

use phylosvg_parser::error::ParseError;

/// The main error type for PhyloSVG operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant contains structured error information with source code
/// spans. This provides detailed error information that can be used for rich
/// error reporting.
#[derive(Debug, Error)]
pub enum PhyloSvgError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Document references unknown element `{id}`")]
    UnknownElement { id: String },

    #[error("Group `{group}` of sequence `{sequence_id}` has no color")]
    MissingGroupColor { group: String, sequence_id: String },

    #[error("Invalid {table} table, line {line}: {message}")]
    Table {
        table: &'static str,
        line: usize,
        message: String,
    },

    #[error("Export error: {0}")]
    Export(String),
}

impl PhyloSvgError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// Create a new `Table` error for a line of an auxiliary input table.
    ///
    /// `line` is 1-based.
    pub fn table_error(table: &'static str, line: usize, message: impl Into<String>) -> Self {
        Self::Table {
            table,
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PhyloSvgError::table_error("taxonomy color", 3, "expected 4 fields, found 2");
        assert_eq!(
            err.to_string(),
            "Invalid taxonomy color table, line 3: expected 4 fields, found 2"
        );

        let err = PhyloSvgError::MissingGroupColor {
            group: "Clade_A".to_string(),
            sequence_id: "YP_000001.1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Group `Clade_A` of sequence `YP_000001.1` has no color"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let err: PhyloSvgError = io::Error::new(io::ErrorKind::NotFound, "tree.svg").into();
        assert!(matches!(err, PhyloSvgError::Io(_)));
    }
}
