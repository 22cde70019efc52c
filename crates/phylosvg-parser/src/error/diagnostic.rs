//! The core diagnostic type for the PhyloSVG error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, multiple labeled source spans, and help text.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// error[E001]: `text` element has no `id` attribute
///   --> tree.svg:14:1
///    |
/// 14 | <text x="10" y="20">Leaf</text>
///    | ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ element without id
///    |
///    = help: every text, path and rect element needs a unique id
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use phylosvg_parser::error::{Diagnostic, ErrorCode};
    /// # use phylosvg_parser::Span;
    ///
    /// let diag = Diagnostic::error("`path` element has no `id` attribute")
    ///     .with_code(ErrorCode::E001)
    ///     .with_label(Span::new(0..10), "element without id");
    /// assert!(diag.severity().is_error());
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_defaults() {
        let diag = Diagnostic::warning("element is never closed");

        assert!(diag.severity().is_warning());
        assert_eq!(diag.message(), "element is never closed");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_labels() {
        let diag = Diagnostic::warning("element id `t1` is used more than once")
            .with_code(ErrorCode::E002)
            .with_label(Span::new(40..60), "duplicate element")
            .with_secondary_label(Span::new(0..20), "first defined here");

        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(diag.labels()[1].is_secondary());
        assert_eq!(diag.labels()[1].message(), "first defined here");
    }

    #[test]
    fn test_diagnostic_display() {
        let coded = Diagnostic::error("`text` element has no `id` attribute")
            .with_code(ErrorCode::E001)
            .with_help("add an id");
        assert_eq!(
            coded.to_string(),
            "error[E001]: `text` element has no `id` attribute"
        );
        assert_eq!(coded.help(), Some("add an id"));

        let plain = Diagnostic::warning("odd input");
        assert_eq!(plain.to_string(), "warning: odd input");
    }
}
