//! Collector for accumulating diagnostics during a parse.
//!
//! The [`DiagnosticCollector`] lets the parser report every problem in a
//! document instead of failing on the first one.

use log::{error, warn};

use crate::error::{Diagnostic, ParseError};

/// A collector for accumulating diagnostics.
///
/// Every emitted diagnostic is also logged, at `error` or `warn` level
/// depending on its severity.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        let code = diagnostic.code().map(|code| code.as_str()).unwrap_or("-");
        if diagnostic.severity().is_error() {
            self.has_errors = true;
            error!(code; "{}", diagnostic.message());
        } else {
            warn!(code; "{}", diagnostic.message());
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if an error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection.
    ///
    /// - If there are errors, returns `Err(ParseError)` with all diagnostics.
    /// - Otherwise returns the collected warnings.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_collector_empty_finish_ok() {
        let collector = DiagnosticCollector::new();
        assert!(collector.finish().unwrap().is_empty());
    }

    #[test]
    fn test_collector_warnings_are_returned() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("warning 1").with_code(ErrorCode::E002));
        collector.emit(Diagnostic::warning("warning 2"));

        assert!(!collector.has_errors());
        let warnings = collector.finish().unwrap();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].code(), Some(ErrorCode::E002));
    }

    #[test]
    fn test_collector_error_keeps_all_diagnostics() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(Diagnostic::warning("duplicate id"));
        collector.emit(
            Diagnostic::error("missing id")
                .with_code(ErrorCode::E001)
                .with_label(Span::new(10..20), "here"),
        );

        assert!(collector.has_errors());
        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.diagnostics()[1].message(), "missing id");
    }
}
