//! Structured diagnostic messages with severity, codes, labels and notes.

use crate::code::DiagnosticCode;
use crate::label::Label;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A finding about one compiled block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Follows the code's category.
    pub severity: Severity,
    /// What kind of finding this is.
    pub code: DiagnosticCode,
    /// One-line summary.
    pub message: String,
    /// Signals the finding points at.
    pub labels: Vec<Label>,
    /// Rendered as `= note: ...`.
    pub notes: Vec<String>,
    /// Rendered as `= help: ...`.
    pub help: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic whose severity follows `code`.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.category.into(),
            code,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Adds a label to this diagnostic.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_comes_from_code() {
        let diag = Diagnostic::new(DiagnosticCode::UNIQUE_OVERLAP, "overlap");
        assert_eq!(diag.severity, Severity::Warning);
        assert!(diag.labels.is_empty());
        let diag = Diagnostic::new(DiagnosticCode::UNIQUE_OVERLAP_DENIED, "overlap");
        assert_eq!(diag.severity, Severity::Error);
    }

    #[test]
    fn builder_methods() {
        let diag = Diagnostic::new(DiagnosticCode::UNINITIALIZED_READ, "latch")
            .with_label(Label::primary("y", "read before assignment"))
            .with_note("the else branch leaves y unassigned")
            .with_help("assign y before the if");
        assert_eq!(diag.labels[0].signal, "y");
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
    }
}
