//! Diagnostic rendering backends.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;

/// Formats a diagnostic into an output string.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format:
///
/// ```text
/// warning[W201]: unique case items overlap
///   --> y: written by overlapping items
///   --- sel: selector
///    = note: items 0 and 1 both match 2'b01
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("{}[{}]: {}\n", diag.severity, diag.code, diag.message);
        for label in &diag.labels {
            let arrow = match label.style {
                LabelStyle::Primary => "-->",
                LabelStyle::Secondary => "---",
            };
            out.push_str(&format!("  {arrow} {}: {}\n", label.signal, label.message));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}
