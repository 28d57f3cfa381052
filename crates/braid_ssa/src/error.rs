//! Compile-time failures of a combinational block.

use braid_diagnostics::{Diagnostic, DiagnosticCode, Label};
use braid_sim::SimError;

/// Errors raised while compiling a combinational block.
///
/// No driver is installed when compilation fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SsaError {
    /// An output still depends on its "no prior value" sentinel, or on that
    /// of another block-local signal, on some path through the block.
    #[error("{}", uninitialized_message(signal, read))]
    UninitializedRead {
        /// The output whose final expression is affected.
        signal: String,
        /// The signal read before assignment. Equal to `signal` when the
        /// output reads itself.
        read: String,
    },

    /// An assigned value does not have the width of its target.
    #[error("width mismatch assigning '{target}': expected {expected} bits, got {actual}")]
    WidthMismatch {
        /// Name of the assigned signal.
        target: String,
        /// Width of the target.
        expected: u32,
        /// Width of the assigned value.
        actual: u32,
    },

    /// A condition or selector has the wrong shape.
    #[error("{context} must be {expected} bit wide, got {actual} bits")]
    TypeMismatch {
        /// What was being checked, e.g. "if condition".
        context: &'static str,
        /// Required width.
        expected: u32,
        /// Actual width.
        actual: u32,
    },

    /// A block output already has a driver or is an injected root.
    #[error("signal '{signal}' is assigned in a combinational block but is already driven")]
    AlreadyDriven {
        /// Name of the conflicting signal.
        signal: String,
    },

    /// Two items of a unique case can match the same selector value.
    #[error("unique case on '{selector}': items {first} and {second} overlap")]
    UniqueOverlap {
        /// Name of the selector signal.
        selector: String,
        /// Index of the earlier item.
        first: usize,
        /// Index of the later item.
        second: usize,
    },

    /// A graph-level width or structure error.
    #[error(transparent)]
    Graph(#[from] SimError),
}

impl SsaError {
    /// The code reported for this failure.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            SsaError::UninitializedRead { .. } => DiagnosticCode::UNINITIALIZED_READ,
            SsaError::WidthMismatch { .. } => DiagnosticCode::WIDTH_MISMATCH,
            SsaError::TypeMismatch { .. } => DiagnosticCode::TYPE_MISMATCH,
            SsaError::AlreadyDriven { .. } => DiagnosticCode::ALREADY_DRIVEN,
            SsaError::UniqueOverlap { .. } => DiagnosticCode::UNIQUE_OVERLAP_DENIED,
            SsaError::Graph(_) => DiagnosticCode::GRAPH,
        }
    }

    /// The error diagnostic a compiler with a sink emits for this failure.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::new(self.code(), self.to_string());
        match self {
            SsaError::UninitializedRead { signal, read } if signal == read => {
                diag.with_label(Label::primary(read, "read before every path assigns it"))
            }
            SsaError::UninitializedRead { signal, read } => diag
                .with_label(Label::primary(read, "read before every path assigns it"))
                .with_label(Label::secondary(signal, "depends on it")),
            SsaError::WidthMismatch {
                target, expected, ..
            } => diag.with_label(Label::primary(target, format!("declared {expected} bits wide"))),
            SsaError::AlreadyDriven { signal } => {
                diag.with_label(Label::primary(signal, "already has a driver"))
            }
            SsaError::UniqueOverlap {
                selector,
                first,
                second,
            } => diag
                .with_label(Label::primary(
                    selector,
                    format!("items {first} and {second} can both match"),
                ))
                .with_help("make the items disjoint or relax `unique_overlap` in braid.toml"),
            SsaError::TypeMismatch { .. } | SsaError::Graph(_) => diag,
        }
    }
}

fn uninitialized_message(signal: &str, read: &str) -> String {
    if signal == read {
        format!("'{signal}' is read before it is assigned on some path (inferred latch)")
    } else {
        format!("'{signal}' depends on '{read}' before it is assigned on some path (inferred latch)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_self_read() {
        let e = SsaError::UninitializedRead {
            signal: "x".into(),
            read: "x".into(),
        };
        assert_eq!(
            e.to_string(),
            "'x' is read before it is assigned on some path (inferred latch)"
        );
    }

    #[test]
    fn uninitialized_other_read() {
        let e = SsaError::UninitializedRead {
            signal: "y".into(),
            read: "tmp".into(),
        };
        assert!(e.to_string().contains("depends on 'tmp'"));
    }

    #[test]
    fn diagnostics_carry_codes_and_labels() {
        let e = SsaError::UninitializedRead {
            signal: "y".into(),
            read: "tmp".into(),
        };
        let diag = e.to_diagnostic();
        assert_eq!(diag.code.to_string(), "E101");
        assert_eq!(diag.message, e.to_string());
        assert_eq!(diag.labels[0].signal, "tmp");
        assert_eq!(diag.labels[1].signal, "y");

        let e = SsaError::UniqueOverlap {
            selector: "op".into(),
            first: 0,
            second: 2,
        };
        let diag = e.to_diagnostic();
        assert_eq!(diag.code, DiagnosticCode::UNIQUE_OVERLAP_DENIED);
        assert_eq!(diag.labels[0].message, "items 0 and 2 can both match");
    }

    #[test]
    fn graph_errors_are_transparent() {
        let e: SsaError = SimError::AlreadyDriven { signal: "q".into() }.into();
        assert_eq!(e.to_string(), "signal 'q' is already driven");
    }
}
