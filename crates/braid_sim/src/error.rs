//! Structural errors raised while building or settling a signal graph.
//!
//! Unknown values never show up here: X/Z propagation is handled inside the
//! value model.

use braid_common::ValueError;
use braid_ir::SignalId;

/// Errors from connecting drivers, forcing values or settling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A driver or forced value has the wrong width for its target.
    #[error("width mismatch on '{signal}': expected {expected} bits, got {actual}")]
    WidthMismatch {
        /// Name of the target signal.
        signal: String,
        /// Width of the target.
        expected: u32,
        /// Width of the driver or value.
        actual: u32,
    },

    /// The target already has a driver or is an injected root.
    #[error("signal '{signal}' is already driven")]
    AlreadyDriven {
        /// Name of the target signal.
        signal: String,
    },

    /// Only undriven or root signals can be forced.
    #[error("cannot force '{signal}': it is driven by an expression")]
    ForceDrivenSignal {
        /// Name of the driven signal.
        signal: String,
    },

    /// The dependency graph contains a cycle.
    #[error("combinational loop through {}", names.join(", "))]
    CombinationalLoop {
        /// Every signal of the strongly connected component, by ID.
        signals: Vec<SignalId>,
        /// The same signals by name.
        names: Vec<String>,
    },

    /// A scope placeholder or uninitialized sentinel escaped into a driver.
    #[error("unresolved scope read of '{signal}'")]
    UnresolvedPlaceholder {
        /// Name of the signal behind the placeholder.
        signal: String,
    },

    /// An integer literal appears where no width can be inferred.
    #[error("integer literal {value} has no width context")]
    UnsizedLiteral {
        /// The literal value.
        value: i64,
    },

    /// A select condition is not a single bit.
    #[error("select condition must be 1 bit wide, got {width} bits")]
    ConditionWidth {
        /// Actual condition width.
        width: u32,
    },

    /// A settlement pass exceeds `propagation.max_pass_nodes`.
    #[error("settlement pass affects {nodes} signals, limit is {limit}")]
    PassTooLarge {
        /// Number of signals in the pass.
        nodes: usize,
        /// Configured limit.
        limit: usize,
    },

    /// An operator received structurally invalid operands.
    #[error(transparent)]
    Value(#[from] ValueError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_mismatch_display() {
        let e = SimError::WidthMismatch {
            signal: "sum".into(),
            expected: 8,
            actual: 9,
        };
        assert_eq!(
            e.to_string(),
            "width mismatch on 'sum': expected 8 bits, got 9"
        );
    }

    #[test]
    fn loop_lists_every_signal() {
        let e = SimError::CombinationalLoop {
            signals: vec![SignalId::from_raw(0), SignalId::from_raw(1)],
            names: vec!["a".into(), "b".into()],
        };
        assert_eq!(e.to_string(), "combinational loop through a, b");
    }

    #[test]
    fn value_errors_pass_through() {
        let e: SimError = ValueError::InvalidSlice {
            high: 8,
            low: 0,
            width: 8,
        }
        .into();
        assert_eq!(e.to_string(), "invalid slice [8:0] of a 8-bit value");
    }
}
