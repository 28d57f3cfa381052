//! Structural errors raised by the value model.
//!
//! Unknown (X/Z) operands are not errors: they propagate as all-X results.
//! Only shape problems that a hardware simulator would reject at elaboration
//! time end up here.

/// A structurally invalid operation on [`LogicVec`](crate::LogicVec)s.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// A binary operator received operands of incompatible widths.
    #[error("width mismatch in {op}: {lhs} bits vs {rhs} bits")]
    WidthMismatch {
        /// The operator name.
        op: &'static str,
        /// Width of the left operand.
        lhs: u32,
        /// Width of the right operand.
        rhs: u32,
    },

    /// A bit range lies outside the vector or is reversed.
    #[error("invalid slice [{high}:{low}] of a {width}-bit value")]
    InvalidSlice {
        /// Requested high bit (inclusive).
        high: u32,
        /// Requested low bit (inclusive).
        low: u32,
        /// Width of the sliced value.
        width: u32,
    },

    /// An extension would shrink the value.
    #[error("cannot extend a {from}-bit value to {to} bits")]
    InvalidExtension {
        /// Current width.
        from: u32,
        /// Requested width.
        to: u32,
    },

    /// A bit pattern contained a character outside `0 1 x z`.
    #[error("invalid bit pattern '{0}'")]
    InvalidPattern(String),
}
