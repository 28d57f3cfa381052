//! The braid diagnostic codes.
//!
//! `E1xx` are compile failures of a block, `E2xx`/`W2xx` are case-statement
//! findings. A denied warning keeps its number and switches to the `E`
//! prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a code is reported as an error or a warning.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// `E` codes.
    Error,
    /// `W` codes.
    Warning,
}

/// A category plus a number, displayed as e.g. `W201`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// `E` or `W`.
    pub category: Category,
    /// Number within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// An output reads its own or a local's value before every path assigns it.
    pub const UNINITIALIZED_READ: Self = Self::error(101);
    /// An assigned value is wider or narrower than its target.
    pub const WIDTH_MISMATCH: Self = Self::error(102);
    /// A condition is not a single bit.
    pub const TYPE_MISMATCH: Self = Self::error(103);
    /// A block writes a signal that already has a driver.
    pub const ALREADY_DRIVEN: Self = Self::error(104);
    /// The signal graph rejected an expression.
    pub const GRAPH: Self = Self::error(105);
    /// Overlapping unique-case items under the `deny` policy.
    pub const UNIQUE_OVERLAP_DENIED: Self = Self::error(201);
    /// Two items of a unique case can match the same value.
    pub const UNIQUE_OVERLAP: Self = Self::warning(201);
    /// A priority-case item is covered by earlier items.
    pub const UNREACHABLE_ITEM: Self = Self::warning(202);

    /// Creates a code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }

    /// An `E` code.
    pub const fn error(number: u16) -> Self {
        Self::new(Category::Error, number)
    }

    /// A `W` code.
    pub const fn warning(number: u16) -> Self {
        Self::new(Category::Warning, number)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.category {
            Category::Error => 'E',
            Category::Warning => 'W',
        };
        write!(f, "{prefix}{:03}", self.number)
    }
}
