//! How serious a finding is.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::code::Category;

/// Severity of a [`Diagnostic`](crate::Diagnostic), taken from its code.
///
/// Warnings never stop compilation; an error accompanies a failed compile.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Compilation went ahead.
    Warning,
    /// Compilation failed and installed nothing.
    Error,
}

impl From<Category> for Severity {
    fn from(category: Category) -> Self {
        match category {
            Category::Error => Severity::Error,
            Category::Warning => Severity::Warning,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}
