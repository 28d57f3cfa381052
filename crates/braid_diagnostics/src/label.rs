//! Labels that point a diagnostic at the signals involved.

use serde::{Deserialize, Serialize};

/// The role of a label within its diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LabelStyle {
    /// The signal the diagnostic is about.
    Primary,
    /// A signal that provides context.
    Secondary,
}

/// A signal name annotated with an explanatory message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    /// Name of the annotated signal.
    pub signal: String,
    /// The message displayed next to the signal name.
    pub message: String,
    /// Whether this is a primary or secondary label.
    pub style: LabelStyle,
}

impl Label {
    /// Creates a primary label.
    pub fn primary(signal: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            signal: signal.into(),
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Creates a secondary label.
    pub fn secondary(signal: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            signal: signal.into(),
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}
