//! References to leaf or composite signals.

use crate::ids::{CompositeId, SignalId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Either a leaf signal or a composite signal.
///
/// Used wherever both kinds are accepted: SSA assignment targets, scope reads,
/// whole-value reads and connections.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum SignalRef {
    /// A leaf signal.
    Signal(SignalId),
    /// A composite signal, standing for the concatenation of its elements.
    Composite(CompositeId),
}

impl SignalRef {
    /// Returns the leaf ID if this is a leaf reference.
    pub fn as_signal(self) -> Option<SignalId> {
        match self {
            SignalRef::Signal(id) => Some(id),
            SignalRef::Composite(_) => None,
        }
    }
}

impl From<SignalId> for SignalRef {
    fn from(id: SignalId) -> Self {
        SignalRef::Signal(id)
    }
}

impl From<CompositeId> for SignalRef {
    fn from(id: CompositeId) -> Self {
        SignalRef::Composite(id)
    }
}

impl fmt::Display for SignalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalRef::Signal(id) => write!(f, "{id}"),
            SignalRef::Composite(id) => write!(f, "{id}"),
        }
    }
}
