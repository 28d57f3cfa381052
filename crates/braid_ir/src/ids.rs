//! Opaque ID newtypes for graph entities.
//!
//! IDs are created by [`Arena::alloc`](crate::arena::Arena::alloc). Identity of
//! a signal is its ID, never its name.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// A leaf signal node: one value, at most one driver.
    SignalId,
    "s"
);

define_id!(
    /// A composite (struct or array) signal made of ordered elements.
    CompositeId,
    "c"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip_and_display() {
        let s = SignalId::from_raw(12);
        assert_eq!(s.as_raw(), 12);
        assert_eq!(s.to_string(), "s12");
        assert_eq!(CompositeId::from_raw(3).to_string(), "c3");
    }

    #[test]
    fn ids_order_by_index() {
        assert!(SignalId::from_raw(1) < SignalId::from_raw(2));
    }

    #[test]
    fn serde_roundtrip() {
        let id = CompositeId::from_raw(9);
        let json = serde_json::to_string(&id).unwrap();
        let back: CompositeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
