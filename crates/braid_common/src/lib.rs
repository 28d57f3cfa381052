//! Foundational types shared across braid.
//!
//! The centerpiece is the 4-state value model: [`Logic`] for a single bit and
//! [`LogicVec`] for an immutable fixed-width vector with bitwise, arithmetic,
//! comparison and concatenation operators. Names of signals are interned with
//! [`Interner`].

#![warn(missing_docs)]

pub mod error;
pub mod ident;
pub mod logic;
pub mod logic_vec;

pub use error::ValueError;
pub use ident::{Ident, Interner};
pub use logic::Logic;
pub use logic_vec::LogicVec;
