//! Dataflow IR shared by the signal graph and the SSA compiler.
//!
//! Signals live in dense arenas and are referred to by copyable IDs
//! ([`SignalId`], [`CompositeId`]). Their drivers are [`Expr`]s: immutable,
//! reference-counted DAG nodes that can be freely shared between statements
//! and between drivers.

#![warn(missing_docs)]

pub mod arena;
pub mod expr;
pub mod ids;
pub mod signal;

pub use arena::{Arena, ArenaId};
pub use expr::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use ids::{CompositeId, SignalId};
pub use signal::SignalRef;
