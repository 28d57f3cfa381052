//! Combinational SSA compiler.
//!
//! A combinational block is written as an ordered list of [`Statement`]s
//! (assignments, `if`, `case` and `casez`) produced once by a builder closure.
//! Reads go through a [`Scope`], which hands out placeholders instead of
//! values. [`SsaCompiler::compile`] replays the list in order against a
//! versioned [`ScopeBinding`], turning control flow into select chains, and
//! installs one driver expression per written signal in the
//! [`SignalGraph`](braid_sim::SignalGraph).
//!
//! ```ignore
//! Combinational::ssa(&mut graph, |s| {
//!     vec![
//!         Statement::assign(x, s.get(a) + 1),
//!         Statement::if_else(s.get(x).gt(3), vec![Statement::assign(x, s.get(x) + 2)],
//!                            vec![Statement::assign(x, s.get(x) + 3)]),
//!     ]
//! })?;
//! ```

#![warn(missing_docs)]

pub mod compiler;
pub mod error;
mod lint;
pub mod scope;
pub mod stmt;

pub use compiler::{Combinational, CompiledBlock, SsaCompiler};
pub use error::SsaError;
pub use scope::{Scope, ScopeBinding};
pub use stmt::{Case, CaseItem, CasePriority, CaseStatement, MatchKind, Statement};
