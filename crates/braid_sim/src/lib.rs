//! Signal graph and zero-delay propagation engine.
//!
//! A [`SignalGraph`] owns every leaf [`SignalNode`] and composite signal. Each
//! leaf is either undriven, a root whose value is injected from outside, or
//! driven by exactly one [`Expr`](braid_ir::Expr). Changes are applied in
//! settlement passes: [`SignalGraph::settle`] re-evaluates everything
//! transitively affected by staged forces and newly connected drivers, in
//! topological order, then commits and notifies subscribers.

#![warn(missing_docs)]

pub mod composite;
pub mod engine;
pub mod error;
mod evaluator;
pub mod graph;
mod width;

pub use composite::CompositeNode;
pub use engine::{SettleReport, SignalChange};
pub use error::SimError;
pub use graph::{NodeMode, SignalGraph, SignalNode, UniqueCheck};
