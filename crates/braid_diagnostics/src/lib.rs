//! Diagnostic creation, severity management, and terminal rendering.
//!
//! Case-statement lints (overlapping unique-case items, unreachable items)
//! are reported as warning [`Diagnostic`]s; a failed compile adds one error
//! diagnostic naming the offending signal. The thread-safe
//! [`DiagnosticSink`] accumulates them, and a [`DiagnosticRenderer`] formats
//! them for display.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use label::{Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
