//! Conformance test helpers for braid.
//!
//! Provides small fixtures that build a graph, compile a block into it and
//! drive inputs, so integration tests can assert on settled values and
//! emitted diagnostics.

#![warn(missing_docs)]

use braid_common::LogicVec;
use braid_config::{load_config_from_str, BraidConfig};
use braid_diagnostics::{Diagnostic, DiagnosticSink, Severity};
use braid_ir::SignalId;
use braid_sim::{SettleReport, SignalGraph};
use braid_ssa::{CompiledBlock, Scope, SsaCompiler, SsaError, Statement};

/// Result of compiling one block with a diagnostic sink attached.
pub struct CompileResult {
    /// The compiler outcome.
    pub block: Result<CompiledBlock, SsaError>,
    /// Diagnostics emitted while compiling.
    pub diagnostics: Vec<Diagnostic>,
    /// Error diagnostics counted by the sink.
    pub errors: usize,
}

impl CompileResult {
    /// Returns `true` if any diagnostic carries the given code number.
    pub fn has_code(&self, number: u16) -> bool {
        self.diagnostics.iter().any(|d| d.code.number == number)
    }
}

/// A fully valid vector of `width` bits holding the low bits of `value`.
pub fn lv(value: u64, width: u32) -> LogicVec {
    LogicVec::from_u64(value, width)
}

/// Parses a `braid.toml` body, panicking on invalid input.
pub fn make_config(toml: &str) -> BraidConfig {
    match load_config_from_str(toml) {
        Ok(config) => config,
        Err(err) => panic!("invalid test config: {err}"),
    }
}

/// Compiles `builder` into `graph` with `config`, collecting diagnostics.
pub fn compile<F>(graph: &mut SignalGraph, config: &BraidConfig, builder: F) -> CompileResult
where
    F: FnOnce(&Scope<'_>) -> Vec<Statement>,
{
    let sink = DiagnosticSink::new();
    let block = SsaCompiler::new(graph)
        .with_config(&config.ssa)
        .with_sink(&sink)
        .compile(builder);
    CompileResult {
        block,
        diagnostics: sink.take_all(),
        errors: sink.count(Severity::Error),
    }
}

/// Forces every `(signal, value)` pair, then runs one settlement pass.
///
/// # Panics
///
/// Panics if a force or the pass fails.
pub fn drive(graph: &mut SignalGraph, inputs: &[(SignalId, u64)]) -> SettleReport {
    for &(id, value) in inputs {
        let width = graph.node(id).width();
        if let Err(err) = graph.force(id, lv(value, width)) {
            panic!("cannot force {}: {err}", graph.name(id));
        }
    }
    match graph.settle() {
        Ok(report) => report,
        Err(err) => panic!("settlement failed: {err}"),
    }
}

/// The settled value of `id` as an integer, or `None` if it holds X/Z.
pub fn value_of(graph: &SignalGraph, id: SignalId) -> Option<u64> {
    graph.value(id).to_u64()
}
