//! Collects diagnostics across compiles.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Accumulates the diagnostics of one or more compiles.
///
/// Counts per severity survive [`take_all`](Self::take_all), so a caller can
/// drain and render findings and still ask whether any compile failed.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        self.counter(diag.severity).fetch_add(1, Ordering::Relaxed);
        self.lock().push(diag);
    }

    /// Number of diagnostics of `severity` emitted so far.
    pub fn count(&self, severity: Severity) -> usize {
        self.counter(severity).load(Ordering::Relaxed)
    }

    /// Returns `true` if a compile reported through this sink has failed.
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    /// A copy of the accumulated diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    fn counter(&self, severity: Severity) -> &AtomicUsize {
        match severity {
            Severity::Warning => &self.warnings,
            Severity::Error => &self.errors,
        }
    }

    // Pushing cannot leave the Vec half-written, so a poisoned lock is still
    // usable.
    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
