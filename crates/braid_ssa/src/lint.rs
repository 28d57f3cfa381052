//! Compile-time checks on case statements with constant item patterns.
//!
//! W201: two items of a unique case can match the same selector value.
//! W202: a priority-case item can never be taken because earlier items cover
//! every value it matches.

use braid_common::{Logic, LogicVec};
use braid_config::{OverlapPolicy, SsaConfig};
use braid_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Label};

use crate::error::SsaError;
use crate::stmt::{CasePriority, MatchKind};

/// Patterns of one case statement after sizing; `None` for patterns that
/// are not constant.
pub(crate) struct CaseShape<'a> {
    pub(crate) selector: &'a str,
    pub(crate) kind: MatchKind,
    pub(crate) priority: CasePriority,
    pub(crate) items: Vec<Vec<Option<LogicVec>>>,
}

pub(crate) fn check_case(
    shape: &CaseShape<'_>,
    config: &SsaConfig,
    sink: Option<&DiagnosticSink>,
) -> Result<(), SsaError> {
    match shape.priority {
        CasePriority::Unique => check_overlap(shape, config.unique_overlap, sink),
        CasePriority::Priority => {
            if config.lint_unreachable_items {
                if let Some(sink) = sink {
                    check_unreachable(shape, sink);
                }
            }
            Ok(())
        }
    }
}

fn check_overlap(
    shape: &CaseShape<'_>,
    policy: OverlapPolicy,
    sink: Option<&DiagnosticSink>,
) -> Result<(), SsaError> {
    if policy == OverlapPolicy::Allow {
        return Ok(());
    }
    for (first, a) in shape.items.iter().enumerate() {
        for (offset, b) in shape.items[first + 1..].iter().enumerate() {
            let second = first + 1 + offset;
            let overlapping = a.iter().flatten().any(|p| {
                b.iter()
                    .flatten()
                    .any(|q| patterns_overlap(shape.kind, p, q))
            });
            if !overlapping {
                continue;
            }
            if policy == OverlapPolicy::Deny {
                return Err(SsaError::UniqueOverlap {
                    selector: shape.selector.to_string(),
                    first,
                    second,
                });
            }
            if let Some(sink) = sink {
                sink.emit(
                    Diagnostic::new(DiagnosticCode::UNIQUE_OVERLAP, "unique case items overlap")
                        .with_label(Label::primary(
                            shape.selector,
                            format!("items {first} and {second} can both match"),
                        ))
                        .with_note("the first matching item is taken; overlaps are also reported at run time"),
                );
            }
        }
    }
    Ok(())
}

fn check_unreachable(shape: &CaseShape<'_>, sink: &DiagnosticSink) {
    for (index, item) in shape.items.iter().enumerate().skip(1) {
        if item.is_empty() || item.iter().any(Option::is_none) {
            continue;
        }
        let shadowing: Option<Vec<usize>> = item
            .iter()
            .flatten()
            .map(|later| {
                shape.items[..index].iter().position(|earlier| {
                    earlier
                        .iter()
                        .flatten()
                        .any(|p| pattern_covers(shape.kind, p, later))
                })
            })
            .collect();
        let Some(shadowing) = shadowing else {
            continue;
        };
        let first = shadowing.iter().min().copied().unwrap_or(0);
        sink.emit(
            Diagnostic::new(DiagnosticCode::UNREACHABLE_ITEM, "case item is unreachable")
                .with_label(Label::primary(
                    shape.selector,
                    format!("item {index} is shadowed by item {first}"),
                ))
                .with_help("remove the item or move it before the items that cover it"),
        );
    }
}

/// Whether some selector value matches both patterns.
fn patterns_overlap(kind: MatchKind, a: &LogicVec, b: &LogicVec) -> bool {
    if a.width() != b.width() {
        return false;
    }
    match kind {
        MatchKind::Exact => a == b,
        MatchKind::ZWildcard => a
            .iter()
            .zip(b.iter())
            .all(|(x, y)| x == Logic::Z || y == Logic::Z || (x.is_valid() && x == y)),
    }
}

/// Whether every selector value matching `later` also matches `earlier`.
fn pattern_covers(kind: MatchKind, earlier: &LogicVec, later: &LogicVec) -> bool {
    if earlier.width() != later.width() {
        return false;
    }
    match kind {
        MatchKind::Exact => earlier == later,
        MatchKind::ZWildcard => earlier
            .iter()
            .zip(later.iter())
            .all(|(e, l)| e == Logic::Z || (e.is_valid() && e == l)),
    }
}
