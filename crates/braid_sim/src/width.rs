//! Width inference and checking for driver expressions.
//!
//! Every node has a self-determined width except unsized integer literals
//! (and operators whose operands are all unsized), which take the width of
//! their context: the other operand of a binary operator, the other branch of
//! a select, or the target signal. Sizing replaces each `Int` with a sized
//! `Literal`, so evaluation never sees an unsized value.

use std::collections::HashMap;

use braid_common::{LogicVec, ValueError};
use braid_ir::{BinaryOp, Expr, ExprKind};

use crate::error::SimError;
use crate::graph::SignalGraph;

pub(crate) struct Sizer<'g> {
    graph: &'g SignalGraph,
    natural: HashMap<*const ExprKind, Option<u32>>,
    sized: HashMap<(*const ExprKind, u32), (Expr, u32)>,
}

impl<'g> Sizer<'g> {
    pub(crate) fn new(graph: &'g SignalGraph) -> Self {
        Self {
            graph,
            natural: HashMap::new(),
            sized: HashMap::new(),
        }
    }

    /// Sizes `expr`, using `context` for an expression without a
    /// self-determined width. Returns the sized expression and its width.
    pub(crate) fn size(&mut self, expr: &Expr, context: Option<u32>) -> Result<(Expr, u32), SimError> {
        let width = match self.natural(expr)? {
            Some(width) => width,
            None => context.unwrap_or_else(|| fallback_width(expr)),
        };
        self.size_to(expr, width)
    }

    /// Self-determined width, or `None` for unsized expressions.
    fn natural(&mut self, expr: &Expr) -> Result<Option<u32>, SimError> {
        if let Some(width) = self.natural.get(&expr.as_ptr()) {
            return Ok(*width);
        }
        let width = match expr.kind() {
            ExprKind::Signal(id) | ExprKind::Uninit(id) => Some(self.graph.node(*id).width()),
            ExprKind::Scoped(target) => Some(self.graph.width(*target)),
            ExprKind::Literal(value) => Some(value.width()),
            ExprKind::Int(_) => None,
            ExprKind::Unary { op, operand } => {
                if op.is_reduction() {
                    Some(1)
                } else {
                    self.natural(operand)?
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                if op.is_comparison() {
                    Some(1)
                } else if op.is_shift() {
                    self.natural(lhs)?
                } else {
                    combine(self.natural(lhs)?, self.natural(rhs)?)
                }
            }
            ExprKind::Mux {
                when_true,
                when_false,
                ..
            } => combine(self.natural(when_true)?, self.natural(when_false)?),
            ExprKind::Concat(parts) => {
                let mut total = 0;
                for part in parts {
                    total += self.required(part)?;
                }
                Some(total)
            }
            ExprKind::Slice { high, low, .. } => Some(high.saturating_sub(*low) + 1),
            ExprKind::Extend { width, .. } => Some(*width),
            ExprKind::CaseMatch { .. } => Some(1),
        };
        self.natural.insert(expr.as_ptr(), width);
        Ok(width)
    }

    /// Self-determined width of an operand that cannot borrow one from context.
    fn required(&mut self, expr: &Expr) -> Result<u32, SimError> {
        self.natural(expr)?.ok_or_else(|| unsized_error(expr))
    }

    fn size_to(&mut self, expr: &Expr, width: u32) -> Result<(Expr, u32), SimError> {
        let key = (expr.as_ptr(), width);
        if let Some(done) = self.sized.get(&key) {
            return Ok(done.clone());
        }
        let done = match expr.kind() {
            ExprKind::Signal(_)
            | ExprKind::Uninit(_)
            | ExprKind::Scoped(_)
            | ExprKind::Literal(_) => (expr.clone(), width),
            ExprKind::Int(value) => (Expr::lit(int_literal(*value, width)?), width),
            ExprKind::Unary { op, operand } => {
                if op.is_reduction() {
                    let operand_width = self.required(operand)?;
                    let (operand, _) = self.size_to(operand, operand_width)?;
                    (Expr::unary(*op, operand), 1)
                } else {
                    let (operand, w) = self.size_to(operand, width)?;
                    (Expr::unary(*op, operand), w)
                }
            }
            ExprKind::Binary { op, lhs, rhs } => self.size_binary(*op, lhs, rhs, width)?,
            ExprKind::Mux {
                condition,
                when_true,
                when_false,
            } => {
                let condition_width = self.natural(condition)?.unwrap_or(1);
                let (condition, cw) = self.size_to(condition, condition_width)?;
                if cw != 1 {
                    return Err(SimError::ConditionWidth { width: cw });
                }
                let (t, f, w) = self.size_pair(when_true, when_false, width)?;
                if t.1 != f.1 {
                    return Err(mismatch("mux", t.1, f.1));
                }
                (condition.mux(t.0, f.0), w)
            }
            ExprKind::Concat(parts) => {
                let mut sized = Vec::with_capacity(parts.len());
                let mut total = 0;
                for part in parts {
                    let part_width = self.required(part)?;
                    let (part, w) = self.size_to(part, part_width)?;
                    total += w;
                    sized.push(part);
                }
                (Expr::swizzle(sized), total)
            }
            ExprKind::Slice {
                expr: operand,
                high,
                low,
            } => {
                let operand_width = self.required(operand)?;
                if high < low || *high >= operand_width {
                    return Err(ValueError::InvalidSlice {
                        high: *high,
                        low: *low,
                        width: operand_width,
                    }
                    .into());
                }
                let (operand, _) = self.size_to(operand, operand_width)?;
                (operand.bits(*high, *low), high - low + 1)
            }
            ExprKind::Extend {
                expr: operand,
                width: target,
                signed,
            } => {
                let operand_width = self.natural(operand)?.unwrap_or(*target);
                if operand_width > *target {
                    return Err(ValueError::InvalidExtension {
                        from: operand_width,
                        to: *target,
                    }
                    .into());
                }
                let (operand, _) = self.size_to(operand, operand_width)?;
                let extended = if *signed {
                    operand.sext(*target)
                } else {
                    operand.zext(*target)
                };
                (extended, *target)
            }
            ExprKind::CaseMatch {
                subject,
                pattern,
                wildcard,
            } => {
                let (s, p, _) = self.size_pair(subject, pattern, 0)?;
                if s.1 != p.1 {
                    return Err(mismatch("case", s.1, p.1));
                }
                (s.0.case_match(p.0, *wildcard), 1)
            }
        };
        let done = (keep_if_unchanged(expr, done.0), done.1);
        self.sized.insert(key, done.clone());
        Ok(done)
    }

    fn size_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        width: u32,
    ) -> Result<(Expr, u32), SimError> {
        if op.is_shift() {
            let (l, lw) = self.size_to(lhs, width)?;
            let amount_width = match self.natural(rhs)? {
                Some(w) => w,
                None => fallback_width(rhs),
            };
            let (r, _) = self.size_to(rhs, amount_width)?;
            return Ok((Expr::binary(op, l, r), lw));
        }
        let context = if op.is_comparison() { 0 } else { width };
        let (l, r, _) = self.size_pair(lhs, rhs, context)?;
        if l.1 != r.1 && l.1 != 1 && r.1 != 1 {
            return Err(mismatch(op.name(), l.1, r.1));
        }
        let result_width = if op.is_comparison() { 1 } else { l.1.max(r.1) };
        Ok((Expr::binary(op, l.0, r.0), result_width))
    }

    /// Sizes two operands that share a width. An unsized operand takes the
    /// other's width; if both are unsized they take `context`, or their
    /// minimal common width when `context` is 0.
    #[allow(clippy::type_complexity)]
    fn size_pair(
        &mut self,
        a: &Expr,
        b: &Expr,
        context: u32,
    ) -> Result<((Expr, u32), (Expr, u32), u32), SimError> {
        let (wa, wb) = match (self.natural(a)?, self.natural(b)?) {
            (Some(wa), Some(wb)) => (wa, wb),
            (Some(wa), None) => (wa, wa),
            (None, Some(wb)) => (wb, wb),
            (None, None) => {
                let w = if context == 0 {
                    fallback_width(a).max(fallback_width(b))
                } else {
                    context
                };
                (w, w)
            }
        };
        let sa = self.size_to(a, wa)?;
        let sb = self.size_to(b, wb)?;
        let width = sa.1.max(sb.1);
        Ok((sa, sb, width))
    }
}

fn combine(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

fn mismatch(op: &'static str, lhs: u32, rhs: u32) -> SimError {
    ValueError::WidthMismatch { op, lhs, rhs }.into()
}

fn unsized_error(expr: &Expr) -> SimError {
    let value = expr
        .find_map(|e| match e.kind() {
            ExprKind::Int(v) => Some(*v),
            _ => None,
        })
        .unwrap_or_default();
    SimError::UnsizedLiteral { value }
}

/// Smallest width that holds every integer literal of an unsized expression.
fn fallback_width(expr: &Expr) -> u32 {
    match expr.kind() {
        ExprKind::Int(v) => min_width(*v),
        ExprKind::Unary { op, operand } if !op.is_reduction() => fallback_width(operand),
        ExprKind::Unary { .. } => 1,
        ExprKind::Binary { op, lhs, .. } if op.is_shift() => fallback_width(lhs),
        ExprKind::Binary { op, .. } if op.is_comparison() => 1,
        ExprKind::Binary { lhs, rhs, .. } => fallback_width(lhs).max(fallback_width(rhs)),
        ExprKind::Mux {
            when_true,
            when_false,
            ..
        } => fallback_width(when_true).max(fallback_width(when_false)),
        _ => 1,
    }
}

fn min_width(value: i64) -> u32 {
    if value >= 0 {
        (64 - value.leading_zeros()).max(1)
    } else {
        65 - value.leading_ones()
    }
}

/// `value` in two's complement, truncated or sign-extended to `width`.
fn int_literal(value: i64, width: u32) -> Result<LogicVec, ValueError> {
    if width <= 64 {
        Ok(LogicVec::from_u64(value as u64, width))
    } else {
        LogicVec::from_u64(value as u64, 64).sign_extend(width)
    }
}

/// Returns `original` when sizing changed none of its operands.
fn keep_if_unchanged(original: &Expr, rebuilt: Expr) -> Expr {
    let same_node = original.ptr_eq(&rebuilt);
    let same_children = !matches!(original.kind(), ExprKind::Int(_))
        && original.children().len() == rebuilt.children().len()
        && original
            .children()
            .iter()
            .zip(rebuilt.children())
            .all(|(a, b)| a.ptr_eq(b));
    if same_node || same_children {
        original.clone()
    } else {
        rebuilt
    }
}
