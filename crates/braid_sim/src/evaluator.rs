//! Expression evaluation against settled and in-flight signal values.
//!
//! [`Evaluator`] memoizes by node address, so a sub-expression shared by
//! several drivers is computed once per settlement pass. This is sound because
//! drivers are evaluated in topological order: every signal a shared node
//! reads is final before the first driver that contains it is evaluated.

use std::collections::HashMap;

use braid_common::{Logic, LogicVec};
use braid_ir::{BinaryOp, Expr, ExprKind, SignalId, UnaryOp};

use crate::error::SimError;
use crate::graph::SignalGraph;

pub(crate) struct Evaluator<'g> {
    graph: &'g SignalGraph,
    /// Values computed (or staged) in the current pass, not yet committed.
    overrides: HashMap<SignalId, LogicVec>,
    memo: HashMap<*const ExprKind, LogicVec>,
}

impl<'g> Evaluator<'g> {
    pub(crate) fn new(graph: &'g SignalGraph) -> Self {
        Self::with_overrides(graph, HashMap::new())
    }

    pub(crate) fn with_overrides(graph: &'g SignalGraph, overrides: HashMap<SignalId, LogicVec>) -> Self {
        Self {
            graph,
            overrides,
            memo: HashMap::new(),
        }
    }

    /// Records the new value of `id` for later reads in this pass.
    pub(crate) fn set(&mut self, id: SignalId, value: LogicVec) {
        self.overrides.insert(id, value);
    }

    pub(crate) fn into_overrides(self) -> HashMap<SignalId, LogicVec> {
        self.overrides
    }

    fn read(&self, id: SignalId) -> LogicVec {
        self.overrides
            .get(&id)
            .unwrap_or_else(|| self.graph.value(id))
            .clone()
    }

    pub(crate) fn eval(&mut self, expr: &Expr) -> Result<LogicVec, SimError> {
        if let Some(value) = self.memo.get(&expr.as_ptr()) {
            return Ok(value.clone());
        }
        let value = match expr.kind() {
            ExprKind::Signal(id) => self.read(*id),
            ExprKind::Literal(value) => value.clone(),
            ExprKind::Int(value) => return Err(SimError::UnsizedLiteral { value: *value }),
            ExprKind::Scoped(target) => {
                return Err(SimError::UnresolvedPlaceholder {
                    signal: self.graph.ref_name(*target).to_string(),
                })
            }
            ExprKind::Uninit(id) => {
                return Err(SimError::UnresolvedPlaceholder {
                    signal: self.graph.name(*id).to_string(),
                })
            }
            ExprKind::Unary { op, operand } => {
                let v = self.eval(operand)?;
                eval_unary(*op, &v)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                eval_binary(*op, &l, &r)?
            }
            ExprKind::Mux {
                condition,
                when_true,
                when_false,
            } => {
                let cond = self.eval(condition)?;
                if cond.width() != 1 {
                    return Err(SimError::ConditionWidth {
                        width: cond.width(),
                    });
                }
                match cond.get(0) {
                    Logic::One => self.eval(when_true)?,
                    Logic::Zero => self.eval(when_false)?,
                    Logic::X | Logic::Z => LogicVec::all_x(self.eval(when_true)?.width()),
                }
            }
            ExprKind::Concat(parts) => {
                let values = parts
                    .iter()
                    .map(|p| self.eval(p))
                    .collect::<Result<Vec<_>, _>>()?;
                LogicVec::swizzle(&values)
            }
            ExprKind::Slice { expr, high, low } => self.eval(expr)?.slice(*high, *low)?,
            ExprKind::Extend {
                expr,
                width,
                signed,
            } => {
                let v = self.eval(expr)?;
                if *signed {
                    v.sign_extend(*width)?
                } else {
                    v.zero_extend(*width)?
                }
            }
            ExprKind::CaseMatch {
                subject,
                pattern,
                wildcard,
            } => {
                let s = self.eval(subject)?;
                let p = self.eval(pattern)?;
                if *wildcard {
                    LogicVec::from_logic(s.wildcard_match(&p)?)
                } else {
                    LogicVec::from_bool(s.case_eq(&p))
                }
            }
        };
        self.memo.insert(expr.as_ptr(), value.clone());
        Ok(value)
    }
}

fn eval_unary(op: UnaryOp, v: &LogicVec) -> LogicVec {
    match op {
        UnaryOp::Not => !v,
        UnaryOp::Neg => v.neg(),
        UnaryOp::RedAnd => v.and_reduce(),
        UnaryOp::RedOr => v.or_reduce(),
        UnaryOp::RedXor => v.xor_reduce(),
        UnaryOp::MultiHot => v.multi_hot(),
    }
}

fn eval_binary(op: BinaryOp, l: &LogicVec, r: &LogicVec) -> Result<LogicVec, SimError> {
    let value = match op {
        BinaryOp::Add => l.add(r)?,
        BinaryOp::Sub => l.sub(r)?,
        BinaryOp::Mul => l.mul(r)?,
        BinaryOp::Div => l.div(r)?,
        BinaryOp::Mod => l.rem(r)?,
        BinaryOp::Pow => l.pow(r)?,
        BinaryOp::And => l.and(r)?,
        BinaryOp::Or => l.or(r)?,
        BinaryOp::Xor => l.xor(r)?,
        BinaryOp::Shl => l.shl(r),
        BinaryOp::Shr => l.shr(r),
        BinaryOp::Ashr => l.ashr(r),
        BinaryOp::Eq => l.cmp_eq(r)?,
        BinaryOp::Ne => l.cmp_ne(r)?,
        BinaryOp::Lt => l.cmp_lt(r)?,
        BinaryOp::Le => l.cmp_le(r)?,
        BinaryOp::Gt => l.cmp_gt(r)?,
        BinaryOp::Ge => l.cmp_ge(r)?,
    };
    Ok(value)
}

impl SignalGraph {
    /// Evaluates an expression against the current settled values.
    ///
    /// The expression is sized first, so unsized integer literals are accepted
    /// wherever their width can be inferred.
    pub fn eval_expr(&self, expr: &Expr) -> Result<LogicVec, SimError> {
        let (sized, _) = crate::width::Sizer::new(self).size(expr, None)?;
        Evaluator::new(self).eval(&sized)
    }
}
