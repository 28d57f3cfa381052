//! The immutable dataflow expression DAG.
//!
//! An [`Expr`] is a cheap-to-clone handle around a shared [`ExprKind`] node.
//! Nodes are never mutated after construction; rewriting an expression builds
//! new nodes and reuses every untouched subtree, so sharing survives
//! substitution. Two handles denote the same node iff [`Expr::ptr_eq`].
//!
//! Builders follow the usual hardware-construction style: `a + b`, `a & b`,
//! `cond.mux(t, f)`, `a.bits(7, 4)`, `Expr::swizzle([hi, lo])`. Integer
//! operands (`a + 1`) become unsized [`ExprKind::Int`] literals that take their
//! width from the surrounding expression when a driver is connected.

use std::collections::HashSet;
use std::fmt;
use std::ops;
use std::sync::Arc;

use braid_common::LogicVec;
use serde::{Deserialize, Serialize};

use crate::ids::SignalId;
use crate::signal::SignalRef;

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Bitwise NOT.
    Not,
    /// Two's-complement negation.
    Neg,
    /// Reduction AND, 1 bit wide.
    RedAnd,
    /// Reduction OR, 1 bit wide.
    RedOr,
    /// Reduction XOR, 1 bit wide.
    RedXor,
    /// 1 if more than one bit is set, 1 bit wide.
    MultiHot,
}

impl UnaryOp {
    /// Returns `true` for operators whose result is a single bit.
    pub fn is_reduction(self) -> bool {
        matches!(
            self,
            UnaryOp::RedAnd | UnaryOp::RedOr | UnaryOp::RedXor | UnaryOp::MultiHot
        )
    }
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition, modulo 2^width.
    Add,
    /// Subtraction, modulo 2^width.
    Sub,
    /// Multiplication, modulo 2^width.
    Mul,
    /// Unsigned division.
    Div,
    /// Unsigned remainder.
    Mod,
    /// Exponentiation, modulo 2^width.
    Pow,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Logical left shift.
    Shl,
    /// Logical right shift.
    Shr,
    /// Arithmetic right shift.
    Ashr,
    /// Equality, 1 bit wide.
    Eq,
    /// Inequality, 1 bit wide.
    Ne,
    /// Unsigned less than, 1 bit wide.
    Lt,
    /// Unsigned less than or equal, 1 bit wide.
    Le,
    /// Unsigned greater than, 1 bit wide.
    Gt,
    /// Unsigned greater than or equal, 1 bit wide.
    Ge,
}

impl BinaryOp {
    /// Returns `true` for relational operators.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Returns `true` for shifts, whose amount operand has an independent width.
    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ashr)
    }

    /// Short operator name used in width errors.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Pow => "pow",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Shl => "shl",
            BinaryOp::Shr => "shr",
            BinaryOp::Ashr => "ashr",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::Gt => "gt",
            BinaryOp::Ge => "ge",
        }
    }
}

/// One node of the expression DAG.
#[derive(Debug)]
pub enum ExprKind {
    /// The live value of a leaf signal.
    Signal(SignalId),
    /// A sized constant.
    Literal(LogicVec),
    /// An unsized integer constant, sized from context at connection time.
    ///
    /// Negative values are two's complement at the final width.
    Int(i64),
    /// A scope read inside a combinational block, resolved during replay.
    Scoped(SignalRef),
    /// The "no prior value" binding of a block output.
    Uninit(SignalId),
    /// A unary operator.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// Its operand.
        operand: Expr,
    },
    /// A binary operator.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Expr,
        /// Right operand (the shift amount for shifts).
        rhs: Expr,
    },
    /// Two-way select on a 1-bit condition.
    Mux {
        /// 1-bit select.
        condition: Expr,
        /// Value when the condition is 1.
        when_true: Expr,
        /// Value when the condition is 0.
        when_false: Expr,
    },
    /// Concatenation, first part most significant.
    Concat(Vec<Expr>),
    /// Bits `high..=low` of the operand.
    Slice {
        /// The sliced operand.
        expr: Expr,
        /// High bit (inclusive).
        high: u32,
        /// Low bit (inclusive).
        low: u32,
    },
    /// Zero or sign extension to `width` bits.
    Extend {
        /// The extended operand.
        expr: Expr,
        /// Target width.
        width: u32,
        /// Sign-extend instead of zero-extend.
        signed: bool,
    },
    /// 1-bit case item match of `subject` against `pattern`.
    ///
    /// Exact matching uses 4-state identity; wildcard matching treats Z bits
    /// of the pattern as don't-care.
    CaseMatch {
        /// The case selector.
        subject: Expr,
        /// The item pattern.
        pattern: Expr,
        /// Z bits of the pattern match anything.
        wildcard: bool,
    },
}

/// A shared, immutable expression node.
#[derive(Clone)]
pub struct Expr(Arc<ExprKind>);

impl Expr {
    /// Wraps a node.
    pub fn new(kind: ExprKind) -> Self {
        Expr(Arc::new(kind))
    }

    /// The node behind this handle.
    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    /// The live value of a leaf signal.
    pub fn signal(id: SignalId) -> Self {
        Expr::new(ExprKind::Signal(id))
    }

    /// A sized constant.
    pub fn lit(value: LogicVec) -> Self {
        Expr::new(ExprKind::Literal(value))
    }

    /// An unsized integer constant.
    pub fn int(value: i64) -> Self {
        Expr::new(ExprKind::Int(value))
    }

    /// A scope placeholder for `target`.
    pub fn scoped(target: impl Into<SignalRef>) -> Self {
        Expr::new(ExprKind::Scoped(target.into()))
    }

    /// The uninitialized sentinel for `id`.
    pub fn uninit(id: SignalId) -> Self {
        Expr::new(ExprKind::Uninit(id))
    }

    /// Applies a unary operator.
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::new(ExprKind::Unary { op, operand })
    }

    /// Applies a binary operator.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::new(ExprKind::Binary { op, lhs, rhs })
    }

    /// Concatenates `parts` with the first part in the most significant position.
    pub fn swizzle(parts: impl IntoIterator<Item = Expr>) -> Self {
        Expr::new(ExprKind::Concat(parts.into_iter().collect()))
    }

    /// Concatenates `parts` with the first part in the least significant position.
    pub fn rswizzle(parts: impl IntoIterator<Item = Expr>) -> Self {
        let mut parts: Vec<Expr> = parts.into_iter().collect();
        parts.reverse();
        Expr::new(ExprKind::Concat(parts))
    }

    /// `self ** rhs`.
    pub fn pow(self, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Pow, self, rhs.into())
    }

    /// Logical left shift by `amount`.
    pub fn shl(self, amount: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Shl, self, amount.into())
    }

    /// Logical right shift by `amount`.
    pub fn shr(self, amount: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Shr, self, amount.into())
    }

    /// Arithmetic right shift by `amount`.
    pub fn ashr(self, amount: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Ashr, self, amount.into())
    }

    /// 1-bit equality.
    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Eq, self, rhs.into())
    }

    /// 1-bit inequality.
    #[allow(clippy::should_implement_trait)]
    pub fn ne(self, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Ne, self, rhs.into())
    }

    /// 1-bit unsigned `<`.
    pub fn lt(self, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Lt, self, rhs.into())
    }

    /// 1-bit unsigned `<=`.
    pub fn le(self, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Le, self, rhs.into())
    }

    /// 1-bit unsigned `>`.
    pub fn gt(self, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Gt, self, rhs.into())
    }

    /// 1-bit unsigned `>=`.
    pub fn ge(self, rhs: impl Into<Expr>) -> Self {
        Expr::binary(BinaryOp::Ge, self, rhs.into())
    }

    /// Selects `when_true` if this 1-bit expression is 1, `when_false` if 0.
    pub fn mux(self, when_true: impl Into<Expr>, when_false: impl Into<Expr>) -> Self {
        Expr::new(ExprKind::Mux {
            condition: self,
            when_true: when_true.into(),
            when_false: when_false.into(),
        })
    }

    /// Bits `high..=low`.
    pub fn bits(self, high: u32, low: u32) -> Self {
        Expr::new(ExprKind::Slice {
            expr: self,
            high,
            low,
        })
    }

    /// A single bit.
    pub fn bit(self, index: u32) -> Self {
        self.bits(index, index)
    }

    /// Zero-extends to `width` bits.
    pub fn zext(self, width: u32) -> Self {
        Expr::new(ExprKind::Extend {
            expr: self,
            width,
            signed: false,
        })
    }

    /// Sign-extends to `width` bits.
    pub fn sext(self, width: u32) -> Self {
        Expr::new(ExprKind::Extend {
            expr: self,
            width,
            signed: true,
        })
    }

    /// Reduction AND.
    pub fn and_reduce(self) -> Self {
        Expr::unary(UnaryOp::RedAnd, self)
    }

    /// Reduction OR.
    pub fn or_reduce(self) -> Self {
        Expr::unary(UnaryOp::RedOr, self)
    }

    /// Reduction XOR.
    pub fn xor_reduce(self) -> Self {
        Expr::unary(UnaryOp::RedXor, self)
    }

    /// 1 when more than one bit is set.
    pub fn multi_hot(self) -> Self {
        Expr::unary(UnaryOp::MultiHot, self)
    }

    /// 1-bit match of this selector against a case item pattern.
    pub fn case_match(self, pattern: impl Into<Expr>, wildcard: bool) -> Self {
        Expr::new(ExprKind::CaseMatch {
            subject: self,
            pattern: pattern.into(),
            wildcard,
        })
    }

    /// Direct operands of this node, in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match self.kind() {
            ExprKind::Signal(_)
            | ExprKind::Literal(_)
            | ExprKind::Int(_)
            | ExprKind::Scoped(_)
            | ExprKind::Uninit(_) => Vec::new(),
            ExprKind::Unary { operand, .. } => vec![operand],
            ExprKind::Binary { lhs, rhs, .. } => vec![lhs, rhs],
            ExprKind::Mux {
                condition,
                when_true,
                when_false,
            } => vec![condition, when_true, when_false],
            ExprKind::Concat(parts) => parts.iter().collect(),
            ExprKind::Slice { expr, .. } | ExprKind::Extend { expr, .. } => vec![expr],
            ExprKind::CaseMatch {
                subject, pattern, ..
            } => vec![subject, pattern],
        }
    }

    /// Rebuilds this node with every operand replaced by `f(operand)`.
    ///
    /// Leaves are returned as-is. If `f` returns every operand unchanged (by
    /// pointer), the original node is returned so sharing is preserved.
    pub fn try_map_children<E>(
        &self,
        mut f: impl FnMut(&Expr) -> Result<Expr, E>,
    ) -> Result<Expr, E> {
        let kind = match self.kind() {
            ExprKind::Signal(_)
            | ExprKind::Literal(_)
            | ExprKind::Int(_)
            | ExprKind::Scoped(_)
            | ExprKind::Uninit(_) => return Ok(self.clone()),
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op: *op,
                operand: f(operand)?,
            },
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op: *op,
                lhs: f(lhs)?,
                rhs: f(rhs)?,
            },
            ExprKind::Mux {
                condition,
                when_true,
                when_false,
            } => ExprKind::Mux {
                condition: f(condition)?,
                when_true: f(when_true)?,
                when_false: f(when_false)?,
            },
            ExprKind::Concat(parts) => {
                ExprKind::Concat(parts.iter().map(&mut f).collect::<Result<_, E>>()?)
            }
            ExprKind::Slice { expr, high, low } => ExprKind::Slice {
                expr: f(expr)?,
                high: *high,
                low: *low,
            },
            ExprKind::Extend {
                expr,
                width,
                signed,
            } => ExprKind::Extend {
                expr: f(expr)?,
                width: *width,
                signed: *signed,
            },
            ExprKind::CaseMatch {
                subject,
                pattern,
                wildcard,
            } => ExprKind::CaseMatch {
                subject: f(subject)?,
                pattern: f(pattern)?,
                wildcard: *wildcard,
            },
        };
        let rebuilt = Expr::new(kind);
        let unchanged = self
            .children()
            .iter()
            .zip(rebuilt.children())
            .all(|(old, new)| old.ptr_eq(new));
        Ok(if unchanged { self.clone() } else { rebuilt })
    }

    /// Visits every distinct node once, pre-order, stopping at the first
    /// `Some` returned by `f`.
    pub fn find_map<T>(&self, mut f: impl FnMut(&Expr) -> Option<T>) -> Option<T> {
        let mut seen: HashSet<*const ExprKind> = HashSet::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            if !seen.insert(expr.as_ptr()) {
                continue;
            }
            if let Some(found) = f(expr) {
                return Some(found);
            }
            stack.extend(expr.children().into_iter().rev());
        }
        None
    }

    /// The constant value of a sized literal node.
    pub fn as_literal(&self) -> Option<&LogicVec> {
        match self.kind() {
            ExprKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if any scope placeholder or uninitialized sentinel is
    /// reachable from this node.
    pub fn contains_placeholder(&self) -> bool {
        self.find_map(|e| {
            matches!(e.kind(), ExprKind::Scoped(_) | ExprKind::Uninit(_)).then_some(())
        })
        .is_some()
    }

    /// The first uninitialized sentinel reachable from this node.
    pub fn first_uninit(&self) -> Option<SignalId> {
        self.find_map(|e| match e.kind() {
            ExprKind::Uninit(id) => Some(*id),
            _ => None,
        })
    }

    /// Leaf signals this expression reads, de-duplicated, in first-visit order.
    pub fn signals(&self) -> Vec<SignalId> {
        let mut out = Vec::new();
        self.find_map::<()>(|e| {
            if let ExprKind::Signal(id) = e.kind() {
                if !out.contains(id) {
                    out.push(*id);
                }
            }
            None
        });
        out
    }

    /// Returns `true` if both handles point at the same node.
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the node, usable as a memoization key.
    pub fn as_ptr(&self) -> *const ExprKind {
        Arc::as_ptr(&self.0)
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

impl From<LogicVec> for Expr {
    fn from(value: LogicVec) -> Self {
        Expr::lit(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::lit(LogicVec::from_bool(value))
    }
}

impl From<SignalId> for Expr {
    fn from(id: SignalId) -> Self {
        Expr::signal(id)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::int(value.into())
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::int(value)
    }
}

impl From<u32> for Expr {
    fn from(value: u32) -> Self {
        Expr::int(value.into())
    }
}

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $op:ident) => {
        impl<R: Into<Expr>> ops::$trait<R> for Expr {
            type Output = Expr;

            fn $method(self, rhs: R) -> Expr {
                Expr::binary(BinaryOp::$op, self, rhs.into())
            }
        }

        impl<R: Into<Expr>> ops::$trait<R> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: R) -> Expr {
                Expr::binary(BinaryOp::$op, self.clone(), rhs.into())
            }
        }
    };
}

binary_operator!(Add, add, Add);
binary_operator!(Sub, sub, Sub);
binary_operator!(Mul, mul, Mul);
binary_operator!(Div, div, Div);
binary_operator!(Rem, rem, Mod);
binary_operator!(BitAnd, bitand, And);
binary_operator!(BitOr, bitor, Or);
binary_operator!(BitXor, bitxor, Xor);

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::unary(UnaryOp::Not, self)
    }
}

impl ops::Not for &Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::unary(UnaryOp::Not, self.clone())
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CompositeId;

    fn sig(i: u32) -> Expr {
        Expr::signal(SignalId::from_raw(i))
    }

    #[test]
    fn operators_build_binary_nodes() {
        let e = sig(0) + 1;
        match e.kind() {
            ExprKind::Binary { op, lhs, rhs } => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(lhs.kind(), ExprKind::Signal(_)));
                assert!(matches!(rhs.kind(), ExprKind::Int(1)));
            }
            other => panic!("expected binary, got {other:?}"),
        }
        assert!(matches!(
            (sig(0) % sig(1)).kind(),
            ExprKind::Binary { op: BinaryOp::Mod, .. }
        ));
        assert!(matches!(
            (!sig(0)).kind(),
            ExprKind::Unary { op: UnaryOp::Not, .. }
        ));
    }

    #[test]
    fn clones_share_nodes() {
        let a = sig(0) & sig(1);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&(sig(0) & sig(1))));
    }

    #[test]
    fn rswizzle_reverses_parts() {
        let e = Expr::rswizzle([sig(0), sig(1), sig(2)]);
        let ExprKind::Concat(parts) = e.kind() else {
            panic!("expected concat");
        };
        let ids: Vec<_> = parts
            .iter()
            .map(|p| match p.kind() {
                ExprKind::Signal(id) => id.as_raw(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[test]
    fn signals_are_deduplicated_in_visit_order() {
        let shared = sig(3) + sig(1);
        let e = shared.clone().mux(shared, sig(3)).eq(sig(2));
        let ids: Vec<u32> = e.signals().iter().map(|s| s.as_raw()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn placeholder_detection() {
        let plain = sig(0) + 1;
        assert!(!plain.contains_placeholder());
        let scoped = plain.clone() + Expr::scoped(CompositeId::from_raw(0));
        assert!(scoped.contains_placeholder());
        let uninit = plain + Expr::uninit(SignalId::from_raw(5));
        assert_eq!(uninit.first_uninit(), Some(SignalId::from_raw(5)));
    }

    #[test]
    fn map_children_preserves_untouched_nodes() {
        let e = (sig(0) + sig(1)).bits(3, 0);
        let same = e.try_map_children::<()>(|c| Ok(c.clone())).unwrap();
        assert!(same.ptr_eq(&e));

        let replaced = e
            .try_map_children::<()>(|_| Ok(sig(9)))
            .unwrap();
        assert!(!replaced.ptr_eq(&e));
        assert!(matches!(
            replaced.kind(),
            ExprKind::Slice { high: 3, low: 0, .. }
        ));
    }

    #[test]
    fn find_map_visits_shared_nodes_once() {
        let leaf = sig(0);
        let mut e = leaf.clone();
        for _ in 0..64 {
            e = e.clone() + e;
        }
        let mut visits = 0;
        e.find_map::<()>(|_| {
            visits += 1;
            None
        });
        assert_eq!(visits, 65);
    }

    #[test]
    fn comparison_and_shift_classification() {
        assert!(BinaryOp::Le.is_comparison());
        assert!(!BinaryOp::Add.is_comparison());
        assert!(BinaryOp::Ashr.is_shift());
        assert!(UnaryOp::MultiHot.is_reduction());
        assert!(!UnaryOp::Neg.is_reduction());
    }
}
