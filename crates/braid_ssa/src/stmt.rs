//! Procedural statements of a combinational block.
//!
//! Statements are plain data. Their expressions may contain scope
//! placeholders from [`Scope::get`](crate::Scope::get); those are resolved
//! only when the compiler replays the statement list.

use braid_ir::{Expr, SignalRef};
use indexmap::IndexSet;

/// One procedural statement.
#[derive(Debug, Clone)]
pub enum Statement {
    /// `target = value`.
    Assign {
        /// The written signal or composite.
        target: SignalRef,
        /// The assigned value, read at this statement's position.
        value: Expr,
    },
    /// `if (condition) then_body else else_body`.
    If {
        /// A 1-bit condition.
        condition: Expr,
        /// Statements replayed when the condition holds.
        then_body: Vec<Statement>,
        /// Statements replayed otherwise. May be empty.
        else_body: Vec<Statement>,
    },
    /// `case` or `casez`.
    Case(CaseStatement),
}

/// How item patterns are compared with the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// 4-state identity, as `case`.
    Exact,
    /// Z bits of the pattern match anything, as `casez`.
    ZWildcard,
}

/// What happens when several items match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePriority {
    /// The first matching item wins.
    Priority,
    /// First match wins, and a match on more than one item is reported.
    Unique,
}

/// One arm of a case statement.
#[derive(Debug, Clone)]
pub struct CaseItem {
    /// The arm is taken when any pattern matches.
    pub patterns: Vec<Expr>,
    /// Statements replayed for this arm.
    pub body: Vec<Statement>,
}

/// A fully built case statement.
#[derive(Debug, Clone)]
pub struct CaseStatement {
    /// The matched value.
    pub selector: Expr,
    /// Arms in priority order.
    pub items: Vec<CaseItem>,
    /// Statements for when no item matches. `None` keeps every target's
    /// previous value.
    pub default: Option<Vec<Statement>>,
    /// Exact or Z-wildcard matching.
    pub kind: MatchKind,
    /// Priority or unique.
    pub priority: CasePriority,
}

impl Statement {
    /// `target = value`.
    pub fn assign(target: impl Into<SignalRef>, value: impl Into<Expr>) -> Self {
        Statement::Assign {
            target: target.into(),
            value: value.into(),
        }
    }

    /// `if (condition) then_body else else_body`.
    pub fn if_else(
        condition: impl Into<Expr>,
        then_body: Vec<Statement>,
        else_body: Vec<Statement>,
    ) -> Self {
        Statement::If {
            condition: condition.into(),
            then_body,
            else_body,
        }
    }

    /// `if (condition) then_body` without an else branch.
    pub fn if_then(condition: impl Into<Expr>, then_body: Vec<Statement>) -> Self {
        Self::if_else(condition, then_body, Vec::new())
    }

    /// `if .. else if .. else` chain, desugared into nested `If`s.
    ///
    /// An empty `branches` list yields the `otherwise` statements inside an
    /// always-true `If`.
    pub fn if_chain(
        branches: impl IntoIterator<Item = (Expr, Vec<Statement>)>,
        otherwise: Vec<Statement>,
    ) -> Self {
        let mut branches: Vec<_> = branches.into_iter().collect();
        let Some((condition, body)) = branches.pop() else {
            return Self::if_then(true, otherwise);
        };
        let mut stmt = Self::if_else(condition, body, otherwise);
        while let Some((condition, body)) = branches.pop() {
            stmt = Self::if_else(condition, body, vec![stmt]);
        }
        stmt
    }
}

/// Builder for [`Statement::Case`].
///
/// ```ignore
/// Case::new(s.get(op))
///     .item(0, vec![Statement::assign(y, s.get(a) + s.get(b))])
///     .item(1, vec![Statement::assign(y, s.get(a) - s.get(b))])
///     .default(vec![Statement::assign(y, 0)])
///     .build()
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct Case {
    stmt: CaseStatement,
}

impl Case {
    /// A priority `case` with exact matching.
    pub fn new(selector: impl Into<Expr>) -> Self {
        Self::with_kind(selector.into(), MatchKind::Exact)
    }

    /// A priority `casez`: Z bits in item patterns are wildcards.
    pub fn z(selector: impl Into<Expr>) -> Self {
        Self::with_kind(selector.into(), MatchKind::ZWildcard)
    }

    fn with_kind(selector: Expr, kind: MatchKind) -> Self {
        Self {
            stmt: CaseStatement {
                selector,
                items: Vec::new(),
                default: None,
                kind,
                priority: CasePriority::Priority,
            },
        }
    }

    /// Adds an arm with a single pattern.
    pub fn item(self, pattern: impl Into<Expr>, body: Vec<Statement>) -> Self {
        self.items([pattern.into()], body)
    }

    /// Adds an arm taken when any of `patterns` matches.
    pub fn items(mut self, patterns: impl IntoIterator<Item = Expr>, body: Vec<Statement>) -> Self {
        self.stmt.items.push(CaseItem {
            patterns: patterns.into_iter().collect(),
            body,
        });
        self
    }

    /// Sets the statements for when no item matches.
    pub fn default(mut self, body: Vec<Statement>) -> Self {
        self.stmt.default = Some(body);
        self
    }

    /// Marks the case `unique`.
    pub fn unique(mut self) -> Self {
        self.stmt.priority = CasePriority::Unique;
        self
    }

    /// Finishes the statement.
    pub fn build(self) -> Statement {
        Statement::Case(self.stmt)
    }
}

impl From<Case> for Statement {
    fn from(case: Case) -> Self {
        case.build()
    }
}

/// Every target assigned anywhere in `statements`, in first-write order.
pub(crate) fn written_targets(statements: &[Statement]) -> IndexSet<SignalRef> {
    let mut out = IndexSet::new();
    collect_targets(statements, &mut out);
    out
}

fn collect_targets(statements: &[Statement], out: &mut IndexSet<SignalRef>) {
    for stmt in statements {
        match stmt {
            Statement::Assign { target, .. } => {
                out.insert(*target);
            }
            Statement::If {
                then_body,
                else_body,
                ..
            } => {
                collect_targets(then_body, out);
                collect_targets(else_body, out);
            }
            Statement::Case(case) => {
                for item in &case.items {
                    collect_targets(&item.body, out);
                }
                if let Some(default) = &case.default {
                    collect_targets(default, out);
                }
            }
        }
    }
}

/// Total number of statements, nested ones included.
pub(crate) fn count(statements: &[Statement]) -> usize {
    statements
        .iter()
        .map(|stmt| {
            1 + match stmt {
                Statement::Assign { .. } => 0,
                Statement::If {
                    then_body,
                    else_body,
                    ..
                } => count(then_body) + count(else_body),
                Statement::Case(case) => {
                    case.items.iter().map(|i| count(&i.body)).sum::<usize>()
                        + case.default.as_deref().map_or(0, count)
                }
            }
        })
        .sum()
}
