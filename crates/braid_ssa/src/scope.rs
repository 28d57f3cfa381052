//! Scope reads and the versioned binding environment.

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;

use braid_ir::{CompositeId, Expr, ExprKind, SignalId, SignalRef};
use braid_sim::SignalGraph;
use indexmap::IndexMap;

/// The accessor handed to a block builder.
///
/// [`get`](Self::get) returns a placeholder, not a value: the read is bound to
/// whatever the target holds at the position of the statement that finally
/// contains it. The scope can also declare block-local scratch signals.
pub struct Scope<'g> {
    graph: RefCell<&'g mut SignalGraph>,
}

impl<'g> Scope<'g> {
    pub(crate) fn new(graph: &'g mut SignalGraph) -> Self {
        Self {
            graph: RefCell::new(graph),
        }
    }

    /// A placeholder reading `target` inside the block.
    pub fn get(&self, target: impl Into<SignalRef>) -> Expr {
        Expr::scoped(target)
    }

    /// Short form of [`get`](Self::get).
    pub fn s(&self, target: impl Into<SignalRef>) -> Expr {
        self.get(target)
    }

    /// Declares a fresh scratch signal. It must be assigned before it is read.
    pub fn local(&self, name: &str, width: u32) -> SignalId {
        self.graph.borrow_mut().add_signal(name, width)
    }

    /// Declares a scratch composite with the shape of `like`.
    pub fn local_like(&self, like: CompositeId, name: &str) -> CompositeId {
        self.graph.borrow_mut().clone_composite(like, name)
    }

    /// Flattened width of a signal or composite.
    pub fn width(&self, target: impl Into<SignalRef>) -> u32 {
        self.graph.borrow().width(target.into())
    }

    /// Element `index` of a composite.
    pub fn element(&self, composite: CompositeId, index: usize) -> Option<SignalRef> {
        self.graph.borrow().element(composite, index)
    }
}

/// Current expression of every leaf written so far, as of one point in the
/// statement replay.
///
/// Forking is a clone: entries are shared `Expr` handles, so an entry left
/// untouched by a branch is pointer-equal to its pre-branch value.
#[derive(Debug, Clone, Default)]
pub struct ScopeBinding {
    current: IndexMap<SignalId, Expr>,
}

impl ScopeBinding {
    /// An empty binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current expression of `leaf`. Leaves never written by the block
    /// read their live graph value.
    pub fn get(&self, leaf: SignalId) -> Expr {
        self.current
            .get(&leaf)
            .cloned()
            .unwrap_or_else(|| Expr::signal(leaf))
    }

    /// The stored entry of `leaf`, if any.
    pub fn entry(&self, leaf: SignalId) -> Option<&Expr> {
        self.current.get(&leaf)
    }

    /// Records a new version of `leaf`.
    pub fn set(&mut self, leaf: SignalId, expr: Expr) {
        self.current.insert(leaf, expr);
    }

    /// All entries, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (SignalId, &Expr)> {
        self.current.iter().map(|(id, expr)| (*id, expr))
    }

    /// Number of bound leaves.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

/// Substitutes scope placeholders with their current binding.
///
/// The memo is keyed by node address and lives for one statement, so a
/// sub-expression shared within the statement is resolved once and stays
/// shared.
pub(crate) struct Resolver<'a> {
    graph: &'a SignalGraph,
    binding: &'a ScopeBinding,
    memo: HashMap<*const ExprKind, Expr>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(graph: &'a SignalGraph, binding: &'a ScopeBinding) -> Self {
        Self {
            graph,
            binding,
            memo: HashMap::new(),
        }
    }

    pub(crate) fn resolve(&mut self, expr: &Expr) -> Expr {
        if let Some(done) = self.memo.get(&expr.as_ptr()) {
            return done.clone();
        }
        let resolved = match expr.kind() {
            ExprKind::Scoped(target) => self.read(*target),
            _ => match expr.try_map_children::<Infallible>(|child| Ok(self.resolve(child))) {
                Ok(rebuilt) => rebuilt,
                Err(never) => match never {},
            },
        };
        self.memo.insert(expr.as_ptr(), resolved.clone());
        resolved
    }

    fn read(&self, target: SignalRef) -> Expr {
        match target {
            SignalRef::Signal(leaf) => self.binding.get(leaf),
            SignalRef::Composite(_) => Expr::rswizzle(
                self.graph
                    .leaves(target)
                    .into_iter()
                    .map(|leaf| self.binding.get(leaf)),
            ),
        }
    }
}
