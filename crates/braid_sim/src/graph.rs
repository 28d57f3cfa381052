//! The signal arena: nodes, drivers, roots and subscriptions.

use std::collections::BTreeSet;
use std::fmt;

use braid_common::{Ident, Interner, LogicVec};
use braid_config::PropagationConfig;
use braid_ir::{Arena, CompositeId, Expr, SignalId, SignalRef};
use indexmap::{IndexMap, IndexSet};

use crate::composite::CompositeNode;
use crate::engine::SignalChange;
use crate::error::SimError;
use crate::width::Sizer;

/// A change callback registered with [`SignalGraph::subscribe`].
pub(crate) type Subscriber = Box<dyn FnMut(&SignalChange)>;

/// How a leaf signal obtains its value. The modes are mutually exclusive.
#[derive(Debug, Clone)]
pub enum NodeMode {
    /// Nothing has written the signal yet.
    Undriven,
    /// The value is injected from outside with [`SignalGraph::force`].
    Root,
    /// The value is the settled result of this expression.
    Driven(Expr),
}

/// One leaf signal.
pub struct SignalNode {
    pub(crate) name: Ident,
    pub(crate) width: u32,
    pub(crate) value: LogicVec,
    pub(crate) mode: NodeMode,
    /// Signals whose driver reads this one.
    pub(crate) dependents: BTreeSet<SignalId>,
    pub(crate) subscribers: Vec<Subscriber>,
}

impl SignalNode {
    /// Declared width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current settled value.
    pub fn value(&self) -> &LogicVec {
        &self.value
    }

    /// Current mode.
    pub fn mode(&self) -> &NodeMode {
        &self.mode
    }
}

impl fmt::Debug for SignalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalNode")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("value", &self.value)
            .field("mode", &self.mode)
            .field("dependents", &self.dependents)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// A run-time overlap check for one unique case, produced by
/// [`SignalGraph::check_unique`].
#[derive(Debug, Clone)]
pub struct UniqueCheck {
    pub(crate) selector: String,
    /// 1 when the case is reached and more than one item matches.
    pub(crate) conflict: Expr,
    pub(crate) reads: BTreeSet<SignalId>,
}

impl UniqueCheck {
    /// The selector name reported on a conflict.
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

/// Arena of leaf and composite signals plus pending settlement work.
#[derive(Debug, Default)]
pub struct SignalGraph {
    pub(crate) nodes: Arena<SignalId, SignalNode>,
    pub(crate) composites: Arena<CompositeId, CompositeNode>,
    pub(crate) names: Interner,
    /// Root values waiting for the next pass.
    pub(crate) staged: IndexMap<SignalId, LogicVec>,
    /// Driven nodes connected since the last successful pass.
    pub(crate) dirty: IndexSet<SignalId>,
    pub(crate) unique_checks: Vec<UniqueCheck>,
    /// Checks added since the last successful pass.
    pub(crate) fresh_checks: IndexSet<usize>,
    pub(crate) config: PropagationConfig,
}

impl SignalGraph {
    /// Creates an empty graph with default propagation settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph using the given propagation settings.
    pub fn with_config(config: &PropagationConfig) -> Self {
        Self {
            config: config.clone(),
            ..Self::default()
        }
    }

    /// Adds an undriven leaf signal holding all-X.
    pub fn add_signal(&mut self, name: &str, width: u32) -> SignalId {
        self.add_signal_with_value(name, LogicVec::all_x(width))
    }

    /// Adds an undriven leaf signal holding `init`.
    pub fn add_signal_with_value(&mut self, name: &str, init: LogicVec) -> SignalId {
        let name = self.names.get_or_intern(name);
        self.nodes.alloc(SignalNode {
            name,
            width: init.width(),
            value: init,
            mode: NodeMode::Undriven,
            dependents: BTreeSet::new(),
            subscribers: Vec::new(),
        })
    }

    /// Returns the leaf node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this graph.
    pub fn node(&self, id: SignalId) -> &SignalNode {
        &self.nodes[id]
    }

    /// Number of leaf signals.
    pub fn signal_count(&self) -> usize {
        self.nodes.len()
    }

    /// The settled value of a leaf signal.
    pub fn value(&self, id: SignalId) -> &LogicVec {
        &self.nodes[id].value
    }

    /// The diagnostic name of a leaf signal.
    pub fn name(&self, id: SignalId) -> &str {
        self.names.resolve(self.nodes[id].name)
    }

    /// The diagnostic name of a leaf or composite signal.
    pub fn ref_name(&self, target: SignalRef) -> &str {
        match target {
            SignalRef::Signal(id) => self.name(id),
            SignalRef::Composite(cid) => self.names.resolve(self.composites[cid].name),
        }
    }

    /// The mode of a leaf signal.
    pub fn mode(&self, id: SignalId) -> &NodeMode {
        &self.nodes[id].mode
    }

    /// The driving expression of a leaf signal, if any.
    pub fn driver(&self, id: SignalId) -> Option<&Expr> {
        match &self.nodes[id].mode {
            NodeMode::Driven(expr) => Some(expr),
            NodeMode::Undriven | NodeMode::Root => None,
        }
    }

    /// Returns `true` unless the signal is still undriven and has no staged
    /// value.
    pub fn is_driven(&self, id: SignalId) -> bool {
        !matches!(self.nodes[id].mode, NodeMode::Undriven) || self.staged.contains_key(&id)
    }

    /// Validates `expr` as a driver for `target` without installing it.
    ///
    /// Rejects unresolved scope reads, sizes unsized integer literals from
    /// context and checks every operator width. Returns the sized expression,
    /// whose width equals the target's.
    pub fn check_driver(&self, target: SignalRef, expr: &Expr) -> Result<Expr, SimError> {
        if let Some(placeholder) = expr.find_map(|e| self.placeholder_name(e)) {
            return Err(SimError::UnresolvedPlaceholder {
                signal: placeholder,
            });
        }
        let expected = self.width(target);
        let (sized, actual) = Sizer::new(self).size(expr, Some(expected))?;
        if actual != expected {
            return Err(SimError::WidthMismatch {
                signal: self.ref_name(target).to_string(),
                expected,
                actual,
            });
        }
        Ok(sized)
    }

    fn placeholder_name(&self, expr: &Expr) -> Option<String> {
        match expr.kind() {
            braid_ir::ExprKind::Scoped(target) => Some(self.ref_name(*target).to_string()),
            braid_ir::ExprKind::Uninit(id) => Some(self.name(*id).to_string()),
            _ => None,
        }
    }

    /// Self-determined width of an expression.
    ///
    /// Scope placeholders and uninitialized sentinels count with the width of
    /// the signal they stand for, so this works on unresolved block
    /// expressions too.
    pub fn expr_width(&self, expr: &Expr) -> Result<u32, SimError> {
        Ok(self.size_expr(expr, None)?.1)
    }

    /// Sizes an expression, giving unsized integer literals the width of
    /// their operands or, failing that, `context`. Returns the sized
    /// expression and its width. Placeholders are accepted.
    pub fn size_expr(&self, expr: &Expr, context: Option<u32>) -> Result<(Expr, u32), SimError> {
        Sizer::new(self).size(expr, context)
    }

    /// Installs `expr` as the driver of an undriven leaf.
    ///
    /// The node is re-evaluated by the next [`settle`](Self::settle).
    pub fn connect(&mut self, id: SignalId, expr: Expr) -> Result<(), SimError> {
        self.ensure_undriven(id)?;
        let sized = self.check_driver(id.into(), &expr)?;
        self.install(id, sized);
        Ok(())
    }

    /// Connects a driver to a leaf or, slice by slice, to every leaf of a
    /// composite. Either every leaf is connected or none is.
    pub fn connect_ref(&mut self, target: SignalRef, expr: Expr) -> Result<(), SimError> {
        let leaves = self.leaves(target);
        for &leaf in &leaves {
            self.ensure_undriven(leaf)?;
        }
        let sized = self.check_driver(target, &expr)?;
        match target {
            SignalRef::Signal(id) => self.install(id, sized),
            SignalRef::Composite(_) => {
                for (leaf, slice) in self.split_expr(target, &sized) {
                    self.install(leaf, slice);
                }
            }
        }
        Ok(())
    }

    /// Drives `dst` from the live value of `src`. Both may be composites of
    /// any shape as long as their flattened widths agree.
    pub fn connect_signals(&mut self, dst: SignalRef, src: SignalRef) -> Result<(), SimError> {
        let expr = self.read_expr(src);
        self.connect_ref(dst, expr)
    }

    /// Installs a validated driver. Callers check the width and mode first.
    pub(crate) fn install(&mut self, id: SignalId, expr: Expr) {
        for dep in expr.signals() {
            self.nodes[dep].dependents.insert(id);
        }
        tracing::trace!(signal = self.name(id), "driver installed");
        self.nodes[id].mode = NodeMode::Driven(expr);
        self.dirty.insert(id);
    }

    /// Validates a unique-case overlap check without registering it.
    ///
    /// `conflict` must be a 1-bit expression that is 1 exactly when the case
    /// is reached and more than one of its items matches.
    pub fn check_unique(&self, selector: &str, conflict: &Expr) -> Result<UniqueCheck, SimError> {
        if let Some(placeholder) = conflict.find_map(|e| self.placeholder_name(e)) {
            return Err(SimError::UnresolvedPlaceholder {
                signal: placeholder,
            });
        }
        let (sized, width) = self.size_expr(conflict, Some(1))?;
        if width != 1 {
            return Err(SimError::WidthMismatch {
                signal: selector.to_string(),
                expected: 1,
                actual: width,
            });
        }
        Ok(UniqueCheck {
            selector: selector.to_string(),
            reads: sized.signals().into_iter().collect(),
            conflict: sized,
        })
    }

    /// Registers a validated overlap check. It is evaluated by the next
    /// pass and then by every pass that touches a signal it reads.
    pub fn add_unique_check(&mut self, check: UniqueCheck) {
        tracing::trace!(selector = check.selector.as_str(), "unique case check installed");
        self.fresh_checks.insert(self.unique_checks.len());
        self.unique_checks.push(check);
    }

    /// Splits a whole-value expression for `target` into one slice per leaf,
    /// element 0 taking the least significant bits.
    pub fn split_expr(&self, target: SignalRef, expr: &Expr) -> Vec<(SignalId, Expr)> {
        let mut low = 0;
        self.leaves(target)
            .into_iter()
            .map(|leaf| {
                let width = self.nodes[leaf].width;
                let slice = if width == 0 {
                    Expr::lit(LogicVec::new(0))
                } else {
                    expr.clone().bits(low + width - 1, low)
                };
                low += width;
                (leaf, slice)
            })
            .collect()
    }

    pub(crate) fn ensure_undriven(&self, id: SignalId) -> Result<(), SimError> {
        match self.nodes[id].mode {
            NodeMode::Undriven if self.staged.contains_key(&id) => Err(SimError::AlreadyDriven {
                signal: self.name(id).to_string(),
            }),
            NodeMode::Undriven => Ok(()),
            NodeMode::Root | NodeMode::Driven(_) => Err(SimError::AlreadyDriven {
                signal: self.name(id).to_string(),
            }),
        }
    }

    fn ensure_forceable(&self, id: SignalId, value: &LogicVec) -> Result<(), SimError> {
        let node = &self.nodes[id];
        if let NodeMode::Driven(_) = node.mode {
            return Err(SimError::ForceDrivenSignal {
                signal: self.name(id).to_string(),
            });
        }
        if value.width() != node.width {
            return Err(SimError::WidthMismatch {
                signal: self.name(id).to_string(),
                expected: node.width,
                actual: value.width(),
            });
        }
        Ok(())
    }

    /// Stages a value on an undriven or root leaf.
    ///
    /// Nothing changes until the next [`settle`](Self::settle), which makes
    /// the leaf a root when it commits. A staged leaf cannot be connected.
    pub fn force(&mut self, id: SignalId, value: LogicVec) -> Result<(), SimError> {
        self.ensure_forceable(id, &value)?;
        self.staged.insert(id, value);
        Ok(())
    }

    /// [`force`](Self::force) followed by [`settle`](Self::settle).
    pub fn inject(&mut self, id: SignalId, value: LogicVec) -> Result<crate::SettleReport, SimError> {
        self.force(id, value)?;
        self.settle()
    }

    /// Injects a whole-value write into a leaf or composite, slicing it across
    /// leaves in declaration order, then settles.
    pub fn inject_ref(
        &mut self,
        target: SignalRef,
        value: LogicVec,
    ) -> Result<crate::SettleReport, SimError> {
        let expected = self.width(target);
        if value.width() != expected {
            return Err(SimError::WidthMismatch {
                signal: self.ref_name(target).to_string(),
                expected,
                actual: value.width(),
            });
        }
        let leaves = self.leaves(target);
        let mut parts = Vec::with_capacity(leaves.len());
        let mut low = 0;
        for &leaf in &leaves {
            let width = self.nodes[leaf].width;
            let part = if width == 0 {
                LogicVec::new(0)
            } else {
                value.slice(low + width - 1, low)?
            };
            self.ensure_forceable(leaf, &part)?;
            parts.push((leaf, part));
            low += width;
        }
        for (leaf, part) in parts {
            self.force(leaf, part)?;
        }
        self.settle()
    }

    /// Registers a callback invoked after every pass in which `id` changes.
    pub fn subscribe(&mut self, id: SignalId, callback: impl FnMut(&SignalChange) + 'static) {
        self.nodes[id].subscribers.push(Box::new(callback));
    }
}
