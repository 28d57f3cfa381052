//! Statement replay and driver installation.
//!
//! Compilation runs in three phases:
//!
//! 1. The builder closure is called exactly once and returns the statement
//!    list. Scope reads inside it are placeholders.
//! 2. The list is replayed in order against a [`ScopeBinding`]. Each
//!    statement's placeholders are substituted with the bindings in effect
//!    just before it. `if` and `case` fork the binding, replay each arm and
//!    merge the arms back with select chains.
//! 3. Every written leaf's final expression is checked for a reachable
//!    "no prior value" sentinel and validated against the graph. Only when
//!    all outputs pass are the drivers installed.
//!
//! A unique case merges like a priority case, first matching item first. It
//! additionally leaves a run-time check in the graph that warns whenever the
//! case is reached with more than one item matching.

use std::cell::RefCell;

use braid_common::LogicVec;
use braid_config::OverlapPolicy;
use braid_config::SsaConfig;
use braid_diagnostics::DiagnosticSink;
use braid_ir::{Expr, ExprKind, SignalId, SignalRef};
use braid_sim::SignalGraph;
use indexmap::IndexSet;

use crate::error::SsaError;
use crate::lint::{self, CaseShape};
use crate::scope::{Resolver, Scope, ScopeBinding};
use crate::stmt::{self, CasePriority, CaseStatement, MatchKind, Statement};

/// Summary of a successfully compiled block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledBlock {
    /// Leaves that received a driver, in first-write order.
    pub outputs: Vec<SignalId>,
    /// Statements replayed, nested ones included.
    pub statements: usize,
}

/// Compiles one combinational block into graph drivers.
pub struct SsaCompiler<'g> {
    graph: &'g mut SignalGraph,
    config: SsaConfig,
    sink: Option<&'g DiagnosticSink>,
}

impl<'g> SsaCompiler<'g> {
    /// A compiler with default settings and no diagnostic sink.
    pub fn new(graph: &'g mut SignalGraph) -> Self {
        Self {
            graph,
            config: SsaConfig::default(),
            sink: None,
        }
    }

    /// Uses the given compiler settings.
    pub fn with_config(mut self, config: &SsaConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Sends case lints to `sink`.
    pub fn with_sink(mut self, sink: &'g DiagnosticSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Builds, replays and installs the block returned by `builder`.
    ///
    /// Either every output receives its driver or, on error, none does.
    /// Drivers take effect at the next settlement pass.
    ///
    /// Locals declared through [`Scope::local`] and [`Scope::local_like`]
    /// are added to the graph while the builder runs and stay there, still
    /// undriven, when compilation fails.
    ///
    /// With a sink attached, a failure is also emitted as one error
    /// diagnostic.
    pub fn compile<F>(self, builder: F) -> Result<CompiledBlock, SsaError>
    where
        F: FnOnce(&Scope<'_>) -> Vec<Statement>,
    {
        let sink = self.sink;
        let result = self.run(builder);
        if let (Err(err), Some(sink)) = (&result, sink) {
            tracing::debug!(%err, "combinational block rejected");
            sink.emit(err.to_diagnostic());
        }
        result
    }

    fn run<F>(self, builder: F) -> Result<CompiledBlock, SsaError>
    where
        F: FnOnce(&Scope<'_>) -> Vec<Statement>,
    {
        let statements = {
            let scope = Scope::new(&mut *self.graph);
            builder(&scope)
        };
        let graph: &SignalGraph = self.graph;

        let mut outputs: IndexSet<SignalId> = IndexSet::new();
        for target in stmt::written_targets(&statements) {
            outputs.extend(graph.leaves(target));
        }
        tracing::debug!(
            statements = statements.len(),
            outputs = outputs.len(),
            "compiling combinational block"
        );
        for &leaf in &outputs {
            if graph.is_driven(leaf) {
                return Err(SsaError::AlreadyDriven {
                    signal: graph.name(leaf).to_string(),
                });
            }
        }

        let mut binding = ScopeBinding::new();
        for &leaf in &outputs {
            binding.set(leaf, Expr::uninit(leaf));
        }
        let replay = Replay {
            graph,
            config: &self.config,
            sink: self.sink,
            path: RefCell::new(Vec::new()),
            unique: RefCell::new(Vec::new()),
        };
        replay.block(&statements, &mut binding)?;
        let unique = replay.unique.into_inner();

        let mut drivers = Vec::with_capacity(outputs.len());
        for &leaf in &outputs {
            let expr = binding.get(leaf);
            if let Some(read) = expr.first_uninit() {
                return Err(SsaError::UninitializedRead {
                    signal: graph.name(leaf).to_string(),
                    read: graph.name(read).to_string(),
                });
            }
            drivers.push((leaf, graph.check_driver(leaf.into(), &expr)?));
        }
        let mut checks = Vec::with_capacity(unique.len());
        for (selector, conflict) in unique {
            if let Some(read) = conflict.first_uninit() {
                return Err(SsaError::UninitializedRead {
                    signal: selector,
                    read: graph.name(read).to_string(),
                });
            }
            checks.push(graph.check_unique(&selector, &conflict)?);
        }

        for (leaf, driver) in drivers {
            self.graph.connect(leaf, driver)?;
        }
        for check in checks {
            self.graph.add_unique_check(check);
        }
        let statements = stmt::count(&statements);
        tracing::debug!(statements, "combinational block compiled");
        Ok(CompiledBlock {
            outputs: outputs.into_iter().collect(),
            statements,
        })
    }
}

/// Entry point mirroring the `always_comb` block form.
pub struct Combinational;

impl Combinational {
    /// Compiles `builder` into `graph` with default settings.
    pub fn ssa<F>(graph: &mut SignalGraph, builder: F) -> Result<CompiledBlock, SsaError>
    where
        F: FnOnce(&Scope<'_>) -> Vec<Statement>,
    {
        SsaCompiler::new(graph).compile(builder)
    }
}

struct Replay<'a> {
    graph: &'a SignalGraph,
    config: &'a SsaConfig,
    sink: Option<&'a DiagnosticSink>,
    /// Conditions under which the statement being replayed is reached.
    path: RefCell<Vec<Expr>>,
    /// Selector name and conflict condition of every unique case to watch.
    unique: RefCell<Vec<(String, Expr)>>,
}

impl Replay<'_> {
    fn block(&self, statements: &[Statement], binding: &mut ScopeBinding) -> Result<(), SsaError> {
        for statement in statements {
            match statement {
                Statement::Assign { target, value } => self.assign(*target, value, binding)?,
                Statement::If {
                    condition,
                    then_body,
                    else_body,
                } => self.if_else(condition, then_body, else_body, binding)?,
                Statement::Case(case) => self.case(case, binding)?,
            }
        }
        Ok(())
    }

    /// Replays `body` with `guard` added to the current path.
    fn guarded(
        &self,
        guard: Expr,
        body: &[Statement],
        binding: &mut ScopeBinding,
    ) -> Result<(), SsaError> {
        self.path.borrow_mut().push(guard);
        let result = self.block(body, binding);
        self.path.borrow_mut().pop();
        result
    }

    fn assign(
        &self,
        target: SignalRef,
        value: &Expr,
        binding: &mut ScopeBinding,
    ) -> Result<(), SsaError> {
        let expected = self.graph.width(target);
        let (sized, actual) = self.graph.size_expr(value, Some(expected))?;
        if actual != expected {
            return Err(SsaError::WidthMismatch {
                target: self.graph.ref_name(target).to_string(),
                expected,
                actual,
            });
        }
        let resolved = Resolver::new(self.graph, binding).resolve(&sized);
        match target {
            SignalRef::Signal(leaf) => binding.set(leaf, resolved),
            SignalRef::Composite(_) => {
                for (leaf, slice) in self.graph.split_expr(target, &resolved) {
                    binding.set(leaf, slice);
                }
            }
        }
        Ok(())
    }

    fn if_else(
        &self,
        condition: &Expr,
        then_body: &[Statement],
        else_body: &[Statement],
        binding: &mut ScopeBinding,
    ) -> Result<(), SsaError> {
        let (sized, width) = self.graph.size_expr(condition, Some(1))?;
        if width != 1 {
            return Err(SsaError::TypeMismatch {
                context: "if condition",
                expected: 1,
                actual: width,
            });
        }
        let condition = Resolver::new(self.graph, binding).resolve(&sized);

        let mut then_binding = binding.clone();
        self.guarded(condition.clone(), then_body, &mut then_binding)?;
        let mut else_binding = binding.clone();
        self.guarded(!condition.clone(), else_body, &mut else_binding)?;

        let leaves: Vec<SignalId> = binding.iter().map(|(leaf, _)| leaf).collect();
        for leaf in leaves {
            let when_true = then_binding.get(leaf);
            let when_false = else_binding.get(leaf);
            if when_true.ptr_eq(&when_false) {
                binding.set(leaf, when_true);
            } else {
                binding.set(leaf, condition.clone().mux(when_true, when_false));
            }
        }
        Ok(())
    }

    fn case(&self, case: &CaseStatement, binding: &mut ScopeBinding) -> Result<(), SsaError> {
        let wildcard = case.kind == MatchKind::ZWildcard;
        let (selector, _) = self.graph.size_expr(&case.selector, None)?;

        let mut sized_items = Vec::with_capacity(case.items.len());
        let mut constants = Vec::with_capacity(case.items.len());
        for item in &case.items {
            let mut patterns = Vec::with_capacity(item.patterns.len());
            let mut literal = Vec::with_capacity(item.patterns.len());
            for pattern in &item.patterns {
                let (matched, _) = self
                    .graph
                    .size_expr(&selector.clone().case_match(pattern.clone(), wildcard), None)?;
                literal.push(match matched.kind() {
                    ExprKind::CaseMatch { pattern, .. } => pattern.as_literal().cloned(),
                    _ => None,
                });
                patterns.push(matched);
            }
            sized_items.push(patterns);
            constants.push(literal);
        }

        let selector_name = self.selector_name(&case.selector);
        lint::check_case(
            &CaseShape {
                selector: &selector_name,
                kind: case.kind,
                priority: case.priority,
                items: constants,
            },
            self.config,
            self.sink,
        )?;

        let mut resolver = Resolver::new(self.graph, binding);
        let matches: Vec<Expr> = sized_items
            .iter()
            .map(|patterns| {
                patterns
                    .iter()
                    .map(|p| resolver.resolve(p))
                    .reduce(|any, m| any | m)
                    .unwrap_or_else(|| Expr::lit(LogicVec::from_bool(false)))
            })
            .collect();
        drop(resolver);

        if case.priority == CasePriority::Unique
            && self.config.unique_overlap != OverlapPolicy::Allow
            && matches.len() > 1
        {
            let multiple = Expr::swizzle(matches.iter().cloned()).multi_hot();
            let conflict = match self.path.borrow().iter().cloned().reduce(|a, b| a & b) {
                Some(reached) => reached & multiple,
                None => multiple,
            };
            self.unique.borrow_mut().push((selector_name, conflict));
        }

        let mut arms = Vec::with_capacity(case.items.len());
        let mut earlier: Option<Expr> = None;
        for (item, matched) in case.items.iter().zip(&matches) {
            let guard = match &earlier {
                Some(earlier) => matched.clone() & !earlier.clone(),
                None => matched.clone(),
            };
            let mut arm = binding.clone();
            self.guarded(guard, &item.body, &mut arm)?;
            arms.push(arm);
            earlier = Some(match earlier {
                Some(earlier) => earlier | matched.clone(),
                None => matched.clone(),
            });
        }
        let mut fallback = binding.clone();
        if let Some(default) = &case.default {
            let guard = earlier.map_or_else(|| Expr::lit(LogicVec::from_bool(true)), |any| !any);
            self.guarded(guard, default, &mut fallback)?;
        }

        let leaves: Vec<SignalId> = binding.iter().map(|(leaf, _)| leaf).collect();
        for leaf in leaves {
            let base = binding.get(leaf);
            let untouched = fallback.get(leaf).ptr_eq(&base)
                && arms.iter().all(|arm| arm.get(leaf).ptr_eq(&base));
            if untouched {
                continue;
            }
            let mut chain = fallback.get(leaf);
            for (matched, arm) in matches.iter().zip(&arms).rev() {
                let value = arm.get(leaf);
                if !value.ptr_eq(&chain) {
                    chain = matched.clone().mux(value, chain);
                }
            }
            binding.set(leaf, chain);
        }
        Ok(())
    }

    /// A name for diagnostics: the first signal the selector reads.
    fn selector_name(&self, selector: &Expr) -> String {
        selector
            .find_map(|e| match e.kind() {
                ExprKind::Scoped(target) => Some(self.graph.ref_name(*target).to_string()),
                ExprKind::Signal(id) => Some(self.graph.name(*id).to_string()),
                _ => None,
            })
            .unwrap_or_else(|| "case selector".to_string())
    }
}
