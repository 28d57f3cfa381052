//! Zero-delay settlement passes.
//!
//! A pass starts from the staged root values and the nodes connected since
//! the last pass, collects everything transitively downstream of them, orders
//! that set topologically and evaluates each driven node exactly once. Values
//! are committed only after every node has been evaluated; subscribers run
//! after the commit. A cycle in the affected set aborts the pass before any
//! value changes.
//!
//! Unique-case overlap checks touched by a pass are evaluated against the
//! pass's results. A conflict is logged as a warning and listed in the
//! report; it never changes a value.

use std::collections::HashMap;

use braid_common::LogicVec;
use braid_ir::SignalId;
use indexmap::{IndexMap, IndexSet};
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::SimError;
use crate::evaluator::Evaluator;
use crate::graph::{NodeMode, SignalGraph};

/// One committed value change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalChange {
    /// The signal that changed.
    pub signal: SignalId,
    /// Value before the pass.
    pub old: LogicVec,
    /// Value after the pass.
    pub new: LogicVec,
}

/// The outcome of a settlement pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettleReport {
    /// Changed signals in topological order.
    pub changes: Vec<SignalChange>,
    /// Number of driven signals evaluated.
    pub evaluated: usize,
    /// Selectors of unique cases that matched more than one item after
    /// this pass.
    pub unique_conflicts: Vec<String>,
}

impl SettleReport {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// The change recorded for `signal`, if any.
    pub fn change(&self, signal: SignalId) -> Option<&SignalChange> {
        self.changes.iter().find(|c| c.signal == signal)
    }
}

/// An evaluated but uncommitted pass.
struct Pass {
    order: Vec<SignalId>,
    values: HashMap<SignalId, LogicVec>,
    evaluated: usize,
    /// Indices of unique checks that fired.
    conflicts: Vec<usize>,
}

impl SignalGraph {
    /// Runs one settlement pass over all staged and newly connected signals.
    ///
    /// On error nothing is committed and staged forces are dropped. Newly
    /// connected drivers stay pending, so a combinational loop is reported
    /// again by every later pass.
    pub fn settle(&mut self) -> Result<SettleReport, SimError> {
        let staged = std::mem::take(&mut self.staged);
        let dirty = std::mem::take(&mut self.dirty);

        let Pass {
            order,
            mut values,
            evaluated,
            conflicts,
        } = match self.compute_pass(&staged, &dirty) {
            Ok(pass) => pass,
            Err(err) => {
                self.dirty = dirty;
                return Err(err);
            }
        };

        for &id in staged.keys() {
            self.nodes[id].mode = NodeMode::Root;
        }
        self.fresh_checks.clear();

        let mut report = SettleReport {
            changes: Vec::new(),
            evaluated,
            unique_conflicts: Vec::new(),
        };
        for index in conflicts {
            let selector = &self.unique_checks[index].selector;
            tracing::warn!(selector = selector.as_str(), "unique case matched more than one item");
            report.unique_conflicts.push(selector.clone());
        }
        for id in order {
            let Some(new) = values.remove(&id) else {
                continue;
            };
            let node = &mut self.nodes[id];
            if node.value != new {
                let old = std::mem::replace(&mut node.value, new.clone());
                report.changes.push(SignalChange {
                    signal: id,
                    old,
                    new,
                });
            }
        }

        for change in &report.changes {
            for subscriber in &mut self.nodes[change.signal].subscribers {
                subscriber(change);
            }
        }
        tracing::trace!(changed = report.changes.len(), "settlement pass committed");
        Ok(report)
    }

    /// Evaluates a pass without committing it.
    fn compute_pass(
        &self,
        staged: &IndexMap<SignalId, LogicVec>,
        dirty: &IndexSet<SignalId>,
    ) -> Result<Pass, SimError> {
        let mut seeds: IndexSet<SignalId> = staged
            .iter()
            .filter(|(id, value)| self.nodes[**id].value != **value)
            .map(|(id, _)| *id)
            .collect();
        seeds.extend(dirty.iter().copied());

        let affected = self.downstream(&seeds);
        if affected.len() > self.config.max_pass_nodes {
            return Err(SimError::PassTooLarge {
                nodes: affected.len(),
                limit: self.config.max_pass_nodes,
            });
        }
        tracing::debug!(
            seeds = seeds.len(),
            affected = affected.len(),
            "settlement pass"
        );

        let order = self.topological_order(&affected)?;
        let overrides = staged
            .iter()
            .map(|(id, value)| (*id, value.clone()))
            .collect();
        let mut evaluator = Evaluator::with_overrides(self, overrides);
        let mut evaluated = 0;
        for &id in &order {
            if let NodeMode::Driven(expr) = &self.nodes[id].mode {
                let value = evaluator.eval(expr)?;
                evaluator.set(id, value);
                evaluated += 1;
            }
        }

        let conflict = LogicVec::from_bool(true);
        let mut conflicts = Vec::new();
        for (index, check) in self.unique_checks.iter().enumerate() {
            let touched = self.fresh_checks.contains(&index)
                || check.reads.iter().any(|id| affected.contains(id));
            if touched && evaluator.eval(&check.conflict)? == conflict {
                conflicts.push(index);
            }
        }
        Ok(Pass {
            order,
            values: evaluator.into_overrides(),
            evaluated,
            conflicts,
        })
    }

    /// `seeds` plus every signal whose driver transitively reads one of them,
    /// in breadth-first discovery order.
    fn downstream(&self, seeds: &IndexSet<SignalId>) -> IndexSet<SignalId> {
        let mut affected = seeds.clone();
        let mut next = 0;
        while let Some(&id) = affected.get_index(next) {
            next += 1;
            for &dep in &self.nodes[id].dependents {
                affected.insert(dep);
            }
        }
        affected
    }

    /// Orders `affected` so every signal comes after the signals its driver
    /// reads, or reports the strongly connected component of a cycle.
    fn topological_order(&self, affected: &IndexSet<SignalId>) -> Result<Vec<SignalId>, SimError> {
        let mut graph: DiGraph<SignalId, ()> = DiGraph::with_capacity(affected.len(), 0);
        let index: HashMap<SignalId, NodeIndex> = affected
            .iter()
            .map(|&id| (id, graph.add_node(id)))
            .collect();
        for &id in affected {
            for dep in &self.nodes[id].dependents {
                if let Some(&to) = index.get(dep) {
                    graph.add_edge(index[&id], to, ());
                }
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(|ix| graph[ix]).collect()),
            Err(cycle) => {
                let start = cycle.node_id();
                let cyclic = |scc: &&Vec<NodeIndex>| {
                    scc.len() > 1 || graph.contains_edge(scc[0], scc[0])
                };
                let sccs = tarjan_scc(&graph);
                let component = sccs
                    .iter()
                    .filter(cyclic)
                    .find(|scc| scc.contains(&start))
                    .or_else(|| sccs.iter().find(cyclic))
                    .cloned()
                    .unwrap_or_else(|| vec![start]);
                let mut signals: Vec<SignalId> = component.into_iter().map(|ix| graph[ix]).collect();
                signals.sort();
                let names: Vec<String> = signals.iter().map(|&s| self.name(s).to_string()).collect();
                tracing::debug!(signals = ?names, "combinational loop detected");
                Err(SimError::CombinationalLoop { signals, names })
            }
        }
    }
}
