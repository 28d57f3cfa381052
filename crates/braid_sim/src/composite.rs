//! Structured and array signals built from ordered elements.
//!
//! A composite is a view over existing leaves (or nested composites). Its
//! value is the concatenation of its elements with element 0 in the least
//! significant position, so a struct declared as `{lo, hi}` reads as
//! `{hi, lo}` in swizzle notation. Writing a composite writes each leaf with
//! the matching slice; writing one element never touches its siblings.

use braid_common::{Ident, LogicVec};
use braid_ir::{CompositeId, Expr, SignalId, SignalRef};

use crate::graph::SignalGraph;

/// An ordered group of elements.
#[derive(Debug, Clone)]
pub struct CompositeNode {
    pub(crate) name: Ident,
    pub(crate) elements: Vec<SignalRef>,
}

impl CompositeNode {
    /// Elements in declaration order.
    pub fn elements(&self) -> &[SignalRef] {
        &self.elements
    }
}

impl SignalGraph {
    /// Groups existing signals into a composite.
    pub fn add_composite(&mut self, name: &str, elements: Vec<SignalRef>) -> CompositeId {
        let name = self.names.get_or_intern(name);
        self.composites.alloc(CompositeNode { name, elements })
    }

    /// Creates a struct whose fields are fresh leaves named `name.field`.
    pub fn add_struct(&mut self, name: &str, fields: &[(&str, u32)]) -> CompositeId {
        let elements: Vec<SignalRef> = fields
            .iter()
            .map(|(field, width)| self.add_signal(&format!("{name}.{field}"), *width).into())
            .collect();
        self.add_composite(name, elements)
    }

    /// Creates an array of `len` fresh leaves named `name[i]`.
    pub fn add_array(&mut self, name: &str, len: usize, width: u32) -> CompositeId {
        let elements: Vec<SignalRef> = (0..len)
            .map(|i| self.add_signal(&format!("{name}[{i}]"), width).into())
            .collect();
        self.add_composite(name, elements)
    }

    /// The composite node for `id`.
    pub fn composite(&self, id: CompositeId) -> &CompositeNode {
        &self.composites[id]
    }

    /// Element `index` of a composite.
    pub fn element(&self, id: CompositeId, index: usize) -> Option<SignalRef> {
        self.composites[id].elements.get(index).copied()
    }

    /// Follows a path of element indices through nested composites.
    ///
    /// An empty path names the composite itself.
    pub fn element_path(&self, id: CompositeId, path: &[usize]) -> Option<SignalRef> {
        let mut current = SignalRef::Composite(id);
        for &index in path {
            let SignalRef::Composite(cid) = current else {
                return None;
            };
            current = self.element(cid, index)?;
        }
        Some(current)
    }

    /// Leaves of `target` in declaration order, nested composites flattened.
    pub fn leaves(&self, target: SignalRef) -> Vec<SignalId> {
        let mut out = Vec::new();
        self.collect_leaves(target, &mut out);
        out
    }

    fn collect_leaves(&self, target: SignalRef, out: &mut Vec<SignalId>) {
        match target {
            SignalRef::Signal(id) => out.push(id),
            SignalRef::Composite(cid) => {
                for &element in &self.composites[cid].elements {
                    self.collect_leaves(element, out);
                }
            }
        }
    }

    /// Flattened width in bits.
    pub fn width(&self, target: SignalRef) -> u32 {
        match target {
            SignalRef::Signal(id) => self.nodes[id].width,
            SignalRef::Composite(cid) => self.composites[cid]
                .elements
                .iter()
                .map(|&element| self.width(element))
                .sum(),
        }
    }

    /// Current whole value: the concatenation of every leaf, element 0 lowest.
    pub fn read(&self, target: SignalRef) -> LogicVec {
        match target {
            SignalRef::Signal(id) => self.nodes[id].value.clone(),
            SignalRef::Composite(_) => {
                let parts: Vec<LogicVec> = self
                    .leaves(target)
                    .into_iter()
                    .map(|leaf| self.nodes[leaf].value.clone())
                    .collect();
                LogicVec::rswizzle(&parts)
            }
        }
    }

    /// An expression reading the live whole value of `target`.
    pub fn read_expr(&self, target: SignalRef) -> Expr {
        match target {
            SignalRef::Signal(id) => Expr::signal(id),
            SignalRef::Composite(_) => {
                Expr::rswizzle(self.leaves(target).into_iter().map(Expr::signal))
            }
        }
    }

    /// Creates an undriven copy of a composite with the same shape.
    ///
    /// Leaf names keep their suffix under the new name: cloning `pkt` (with a
    /// leaf `pkt.len`) as `tmp` yields `tmp.len`.
    pub fn clone_composite(&mut self, id: CompositeId, new_name: &str) -> CompositeId {
        let old_name = self.names.resolve(self.composites[id].name).to_string();
        let elements = self.composites[id].elements.clone();
        let copies: Vec<SignalRef> = elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                let element_name = self.ref_name(element).to_string();
                let renamed = match element_name.strip_prefix(&old_name) {
                    Some(suffix) if !suffix.is_empty() => format!("{new_name}{suffix}"),
                    _ => format!("{new_name}.{index}"),
                };
                match element {
                    SignalRef::Signal(leaf) => {
                        let width = self.nodes[leaf].width;
                        self.add_signal(&renamed, width).into()
                    }
                    SignalRef::Composite(inner) => self.clone_composite(inner, &renamed).into(),
                }
            })
            .collect();
        self.add_composite(new_name, copies)
    }
}
