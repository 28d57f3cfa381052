//! Append-only, ID-indexed storage for signal graph entities.
//!
//! Nodes reference each other by [`ArenaId`] rather than by ownership, so the
//! signal graph may contain cycles without any reference cycles in memory.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Trait for opaque ID types used as arena keys.
pub trait ArenaId: Copy {
    /// Creates an ID from a raw `u32` index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw `u32` index.
    fn as_raw(self) -> u32;
}

/// A dense container whose IDs stay valid for its whole lifetime.
///
/// Items are never removed or reordered.
#[derive(Debug, Clone)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Stores `item` and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// Returns the item for `id`, or `None` if no such item was allocated.
    pub fn try_get(&self, id: I) -> Option<&T> {
        self.items.get(id.as_raw() as usize)
    }

    /// Returns the item for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this arena.
    pub fn get(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }

    /// Returns the item for `id` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this arena.
    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.as_raw() as usize]
    }

    /// Number of allocated items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(ID, &T)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }

    /// Iterates over all allocated IDs in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = I> {
        (0..self.items.len() as u32).map(I::from_raw)
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SignalId;

    #[test]
    fn alloc_returns_sequential_ids() {
        let mut arena: Arena<SignalId, &str> = Arena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        assert_eq!(arena[b], "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn get_mut_modifies_in_place() {
        let mut arena: Arena<SignalId, u32> = Arena::new();
        let id = arena.alloc(7);
        arena[id] += 1;
        assert_eq!(*arena.get(id), 8);
    }

    #[test]
    fn try_get_out_of_range() {
        let arena: Arena<SignalId, u32> = Arena::default();
        assert!(arena.is_empty());
        assert!(arena.try_get(SignalId::from_raw(3)).is_none());
    }

    #[test]
    fn iteration_follows_allocation_order() {
        let mut arena: Arena<SignalId, char> = Arena::new();
        for c in ['x', 'y', 'z'] {
            arena.alloc(c);
        }
        let items: Vec<char> = arena.iter().map(|(_, c)| *c).collect();
        assert_eq!(items, vec!['x', 'y', 'z']);
        let ids: Vec<u32> = arena.ids().map(|id| id.as_raw()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
