//! Tombstoned entity storage.
//!
//! An [`Arena`] is a `Vec<Option<T>>` addressed by a typed id. Removal leaves
//! a `None` slot behind so that every other id keeps pointing at the same
//! entity; freed slots are never reused.

use std::marker::PhantomData;

use super::index::ElementId;

/// Stable-id storage for one kind of board entity.
#[derive(Debug, Clone)]
pub struct Arena<K: ElementId, T> {
    slots: Vec<Option<T>>,
    live: usize,
    _key: PhantomData<K>,
}

impl<K: ElementId, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ElementId, T> Arena<K, T> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty arena with room for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            live: 0,
            _key: PhantomData,
        }
    }

    /// Store a new entity and return its id.
    pub fn insert(&mut self, value: T) -> K {
        let id = K::from_slot(self.slots.len());
        self.slots.push(Some(value));
        self.live += 1;
        id
    }

    /// Remove an entity, returning it if it was still live.
    pub fn remove(&mut self, id: K) -> Option<T> {
        let removed = self.slots.get_mut(id.slot()).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Get an entity if the id refers to a live slot.
    #[inline]
    pub fn get(&self, id: K) -> Option<&T> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    /// Get a mutable entity if the id refers to a live slot.
    #[inline]
    pub fn get_mut(&mut self, id: K) -> Option<&mut T> {
        self.slots.get_mut(id.slot()).and_then(Option::as_mut)
    }

    /// Whether the id refers to a live entity.
    #[inline]
    pub fn contains(&self, id: K) -> bool {
        self.get(id).is_some()
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no live entity.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots ever allocated, live or not. Every id is below this.
    #[inline]
    pub fn capacity_bound(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over live ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Iterate over live entities with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (K::from_slot(i), v)))
    }
}

impl<K: ElementId, T> std::ops::Index<K> for Arena<K, T> {
    type Output = T;

    fn index(&self, id: K) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("access to removed or unknown element {:?}", id),
        }
    }
}

impl<K: ElementId, T> std::ops::IndexMut<K> for Arena<K, T> {
    fn index_mut(&mut self, id: K) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("access to removed or unknown element {:?}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexId;

    #[test]
    fn test_remove_keeps_other_ids() {
        let mut arena: Arena<VertexId, &str> = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        let c = arena.insert("c");

        assert_eq!(arena.remove(b), Some("b"));
        assert_eq!(arena.remove(b), None);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[a], "a");
        assert_eq!(arena[c], "c");
        assert!(!arena.contains(b));
        assert_eq!(arena.ids().collect::<Vec<_>>(), vec![a, c]);
    }

    #[test]
    fn test_slots_are_not_reused() {
        let mut arena: Arena<VertexId, u8> = Arena::new();
        let a = arena.insert(1);
        arena.remove(a);
        let b = arena.insert(2);
        assert_ne!(a, b);
        assert_eq!(arena.capacity_bound(), 2);
    }
}
