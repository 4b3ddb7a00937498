//! Enumerable set with O(1) membership.
//!
//! ## Layout
//!
//! A growable `Vec` holds the members in iteration order and a `HashMap`
//! maps each member back to its slot. Removal swaps the last member into
//! the vacated slot, so:
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | insert | O(1) |
//! | remove | O(1) |
//! | contains | O(1) |
//! | iterate | O(n) |
//!
//! Iteration order is insertion order until the first removal.

use std::collections::HashMap;
use std::hash::Hash;

/// Set of `Copy` keys that can be listed without a separate index.
#[derive(Debug, Clone)]
pub struct IndexedSet<T> {
    items: Vec<T>,
    index: HashMap<T, usize>,
}

impl<T> Default for IndexedSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Copy + Eq + Hash> IndexedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member. Returns `false` if it was already present.
    pub fn insert(&mut self, item: T) -> bool {
        if self.index.contains_key(&item) {
            return false;
        }
        self.index.insert(item, self.items.len());
        self.items.push(item);
        true
    }

    /// Remove a member. Returns `false` if it was absent.
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(slot) = self.index.remove(item) else {
            return false;
        };
        self.items.swap_remove(slot);
        // the former last element now lives in `slot`
        if let Some(moved) = self.items.get(slot) {
            self.index.insert(*moved, slot);
        }
        true
    }

    #[inline]
    pub fn contains(&self, item: &T) -> bool {
        self.index.contains_key(item)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.items.get(slot)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}
