//! Growable building blocks for the sparse sets.
//!
//! - [`DenseVec`]: packed values, O(1) push and O(1) swap removal.
//! - [`SparseVec`]: index -> value map that grows on out-of-range writes.
//! - [`NestedVec`]: packed list of [`DenseVec`]s with reusable inner buffers.
//!
//! None of these track occupancy or validate indices beyond what slice
//! indexing requires. Callers own the invariants; debug builds assert them.

use std::ops::{Index, IndexMut};

use crate::config::NestedSize;

/// A packed, growable sequence.
///
/// Only the first [`len`](Self::len) slots are live. [`remove`](Self::remove)
/// swaps the removed value into the first slot past the live region instead
/// of dropping it, so the most recently removed values stay readable through
/// [`spare`](Self::spare) until they are overwritten by a later push.
pub struct DenseVec<T> {
    /// Every slot ever written: the live prefix followed by vacated values.
    items: Vec<T>,
    /// Number of live values.
    len: usize,
}

impl<T> Default for DenseVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DenseVec<T> {
    /// Create an empty sequence without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            len: 0,
        }
    }

    /// Create an empty sequence with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Number of live values.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Append a value, doubling the backing storage when it is full.
    pub fn push(&mut self, value: T) {
        if self.len < self.items.len() {
            self.items[self.len] = value;
        } else {
            if self.items.len() == self.items.capacity() {
                self.grow();
            }
            self.items.push(value);
        }
        self.len += 1;
    }

    /// Remove the value at `index` by swapping the last live value into it.
    ///
    /// O(1), but reorders the sequence. The removed value ends up at
    /// `spare(self.len())`.
    pub fn remove(&mut self, index: usize) {
        debug_assert!(index < self.len, "DenseVec::remove out of range");
        self.len -= 1;
        self.items.swap(index, self.len);
    }

    /// Read a vacated slot past the live region.
    ///
    /// Returns `None` if nothing was ever written there.
    #[must_use]
    pub fn spare(&self, index: usize) -> Option<&T> {
        debug_assert!(index >= self.len, "DenseVec::spare inside live region");
        self.items.get(index)
    }

    /// Last live value.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Drop every value (live and vacated), keeping the allocation.
    pub fn clear(&mut self) {
        self.items.clear();
        self.len = 0;
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    fn grow(&mut self) {
        let additional = self.items.capacity().max(1);
        self.items.reserve_exact(additional);
        tracing::trace!(capacity = self.items.capacity(), "dense storage grown");
    }
}

impl<T> Index<usize> for DenseVec<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        debug_assert!(index < self.len, "DenseVec index {index} >= len {}", self.len);
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for DenseVec<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len, "DenseVec index {index} >= len {}", self.len);
        &mut self.items[index]
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for DenseVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// An index -> value map over small integers.
///
/// Writes past the end extend the storage (doubling) and fill the gap with
/// `T::default()`. There is no notion of an unset slot: reading a slot that
/// was never written yields the default value.
pub struct SparseVec<T> {
    items: Vec<T>,
}

impl<T: Default> Default for SparseVec<T> {
    fn default() -> Self {
        Self::with_len(0)
    }
}

impl<T: Default> SparseVec<T> {
    /// Create a map with `len` default-initialized slots.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        let mut items = Vec::with_capacity(len);
        items.resize_with(len, T::default);
        Self { items }
    }

    /// Number of addressable slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Write `value` at `index`, growing the storage if needed.
    pub fn insert(&mut self, index: usize, value: T) {
        self.ensure_len(index + 1);
        self.items[index] = value;
    }

    /// Overwrite the slot at `index` with `replacement`. Never shrinks.
    pub fn remove(&mut self, index: usize, replacement: T) {
        debug_assert!(index < self.items.len(), "SparseVec::remove out of range");
        self.items[index] = replacement;
    }

    /// Reset the slot at `index` to `T::default()`.
    pub fn clear_slot(&mut self, index: usize) {
        self.remove(index, T::default());
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    fn ensure_len(&mut self, len: usize) {
        if self.items.len() >= len {
            return;
        }
        let mut new_len = self.items.len().max(1);
        while new_len < len {
            new_len *= 2;
        }
        self.items.resize_with(new_len, T::default);
        tracing::trace!(len = new_len, "sparse storage grown");
    }
}

impl<T> Index<usize> for SparseVec<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for SparseVec<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

impl<T> std::fmt::Debug for SparseVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseVec")
            .field("len", &self.items.len())
            .finish_non_exhaustive()
    }
}

/// A packed list of lists.
///
/// Inner lists are allocated ahead of time and reused: removing a list
/// swaps it past the live region and empties it, and the next
/// [`push_list`](Self::push_list) hands it out again with its allocation
/// intact.
pub struct NestedVec<T> {
    lists: Vec<DenseVec<T>>,
    len: usize,
    inner_capacity: usize,
}

impl<T> NestedVec<T> {
    #[must_use]
    pub fn new(size: NestedSize) -> Self {
        let size = size.normalized();
        let lists = (0..size.outer)
            .map(|_| DenseVec::with_capacity(size.inner))
            .collect();
        Self {
            lists,
            len: 0,
            inner_capacity: size.inner,
        }
    }

    /// Number of live lists.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append an empty list and return its index.
    pub fn push_list(&mut self) -> usize {
        if self.len == self.lists.len() {
            let new_len = (self.lists.len() * 2).max(1);
            let inner = self.inner_capacity;
            self.lists.resize_with(new_len, || DenseVec::with_capacity(inner));
            tracing::trace!(lists = new_len, "nested storage grown");
        }
        debug_assert!(self.lists[self.len].is_empty());
        self.len += 1;
        self.len - 1
    }

    /// Remove the list at `index`, moving the last live list into its place.
    pub fn remove_list(&mut self, index: usize) {
        debug_assert!(index < self.len, "NestedVec::remove_list out of range");
        self.len -= 1;
        self.lists.swap(index, self.len);
        self.lists[self.len].clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DenseVec<T>> {
        self.lists[..self.len].iter()
    }
}

impl<T> Index<usize> for NestedVec<T> {
    type Output = DenseVec<T>;

    #[inline]
    fn index(&self, index: usize) -> &DenseVec<T> {
        debug_assert!(index < self.len, "NestedVec index {index} >= len {}", self.len);
        &self.lists[index]
    }
}

impl<T> IndexMut<usize> for NestedVec<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut DenseVec<T> {
        debug_assert!(index < self.len, "NestedVec index {index} >= len {}", self.len);
        &mut self.lists[index]
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for NestedVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_push_and_grow() {
        let mut dense = DenseVec::with_capacity(1);
        for i in 0..10 {
            dense.push(i);
        }

        assert_eq!(dense.len(), 10);
        assert!(dense.capacity() >= 10);
        assert_eq!(dense.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_dense_swap_remove() {
        let mut dense = DenseVec::with_capacity(4);
        dense.push('a');
        dense.push('b');
        dense.push('c');

        dense.remove(0);

        // Last element moved into the hole
        assert_eq!(dense.as_slice(), &['c', 'b']);
        // Removed value parked right after the live region
        assert_eq!(dense.spare(2), Some(&'a'));
    }

    #[test]
    fn test_dense_spare_is_lifo() {
        let mut dense = DenseVec::new();
        for i in 1..=3 {
            dense.push(i);
        }

        dense.remove(2);
        dense.remove(0);

        assert_eq!(dense.as_slice(), &[2]);
        assert_eq!(dense.spare(1), Some(&1));
        assert_eq!(dense.spare(2), Some(&3));
        assert_eq!(dense.spare(3), None);

        // Push overwrites the most recently vacated slot
        dense.push(9);
        assert_eq!(dense.as_slice(), &[2, 9]);
        assert_eq!(dense.spare(2), Some(&3));
    }

    #[test]
    fn test_dense_index_mut() {
        let mut dense = DenseVec::new();
        dense.push(String::from("x"));
        dense[0].push('y');
        assert_eq!(dense[0], "xy");
    }

    #[test]
    fn test_sparse_defaults_and_growth() {
        let mut sparse: SparseVec<i32> = SparseVec::with_len(2);
        assert_eq!(sparse.len(), 2);
        assert_eq!(sparse[1], 0);

        sparse.insert(9, 7);
        // Doubles 2 -> 4 -> 8 -> 16
        assert_eq!(sparse.len(), 16);
        assert_eq!(sparse[9], 7);
        assert_eq!(sparse[8], 0);
        assert_eq!(sparse.get(16), None);
    }

    #[test]
    fn test_sparse_remove_does_not_shrink() {
        let mut sparse: SparseVec<usize> = SparseVec::with_len(4);
        sparse.insert(3, 5);
        sparse.remove(3, 1);
        assert_eq!(sparse[3], 1);
        sparse.clear_slot(3);
        assert_eq!(sparse[3], 0);
        assert_eq!(sparse.len(), 4);
    }

    #[test]
    fn test_sparse_from_empty() {
        let mut sparse: SparseVec<u8> = SparseVec::default();
        assert!(sparse.is_empty());
        sparse.insert(0, 1);
        assert_eq!(sparse.len(), 1);
    }

    #[test]
    fn test_nested_reuses_cleared_lists() {
        let mut nested = NestedVec::new(NestedSize::new(1, 2));

        let a = nested.push_list();
        nested[a].push(1);
        nested[a].push(2);
        let b = nested.push_list();
        nested[b].push(3);

        assert_eq!(nested.len(), 2);

        // Removing `a` moves `b`'s list into slot 0
        nested.remove_list(a);
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].as_slice(), &[3]);

        // The recycled list comes back empty
        let c = nested.push_list();
        assert_eq!(c, 1);
        assert!(nested[c].is_empty());
    }
}
