//! Sparse set of entities.
//!
//! `sparse[entity.id]` holds an index into `dense`, and `dense` holds the
//! entities packed together. Slot 0 of `dense` is a permanent
//! [`Entity::NULL`] sentinel, so a zeroed sparse slot always points at
//! something that compares unequal to every real entity.

use crate::{
    config::SetSize,
    entity::Entity,
    storage::{DenseVec, SparseVec},
};

/// O(1) membership, insertion and removal for entities, with contiguous
/// iteration over the members.
///
/// Iteration order is insertion order until the first removal; removals
/// swap the last member into the hole, so order is not stable.
pub struct SparseSet {
    /// Entity id -> index into `dense`.
    sparse: SparseVec<usize>,
    /// Sentinel followed by the members.
    dense: DenseVec<Entity>,
}

impl Default for SparseSet {
    fn default() -> Self {
        Self::new(SetSize::DEFAULT)
    }
}

impl SparseSet {
    #[must_use]
    pub fn new(size: SetSize) -> Self {
        let size = size.normalized();
        let mut dense = DenseVec::with_capacity(size.dense);
        dense.push(Entity::NULL);
        Self {
            sparse: SparseVec::with_len(size.sparse),
            dense,
        }
    }

    /// Add an entity. It must not already be a member.
    pub fn insert(&mut self, entity: Entity) {
        debug_assert!(!entity.is_null(), "null entity inserted into sparse set");
        debug_assert!(!self.contains(entity), "{entity} inserted twice");
        self.sparse.insert(entity.index(), self.dense.len());
        self.dense.push(entity);
    }

    /// Remove a member and return the dense index it occupied.
    ///
    /// The last member is moved into that index. Parallel arrays must mirror
    /// the same swap.
    pub fn remove(&mut self, entity: Entity) -> usize {
        debug_assert!(self.contains(entity), "{entity} removed but not present");
        let index = self.sparse[entity.index()];
        let Some(&last) = self.dense.last() else {
            return index;
        };
        self.dense.remove(index);
        self.sparse[last.index()] = index;
        self.sparse.clear_slot(entity.index());
        index
    }

    /// Check membership. Stale handles of a recycled id report `false`.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        match self.sparse.get(entity.index()) {
            Some(&index) => index < self.dense.len() && self.dense[index] == entity,
            None => false,
        }
    }

    /// Dense index of a member, counting the sentinel. Unchecked.
    #[must_use]
    pub fn dense_index(&self, entity: Entity) -> usize {
        debug_assert!(self.contains(entity), "{entity} not present");
        self.sparse[entity.index()]
    }

    /// Members, in storage order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.dense.as_slice()[1..]
    }

    /// Dense array including the sentinel slot.
    #[must_use]
    pub fn dense(&self) -> &[Entity] {
        self.dense.as_slice()
    }

    /// Sparse array, including slots that are not meaningful.
    #[must_use]
    pub fn sparse(&self) -> &[usize] {
        self.sparse.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities().iter().copied()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entity most recently removed, parked just past the members.
    pub(crate) fn vacated(&self) -> Option<&Entity> {
        self.dense.spare(self.dense.len())
    }
}

impl std::fmt::Debug for SparseSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entities()).finish()
    }
}
