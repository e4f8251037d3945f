//! Entity identifiers with generational indices.
//!
//! Entities use a generational index pattern to safely reuse IDs
//! while detecting use-after-free scenarios. Id 0 is reserved for
//! [`Entity::NULL`] and is never handed out.

use std::fmt;

use crate::{config::SetSize, set::SparseSet};

/// Generation counter to detect stale entity references.
/// Incremented each time an entity slot is recycled.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u32);

impl Generation {
    /// Last representable generation. An id that reaches it is retired.
    pub const MAX: Self = Self(u32::MAX);

    /// Create a new generation (starts at 0).
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Create a generation from a raw value.
    #[must_use]
    pub const fn from_raw(generation: u32) -> Self {
        Self(generation)
    }

    /// The following generation, or `None` once [`Generation::MAX`] is reached.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(generation) => Some(Self(generation)),
            None => None,
        }
    }

    /// Get the raw generation value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Raw entity index. 0 is the null id.
pub type EntityId = u32;

/// A handle to an entity: an id plus the generation it was issued with.
///
/// Two handles are equal when both parts match and the id is not the null
/// id, so [`Entity::NULL`] compares unequal to everything, itself included.
/// That is why `Entity` implements `PartialEq` but not `Eq` or `Hash`.
#[derive(Clone, Copy, Default)]
pub struct Entity {
    /// Slot index, also used as the sparse array key.
    id: EntityId,
    /// Generation counter for this slot.
    generation: Generation,
}

impl Entity {
    /// The null entity. Fills the sentinel slot of every sparse set.
    pub const NULL: Entity = Entity {
        id: 0,
        generation: Generation(0),
    };

    /// Create a new entity with the given ID and generation.
    #[must_use]
    pub const fn new(id: EntityId, generation: Generation) -> Self {
        Self { id, generation }
    }

    /// Get the entity's id.
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.id
    }

    /// Get the entity's id as a sparse array index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.id as usize
    }

    /// Get the entity's generation.
    #[must_use]
    pub const fn generation(self) -> Generation {
        self.generation
    }

    #[must_use]
    pub const fn is_null(self) -> bool {
        self.id == 0
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.generation == other.generation && self.id != 0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Entity(NULL)")
        } else {
            write!(f, "Entity({}v{})", self.id, self.generation.0)
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("NULL")
        } else {
            write!(f, "{}v{}", self.id, self.generation.0)
        }
    }
}

/// Allocator for entity IDs with generation tracking.
///
/// Live entities are kept in a [`SparseSet`]. Removing an entity parks its
/// handle just past the set's live region, and the next
/// [`create`](Self::create) reissues the id from that slot with the
/// generation bumped. Recycling is therefore LIFO: the most recently removed
/// id comes back first.
pub struct EntityAllocator {
    /// Currently alive entities.
    live: SparseSet,
    /// Removed ids waiting to be reissued.
    pending: usize,
    /// Next never-issued id.
    next_id: EntityId,
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityAllocator {
    /// Create a new entity allocator with default capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(SetSize::DEFAULT)
    }

    /// Create an allocator with pre-allocated capacity.
    #[must_use]
    pub fn with_size(size: SetSize) -> Self {
        Self {
            live: SparseSet::new(size),
            pending: 0,
            next_id: 1,
        }
    }

    /// Issue a new entity, recycling the most recently removed id if any.
    pub fn create(&mut self) -> Entity {
        let entity = if self.pending == 0 {
            self.mint()
        } else {
            self.pending -= 1;
            self.recycle()
        };
        self.live.insert(entity);
        entity
    }

    /// Remove a live entity, making its id available for reuse.
    ///
    /// The entity must be alive; this is only checked in debug builds.
    pub fn remove(&mut self, entity: Entity) {
        self.pending += 1;
        self.live.remove(entity);
    }

    /// Check if an entity is currently alive.
    ///
    /// Stale handles (older generations of a recycled id) report `false`.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.live.contains(entity)
    }

    /// Live entities, in storage order.
    #[must_use]
    pub fn existing(&self) -> &[Entity] {
        self.live.entities()
    }

    /// Get the number of currently alive entities.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.live.len()
    }

    /// Number of removed ids waiting to be reissued.
    #[must_use]
    pub const fn pending_recycle(&self) -> usize {
        self.pending
    }

    fn mint(&mut self) -> Entity {
        let id = self.next_id;
        self.next_id += 1;
        Entity::new(id, Generation::new())
    }

    fn recycle(&mut self) -> Entity {
        // Only empty after removing an entity that was never alive.
        let Some(&parked) = self.live.vacated() else {
            return self.mint();
        };

        match parked.generation().next() {
            Some(generation) => Entity::new(parked.id(), generation),
            None => {
                tracing::warn!(id = parked.id(), "entity generation exhausted, retiring id");
                self.mint()
            }
        }
    }
}

impl fmt::Debug for EntityAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityAllocator")
            .field("alive", &self.live.len())
            .field("pending", &self.pending)
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_allocation() {
        let mut allocator = EntityAllocator::new();

        let e1 = allocator.create();
        let e2 = allocator.create();

        assert_eq!(e1.id(), 1);
        assert_eq!(e2.id(), 2);
        assert!(allocator.is_alive(e1));
        assert!(allocator.is_alive(e2));
        assert_eq!(allocator.alive_count(), 2);
    }

    #[test]
    fn test_entity_removal() {
        let mut allocator = EntityAllocator::new();

        let e1 = allocator.create();
        allocator.remove(e1);
        assert!(!allocator.is_alive(e1));
        assert_eq!(allocator.alive_count(), 0);
        assert_eq!(allocator.pending_recycle(), 1);

        // New allocation reuses the slot but with incremented generation
        let e2 = allocator.create();
        assert_eq!(e2.id(), e1.id());
        assert_eq!(e2.generation().get(), 1);
        assert!(!allocator.is_alive(e1));
        assert!(allocator.is_alive(e2));
    }

    #[test]
    fn test_recycling_is_lifo() {
        let mut allocator = EntityAllocator::with_size(SetSize::new(1, 1));
        let entities: Vec<Entity> = (0..3).map(|_| allocator.create()).collect();

        for &entity in &entities {
            allocator.remove(entity);
        }

        let ids: Vec<EntityId> = (0..3).map(|_| allocator.create().id()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_repeated_recycle_of_same_id() {
        let mut allocator = EntityAllocator::new();
        let mut entity = allocator.create();

        for expected in 1..=5 {
            allocator.remove(entity);
            entity = allocator.create();
            assert_eq!(entity.id(), 1);
            assert_eq!(entity.generation().get(), expected);
        }
    }

    #[test]
    fn test_exhausted_generation_mints_new_id() {
        let mut allocator = EntityAllocator::new();
        let first = allocator.create();
        allocator.remove(first);

        // Hand-issue the final generation of id 1 through the live set
        let last = Entity::new(first.id(), Generation::MAX);
        allocator.pending -= 1;
        allocator.live.insert(last);
        allocator.remove(last);

        let fresh = allocator.create();
        assert_eq!(fresh.id(), 2);
        assert_eq!(fresh.generation(), Generation::new());
        assert_eq!(allocator.pending_recycle(), 0);
    }

    #[test]
    fn test_existing_skips_sentinel() {
        let mut allocator = EntityAllocator::new();
        assert!(allocator.existing().is_empty());

        let e1 = allocator.create();
        let e2 = allocator.create();
        allocator.remove(e1);

        assert_eq!(allocator.existing(), &[e2]);
    }

    #[test]
    fn test_null_entity_never_equal() {
        assert_ne!(Entity::NULL, Entity::NULL);
        assert_ne!(Entity::new(0, Generation::new()), Entity::NULL);
        assert_eq!(
            Entity::new(4, Generation::from_raw(2)),
            Entity::new(4, Generation::from_raw(2))
        );
        assert_ne!(
            Entity::new(4, Generation::from_raw(2)),
            Entity::new(4, Generation::from_raw(3))
        );
    }

    #[test]
    fn test_entity_display() {
        assert_eq!(Entity::new(3, Generation::from_raw(1)).to_string(), "3v1");
        assert_eq!(Entity::NULL.to_string(), "NULL");
    }

    #[test]
    fn test_generation_next_saturates() {
        assert_eq!(Generation::new().next(), Some(Generation::from_raw(1)));
        assert_eq!(Generation::MAX.next(), None);
    }
}
