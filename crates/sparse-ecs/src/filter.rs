//! A single live query result.
//!
//! A filter counts, per entity, how many of its requirements are currently
//! met. Gaining an included component or losing an excluded one adds one;
//! the opposite events subtract one. An entity matches exactly when its
//! count equals the number of included component types.
//!
//! Counts start at zero, so a filter without included components is met by
//! an untouched entity. Such entities are added through
//! [`Filter::admit`] rather than by an event.

use smallvec::SmallVec;

use crate::{
    component::ComponentId,
    config::SetSize,
    entity::Entity,
    set::SparseSet,
    storage::SparseVec,
};

/// Handle to a filter owned by a [`Filters`](crate::Filters) registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterId(u32);

impl FilterId {
    /// Create a filter ID from a raw value.
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Entities that have every included component and none of the excluded
/// ones, maintained incrementally.
pub struct Filter {
    /// Number of included component types.
    target: i32,
    /// Current members.
    matches: SparseSet,
    /// Satisfaction count per entity id.
    sums: SparseVec<i32>,
    includes: SmallVec<[ComponentId; 4]>,
    excludes: SmallVec<[ComponentId; 4]>,
}

impl Filter {
    /// Create an empty filter. `target` is derived from `includes`.
    #[must_use]
    pub fn new(includes: &[ComponentId], excludes: &[ComponentId], size: SetSize) -> Self {
        let size = size.normalized();
        Self {
            target: includes.len() as i32,
            matches: SparseSet::new(size),
            sums: SparseVec::with_len(size.sparse),
            includes: includes.iter().copied().collect(),
            excludes: excludes.iter().copied().collect(),
        }
    }

    /// The entity satisfies one more requirement.
    pub fn increase(&mut self, entity: Entity) {
        let sum = self.sum_mut(entity);
        *sum += 1;
        let sum = *sum;
        if sum == self.target && !self.matches.contains(entity) {
            self.matches.insert(entity);
        }
    }

    /// The entity satisfies one requirement fewer.
    pub fn decrease(&mut self, entity: Entity) {
        if self.matches.contains(entity) {
            self.matches.remove(entity);
        }
        *self.sum_mut(entity) -= 1;
    }

    /// Add the entity if its current count already meets the target.
    ///
    /// Needed for filters without included components, whose target of zero
    /// is met by any entity before it gains an excluded component.
    pub fn admit(&mut self, entity: Entity) {
        if self.sum(entity) == self.target && !self.matches.contains(entity) {
            self.matches.insert(entity);
        }
    }

    /// Drop the entity and reset its count, so a recycled id starts clean.
    pub fn forget(&mut self, entity: Entity) {
        if self.matches.contains(entity) {
            self.matches.remove(entity);
        }
        let index = entity.index();
        if index < self.sums.len() {
            self.sums[index] = 0;
        }
    }

    /// Matching entities, in storage order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.matches.entities()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.matches.iter()
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.matches.contains(entity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Count an entity needs to match.
    #[must_use]
    pub const fn target(&self) -> i32 {
        self.target
    }

    /// Current satisfaction count of the entity's id (0 if never touched).
    #[must_use]
    pub fn sum(&self, entity: Entity) -> i32 {
        self.sums.get(entity.index()).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn includes(&self) -> &[ComponentId] {
        &self.includes
    }

    #[must_use]
    pub fn excludes(&self) -> &[ComponentId] {
        &self.excludes
    }

    fn sum_mut(&mut self, entity: Entity) -> &mut i32 {
        let index = entity.index();
        if index >= self.sums.len() {
            self.sums.insert(index, 0);
        }
        &mut self.sums[index]
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("includes", &self.includes)
            .field("excludes", &self.excludes)
            .field("matches", &self.matches)
            .finish_non_exhaustive()
    }
}
