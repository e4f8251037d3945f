//! Filter registry and builder.
//!
//! [`Filters`] owns every [`Filter`] and indexes them by component type, so a
//! component being added to or removed from an entity only touches the
//! filters that mention that type.
//!
//! # Basic Usage
//!
//! ```
//! use sparse_ecs::{Filters, Entity, Generation};
//!
//! struct Position;
//! struct Velocity;
//! struct Frozen;
//!
//! let mut filters = Filters::default();
//! let moving = filters
//!     .builder()
//!     .with::<Position>()
//!     .with::<Velocity>()
//!     .without::<Frozen>()
//!     .build();
//!
//! let entity = Entity::new(1, Generation::new());
//! filters.register::<Position>(entity);
//! filters.register::<Velocity>(entity);
//! assert!(filters.filter(moving).contains(entity));
//!
//! filters.register::<Frozen>(entity);
//! assert!(filters.filter(moving).is_empty());
//! ```
//!
//! # Builder Combinators
//!
//! - `.with::<T>()` - Entity must have component T
//! - `.without::<T>()` - Entity must NOT have component T

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

use crate::{
    component::{Component, ComponentId, ComponentMap},
    config::{BucketSize, SetSize},
    entity::Entity,
    filter::{Filter, FilterId},
    world::EntityComponents,
};

/// Filters that mention one component type.
#[derive(Debug)]
pub struct FilterBucket {
    /// Filters that require the type.
    includes: Vec<FilterId>,
    /// Filters that forbid the type.
    excludes: Vec<FilterId>,
}

impl FilterBucket {
    fn new(size: BucketSize) -> Self {
        let size = size.normalized();
        Self {
            includes: Vec::with_capacity(size.include),
            excludes: Vec::with_capacity(size.exclude),
        }
    }

    #[must_use]
    pub fn includes(&self) -> &[FilterId] {
        &self.includes
    }

    #[must_use]
    pub fn excludes(&self) -> &[FilterId] {
        &self.excludes
    }
}

/// Registry of all filters, indexed by the component types they mention.
pub struct Filters {
    filters: Vec<Filter>,
    buckets: ComponentMap<FilterBucket>,
    /// Filters without included components; every new entity is a candidate.
    unconditional: Vec<FilterId>,
}

impl Default for Filters {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl Filters {
    /// Create a registry expecting `types` distinct component types.
    #[must_use]
    pub fn with_capacity(types: usize) -> Self {
        Self {
            filters: Vec::new(),
            buckets: HashMap::with_capacity_and_hasher(types, FxBuildHasher),
            unconditional: Vec::new(),
        }
    }

    /// Create a filter and index it under every type it mentions.
    ///
    /// The filter starts empty. Entities that already exist are picked up
    /// with [`seed`](Self::seed).
    pub fn create(
        &mut self,
        includes: &[ComponentId],
        excludes: &[ComponentId],
        size: SetSize,
        bucket_size: BucketSize,
    ) -> FilterId {
        let id = FilterId::from_raw(self.filters.len() as u32);

        if includes.is_empty() {
            self.unconditional.push(id);
        }
        tracing::debug!(
            filter = id.as_raw(),
            includes = ?includes,
            excludes = ?excludes,
            "creating filter"
        );

        self.filters.push(Filter::new(includes, excludes, size));

        for &component in includes {
            self.bucket_mut(component, bucket_size).includes.push(id);
        }
        for &component in excludes {
            self.bucket_mut(component, bucket_size).excludes.push(id);
        }

        id
    }

    /// Start building a filter.
    pub fn builder(&mut self) -> FilterBuilder<'_> {
        FilterBuilder::new(self)
    }

    /// Bring a filter up to date with entities that existed before it.
    ///
    /// `entities` yields every registered entity with its component types.
    pub fn seed<'a>(
        &mut self,
        id: FilterId,
        entities: impl IntoIterator<Item = (Entity, &'a [ComponentId])>,
    ) {
        let filter = &mut self.filters[id.index()];
        let mut seeded = 0_usize;
        for (entity, components) in entities {
            for component in components {
                let gained = filter.includes().iter().filter(|&c| c == component).count();
                let lost = filter.excludes().iter().filter(|&c| c == component).count();
                for _ in 0..gained {
                    filter.increase(entity);
                }
                for _ in 0..lost {
                    filter.decrease(entity);
                }
            }
            filter.admit(entity);
            seeded += 1;
        }
        tracing::debug!(
            filter = id.as_raw(),
            entities = seeded,
            matches = filter.len(),
            "seeded filter"
        );
    }

    /// A new entity with no components exists.
    pub fn on_entity_created(&mut self, entity: Entity) {
        for id in &self.unconditional {
            self.filters[id.index()].admit(entity);
        }
    }

    /// An entity is gone. Its components must already be announced as
    /// removed.
    pub fn on_entity_removed(&mut self, entity: Entity) {
        for filter in &mut self.filters {
            filter.forget(entity);
        }
    }

    /// An entity gained a component of type `component`.
    pub fn on_component_added(&mut self, component: ComponentId, entity: Entity) {
        let Some(bucket) = self.buckets.get(&component) else {
            return;
        };
        for id in &bucket.includes {
            self.filters[id.index()].increase(entity);
        }
        for id in &bucket.excludes {
            self.filters[id.index()].decrease(entity);
        }
    }

    /// An entity lost a component of type `component`.
    pub fn on_component_removed(&mut self, component: ComponentId, entity: Entity) {
        let Some(bucket) = self.buckets.get(&component) else {
            return;
        };
        for id in &bucket.includes {
            self.filters[id.index()].decrease(entity);
        }
        for id in &bucket.excludes {
            self.filters[id.index()].increase(entity);
        }
    }

    /// Typed form of [`on_component_added`](Self::on_component_added).
    pub fn register<T: Component>(&mut self, entity: Entity) {
        self.on_component_added(ComponentId::of::<T>(), entity);
    }

    /// Typed form of [`on_component_removed`](Self::on_component_removed).
    pub fn unregister<T: Component>(&mut self, entity: Entity) {
        self.on_component_removed(ComponentId::of::<T>(), entity);
    }

    #[must_use]
    pub fn get(&self, id: FilterId) -> Option<&Filter> {
        self.filters.get(id.index())
    }

    /// Get a filter created by this registry.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different registry.
    #[must_use]
    pub fn filter(&self, id: FilterId) -> &Filter {
        &self.filters[id.index()]
    }

    /// Filters indexed under a component type, if any.
    #[must_use]
    pub fn bucket(&self, component: ComponentId) -> Option<&FilterBucket> {
        self.buckets.get(&component)
    }

    /// Number of filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterId, &Filter)> + '_ {
        self.filters
            .iter()
            .enumerate()
            .map(|(index, filter)| (FilterId::from_raw(index as u32), filter))
    }

    fn bucket_mut(&mut self, component: ComponentId, size: BucketSize) -> &mut FilterBucket {
        self.buckets
            .entry(component)
            .or_insert_with(|| FilterBucket::new(size))
    }
}

impl std::fmt::Debug for Filters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filters")
            .field("filter_count", &self.filters.len())
            .field("indexed_types", &self.buckets.len())
            .finish()
    }
}

/// Builder for a [`Filter`].
///
/// Repeated component types are only counted once.
pub struct FilterBuilder<'f> {
    filters: &'f mut Filters,
    existing: Option<&'f EntityComponents>,
    includes: SmallVec<[ComponentId; 4]>,
    excludes: SmallVec<[ComponentId; 4]>,
    size: SetSize,
    bucket_size: BucketSize,
}

impl<'f> FilterBuilder<'f> {
    /// Create a new filter builder.
    pub fn new(filters: &'f mut Filters) -> Self {
        Self {
            filters,
            existing: None,
            includes: SmallVec::new(),
            excludes: SmallVec::new(),
            size: SetSize::DEFAULT,
            bucket_size: BucketSize::DEFAULT,
        }
    }

    /// Seed the filter from `existing` when it is built.
    #[must_use]
    pub(crate) fn seeded_from(mut self, existing: &'f EntityComponents) -> Self {
        self.existing = Some(existing);
        self
    }

    /// Entity must have component `T`.
    #[must_use]
    pub fn with<T: Component>(self) -> Self {
        self.with_id(ComponentId::of::<T>())
    }

    /// Exclude entities that have component `T`.
    #[must_use]
    pub fn without<T: Component>(self) -> Self {
        self.without_id(ComponentId::of::<T>())
    }

    #[must_use]
    pub fn with_id(mut self, component: ComponentId) -> Self {
        if !self.includes.contains(&component) {
            self.includes.push(component);
        }
        self
    }

    #[must_use]
    pub fn without_id(mut self, component: ComponentId) -> Self {
        if !self.excludes.contains(&component) {
            self.excludes.push(component);
        }
        self
    }

    /// Initial capacities of the filter's member set.
    #[must_use]
    pub fn set_size(mut self, size: SetSize) -> Self {
        self.size = size;
        self
    }

    /// Initial capacities of buckets created for new component types.
    #[must_use]
    pub fn bucket_size(mut self, size: BucketSize) -> Self {
        self.bucket_size = size;
        self
    }

    /// Create the filter.
    pub fn build(self) -> FilterId {
        let id = self.filters.create(&self.includes, &self.excludes, self.size, self.bucket_size);
        if let Some(existing) = self.existing {
            self.filters.seed(id, existing.iter());
        }
        id
    }
}
