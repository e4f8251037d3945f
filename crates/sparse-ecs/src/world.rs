//! World - the main container for all ECS data.
//!
//! The World owns the entity allocator, the component pools, the filters and
//! the systems, and keeps them consistent: adding or removing a component
//! through the World updates the pool, the entity's component list and every
//! filter that mentions the type.
//!
//! The lower-level containers are reachable through
//! [`entities_mut`](World::entities_mut) and [`pool_mut`](World::pool_mut).
//! Changes made there must be announced with the matching `register_*` /
//! `unregister_*` call.

use crate::{
    component::{Component, ComponentId, Pool, Pools},
    config::{BucketSize, NestedSize, SetSize, WorldConfig},
    entity::{Entity, EntityAllocator},
    error::WorldResult,
    filter::{Filter, FilterId},
    query::{FilterBuilder, Filters},
    storage::{DenseVec, NestedVec, SparseVec},
    systems::Systems,
};

/// Component types attached to each registered entity.
///
/// Lists are packed; `index[entity.id]` points at the entity's list and
/// `owners[list]` points back at the entity. Slot 0 of both is reserved.
pub struct EntityComponents {
    /// Entity id -> list index.
    index: SparseVec<usize>,
    /// List index -> owning entity.
    owners: DenseVec<Entity>,
    lists: NestedVec<ComponentId>,
}

impl Default for EntityComponents {
    fn default() -> Self {
        Self::new(SetSize::DEFAULT, NestedSize::DEFAULT)
    }
}

impl EntityComponents {
    #[must_use]
    pub fn new(entities: SetSize, lists: NestedSize) -> Self {
        let entities = entities.normalized();
        let lists = lists.normalized();

        let mut owners = DenseVec::with_capacity(lists.outer);
        owners.push(Entity::NULL);
        let mut lists = NestedVec::new(lists);
        lists.push_list();

        Self {
            index: SparseVec::with_len(entities.sparse),
            owners,
            lists,
        }
    }

    /// Give `entity` an empty component list.
    pub fn register(&mut self, entity: Entity) {
        debug_assert!(!self.is_registered(entity), "{entity} registered twice");
        let slot = self.lists.push_list();
        self.owners.push(entity);
        debug_assert_eq!(slot + 1, self.owners.len());
        self.index.insert(entity.index(), slot);
    }

    /// Drop `entity`'s component list.
    pub fn unregister(&mut self, entity: Entity) {
        debug_assert!(self.is_registered(entity), "{entity} not registered");
        let slot = self.index[entity.index()];
        let Some(&last) = self.owners.last() else {
            return;
        };
        self.owners.remove(slot);
        self.lists.remove_list(slot);
        self.index[last.index()] = slot;
        self.index.clear_slot(entity.index());
    }

    /// Record that `entity` has a component of type `component`.
    pub fn push(&mut self, entity: Entity, component: ComponentId) {
        debug_assert!(self.is_registered(entity), "{entity} not registered");
        let slot = self.index[entity.index()];
        self.lists[slot].push(component);
    }

    /// Forget one component type of `entity`. Returns whether it was listed.
    pub fn remove(&mut self, entity: Entity, component: ComponentId) -> bool {
        let Some(slot) = self.slot(entity) else {
            return false;
        };
        let list = &mut self.lists[slot];
        match list.iter().position(|&listed| listed == component) {
            Some(position) => {
                list.remove(position);
                true
            }
            None => false,
        }
    }

    /// Component types of `entity`, in no particular order.
    ///
    /// Empty for unregistered entities.
    #[must_use]
    pub fn components(&self, entity: Entity) -> &[ComponentId] {
        match self.slot(entity) {
            Some(slot) => self.lists[slot].as_slice(),
            None => &[],
        }
    }

    /// Registered entities with their component types.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &[ComponentId])> + '_ {
        self.owners
            .iter()
            .zip(self.lists.iter())
            .skip(1)
            .map(|(&entity, list)| (entity, list.as_slice()))
    }

    #[must_use]
    pub fn is_registered(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, entity: Entity) -> Option<usize> {
        let &slot = self.index.get(entity.index())?;
        (slot != 0 && slot < self.owners.len() && self.owners[slot] == entity).then_some(slot)
    }
}

impl std::fmt::Debug for EntityComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// The ECS world - container for all entities, components, filters and
/// systems.
pub struct World {
    /// Entity ID allocator.
    entities: EntityAllocator,
    /// Component types per entity, used to clean up on removal.
    components: EntityComponents,
    /// One pool per component type.
    pools: Pools,
    filters: Filters,
    systems: Systems,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new world with default capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world with the given initial capacities.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        let config = config.normalized();
        Self {
            entities: EntityAllocator::with_size(config.entities),
            components: EntityComponents::new(config.entities, config.components),
            pools: Pools::with_capacity(config.pools),
            filters: Filters::with_capacity(config.filters),
            systems: Systems::with_size(config.systems),
        }
    }

    // ==================== Entity Operations ====================

    /// Create a new entity with no components.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.create();
        self.components.register(entity);
        self.filters.on_entity_created(entity);
        entity
    }

    /// Register an entity created directly through
    /// [`entities_mut`](Self::entities_mut). It must have no components.
    pub fn register_entity(&mut self, entity: Entity) {
        self.components.register(entity);
        self.filters.on_entity_created(entity);
    }

    /// Remove an entity together with all of its components.
    pub fn remove_entity(&mut self, entity: Entity) {
        debug_assert!(self.is_alive(entity), "{entity} removed but not alive");
        self.clear_entity(entity);
        self.components.unregister(entity);
        self.filters.on_entity_removed(entity);
        self.entities.remove(entity);
    }

    /// Unregister an entity already removed through
    /// [`entities_mut`](Self::entities_mut). It must have no components.
    pub fn unregister_entity(&mut self, entity: Entity) {
        debug_assert!(
            self.components.components(entity).is_empty(),
            "{entity} unregistered with components attached"
        );
        self.components.unregister(entity);
        self.filters.on_entity_removed(entity);
    }

    /// Check if an entity is alive.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Get the number of alive entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    #[must_use]
    pub fn entities(&self) -> &EntityAllocator {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityAllocator {
        &mut self.entities
    }

    // ==================== Pool Operations ====================

    /// Create the pool for `T`. Fails if it already exists.
    pub fn create_pool<T: Component>(&mut self, size: SetSize) -> WorldResult<&mut Pool<T>> {
        self.pools.create(size)
    }

    #[must_use]
    pub fn pool<T: Component>(&self) -> Option<&Pool<T>> {
        self.pools.get()
    }

    pub fn pool_mut<T: Component>(&mut self) -> Option<&mut Pool<T>> {
        self.pools.get_mut()
    }

    #[must_use]
    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    // ==================== Component Operations ====================

    /// Attach a component to an entity.
    ///
    /// The pool for `T` must exist and the entity must not already have a
    /// `T`.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> WorldResult<()> {
        self.pools.require_mut::<T>()?.add(entity, value);
        self.components.push(entity, ComponentId::of::<T>());
        self.filters.register::<T>(entity);
        Ok(())
    }

    /// Announce a component added directly through [`pool_mut`](Self::pool_mut).
    pub fn register_component<T: Component>(&mut self, entity: Entity) {
        self.components.push(entity, ComponentId::of::<T>());
        self.filters.register::<T>(entity);
    }

    /// Detach a component from an entity and return it.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> WorldResult<T> {
        let Self {
            pools,
            filters,
            components,
            ..
        } = self;
        let pool = pools.require_mut::<T>()?;
        filters.unregister::<T>(entity);
        components.remove(entity, ComponentId::of::<T>());
        Ok(pool.remove(entity))
    }

    /// Announce a component removed directly through
    /// [`pool_mut`](Self::pool_mut).
    pub fn unregister_component<T: Component>(&mut self, entity: Entity) {
        self.filters.unregister::<T>(entity);
        self.components.remove(entity, ComponentId::of::<T>());
    }

    /// Check if an entity has a component.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.pools
            .get::<T>()
            .is_some_and(|pool| pool.contains(entity))
    }

    /// Get a reference to a component.
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.pools.get::<T>()?.try_get(entity)
    }

    /// Get a mutable reference to a component.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.pools.get_mut::<T>()?.try_get_mut(entity)
    }

    /// Component types attached to an entity.
    #[must_use]
    pub fn components_of(&self, entity: Entity) -> &[ComponentId] {
        self.components.components(entity)
    }

    fn clear_entity(&mut self, entity: Entity) {
        let Self {
            components,
            pools,
            filters,
            ..
        } = self;
        for &component in components.components(entity) {
            filters.on_component_removed(component, entity);
            if let Some(pool) = pools.get_erased_mut(component) {
                if pool.contains(entity) {
                    pool.remove_entity(entity);
                }
            }
        }
    }

    // ==================== Filter Operations ====================

    /// Create a filter over `includes` and not `excludes`.
    ///
    /// Entities that already exist are matched right away.
    pub fn create_filter(
        &mut self,
        includes: &[ComponentId],
        excludes: &[ComponentId],
        set_size: SetSize,
        bucket_size: BucketSize,
    ) -> FilterId {
        let id = self.filters.create(includes, excludes, set_size, bucket_size);
        self.filters.seed(id, self.components.iter());
        id
    }

    /// Start building a filter.
    ///
    /// # Example
    ///
    /// ```
    /// use sparse_ecs::{SetSize, World};
    ///
    /// struct Health(u32);
    /// struct Dead;
    ///
    /// let mut world = World::new();
    /// world.create_pool::<Health>(SetSize::DEFAULT).unwrap();
    /// let living = world.filter_builder().with::<Health>().without::<Dead>().build();
    ///
    /// let entity = world.create_entity();
    /// world.add_component(entity, Health(10)).unwrap();
    /// assert_eq!(world.filter(living).len(), 1);
    /// ```
    pub fn filter_builder(&mut self) -> FilterBuilder<'_> {
        self.filters.builder().seeded_from(&self.components)
    }

    /// Get a filter created by this world.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from another world.
    #[must_use]
    pub fn filter(&self, id: FilterId) -> &Filter {
        self.filters.filter(id)
    }

    #[must_use]
    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    // ==================== System Operations ====================

    #[must_use]
    pub fn systems(&self) -> &Systems {
        &self.systems
    }

    pub fn systems_mut(&mut self) -> &mut Systems {
        &mut self.systems
    }

    /// Run the initialize phase of every system.
    pub fn initialize_systems(&mut self) {
        self.run_systems(Systems::initialize);
    }

    /// Run the start phase of every system.
    pub fn start_systems(&mut self) {
        self.run_systems(Systems::start);
    }

    /// Run the update phase of every system.
    pub fn update_systems(&mut self) {
        self.run_systems(Systems::update);
    }

    fn run_systems(&mut self, phase: fn(&mut Systems, &mut World)) {
        let mut systems = std::mem::take(&mut self.systems);
        phase(&mut systems, self);
        let added = std::mem::replace(&mut self.systems, systems);
        self.systems.append(added);
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entity_count", &self.entities.alive_count())
            .field("pools", &self.pools)
            .field("filters", &self.filters)
            .field("systems", &self.systems)
            .finish_non_exhaustive()
    }
}
