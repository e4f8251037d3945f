//! Component types and their pools.
//!
//! Each component type gets its own [`Pool`]: a [`SparseSet`] of the
//! entities that have the component plus a packed array of the values.
//! [`Pools`] keys the pools by [`ComponentId`] and recovers the concrete
//! `Pool<T>` through a checked downcast.

use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::{
    config::SetSize,
    entity::Entity,
    error::{WorldError, WorldResult},
    set::SparseSet,
};

/// Marker trait for types that can be used as components.
pub trait Component: 'static {}

// Blanket implementation for all suitable types
impl<T: 'static> Component for T {}

/// Identity of a component type.
///
/// Compares and hashes by [`TypeId`]; the type name is kept for diagnostics.
#[derive(Clone, Copy)]
pub struct ComponentId {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentId {
    /// Identity of `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub const fn type_id(self) -> TypeId {
        self.type_id
    }

    /// Get the component type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Check if this id is for the given type.
    #[must_use]
    pub fn is<T: 'static>(self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl PartialEq for ComponentId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentId {}

impl Hash for ComponentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.name)
    }
}

/// Map keyed by component type.
pub(crate) type ComponentMap<V> = HashMap<ComponentId, V, FxBuildHasher>;

/// Storage for every component of type `T`.
///
/// `entities()[i]` owns `items()[i]`. Both are reordered together by
/// removals.
pub struct Pool<T> {
    set: SparseSet,
    /// Values, aligned with the set's members (the sentinel has no value).
    items: Vec<T>,
}

impl<T: Component> Pool<T> {
    #[must_use]
    pub fn new(size: SetSize) -> Self {
        let size = size.normalized();
        Self {
            set: SparseSet::new(size),
            items: Vec::with_capacity(size.dense),
        }
    }

    /// Attach `item` to `entity`. The entity must not already be in the pool.
    pub fn add(&mut self, entity: Entity, item: T) {
        self.set.insert(entity);
        self.items.push(item);
    }

    /// Remove the entity's component and return it.
    ///
    /// The entity must be in the pool; this is only checked in debug builds.
    pub fn remove(&mut self, entity: Entity) -> T {
        let index = self.set.remove(entity);
        self.items.swap_remove(index - 1)
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.set.contains(entity)
    }

    /// Get the entity's component. The caller must have checked
    /// [`contains`](Self::contains).
    #[must_use]
    pub fn get(&self, entity: Entity) -> &T {
        &self.items[self.set.dense_index(entity) - 1]
    }

    /// Mutable counterpart of [`get`](Self::get).
    #[must_use]
    pub fn get_mut(&mut self, entity: Entity) -> &mut T {
        let index = self.set.dense_index(entity) - 1;
        &mut self.items[index]
    }

    /// Checked lookup.
    #[must_use]
    pub fn try_get(&self, entity: Entity) -> Option<&T> {
        self.contains(entity).then(|| self.get(entity))
    }

    /// Checked mutable lookup.
    #[must_use]
    pub fn try_get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        if self.contains(entity) {
            Some(self.get_mut(entity))
        } else {
            None
        }
    }

    /// Entities that have the component, in storage order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.set.entities()
    }

    /// Component values, aligned with [`entities`](Self::entities).
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.set.iter().zip(self.items.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        self.set.iter().zip(self.items.iter_mut())
    }

    /// The underlying entity set.
    #[must_use]
    pub fn set(&self) -> &SparseSet {
        &self.set
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Component + Default> Pool<T> {
    /// Attach a default-valued component to `entity`.
    pub fn add_default(&mut self, entity: Entity) {
        self.add(entity, T::default());
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("component", &std::any::type_name::<T>())
            .field("entities", &self.set)
            .finish()
    }
}

/// Type-erased view of a [`Pool`], enough to clean up an entity without
/// knowing the component type.
pub trait ErasedPool: Any {
    fn component(&self) -> ComponentId;

    fn contains(&self, entity: Entity) -> bool;

    /// Remove and drop the entity's component.
    fn remove_entity(&mut self, entity: Entity);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedPool for Pool<T> {
    fn component(&self) -> ComponentId {
        ComponentId::of::<T>()
    }

    fn contains(&self, entity: Entity) -> bool {
        Pool::contains(self, entity)
    }

    fn remove_entity(&mut self, entity: Entity) {
        self.remove(entity);
    }

    fn len(&self) -> usize {
        Pool::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// All component pools of a world, one per component type.
pub struct Pools {
    pools: ComponentMap<Box<dyn ErasedPool>>,
}

impl Default for Pools {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl Pools {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pools: HashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Create the pool for `T`.
    ///
    /// Fails if a pool for `T` already exists.
    pub fn create<T: Component>(&mut self, size: SetSize) -> WorldResult<&mut Pool<T>> {
        let id = ComponentId::of::<T>();
        if self.pools.contains_key(&id) {
            return Err(WorldError::PoolExists {
                component: id.name(),
            });
        }

        tracing::debug!(component = id.name(), "creating pool");
        let pool = self
            .pools
            .entry(id)
            .or_insert_with(|| Box::new(Pool::<T>::new(size)));

        Ok(downcast_mut(pool.as_mut()))
    }

    /// Check if a pool for `T` exists.
    #[must_use]
    pub fn contains<T: Component>(&self) -> bool {
        self.pools.contains_key(&ComponentId::of::<T>())
    }

    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&Pool<T>> {
        self.pools
            .get(&ComponentId::of::<T>())
            .and_then(|pool| pool.as_any().downcast_ref())
    }

    #[must_use]
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut Pool<T>> {
        self.pools
            .get_mut(&ComponentId::of::<T>())
            .and_then(|pool| pool.as_any_mut().downcast_mut())
    }

    /// Like [`get_mut`](Self::get_mut), but reports a missing pool as an error.
    pub fn require_mut<T: Component>(&mut self) -> WorldResult<&mut Pool<T>> {
        self.get_mut::<T>().ok_or(WorldError::MissingPool {
            component: std::any::type_name::<T>(),
        })
    }

    /// Type-erased pool lookup, used to clean up an entity's components.
    #[must_use]
    pub fn get_erased_mut(&mut self, id: ComponentId) -> Option<&mut dyn ErasedPool> {
        self.pools.get_mut(&id).map(|pool| &mut **pool)
    }

    /// Number of pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

impl fmt::Debug for Pools {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.pools.iter().map(|(id, pool)| (id.name(), pool.len())))
            .finish()
    }
}

/// Downcast a pool that is known to hold `T` because it is stored under
/// `ComponentId::of::<T>()`.
fn downcast_mut<T: Component>(pool: &mut dyn ErasedPool) -> &mut Pool<T> {
    match pool.as_any_mut().downcast_mut() {
        Some(pool) => pool,
        None => unreachable!("pool stored under the wrong component id"),
    }
}
