// Allow missing docs for now
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::float_cmp)]

//! Sparse ECS - Sparse-set Entity Component System
//!
//! Component data lives in one pool per type, and queries ("filters") are
//! kept up to date as components come and go, so reading a filter never
//! rescans the world.
//!
//! # Key Concepts
//!
//! - **Entity**: An id plus a generation. Removed ids are recycled with the
//!   generation bumped, so old handles stop matching.
//! - **Component**: Any `'static` type, stored in a [`Pool`] created up front
//!   with [`World::create_pool`].
//! - **Filter**: The entities that have every included component and none of
//!   the excluded ones.
//! - **System**: Code run by the world in the initialize, start and update
//!   phases.
//!
//! # Example
//!
//! ```
//! use sparse_ecs::prelude::*;
//!
//! struct Position(f32);
//! struct Velocity(f32);
//!
//! let mut world = World::new();
//! world.create_pool::<Position>(SetSize::DEFAULT)?;
//! world.create_pool::<Velocity>(SetSize::DEFAULT)?;
//! let moving = world.filter_builder().with::<Position>().with::<Velocity>().build();
//!
//! let entity = world.create_entity();
//! world.add_component(entity, Position(0.0))?;
//! world.add_component(entity, Velocity(2.0))?;
//!
//! for entity in world.filter(moving).entities().to_vec() {
//!     let speed = world.get::<Velocity>(entity).map_or(0.0, |v| v.0);
//!     if let Some(position) = world.get_mut::<Position>(entity) {
//!         position.0 += speed;
//!     }
//! }
//! assert_eq!(world.get::<Position>(entity).map(|p| p.0), Some(2.0));
//! # Ok::<(), sparse_ecs::WorldError>(())
//! ```

mod component;
mod config;
mod entity;
mod error;
mod filter;
mod query;
mod set;
mod storage;
mod systems;
mod world;

pub use component::{Component, ComponentId, ErasedPool, Pool, Pools};
pub use config::{BucketSize, NestedSize, SetSize, SystemsSize, WorldConfig};
pub use entity::{Entity, EntityAllocator, EntityId, Generation};
pub use error::{WorldError, WorldResult};
pub use filter::{Filter, FilterId};
pub use query::{FilterBucket, FilterBuilder, Filters};
pub use set::SparseSet;
pub use storage::{DenseVec, NestedVec, SparseVec};
pub use systems::{Phases, System, Systems};
pub use world::{EntityComponents, World};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Component, ComponentId, Entity, FilterId, SetSize, System, World, WorldConfig,
        WorldResult,
    };
}
