//! Construction-time capacity knobs.
//!
//! Every field follows the same convention: `0` means "use the documented
//! default". Sizes are only initial capacities; all storage grows on demand
//! and never shrinks.

/// Initial capacities of a sparse set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetSize {
    /// Length of the sparse (id -> dense index) array.
    pub sparse: usize,
    /// Capacity of the dense (packed entities) array.
    pub dense: usize,
}

impl SetSize {
    /// Default sizes: 32 sparse slots, 32 dense slots.
    pub const DEFAULT: Self = Self::new(32, 32);

    #[must_use]
    pub const fn new(sparse: usize, dense: usize) -> Self {
        Self { sparse, dense }
    }

    /// Replace every zero field with its default.
    #[must_use]
    pub const fn normalized(self) -> Self {
        Self {
            sparse: or_default(self.sparse, Self::DEFAULT.sparse),
            dense: or_default(self.dense, Self::DEFAULT.dense),
        }
    }
}

/// Initial capacities of a list of lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NestedSize {
    /// Number of inner lists allocated up front.
    pub outer: usize,
    /// Capacity of each inner list.
    pub inner: usize,
}

impl NestedSize {
    /// Default sizes: 32 lists of 8 slots.
    pub const DEFAULT: Self = Self::new(32, 8);

    #[must_use]
    pub const fn new(outer: usize, inner: usize) -> Self {
        Self { outer, inner }
    }

    #[must_use]
    pub const fn normalized(self) -> Self {
        Self {
            outer: or_default(self.outer, Self::DEFAULT.outer),
            inner: or_default(self.inner, Self::DEFAULT.inner),
        }
    }
}

/// Initial capacities of the per-component-type filter lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BucketSize {
    /// Capacity of the list of filters including the type.
    pub include: usize,
    /// Capacity of the list of filters excluding the type.
    pub exclude: usize,
}

impl BucketSize {
    pub const DEFAULT: Self = Self::new(32, 32);

    #[must_use]
    pub const fn new(include: usize, exclude: usize) -> Self {
        Self { include, exclude }
    }

    #[must_use]
    pub const fn normalized(self) -> Self {
        Self {
            include: or_default(self.include, Self::DEFAULT.include),
            exclude: or_default(self.exclude, Self::DEFAULT.exclude),
        }
    }
}

/// Initial capacities of the three system phase lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemsSize {
    pub initialize: usize,
    pub start: usize,
    pub update: usize,
}

impl SystemsSize {
    pub const DEFAULT: Self = Self::new(16, 16, 16);

    #[must_use]
    pub const fn new(initialize: usize, start: usize, update: usize) -> Self {
        Self {
            initialize,
            start,
            update,
        }
    }

    #[must_use]
    pub const fn normalized(self) -> Self {
        Self {
            initialize: or_default(self.initialize, Self::DEFAULT.initialize),
            start: or_default(self.start, Self::DEFAULT.start),
            update: or_default(self.update, Self::DEFAULT.update),
        }
    }
}

/// Capacities for every container owned by a [`World`](crate::World).
///
/// # Example
///
/// ```
/// use sparse_ecs::{SetSize, World, WorldConfig};
///
/// let config = WorldConfig::default()
///     .with_entities(SetSize::new(1024, 1024))
///     .with_pools(8);
/// let world = World::with_config(config);
/// assert_eq!(world.entity_count(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldConfig {
    /// Entity allocator (and entity index) sizes.
    pub entities: SetSize,
    /// Per-entity component type lists.
    pub components: NestedSize,
    /// Expected number of component pools.
    pub pools: usize,
    /// Expected number of component types referenced by filters.
    pub filters: usize,
    /// System phase lists.
    pub systems: SystemsSize,
}

impl WorldConfig {
    pub const DEFAULT_POOLS: usize = 32;
    pub const DEFAULT_FILTERS: usize = 32;

    #[must_use]
    pub const fn with_entities(mut self, size: SetSize) -> Self {
        self.entities = size;
        self
    }

    #[must_use]
    pub const fn with_components(mut self, size: NestedSize) -> Self {
        self.components = size;
        self
    }

    #[must_use]
    pub const fn with_pools(mut self, pools: usize) -> Self {
        self.pools = pools;
        self
    }

    #[must_use]
    pub const fn with_filters(mut self, filters: usize) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub const fn with_systems(mut self, size: SystemsSize) -> Self {
        self.systems = size;
        self
    }

    /// Replace every zero knob with its default.
    #[must_use]
    pub const fn normalized(self) -> Self {
        Self {
            entities: self.entities.normalized(),
            components: self.components.normalized(),
            pools: or_default(self.pools, Self::DEFAULT_POOLS),
            filters: or_default(self.filters, Self::DEFAULT_FILTERS),
            systems: self.systems.normalized(),
        }
    }
}

const fn or_default(value: usize, default: usize) -> usize {
    if value == 0 { default } else { value }
}
