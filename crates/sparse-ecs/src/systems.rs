//! Systems and the phase lists that run them.
//!
//! A system opts into any of three phases:
//!
//! - **initialize**: once, after the world is set up (create pools, filters
//!   and initial entities here)
//! - **start**: once, before the first update
//! - **update**: every tick
//!
//! Each phase runs its systems in registration order.

use bitflags::bitflags;

use crate::{config::SystemsSize, world::World};

bitflags! {
    /// Phases a system takes part in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Phases: u8 {
        const INITIALIZE = 1 << 0;
        const START = 1 << 1;
        const UPDATE = 1 << 2;
    }
}

/// Logic that runs against a [`World`].
///
/// Every hook defaults to a no-op. Keep handles (such as a
/// [`FilterId`](crate::FilterId)) between calls, not references into the
/// world.
///
/// # Example
///
/// ```
/// use sparse_ecs::{FilterId, SetSize, System, World};
///
/// #[derive(Default)]
/// struct Ageing {
///     alive: Option<FilterId>,
/// }
///
/// impl System for Ageing {
///     fn initialize(&mut self, world: &mut World) {
///         world.create_pool::<u32>(SetSize::DEFAULT).ok();
///         self.alive = Some(world.filter_builder().with::<u32>().build());
///     }
///
///     fn update(&mut self, world: &mut World) {
///         let Some(alive) = self.alive else { return };
///         let entities = world.filter(alive).entities().to_vec();
///         for entity in entities {
///             if let Some(age) = world.get_mut::<u32>(entity) {
///                 *age += 1;
///             }
///         }
///     }
/// }
///
/// let mut world = World::new();
/// world.systems_mut().add(Ageing::default());
/// world.initialize_systems();
///
/// let entity = world.create_entity();
/// world.add_component(entity, 0_u32).unwrap();
/// world.update_systems();
/// assert_eq!(world.get::<u32>(entity), Some(&1));
/// ```
pub trait System: 'static {
    fn initialize(&mut self, world: &mut World) {
        let _ = world;
    }

    fn start(&mut self, world: &mut World) {
        let _ = world;
    }

    fn update(&mut self, world: &mut World) {
        let _ = world;
    }

    /// Phases to register the system for.
    fn phases(&self) -> Phases {
        Phases::all()
    }
}

/// Registered systems plus, per phase, the order to run them in.
#[derive(Default)]
pub struct Systems {
    systems: Vec<Box<dyn System>>,
    initialize: Vec<usize>,
    start: Vec<usize>,
    update: Vec<usize>,
}

impl Systems {
    #[must_use]
    pub fn with_size(size: SystemsSize) -> Self {
        let size = size.normalized();
        Self {
            systems: Vec::new(),
            initialize: Vec::with_capacity(size.initialize),
            start: Vec::with_capacity(size.start),
            update: Vec::with_capacity(size.update),
        }
    }

    /// Register a system for every phase it declares.
    pub fn add<S: System>(&mut self, system: S) -> &mut Self {
        self.add_boxed(Box::new(system))
    }

    /// Register a default-constructed system.
    pub fn add_default<S: System + Default>(&mut self) -> &mut Self {
        self.add(S::default())
    }

    pub fn add_boxed(&mut self, system: Box<dyn System>) -> &mut Self {
        let index = self.systems.len();
        let phases = system.phases();
        if phases.contains(Phases::INITIALIZE) {
            self.initialize.push(index);
        }
        if phases.contains(Phases::START) {
            self.start.push(index);
        }
        if phases.contains(Phases::UPDATE) {
            self.update.push(index);
        }
        self.systems.push(system);
        self
    }

    /// Run every initialize system.
    pub fn initialize(&mut self, world: &mut World) {
        tracing::debug!(systems = self.initialize.len(), "initializing systems");
        for &index in &self.initialize {
            self.systems[index].initialize(world);
        }
    }

    /// Run every start system.
    pub fn start(&mut self, world: &mut World) {
        tracing::debug!(systems = self.start.len(), "starting systems");
        for &index in &self.start {
            self.systems[index].start(world);
        }
    }

    /// Run every update system.
    pub fn update(&mut self, world: &mut World) {
        for &index in &self.update {
            self.systems[index].update(world);
        }
    }

    /// Number of systems registered for `phase`.
    #[must_use]
    pub fn count(&self, phase: Phases) -> usize {
        let mut count = 0;
        if phase.contains(Phases::INITIALIZE) {
            count += self.initialize.len();
        }
        if phase.contains(Phases::START) {
            count += self.start.len();
        }
        if phase.contains(Phases::UPDATE) {
            count += self.update.len();
        }
        count
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Move every system of `other` into `self`, keeping their order.
    pub(crate) fn append(&mut self, other: Self) {
        for system in other.systems {
            self.add_boxed(system);
        }
    }
}

impl std::fmt::Debug for Systems {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Systems")
            .field("systems", &self.systems.len())
            .field("initialize", &self.initialize)
            .field("start", &self.start)
            .field("update", &self.update)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{config::SetSize, filter::FilterId};

    #[derive(Default)]
    struct Counter {
        filter: Option<FilterId>,
    }

    impl Counter {
        fn bump(&self, world: &mut World) {
            let Some(filter) = self.filter else { return };
            let entities = world.filter(filter).entities().to_vec();
            for entity in entities {
                *world.get_mut::<i32>(entity).unwrap() += 1;
            }
        }
    }

    impl System for Counter {
        fn initialize(&mut self, world: &mut World) {
            world.create_pool::<i32>(SetSize::new(1, 1)).unwrap();
            self.filter = Some(world.filter_builder().with::<i32>().build());
            let first = world.create_entity();
            world.add_component(first, 1).unwrap();
            let second = world.create_entity();
            world.add_component(second, 1).unwrap();
        }

        fn start(&mut self, world: &mut World) {
            self.bump(world);
        }

        fn update(&mut self, world: &mut World) {
            self.bump(world);
        }
    }

    #[test]
    fn test_phases_run_in_order() {
        let mut world = World::new();
        world.systems_mut().add_default::<Counter>();

        world.initialize_systems();
        assert_eq!(world.pool::<i32>().unwrap().items(), &[1, 1]);

        world.start_systems();
        assert_eq!(world.pool::<i32>().unwrap().items(), &[2, 2]);

        world.update_systems();
        assert_eq!(world.pool::<i32>().unwrap().items(), &[3, 3]);
    }

    struct Logged {
        name: &'static str,
        phases: Phases,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl System for Logged {
        fn initialize(&mut self, _world: &mut World) {
            self.log.borrow_mut().push(format!("{}:initialize", self.name));
        }

        fn start(&mut self, _world: &mut World) {
            self.log.borrow_mut().push(format!("{}:start", self.name));
        }

        fn update(&mut self, _world: &mut World) {
            self.log.borrow_mut().push(format!("{}:update", self.name));
        }

        fn phases(&self) -> Phases {
            self.phases
        }
    }

    #[test]
    fn test_only_declared_phases_run() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world
            .systems_mut()
            .add(Logged {
                name: "a",
                phases: Phases::UPDATE,
                log: Rc::clone(&log),
            })
            .add(Logged {
                name: "b",
                phases: Phases::INITIALIZE | Phases::UPDATE,
                log: Rc::clone(&log),
            });

        assert_eq!(world.systems().count(Phases::UPDATE), 2);
        assert_eq!(world.systems().count(Phases::START), 0);

        world.initialize_systems();
        world.start_systems();
        world.update_systems();

        assert_eq!(*log.borrow(), vec!["b:initialize", "a:update", "b:update"]);
    }

    struct Spawner;

    impl System for Spawner {
        fn initialize(&mut self, world: &mut World) {
            world.systems_mut().add_default::<Counter>();
        }

        fn phases(&self) -> Phases {
            Phases::INITIALIZE
        }
    }

    #[test]
    fn test_systems_added_during_phase_are_kept() {
        let mut world = World::new();
        world.systems_mut().add(Spawner);

        world.initialize_systems();

        assert_eq!(world.systems().len(), 2);
        assert_eq!(world.systems().count(Phases::UPDATE), 1);
    }
}
