//! # System Manager
//!
//! Owns the ordered collection of systems. Registration order is update
//! order and never changes from frame to frame.
//!
//! The manager is also the broadcast hub: every component change and every
//! entity destruction is forwarded to all registered systems so their
//! subscription lists stay current.

use std::any::TypeId;

use super::bitmask::BitMask;
use super::commands::FrameContext;
use super::entity::{Entity, EntityId};
use super::registry::system_bit;
use super::system::{AsAny, System};
use crate::error::{EcsError, EcsResult};

/// A registered system and its type key.
struct SystemEntry {
    type_id: TypeId,
    name: &'static str,
    system: Box<dyn System>,
}

/// Ordered, type-unique collection of systems.
///
/// # Example
///
/// ```rust
/// use atlas_core::{FrameContext, System, SystemManager, SystemState};
///
/// #[derive(Default)]
/// struct Tick {
///     state: SystemState,
///     frames: u32,
/// }
///
/// impl System for Tick {
///     fn state(&self) -> &SystemState { &self.state }
///     fn state_mut(&mut self) -> &mut SystemState { &mut self.state }
///     fn update(&mut self, _ctx: &mut FrameContext<'_>) { self.frames += 1; }
/// }
///
/// let mut manager = SystemManager::new();
/// manager.add_system(Tick::default()).unwrap();
/// assert!(manager.add_system(Tick::default()).is_err());
/// assert_eq!(manager.len(), 1);
/// ```
#[derive(Default)]
pub struct SystemManager {
    entries: Vec<SystemEntry>,
}

impl SystemManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered systems.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no system is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position<T: System>(&self) -> Option<usize> {
        let type_id = TypeId::of::<T>();
        self.entries.iter().position(|entry| entry.type_id == type_id)
    }

    /// Registers `system` at the end of the update order.
    ///
    /// # Returns
    ///
    /// A mutable reference to the stored system.
    ///
    /// # Errors
    ///
    /// - [`EcsError::DuplicateSystem`] if a `T` is already registered
    /// - Registry errors if `T` cannot be assigned a system bit
    ///
    /// On error the collection is unchanged.
    pub fn add_system<T: System>(&mut self, mut system: T) -> EcsResult<&mut T> {
        let name = std::any::type_name::<T>();
        if self.position::<T>().is_some() {
            return Err(EcsError::DuplicateSystem(name));
        }

        let bit = system_bit::<T>()?;
        system.state_mut().assign_system_bit(bit);

        self.entries.push(SystemEntry {
            type_id: TypeId::of::<T>(),
            name,
            system: Box::new(system),
        });
        tracing::info!(system = name, index = self.entries.len() - 1, "system added");

        let entry = self
            .entries
            .last_mut()
            .ok_or(EcsError::SystemNotFound(name))?;
        AsAny::as_any_mut(&mut *entry.system)
            .downcast_mut::<T>()
            .ok_or(EcsError::SystemNotFound(name))
    }

    /// Gets the registered `T`.
    #[must_use]
    pub fn get_system<T: System>(&self) -> Option<&T> {
        let entry = &self.entries[self.position::<T>()?];
        AsAny::as_any(&*entry.system).downcast_ref::<T>()
    }

    /// Gets the registered `T` mutably.
    pub fn get_system_mut<T: System>(&mut self) -> Option<&mut T> {
        let index = self.position::<T>()?;
        AsAny::as_any_mut(&mut *self.entries[index].system).downcast_mut::<T>()
    }

    /// Gets the system at `index` in update order.
    #[must_use]
    pub fn system_at(&self, index: usize) -> Option<&dyn System> {
        self.entries.get(index).map(|entry| &*entry.system)
    }

    /// Gets the system at `index` in update order, mutably.
    pub fn system_at_mut(&mut self, index: usize) -> Option<&mut dyn System> {
        match self.entries.get_mut(index) {
            Some(entry) => Some(&mut *entry.system),
            None => None,
        }
    }

    /// Unregisters the `T`, returning it.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotFound`] if no `T` is registered.
    pub fn remove_system<T: System>(&mut self) -> EcsResult<Box<dyn System>> {
        let name = std::any::type_name::<T>();
        let index = self
            .position::<T>()
            .ok_or(EcsError::SystemNotFound(name))?;
        Ok(self.remove_system_at(index))
    }

    /// Unregisters the system at `index`. Later systems shift down by one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn remove_system_at(&mut self, index: usize) -> Box<dyn System> {
        assert!(
            index < self.entries.len(),
            "system index {index} out of range (len {})",
            self.entries.len()
        );
        let entry = self.entries.remove(index);
        tracing::info!(system = entry.name, index, "system removed");
        entry.system
    }

    /// Names of the registered systems, in update order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Forwards a component change on `entity` to every system.
    ///
    /// `changed` is the bit of the component type that was added or removed;
    /// it is only used for tracing, each system evaluates the full mask.
    pub fn check_interest(&mut self, entity: &Entity, changed: BitMask) {
        tracing::trace!(entity = ?entity.id(), ?changed, "interest recheck");
        for entry in &mut self.entries {
            entry.system.check_interest(entity);
        }
    }

    /// Forwards the destruction of `id` to every system.
    pub fn remove_object(&mut self, id: EntityId) {
        for entry in &mut self.entries {
            entry.system.remove_object(id);
        }
    }

    /// Calls `start` on every system that has not started, in order.
    pub fn start(&mut self) {
        for entry in &mut self.entries {
            if entry.system.state().is_started() {
                continue;
            }
            entry.system.start();
            entry.system.state_mut().mark_started();
            tracing::debug!(system = entry.name, "system started");
        }
    }

    /// Runs every system's `update`, in registration order.
    ///
    /// # Returns
    ///
    /// The number of systems updated.
    pub fn update(&mut self, ctx: &mut FrameContext<'_>) -> usize {
        for entry in &mut self.entries {
            entry.system.update(ctx);
        }
        self.entries.len()
    }
}

impl std::fmt::Debug for SystemManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::commands::Commands;
    use crate::ecs::entity::EntityTable;
    use crate::ecs::storage::ComponentStore;
    use crate::ecs::system::SystemState;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    macro_rules! logging_system {
        ($name:ident) => {
            struct $name {
                state: SystemState,
                log: Log,
            }

            impl System for $name {
                fn state(&self) -> &SystemState {
                    &self.state
                }
                fn state_mut(&mut self) -> &mut SystemState {
                    &mut self.state
                }
                fn start(&mut self) {
                    self.log.lock().push(concat!(stringify!($name), ".start"));
                }
                fn update(&mut self, _ctx: &mut FrameContext<'_>) {
                    self.log.lock().push(stringify!($name));
                }
            }
        };
    }

    logging_system!(First);
    logging_system!(Second);
    logging_system!(Third);

    fn frame(manager: &mut SystemManager) -> usize {
        let entities = EntityTable::new(1);
        let mut components = ComponentStore::new();
        let mut commands = Commands::new();
        let mut ctx = FrameContext::new(&entities, &mut components, &mut commands, 0.0, 1);
        manager.update(&mut ctx)
    }

    #[test]
    fn test_update_order_is_registration_order() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        manager.add_system(Second { state: SystemState::untracked(), log: log.clone() }).unwrap();
        manager.add_system(First { state: SystemState::untracked(), log: log.clone() }).unwrap();
        manager.add_system(Third { state: SystemState::untracked(), log: log.clone() }).unwrap();

        for _ in 0..3 {
            assert_eq!(frame(&mut manager), 3);
        }
        let expected: Vec<_> = ["Second", "First", "Third"].repeat(3);
        assert_eq!(*log.lock(), expected);
    }

    #[test]
    fn test_duplicate_system_rejected() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        manager.add_system(First { state: SystemState::untracked(), log: log.clone() }).unwrap();

        let err = manager
            .add_system(First { state: SystemState::untracked(), log })
            .err();
        assert_eq!(err, Some(EcsError::DuplicateSystem(std::any::type_name::<First>())));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_system_bit_assigned_on_add() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        let first = manager
            .add_system(First { state: SystemState::untracked(), log: log.clone() })
            .unwrap();
        let first_bit = first.state().system_bit().unwrap();
        let second_bit = manager
            .add_system(Second { state: SystemState::untracked(), log })
            .unwrap()
            .state()
            .system_bit()
            .unwrap();

        assert_eq!(first_bit.count(), 1);
        assert_ne!(first_bit, second_bit);
        assert_eq!(Some(first_bit), crate::ecs::registry::system_registry().lookup::<First>());
    }

    #[test]
    fn test_lookup_and_remove() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        manager.add_system(First { state: SystemState::untracked(), log: log.clone() }).unwrap();
        manager.add_system(Second { state: SystemState::untracked(), log: log.clone() }).unwrap();

        assert!(manager.get_system::<First>().is_some());
        assert!(manager.get_system_mut::<Second>().is_some());
        assert!(manager.get_system::<Third>().is_none());
        assert!(manager.system_at(1).is_some());
        assert!(manager.system_at(2).is_none());

        manager.remove_system::<First>().unwrap();
        assert!(manager.get_system::<First>().is_none());
        assert_eq!(
            manager.remove_system::<First>().err(),
            Some(EcsError::SystemNotFound(std::any::type_name::<First>()))
        );

        // Second shifted down to index 0.
        assert!(manager.system_at(0).unwrap().name().ends_with("Second"));
        manager.remove_system_at(0);
        assert!(manager.is_empty());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_remove_system_at_out_of_range_panics() {
        let mut manager = SystemManager::new();
        manager.remove_system_at(0);
    }

    #[test]
    fn test_start_runs_once() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        manager.add_system(First { state: SystemState::untracked(), log: log.clone() }).unwrap();
        manager.start();
        manager.add_system(Second { state: SystemState::untracked(), log: log.clone() }).unwrap();
        manager.start();

        assert_eq!(*log.lock(), vec!["First.start", "Second.start"]);
    }

    #[test]
    fn test_broadcasts() {
        let log = Log::default();
        let mut manager = SystemManager::new();
        let interest = BitMask::from_bit(0);
        manager.add_system(First { state: SystemState::new(interest), log: log.clone() }).unwrap();
        manager.add_system(Second { state: SystemState::untracked(), log }).unwrap();

        let mut table = EntityTable::new(2);
        let id = table.spawn().unwrap();
        table.insert_bits(id, interest).unwrap();
        manager.check_interest(table.get(id).unwrap(), interest);

        assert_eq!(manager.get_system::<First>().unwrap().state().subscribed(), &[id]);
        assert!(manager.get_system::<Second>().unwrap().state().subscribed().is_empty());

        manager.remove_object(id);
        assert!(manager.get_system::<First>().unwrap().state().subscribed().is_empty());
    }
}
