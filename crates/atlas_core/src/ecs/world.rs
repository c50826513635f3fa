//! # ECS World
//!
//! The central container for entities, components and systems.
//!
//! Every structural change goes through the world so that the entity's
//! component mask, the component store and every system's subscription
//! list agree before the call returns.

use super::bitmask::BitMask;
use super::commands::{Commands, FrameContext, FrameStats};
use super::component::Component;
use super::entity::{Entity, EntityId, EntityTable};
use super::manager::SystemManager;
use super::storage::ComponentStore;
use super::system::System;
use crate::error::{EcsError, EcsResult};

/// The ECS World - container for all game state.
///
/// Entity slots are pre-allocated. Component columns grow on first use of a
/// type and are reused afterwards.
///
/// # Example
///
/// ```rust
/// use atlas_core::{Position, Velocity, World};
///
/// let mut world = World::new(1024);
///
/// let entity = world.spawn().unwrap();
/// world.add_component(entity, Position::new(1.0, 2.0, 3.0)).unwrap();
/// world.add_component(entity, Velocity::new(0.0, 1.0, 0.0)).unwrap();
///
/// assert!(world.has::<Velocity>(entity));
/// assert_eq!(world.mask(entity).unwrap().count(), 2);
/// ```
pub struct World {
    entities: EntityTable,
    components: ComponentStore,
    systems: SystemManager,
    commands: Commands,
    frame: u64,
}

impl World {
    /// Creates a new world with the specified entity capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of simultaneously live entities
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entities: EntityTable::new(capacity),
            components: ComponentStore::new(),
            systems: SystemManager::new(),
            commands: Commands::new(),
            frame: 0,
        }
    }

    /// Returns the maximum capacity of this world.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entities.capacity()
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Number of frames updated so far.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Spawns a new entity with no components.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityCapacity`] if every slot is live.
    pub fn spawn(&mut self) -> EcsResult<EntityId> {
        let id = self.entities.spawn()?;
        tracing::trace!(entity = ?id, "spawned");
        Ok(id)
    }

    /// Despawns an entity, dropping all of its components and removing it
    /// from every system.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityNotFound`] if `id` is dead or stale.
    pub fn despawn(&mut self, id: EntityId) -> EcsResult<()> {
        self.entities.try_get(id)?;

        let dropped = self.components.remove_all(id);
        self.systems.remove_object(id);
        self.entities.despawn(id);
        tracing::trace!(entity = ?id, components = dropped, "despawned");

        Ok(())
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.is_alive(id)
    }

    /// Gets a live entity by ID.
    #[inline]
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Component mask of a live entity.
    #[inline]
    #[must_use]
    pub fn mask(&self, id: EntityId) -> Option<BitMask> {
        self.entities.get(id).map(Entity::mask)
    }

    /// The entity table.
    #[inline]
    #[must_use]
    pub const fn entities(&self) -> &EntityTable {
        &self.entities
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches `value` to `id` and rechecks interest on every system.
    ///
    /// # Returns
    ///
    /// A mutable reference to the stored component.
    ///
    /// # Errors
    ///
    /// - [`EcsError::EntityNotFound`] if `id` is dead or stale
    /// - [`EcsError::DuplicateComponent`] if `id` already owns a `C`
    /// - Registry errors if `C` cannot be assigned a bit
    ///
    /// Nothing is mutated on error.
    pub fn add_component<C: Component>(&mut self, id: EntityId, value: C) -> EcsResult<&mut C> {
        self.entities.try_get(id)?;
        let bit = C::bit()?;

        self.components.insert(id, value)?;
        self.entities.insert_bits(id, bit)?;
        self.recheck(id, bit)?;

        self.components
            .get_mut::<C>(id)
            .ok_or(EcsError::MissingComponent {
                entity: id,
                component: std::any::type_name::<C>(),
            })
    }

    /// Detaches and returns the `C` owned by `id`, then rechecks interest.
    ///
    /// # Errors
    ///
    /// - [`EcsError::EntityNotFound`] if `id` is dead or stale
    /// - [`EcsError::MissingComponent`] if `id` owns no `C`
    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> EcsResult<C> {
        self.entities.try_get(id)?;

        let value = self
            .components
            .remove::<C>(id)
            .ok_or(EcsError::MissingComponent {
                entity: id,
                component: std::any::type_name::<C>(),
            })?;

        // A stored C implies its bit was assigned.
        let bit = C::bit()?;
        self.entities.remove_bits(id, bit)?;
        self.recheck(id, bit)?;

        Ok(value)
    }

    fn recheck(&mut self, id: EntityId, changed: BitMask) -> EcsResult<()> {
        let entity = self.entities.try_get(id)?;
        self.systems.check_interest(entity, changed);
        Ok(())
    }

    /// Gets the `C` owned by `id`.
    #[inline]
    #[must_use]
    pub fn get_component<C: Component>(&self, id: EntityId) -> Option<&C> {
        self.components.get(id)
    }

    /// Gets the `C` owned by `id` mutably.
    #[inline]
    pub fn get_component_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        self.components.get_mut(id)
    }

    /// Checks if `id` owns a `C`.
    #[inline]
    #[must_use]
    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        self.components.contains::<C>(id)
    }

    /// Read-only component store.
    #[inline]
    #[must_use]
    pub const fn components(&self) -> &ComponentStore {
        &self.components
    }

    /// Mutable component store. Values only; structure changes go through
    /// the world.
    #[inline]
    pub fn components_mut(&mut self) -> &mut ComponentStore {
        &mut self.components
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Registers a system and subscribes it to every live entity that
    /// already matches its interest.
    ///
    /// # Errors
    ///
    /// See [`SystemManager::add_system`].
    pub fn add_system<T: System>(&mut self, system: T) -> EcsResult<&mut T> {
        let system = self.systems.add_system(system)?;
        for entity in self.entities.iter_alive() {
            system.check_interest(entity);
        }
        Ok(system)
    }

    /// The system manager.
    #[inline]
    #[must_use]
    pub const fn systems(&self) -> &SystemManager {
        &self.systems
    }

    /// The system manager, mutably.
    #[inline]
    pub fn systems_mut(&mut self) -> &mut SystemManager {
        &mut self.systems
    }

    /// Runs `start` on every system that has not started yet.
    pub fn start(&mut self) {
        self.systems.start();
    }

    /// Runs one frame: every system's `update` in registration order, then
    /// the deferred commands they recorded.
    ///
    /// # Arguments
    ///
    /// * `delta_seconds` - Time since the previous frame
    pub fn update(&mut self, delta_seconds: f32) -> FrameStats {
        self.frame += 1;

        let mut ctx = FrameContext::new(
            &self.entities,
            &mut self.components,
            &mut self.commands,
            delta_seconds,
            self.frame,
        );
        let systems_run = self.systems.update(&mut ctx);

        let (commands_applied, commands_failed) = self.apply_commands();

        FrameStats {
            frame: self.frame,
            systems_run,
            commands_applied,
            commands_failed,
        }
    }

    /// Queues a command to run at the end of the next update.
    pub fn commands(&mut self) -> &mut Commands {
        &mut self.commands
    }

    /// Applies every queued command in order. Failures are logged and
    /// skipped.
    ///
    /// # Returns
    ///
    /// `(applied, failed)` counts.
    pub fn apply_commands(&mut self) -> (usize, usize) {
        let queued: Vec<_> = self.commands.drain().collect();
        let mut applied = 0;
        let mut failed = 0;

        for command in queued {
            let description = format!("{command:?}");
            match command.apply(self) {
                Ok(()) => applied += 1,
                Err(error) => {
                    failed += 1;
                    tracing::warn!(command = %description, %error, "deferred command failed");
                }
            }
        }

        (applied, failed)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("capacity", &self.capacity())
            .field("alive", &self.alive_count())
            .field("systems", &self.systems)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}
