//! # Commands
//!
//! Deferred structural changes recorded while systems run.
//!
//! Systems see the component store but not the entity table mutably, so
//! adding or removing components and despawning entities during `update` is
//! done by recording a [`Command`]. The world applies the buffer in recording
//! order once every system has updated, and each applied change triggers the
//! usual interest recheck.

use super::component::Component;
use super::entity::{EntityId, EntityTable};
use super::storage::ComponentStore;
use super::world::World;
use crate::error::EcsResult;

/// Deferred mutation applied to the world after the update pass.
type ApplyFn = Box<dyn FnOnce(&mut World) -> EcsResult<()> + Send>;

/// A single recorded structural change.
pub enum Command {
    /// Despawns an entity and drops all of its components.
    Despawn {
        /// Entity to remove.
        entity: EntityId,
    },

    /// Attaches a component to an existing entity.
    Add {
        /// Target entity.
        entity: EntityId,
        /// Component type name, for logs.
        component: &'static str,
        /// Performs the insertion.
        apply: ApplyFn,
    },

    /// Detaches a component from an existing entity. The value is dropped.
    Remove {
        /// Target entity.
        entity: EntityId,
        /// Component type name, for logs.
        component: &'static str,
        /// Performs the removal.
        apply: ApplyFn,
    },
}

impl Command {
    /// Entity the command targets.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Despawn { entity } | Self::Add { entity, .. } | Self::Remove { entity, .. } => {
                *entity
            }
        }
    }

    /// Applies the command.
    ///
    /// # Errors
    ///
    /// Whatever the underlying world operation returns.
    pub(crate) fn apply(self, world: &mut World) -> EcsResult<()> {
        match self {
            Self::Despawn { entity } => world.despawn(entity),
            Self::Add { apply, .. } | Self::Remove { apply, .. } => apply(world),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Despawn { .. } => "despawn",
            Self::Add { component, .. } | Self::Remove { component, .. } => component,
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Despawn { .. } => "Despawn",
            Self::Add { .. } => "Add",
            Self::Remove { .. } => "Remove",
        };
        f.debug_struct(kind)
            .field("entity", &self.entity())
            .field("target", &self.describe())
            .finish()
    }
}

/// Ordered buffer of [`Command`]s.
#[derive(Debug, Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a component insertion.
    pub fn add_component<C: Component>(&mut self, entity: EntityId, value: C) {
        self.queue.push(Command::Add {
            entity,
            component: std::any::type_name::<C>(),
            apply: Box::new(move |world: &mut World| world.add_component(entity, value).map(|_| ())),
        });
    }

    /// Records a component removal.
    pub fn remove_component<C: Component>(&mut self, entity: EntityId) {
        self.queue.push(Command::Remove {
            entity,
            component: std::any::type_name::<C>(),
            apply: Box::new(move |world: &mut World| world.remove_component::<C>(entity).map(drop)),
        });
    }

    /// Records a despawn.
    pub fn despawn(&mut self, entity: EntityId) {
        self.queue.push(Command::Despawn { entity });
    }

    /// Number of recorded commands.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Removes and returns every recorded command, in order.
    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, Command> {
        self.queue.drain(..)
    }
}

/// Counters for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Number of systems updated.
    pub systems_run: usize,
    /// Deferred commands applied successfully.
    pub commands_applied: usize,
    /// Deferred commands that failed and were skipped.
    pub commands_failed: usize,
}

/// Everything a system may touch during `update`.
pub struct FrameContext<'w> {
    entities: &'w EntityTable,
    components: &'w mut ComponentStore,
    commands: &'w mut Commands,
    delta_seconds: f32,
    frame: u64,
}

impl<'w> FrameContext<'w> {
    pub(crate) fn new(
        entities: &'w EntityTable,
        components: &'w mut ComponentStore,
        commands: &'w mut Commands,
        delta_seconds: f32,
        frame: u64,
    ) -> Self {
        Self {
            entities,
            components,
            commands,
            delta_seconds,
            frame,
        }
    }

    /// Read-only view of the entity table.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &EntityTable {
        self.entities
    }

    /// Component data.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &ComponentStore {
        self.components
    }

    /// Component data, mutably. Structural changes go through
    /// [`commands`](Self::commands).
    #[inline]
    pub fn components_mut(&mut self) -> &mut ComponentStore {
        self.components
    }

    /// Deferred command buffer.
    #[inline]
    pub fn commands(&mut self) -> &mut Commands {
        self.commands
    }

    /// Seconds since the previous frame.
    #[inline]
    #[must_use]
    pub const fn delta_seconds(&self) -> f32 {
        self.delta_seconds
    }

    /// Current frame number, starting at 1.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}
