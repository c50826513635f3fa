//! # Core Error Types
//!
//! All errors that can occur in the ECS and the memory pools.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur in the ECS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Every bit of the registry's bitset is already assigned.
    #[error("{kind} registry full: all {capacity} bits are assigned, cannot register {type_name}")]
    RegistryFull {
        /// Which registry overflowed ("component" or "system").
        kind: &'static str,
        /// The fixed bit width.
        capacity: usize,
        /// The type that could not be registered.
        type_name: &'static str,
    },

    /// The registry was frozen before this type was seen.
    #[error("{kind} registry frozen, cannot register {type_name}")]
    RegistryFrozen {
        /// Which registry rejected the type.
        kind: &'static str,
        /// The type that could not be registered.
        type_name: &'static str,
    },

    /// The entity table has no free slots left.
    #[error("entity capacity reached: {capacity}")]
    EntityCapacity {
        /// Fixed entity capacity of the world.
        capacity: usize,
    },

    /// The entity is dead, stale or was never spawned.
    #[error("entity not found: {0:?}")]
    EntityNotFound(EntityId),

    /// The entity already owns a component of this type.
    #[error("duplicate component: {entity:?} already owns a {component}")]
    DuplicateComponent {
        /// The entity the add was attempted on.
        entity: EntityId,
        /// The component type name.
        component: &'static str,
    },

    /// The entity does not own a component of this type.
    #[error("missing component: {entity:?} does not own a {component}")]
    MissingComponent {
        /// The entity the removal was attempted on.
        entity: EntityId,
        /// The component type name.
        component: &'static str,
    },

    /// A system of this type is already registered with the manager.
    #[error("duplicate system: {0} is already registered")]
    DuplicateSystem(&'static str),

    /// No system of this type is registered with the manager.
    #[error("system not found: {0}")]
    SystemNotFound(&'static str),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

/// Errors that can occur in a slab pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Every slab is currently handed out.
    #[error("pool exhausted: all {capacity} slabs are in use")]
    Exhausted {
        /// Fixed capacity of the pool.
        capacity: usize,
    },

    /// The slab was issued by a different pool.
    #[error("slab {index} does not belong to this pool")]
    ForeignSlab {
        /// Slot index carried by the slab.
        index: usize,
    },

    /// The slot the slab belongs to is already free.
    #[error("slab {index} released twice")]
    DoubleRelease {
        /// Slot index carried by the slab.
        index: usize,
    },
}
