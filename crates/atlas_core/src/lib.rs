//! # ATLAS Core Engine
//!
//! Bitmask-driven Entity Component System plus fixed-capacity slab pools.
//!
//! ## Architecture Rules
//!
//! 1. **Interest is a bitmask** - a system sees an entity iff the entity's
//!    component mask contains the system's interest mask
//! 2. **No per-frame scans** - subscriptions change only when components do
//! 3. **Pools never grow** - exhaustion is an error, not a reallocation
//!
//! ## Example
//!
//! ```rust
//! use atlas_core::{Position, Velocity, World};
//!
//! let mut world = World::new(1024);
//! let entity = world.spawn().unwrap();
//! world.add_component(entity, Position::new(0.0, 0.0, 0.0)).unwrap();
//! world.add_component(entity, Velocity::new(1.0, 0.0, 0.0)).unwrap();
//! world.update(1.0 / 60.0);
//! ```

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;
pub mod memory;

pub use ecs::{
    component_bit, component_registry, system_bit, system_registry, AsAny, BitMask,
    BitRegistry, Command, Commands, Component, ComponentColumn, ComponentStore, Entity,
    EntityId, EntityTable, FrameContext, FrameStats, Position, System, SystemManager,
    SystemState, Velocity, World, BITSIZE,
};
pub use error::{EcsError, EcsResult, PoolError};
pub use memory::{Slab, SlabPool};
