//! # Entity Component System
//!
//! A bitmask-driven ECS.
//!
//! ## Design Philosophy
//!
//! - Every component type and every system type owns one bit
//! - Entities carry the mask of the component types they own
//! - Systems subscribe to entities whose mask contains their interest mask
//! - Subscriptions are updated on change, never by scanning each frame

mod bitmask;
mod commands;
mod component;
mod entity;
mod manager;
mod registry;
mod storage;
mod system;
mod world;

pub use bitmask::{BitMask, BITSIZE};
pub use commands::{Command, Commands, FrameContext, FrameStats};
pub use component::{Component, Position, Velocity};
pub use entity::{Entity, EntityId, EntityTable};
pub use manager::SystemManager;
pub use registry::{
    component_bit, component_registry, system_bit, system_registry, BitRegistry,
};
pub use storage::{ComponentColumn, ComponentStore};
pub use system::{AsAny, System, SystemState};
pub use world::World;
