//! # ATLAS
//!
//! Engine facade over [`atlas_core`] (bitmask ECS) and [`atlas_voxel`]
//! (pooled chunks and meshing).
//!
//! ## Startup
//!
//! 1. Load an [`EngineConfig`] from TOML (or take the defaults)
//! 2. [`Engine::new`] builds the world, the block pool and the stock systems
//! 3. Register game components and systems on [`Engine::world_mut`]
//! 4. The first [`Engine::tick`] starts the systems and, by default,
//!    freezes the component and system bit registries

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod engine;
pub mod error;
pub mod systems;

pub use config::{EcsConfig, EngineConfig, VoxelConfig};
pub use engine::{flat_terrain, Engine, GRASS, STONE};
pub use error::{ConfigError, EngineError, EngineResult};
pub use systems::{
    Lifetime, LifetimeSystem, MovementSystem, RenderItem, RenderListSystem, Renderable,
};
