//! # Engine Error Types
//!
//! Everything the engine facade can fail with.

use std::path::PathBuf;

use atlas_core::EcsError;
use atlas_voxel::VoxelError;
use thiserror::Error;

/// Configuration load and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config text is not valid TOML for [`EngineConfig`](crate::EngineConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors surfaced by the [`Engine`](crate::Engine).
#[derive(Error, Debug)]
pub enum EngineError {
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// ECS failure.
    #[error("ecs: {0}")]
    Ecs(#[from] EcsError),

    /// Voxel failure.
    #[error("voxel: {0}")]
    Voxel(#[from] VoxelError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
