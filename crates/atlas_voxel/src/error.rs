//! # Voxel Error Types

use atlas_core::PoolError;
use thiserror::Error;

use crate::chunk::ChunkCoord;

/// Errors that can occur while managing chunks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoxelError {
    /// The block pool could not serve or take back a slab.
    #[error("block pool error: {0}")]
    Pool(#[from] PoolError),

    /// The chunk has no block storage.
    #[error("chunk is not loaded")]
    NotLoaded,

    /// Local block coordinates outside the chunk.
    #[error("block ({x}, {y}, {z}) is outside the chunk")]
    OutOfBounds {
        /// Local X.
        x: usize,
        /// Local Y.
        y: usize,
        /// Local Z.
        z: usize,
    },

    /// No chunk at this coordinate in the map.
    #[error("no chunk at {0:?}")]
    ChunkNotFound(ChunkCoord),
}

/// Result type for voxel operations.
pub type VoxelResult<T> = Result<T, VoxelError>;
