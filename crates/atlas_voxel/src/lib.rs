//! # ATLAS Voxel
//!
//! Fixed-size block chunks with pooled storage and a face-culling mesher.
//!
//! ## Pipeline
//!
//! 1. `Chunk::load` takes a slab from the shared [`BlockPool`]
//! 2. Blocks are filled in with `set_block` / `fill`
//! 3. `Chunk::build_mesh` emits one quad per exposed face
//! 4. `Chunk::render` hands the mesh to a [`ChunkRenderer`]
//! 5. `Chunk::unload` gives the slab back

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod block;
pub mod chunk;
pub mod error;
pub mod map;
pub mod mesh;
pub mod render;

pub use block::Block;
pub use chunk::{
    block_index, block_pool, BlockPool, Chunk, ChunkCoord, BLOCKS_PER_CHUNK, CHUNK_SIZE,
    DEFAULT_POOL_CAPACITY,
};
pub use error::{VoxelError, VoxelResult};
pub use map::{ChunkMap, StreamStats};
pub use mesh::{build_mesh, ChunkMesh, Face, VoxelVertex};
pub use render::{ChunkRenderer, DrawCommand, DrawQueue};
