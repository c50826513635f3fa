//! Voxel chunk data structures.
//!
//! Chunks are 16x16x16 blocks. Block storage is borrowed from a shared
//! [`BlockPool`] between `load` and `unload`, so loading and unloading
//! chunks never touches the heap once the pool exists.

use std::sync::Arc;

use atlas_core::{Slab, SlabPool};
use parking_lot::Mutex;

use crate::block::Block;
use crate::error::{VoxelError, VoxelResult};
use crate::mesh::{self, ChunkMesh};
use crate::render::ChunkRenderer;

/// Chunk dimension - 16 blocks per axis.
pub const CHUNK_SIZE: usize = 16;

/// Total blocks per chunk.
pub const BLOCKS_PER_CHUNK: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Default number of chunk slabs in a block pool.
pub const DEFAULT_POOL_CAPACITY: usize = 500;

/// Shared pool of chunk-sized block slabs.
pub type BlockPool = Arc<Mutex<SlabPool<Block>>>;

/// Creates a block pool holding `capacity` chunks worth of blocks.
///
/// # Panics
///
/// Panics if capacity is zero.
#[must_use]
pub fn block_pool(capacity: usize) -> BlockPool {
    Arc::new(Mutex::new(SlabPool::new(capacity, BLOCKS_PER_CHUNK, Block::AIR)))
}

/// Linear index of a local block position.
///
/// Blocks are stored in Z-Y-X order.
#[inline]
#[must_use]
pub const fn block_index(x: usize, y: usize, z: usize) -> usize {
    debug_assert!(x < CHUNK_SIZE);
    debug_assert!(y < CHUNK_SIZE);
    debug_assert!(z < CHUNK_SIZE);
    z * CHUNK_SIZE * CHUNK_SIZE + y * CHUNK_SIZE + x
}

/// Chunk coordinate in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Converts a world block position to the chunk containing it.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn from_world_pos(x: i32, y: i32, z: i32) -> Self {
        Self::new(
            x.div_euclid(CHUNK_SIZE as i32),
            y.div_euclid(CHUNK_SIZE as i32),
            z.div_euclid(CHUNK_SIZE as i32),
        )
    }

    /// Converts a world-space point to the chunk containing it.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_world_point(point: [f32; 3]) -> Self {
        Self::from_world_pos(
            point[0].floor() as i32,
            point[1].floor() as i32,
            point[2].floor() as i32,
        )
    }

    /// World-space position of the chunk's minimum corner.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn world_origin(self) -> [f32; 3] {
        let size = CHUNK_SIZE as f32;
        [self.x as f32 * size, self.y as f32 * size, self.z as f32 * size]
    }

    /// Coordinate offset by `(dx, dy, dz)` chunks, or `None` past the
    /// `i32` range.
    #[inline]
    #[must_use]
    pub fn checked_offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }

    /// Chebyshev distance in chunks.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        self.x
            .abs_diff(other.x)
            .max(self.y.abs_diff(other.y))
            .max(self.z.abs_diff(other.z))
    }
}

/// A chunk of blocks with its derived mesh.
///
/// # Lifecycle
///
/// Constructed unloaded, `load` takes a slab from the pool and fills it with
/// air, `build_mesh` may run any number of times, `unload` gives the slab
/// back and clears the mesh. Dropping a loaded chunk unloads it.
///
/// # Example
///
/// ```rust
/// use atlas_voxel::{block_pool, Block, Chunk};
///
/// let pool = block_pool(4);
/// let mut chunk = Chunk::new(pool.clone());
///
/// chunk.load().unwrap();
/// chunk.set_block(0, 0, 0, Block::new(1)).unwrap();
/// assert_eq!(chunk.build_mesh().unwrap(), 6);
///
/// chunk.unload().unwrap();
/// assert_eq!(pool.lock().free_count(), 4);
/// ```
pub struct Chunk {
    pool: BlockPool,
    /// Block storage, present iff loaded.
    blocks: Option<Slab<Block>>,
    mesh: ChunkMesh,
    /// Set when blocks changed since the last mesh build.
    dirty: bool,
    solid_count: u32,
}

impl Chunk {
    /// Creates an unloaded chunk drawing storage from `pool`.
    #[must_use]
    pub fn new(pool: BlockPool) -> Self {
        Self {
            pool,
            blocks: None,
            mesh: ChunkMesh::default(),
            dirty: false,
            solid_count: 0,
        }
    }

    /// Checks if the chunk has block storage.
    #[inline]
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.blocks.is_some()
    }

    /// Returns true if the mesh is stale.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the number of solid blocks.
    #[inline]
    #[must_use]
    pub const fn solid_count(&self) -> u32 {
        self.solid_count
    }

    /// The current mesh. Empty until built.
    #[inline]
    #[must_use]
    pub const fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// All blocks, or `None` while unloaded.
    #[must_use]
    pub fn blocks(&self) -> Option<&[Block]> {
        self.blocks.as_ref().map(Slab::as_slice)
    }

    /// Takes a slab from the pool and fills it with air.
    ///
    /// Loading a loaded chunk is a no-op.
    ///
    /// # Errors
    ///
    /// [`VoxelError::Pool`] if the pool is exhausted. The chunk stays
    /// unloaded and the pool is unchanged.
    pub fn load(&mut self) -> VoxelResult<()> {
        if self.is_loaded() {
            return Ok(());
        }

        let mut slab = self.pool.lock().acquire()?;
        slab.fill(Block::AIR);

        self.blocks = Some(slab);
        self.solid_count = 0;
        self.dirty = true;
        tracing::trace!("chunk loaded");
        Ok(())
    }

    /// Returns the slab to the pool and discards the mesh.
    ///
    /// Unloading an unloaded chunk is a no-op.
    ///
    /// # Errors
    ///
    /// [`VoxelError::Pool`] if the pool refuses the slab. The chunk is
    /// unloaded regardless.
    pub fn unload(&mut self) -> VoxelResult<()> {
        let Some(slab) = self.blocks.take() else {
            return Ok(());
        };

        self.mesh.clear();
        self.solid_count = 0;
        self.dirty = false;
        self.pool.lock().release(slab)?;
        tracing::trace!("chunk unloaded");
        Ok(())
    }

    fn slab(&self) -> VoxelResult<&Slab<Block>> {
        self.blocks.as_ref().ok_or(VoxelError::NotLoaded)
    }

    fn check_bounds(x: usize, y: usize, z: usize) -> VoxelResult<usize> {
        if x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE {
            Ok(block_index(x, y, z))
        } else {
            Err(VoxelError::OutOfBounds { x, y, z })
        }
    }

    /// Gets the block at a local position.
    ///
    /// # Errors
    ///
    /// [`VoxelError::NotLoaded`] or [`VoxelError::OutOfBounds`].
    pub fn block(&self, x: usize, y: usize, z: usize) -> VoxelResult<Block> {
        let index = Self::check_bounds(x, y, z)?;
        Ok(self.slab()?.as_slice()[index])
    }

    /// Sets the block at a local position and marks the mesh stale.
    ///
    /// # Errors
    ///
    /// [`VoxelError::NotLoaded`] or [`VoxelError::OutOfBounds`].
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: Block) -> VoxelResult<()> {
        let index = Self::check_bounds(x, y, z)?;
        let slab = self.blocks.as_mut().ok_or(VoxelError::NotLoaded)?;

        let cell = &mut slab.as_mut_slice()[index];
        let old = *cell;
        *cell = block;

        if old.is_solid() && block.is_air() {
            self.solid_count -= 1;
        } else if old.is_air() && block.is_solid() {
            self.solid_count += 1;
        }
        self.dirty = true;
        Ok(())
    }

    /// Overwrites every block and marks the mesh stale.
    ///
    /// # Errors
    ///
    /// [`VoxelError::NotLoaded`] while unloaded.
    #[allow(clippy::cast_possible_truncation)]
    pub fn fill(&mut self, block: Block) -> VoxelResult<()> {
        let slab = self.blocks.as_mut().ok_or(VoxelError::NotLoaded)?;
        slab.fill(block);
        self.solid_count = if block.is_solid() {
            BLOCKS_PER_CHUNK as u32
        } else {
            0
        };
        self.dirty = true;
        Ok(())
    }

    /// Rebuilds the mesh from the current blocks, replacing the old one.
    ///
    /// # Returns
    ///
    /// The number of faces in the new mesh.
    ///
    /// # Errors
    ///
    /// [`VoxelError::NotLoaded`] while unloaded; the mesh is left untouched.
    pub fn build_mesh(&mut self) -> VoxelResult<usize> {
        let blocks = self.blocks.as_ref().ok_or(VoxelError::NotLoaded)?;
        let faces = mesh::build_mesh(blocks.as_slice(), &mut self.mesh);
        self.dirty = false;
        tracing::trace!(faces, "chunk mesh built");
        Ok(faces)
    }

    /// Submits the mesh to `renderer`, translated to `world_position`.
    ///
    /// # Returns
    ///
    /// `false` without submitting if the chunk is unloaded or its mesh is
    /// empty.
    pub fn render(&self, world_position: [f32; 3], renderer: &mut dyn ChunkRenderer) -> bool {
        if !self.is_loaded() || self.mesh.is_empty() {
            return false;
        }
        renderer.submit(&self.mesh, world_position);
        true
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        if let Err(error) = self.unload() {
            tracing::warn!(%error, "failed to return chunk slab on drop");
        }
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("loaded", &self.is_loaded())
            .field("dirty", &self.dirty)
            .field("solid_count", &self.solid_count)
            .field("faces", &self.mesh.face_count())
            .finish_non_exhaustive()
    }
}
