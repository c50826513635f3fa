//! Chunk map.
//!
//! Coordinate-keyed set of chunks sharing one block pool, with streaming
//! around a focus chunk.

use std::collections::HashMap;

use crate::chunk::{BlockPool, Chunk, ChunkCoord};
use crate::error::{VoxelError, VoxelResult};
use crate::render::ChunkRenderer;

/// Counters from one streaming pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Chunks newly loaded.
    pub loaded: usize,
    /// Chunks unloaded for being out of range.
    pub unloaded: usize,
}

/// All loaded chunks of a world.
///
/// # Example
///
/// ```rust
/// use atlas_voxel::{block_pool, ChunkCoord, ChunkMap};
///
/// let mut map = ChunkMap::new(block_pool(27));
/// let stats = map.load_around(ChunkCoord::new(0, 0, 0), 1, |_, _| Ok(())).unwrap();
///
/// assert_eq!(stats.loaded, 27);
/// assert_eq!(map.pool().lock().free_count(), 0);
/// ```
#[derive(Debug)]
pub struct ChunkMap {
    pool: BlockPool,
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl ChunkMap {
    /// Creates an empty map drawing storage from `pool`.
    #[must_use]
    pub fn new(pool: BlockPool) -> Self {
        Self {
            pool,
            chunks: HashMap::new(),
        }
    }

    /// The shared block pool.
    #[inline]
    #[must_use]
    pub const fn pool(&self) -> &BlockPool {
        &self.pool
    }

    /// Number of loaded chunks.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if no chunk is loaded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Checks if a chunk is loaded at `coord`.
    #[inline]
    #[must_use]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Gets the chunk at `coord`.
    #[must_use]
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Gets the chunk at `coord` mutably.
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    /// Coordinates of every loaded chunk, in no particular order.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// Loads the chunk at `coord` if needed.
    ///
    /// # Errors
    ///
    /// [`VoxelError::Pool`] when the pool is exhausted; nothing is inserted.
    pub fn load(&mut self, coord: ChunkCoord) -> VoxelResult<&mut Chunk> {
        if !self.chunks.contains_key(&coord) {
            let mut chunk = Chunk::new(self.pool.clone());
            chunk.load()?;
            self.chunks.insert(coord, chunk);
            tracing::debug!(?coord, "chunk loaded");
        }
        self.chunks
            .get_mut(&coord)
            .ok_or(VoxelError::ChunkNotFound(coord))
    }

    /// Unloads and removes the chunk at `coord`.
    ///
    /// # Errors
    ///
    /// [`VoxelError::ChunkNotFound`] if nothing is loaded there.
    pub fn unload(&mut self, coord: ChunkCoord) -> VoxelResult<()> {
        let mut chunk = self
            .chunks
            .remove(&coord)
            .ok_or(VoxelError::ChunkNotFound(coord))?;
        chunk.unload()?;
        tracing::debug!(?coord, "chunk unloaded");
        Ok(())
    }

    /// Unloads every chunk.
    pub fn clear(&mut self) {
        let coords: Vec<_> = self.coords().collect();
        for coord in coords {
            if let Err(error) = self.unload(coord) {
                tracing::warn!(?coord, %error, "chunk unload failed");
            }
        }
    }

    /// Loads every chunk within `radius` of `center` and unloads the rest.
    ///
    /// `populate` runs once on each newly loaded chunk to fill its blocks.
    /// Out-of-range chunks are dropped first so their slabs can be reused.
    ///
    /// # Errors
    ///
    /// Stops at the first pool or populate error. Chunks loaded before the
    /// error stay loaded.
    pub fn load_around<F>(
        &mut self,
        center: ChunkCoord,
        radius: u32,
        mut populate: F,
    ) -> VoxelResult<StreamStats>
    where
        F: FnMut(ChunkCoord, &mut Chunk) -> VoxelResult<()>,
    {
        let mut stats = StreamStats::default();

        let stale: Vec<_> = self
            .coords()
            .filter(|coord| coord.distance(center) > radius)
            .collect();
        for coord in stale {
            self.unload(coord)?;
            stats.unloaded += 1;
        }

        // Offsets past the i32 range have no chunk and are skipped.
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        for z in -r..=r {
            for y in -r..=r {
                for x in -r..=r {
                    let Some(coord) = center.checked_offset(x, y, z) else {
                        continue;
                    };
                    if self.contains(coord) {
                        continue;
                    }
                    let chunk = self.load(coord)?;
                    populate(coord, chunk)?;
                    stats.loaded += 1;
                }
            }
        }

        if stats.loaded > 0 || stats.unloaded > 0 {
            tracing::info!(
                ?center,
                radius,
                loaded = stats.loaded,
                unloaded = stats.unloaded,
                resident = self.len(),
                "chunks streamed"
            );
        }
        Ok(stats)
    }

    /// Rebuilds the mesh of every dirty chunk.
    ///
    /// # Returns
    ///
    /// The number of chunks rebuilt.
    ///
    /// # Errors
    ///
    /// Propagates mesh build errors.
    pub fn rebuild_dirty(&mut self) -> VoxelResult<usize> {
        let mut rebuilt = 0;
        for chunk in self.chunks.values_mut().filter(|chunk| chunk.is_dirty()) {
            chunk.build_mesh()?;
            rebuilt += 1;
        }
        Ok(rebuilt)
    }

    /// Submits every non-empty chunk mesh at its world origin.
    ///
    /// # Returns
    ///
    /// The number of chunks submitted.
    pub fn render_all(&self, renderer: &mut dyn ChunkRenderer) -> usize {
        self.chunks
            .iter()
            .filter(|(coord, chunk)| chunk.render(coord.world_origin(), renderer))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::chunk::block_pool;
    use crate::render::DrawQueue;

    #[test]
    fn test_load_and_unload() {
        let mut map = ChunkMap::new(block_pool(2));
        let coord = ChunkCoord::new(1, 0, -1);

        map.load(coord).unwrap();
        map.load(coord).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.pool().lock().free_count(), 1);

        map.unload(coord).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.pool().lock().free_count(), 2);
        assert_eq!(map.unload(coord), Err(VoxelError::ChunkNotFound(coord)));
    }

    #[test]
    fn test_load_fails_cleanly_when_pool_exhausted() {
        let mut map = ChunkMap::new(block_pool(1));
        map.load(ChunkCoord::new(0, 0, 0)).unwrap();

        assert!(matches!(
            map.load(ChunkCoord::new(1, 0, 0)),
            Err(VoxelError::Pool(_))
        ));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_streaming_moves_window() {
        let mut map = ChunkMap::new(block_pool(27));
        let noop = |_: ChunkCoord, _: &mut Chunk| -> VoxelResult<()> { Ok(()) };

        let first = map.load_around(ChunkCoord::new(0, 0, 0), 1, noop).unwrap();
        assert_eq!(first, StreamStats { loaded: 27, unloaded: 0 });

        // Shifting by one chunk swaps one 3x3 slab of chunks.
        let second = map.load_around(ChunkCoord::new(1, 0, 0), 1, noop).unwrap();
        assert_eq!(second, StreamStats { loaded: 9, unloaded: 9 });
        assert!(!map.contains(ChunkCoord::new(-1, 0, 0)));
        assert!(map.contains(ChunkCoord::new(2, 0, 0)));
        assert_eq!(map.pool().lock().free_count(), 0);
    }

    #[test]
    fn test_streaming_at_coordinate_edge() {
        let mut map = ChunkMap::new(block_pool(27));
        let edge = ChunkCoord::new(i32::MAX, 0, i32::MIN);

        let stats = map.load_around(edge, 1, |_, _| Ok(())).unwrap();
        // Only the in-range 2x3x2 corner of the cube exists.
        assert_eq!(stats, StreamStats { loaded: 12, unloaded: 0 });
        assert!(map.contains(ChunkCoord::new(i32::MAX - 1, 1, i32::MIN + 1)));
        assert!(map.coords().all(|coord| coord.distance(edge) <= 1));
    }

    #[test]
    fn test_populate_rebuild_render() {
        let mut map = ChunkMap::new(block_pool(8));
        map.load_around(ChunkCoord::new(0, 0, 0), 0, |coord, chunk| {
            assert_eq!(coord, ChunkCoord::new(0, 0, 0));
            chunk.set_block(0, 0, 0, Block::new(1))
        })
        .unwrap();

        assert_eq!(map.rebuild_dirty().unwrap(), 1);
        assert_eq!(map.rebuild_dirty().unwrap(), 0);

        let mut queue = DrawQueue::new();
        assert_eq!(map.render_all(&mut queue), 1);
        assert_eq!(queue.total_triangles(), 12);
    }

    #[test]
    fn test_clear_returns_everything() {
        let mut map = ChunkMap::new(block_pool(8));
        map.load_around(ChunkCoord::new(5, 5, 5), 0, |_, _| Ok(())).unwrap();
        map.load(ChunkCoord::new(0, 0, 0)).unwrap();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.pool().lock().free_count(), 8);
    }
}
