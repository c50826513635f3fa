//! # Engine
//!
//! Owns the ECS world and the chunk map and drives them frame by frame.
//!
//! ```text
//! Frame N:
//!   1. stream_around(focus)  load/unload chunks, rebuild dirty meshes
//!   2. tick(dt)              systems update, deferred commands applied
//!   3. render(renderer)      every non-empty chunk mesh submitted
//! ```

use atlas_core::{component_registry, system_registry, FrameStats, World};
use atlas_voxel::{
    block_pool, Block, Chunk, ChunkCoord, ChunkMap, ChunkRenderer, StreamStats, VoxelResult,
    CHUNK_SIZE,
};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::systems::{LifetimeSystem, MovementSystem, RenderItem, RenderListSystem};

/// Material of buried terrain blocks.
pub const STONE: Block = Block::new(1);

/// Material of the topmost terrain layer.
pub const GRASS: Block = Block::new(2);

/// Fills `chunk` with flat terrain: solid below `ground_level`, grass on top.
///
/// # Errors
///
/// Fails only if the chunk is not loaded.
#[allow(clippy::cast_possible_wrap)]
pub fn flat_terrain(coord: ChunkCoord, chunk: &mut Chunk, ground_level: i32) -> VoxelResult<()> {
    // i64 so chunks near the i32 limits cannot overflow.
    let size = CHUNK_SIZE as i64;
    let base_y = i64::from(coord.y) * size;
    let ground = i64::from(ground_level);

    if base_y + size < ground {
        return chunk.fill(STONE);
    }

    for (y, world_y) in (base_y..base_y + size).enumerate() {
        let block = if world_y < ground - 1 {
            STONE
        } else if world_y == ground - 1 {
            GRASS
        } else {
            break;
        };
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                chunk.set_block(x, y, z, block)?;
            }
        }
    }
    Ok(())
}

/// The engine facade.
///
/// # Example
///
/// ```rust
/// use atlas::{Engine, EngineConfig};
/// use atlas_voxel::DrawQueue;
///
/// let mut config = EngineConfig::default();
/// config.ecs.freeze_registries_on_start = false;
///
/// let mut engine = Engine::new(config).unwrap();
/// engine.stream_around([0.0, 0.0, 0.0]).unwrap();
/// engine.tick(1.0 / 60.0);
///
/// let mut queue = DrawQueue::new();
/// assert_eq!(engine.render(&mut queue), 9);
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    world: World,
    chunks: ChunkMap,
    started: bool,
}

impl Engine {
    /// Builds the world, the block pool and the stock systems.
    ///
    /// # Errors
    ///
    /// Fails on invalid config, or if a stock system cannot register.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;

        let mut world = World::new(config.ecs.entity_capacity);
        world.add_system(MovementSystem::new()?)?;
        world.add_system(RenderListSystem::new()?)?;
        world.add_system(LifetimeSystem::new())?;

        let chunks = ChunkMap::new(block_pool(config.voxel.pool_capacity));

        tracing::info!(
            entity_capacity = config.ecs.entity_capacity,
            pool_capacity = config.voxel.pool_capacity,
            load_radius = config.voxel.load_radius,
            "engine created"
        );

        Ok(Self {
            config,
            world,
            chunks,
            started: false,
        })
    }

    /// Starts every system and, if configured, freezes the bit registries.
    ///
    /// Called by every [`tick`](Self::tick); only systems added since the
    /// last call are started, and the registries are frozen once.
    pub fn start(&mut self) {
        self.world.start();
        if !self.started && self.config.ecs.freeze_registries_on_start {
            component_registry().freeze();
            system_registry().freeze();
        }
        self.started = true;
    }

    /// Returns true once [`start`](Self::start) has run.
    #[inline]
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Runs one frame of the ECS.
    ///
    /// # Arguments
    ///
    /// * `delta_seconds` - Time since the previous tick
    pub fn tick(&mut self, delta_seconds: f32) -> FrameStats {
        self.start();
        let stats = self.world.update(delta_seconds);
        if stats.commands_failed > 0 {
            tracing::warn!(
                frame = stats.frame,
                failed = stats.commands_failed,
                "deferred commands failed this frame"
            );
        }
        stats
    }

    /// Keeps the chunks within the configured radius of `focus` loaded,
    /// generates terrain for new ones and rebuilds dirty meshes.
    ///
    /// # Errors
    ///
    /// Voxel errors from loading or meshing.
    pub fn stream_around(&mut self, focus: [f32; 3]) -> EngineResult<StreamStats> {
        let center = ChunkCoord::from_world_point(focus);
        let ground_level = self.config.voxel.ground_level;

        let stats = self
            .chunks
            .load_around(center, self.config.voxel.load_radius, |coord, chunk| {
                flat_terrain(coord, chunk, ground_level)
            })?;
        self.chunks.rebuild_dirty()?;
        Ok(stats)
    }

    /// Submits every loaded chunk mesh to `renderer`.
    ///
    /// # Returns
    ///
    /// The number of chunks submitted.
    pub fn render(&self, renderer: &mut dyn ChunkRenderer) -> usize {
        self.chunks.render_all(renderer)
    }

    /// Drawable entities gathered by the last tick.
    #[must_use]
    pub fn render_items(&self) -> &[RenderItem] {
        match self.world.systems().get_system::<RenderListSystem>() {
            Some(system) => system.items(),
            None => &[],
        }
    }

    /// The active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The ECS world.
    #[inline]
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The ECS world, mutably.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The loaded chunks.
    #[inline]
    #[must_use]
    pub const fn chunks(&self) -> &ChunkMap {
        &self.chunks
    }

    /// The loaded chunks, mutably.
    #[inline]
    pub fn chunks_mut(&mut self) -> &mut ChunkMap {
        &mut self.chunks
    }
}
