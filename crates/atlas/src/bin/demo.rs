//! # ATLAS Demo
//!
//! Flies a camera entity across flat terrain while a swarm of short-lived
//! particles moves around it.
//!
//! ```text
//! atlas_demo [config.toml]
//! ```

use std::time::Instant;

use atlas::{Engine, EngineConfig, EngineResult, Lifetime, Renderable};
use atlas_core::{Position, Velocity};
use atlas_voxel::DrawQueue;

const FRAMES: u32 = 240;
const DELTA: f32 = 1.0 / 60.0;
const PARTICLES: u32 = 1_000;

#[allow(clippy::cast_precision_loss)]
fn main() -> EngineResult<()> {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║           ATLAS DEMO                                             ║");
    println!("║           Bitmask ECS + pooled voxel chunks                      ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    println!("Config: {config:?}");

    let mut engine = Engine::new(config)?;

    // The camera flies along +X at 32 blocks per second.
    let world = engine.world_mut();
    let camera = world.spawn()?;
    world.add_component(camera, Position::new(0.0, 8.0, 0.0))?;
    world.add_component(camera, Velocity::new(32.0, 0.0, 0.0))?;

    for i in 0..PARTICLES {
        let t = i as f32;
        let particle = world.spawn()?;
        world.add_component(particle, Position::new(0.0, 4.0, 0.0))?;
        world.add_component(particle, Velocity::new(t.sin(), 1.0, t.cos()))?;
        world.add_component(particle, Renderable::new(0, i % 4))?;
        world.add_component(particle, Lifetime::new(0.5 + (i % 120) as f32 * DELTA))?;
    }
    println!("Spawned camera + {PARTICLES} particles");

    let mut queue = DrawQueue::new();
    let mut chunks_loaded = 0;
    let mut chunks_unloaded = 0;
    let start = Instant::now();

    for _ in 0..FRAMES {
        let focus = engine
            .world()
            .get_component::<Position>(camera)
            .map_or([0.0; 3], |p| p.to_array());
        let streamed = engine.stream_around(focus)?;
        chunks_loaded += streamed.loaded;
        chunks_unloaded += streamed.unloaded;

        let stats = engine.tick(DELTA);

        queue.clear();
        engine.render(&mut queue);

        if stats.frame % 60 == 0 {
            println!(
                "frame {:>4} | alive {:>5} | drawables {:>5} | chunks {:>3} | triangles {:>7}",
                stats.frame,
                engine.world().alive_count(),
                engine.render_items().len(),
                engine.chunks().len(),
                queue.total_triangles(),
            );
        }
    }

    let elapsed = start.elapsed();
    let pool = engine.chunks().pool().lock();
    println!();
    println!("Ran {FRAMES} frames in {:.2}ms", elapsed.as_secs_f64() * 1000.0);
    println!("Chunks loaded {chunks_loaded}, unloaded {chunks_unloaded}");
    println!(
        "Pool: {} outstanding, {} free of {}",
        pool.outstanding(),
        pool.free_count(),
        pool.capacity()
    );

    Ok(())
}
