//! # Chunk Meshing Benchmark
//!
//! Face-culling cost for typical chunk fill patterns.

#![allow(missing_docs)]

use atlas_voxel::{block_pool, Block, Chunk, CHUNK_SIZE};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Fill patterns, from cheapest to worst case.
#[derive(Clone, Copy, Debug)]
enum Pattern {
    Empty,
    Solid,
    Terrain,
    Checkerboard,
}

fn loaded_chunk(pattern: Pattern) -> Chunk {
    let mut chunk = Chunk::new(block_pool(1));
    chunk.load().expect("load");
    match pattern {
        Pattern::Empty => {}
        Pattern::Solid => chunk.fill(Block::new(1)).expect("fill"),
        Pattern::Terrain => {
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let height = 4 + (x * 3 + z * 5) % 8;
                    for y in 0..height {
                        chunk.set_block(x, y, z, Block::new(1)).expect("set");
                    }
                }
            }
        }
        Pattern::Checkerboard => {
            for z in 0..CHUNK_SIZE {
                for y in 0..CHUNK_SIZE {
                    for x in 0..CHUNK_SIZE {
                        if (x + y + z) % 2 == 0 {
                            chunk.set_block(x, y, z, Block::new(1)).expect("set");
                        }
                    }
                }
            }
        }
    }
    chunk
}

/// Benchmark: build_mesh per fill pattern.
fn bench_build_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_mesh");

    for pattern in [Pattern::Empty, Pattern::Solid, Pattern::Terrain, Pattern::Checkerboard] {
        let mut chunk = loaded_chunk(pattern);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{pattern:?}")),
            &pattern,
            |b, _| {
                b.iter(|| black_box(chunk.build_mesh().expect("mesh")));
            },
        );
    }

    group.finish();
}

/// Benchmark: load + unload against the pool.
fn bench_load_unload(c: &mut Criterion) {
    let pool = block_pool(1);
    let mut chunk = Chunk::new(pool);

    c.bench_function("chunk_load_unload", |b| {
        b.iter(|| {
            chunk.load().expect("load");
            chunk.unload().expect("unload");
            black_box(chunk.is_loaded())
        });
    });
}

criterion_group!(benches, bench_build_mesh, bench_load_unload);
criterion_main!(benches);
