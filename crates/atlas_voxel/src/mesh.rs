//! Face-culling mesher.
//!
//! One quad per exposed block face, no merging. A face is exposed when the
//! neighbouring block inside the chunk is air, or when the neighbour lies
//! outside the chunk.
//!
//! Quads are wound counter-clockwise when seen from outside the block.

use bytemuck::{Pod, Zeroable};

use crate::block::Block;
use crate::chunk::{block_index, CHUNK_SIZE};

// =============================================================================
// FACES
// =============================================================================

/// One of the six faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Facing positive X.
    Right,
    /// Facing negative X.
    Left,
    /// Facing positive Y.
    Top,
    /// Facing negative Y.
    Bottom,
    /// Facing positive Z.
    Front,
    /// Facing negative Z.
    Back,
}

impl Face {
    /// All six faces, in emission order.
    pub const ALL: [Self; 6] = [
        Self::Right,
        Self::Left,
        Self::Top,
        Self::Bottom,
        Self::Front,
        Self::Back,
    ];

    /// Step from a block to the neighbour behind this face.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> [i32; 3] {
        match self {
            Self::Right => [1, 0, 0],
            Self::Left => [-1, 0, 0],
            Self::Top => [0, 1, 0],
            Self::Bottom => [0, -1, 0],
            Self::Front => [0, 0, 1],
            Self::Back => [0, 0, -1],
        }
    }

    /// Outward unit normal.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn normal(self) -> [f32; 3] {
        let [x, y, z] = self.offset();
        [x as f32, y as f32, z as f32]
    }

    /// Corners of the face on a unit cube, counter-clockwise from outside.
    const fn corners(self) -> [[f32; 3]; 4] {
        match self {
            Self::Right => [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
            Self::Left => [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
            Self::Top => [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
            Self::Bottom => [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
            Self::Front => [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
            Self::Back => [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
        }
    }
}

/// Texture coordinates shared by every quad.
const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

// =============================================================================
// VERTEX FORMAT
// =============================================================================

/// Vertex for chunk meshes, in chunk-local space.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VoxelVertex {
    /// Position [x, y, z].
    pub position: [f32; 3],
    /// Normal direction [nx, ny, nz].
    pub normal: [f32; 3],
    /// UV coordinates [u, v].
    pub uv: [f32; 2],
    /// Material ID of the block the face belongs to.
    pub material: u32,
}

// =============================================================================
// MESH OUTPUT
// =============================================================================

/// Vertex and index data for one chunk.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    /// Vertex buffer data, four per face.
    pub vertices: Vec<VoxelVertex>,
    /// Index buffer data, six per face.
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    /// Check if the mesh has no geometry.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of quads (exposed faces).
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Drops all geometry, keeping the buffers' capacity.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Appends the quad for `face` of the block at `origin`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_face(&mut self, origin: [f32; 3], face: Face, material: u8) {
        let base = self.vertices.len() as u32;
        let normal = face.normal();

        for (corner, uv) in face.corners().into_iter().zip(QUAD_UVS) {
            self.vertices.push(VoxelVertex {
                position: [
                    origin[0] + corner[0],
                    origin[1] + corner[1],
                    origin[2] + corner[2],
                ],
                normal,
                uv,
                material: u32::from(material),
            });
        }

        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

// =============================================================================
// MESHING
// =============================================================================

/// Neighbour of `(x, y, z)` across `face`, or `None` outside the chunk.
#[inline]
fn neighbour(x: usize, y: usize, z: usize, face: Face) -> Option<(usize, usize, usize)> {
    let [dx, dy, dz] = face.offset();
    let step = |v: usize, d: i32| -> Option<usize> {
        let next = v.checked_add_signed(d as isize)?;
        (next < CHUNK_SIZE).then_some(next)
    };
    Some((step(x, dx)?, step(y, dy)?, step(z, dz)?))
}

/// Rebuilds `mesh` from a full chunk of blocks.
///
/// `blocks` must hold `CHUNK_SIZE^3` blocks in `block_index` order.
///
/// # Returns
///
/// The number of faces emitted.
#[allow(clippy::cast_precision_loss)]
pub fn build_mesh(blocks: &[Block], mesh: &mut ChunkMesh) -> usize {
    debug_assert_eq!(blocks.len(), CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE);
    mesh.clear();

    for z in 0..CHUNK_SIZE {
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let block = blocks[block_index(x, y, z)];
                if block.is_air() {
                    continue;
                }

                let origin = [x as f32, y as f32, z as f32];
                for face in Face::ALL {
                    let exposed = match neighbour(x, y, z, face) {
                        Some((nx, ny, nz)) => !blocks[block_index(nx, ny, nz)].is_solid(),
                        None => true,
                    };
                    if exposed {
                        mesh.push_face(origin, face, block.material_id);
                    }
                }
            }
        }
    }

    mesh.face_count()
}
