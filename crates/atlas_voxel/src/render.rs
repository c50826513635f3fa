//! Renderer seam.
//!
//! Chunks hand their mesh and a world-space translation to a
//! [`ChunkRenderer`]. GPU upload lives behind this trait; [`DrawQueue`]
//! simply records what was submitted.

use crate::mesh::ChunkMesh;

/// Receives chunk meshes for drawing.
pub trait ChunkRenderer {
    /// Draws `mesh` translated by `translation`.
    fn submit(&mut self, mesh: &ChunkMesh, translation: [f32; 3]);
}

/// One submitted draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// World-space offset of the chunk.
    pub translation: [f32; 3],
    /// Vertices in the mesh.
    pub vertex_count: usize,
    /// Indices in the mesh.
    pub index_count: usize,
    /// Triangles in the mesh.
    pub triangle_count: usize,
}

/// A renderer that records draws for later inspection.
#[derive(Debug, Default)]
pub struct DrawQueue {
    commands: Vec<DrawCommand>,
}

impl DrawQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded draws, in submission order.
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of recorded draws.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing was submitted.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Sum of triangles over every recorded draw.
    #[must_use]
    pub fn total_triangles(&self) -> usize {
        self.commands.iter().map(|c| c.triangle_count).sum()
    }

    /// Forgets every recorded draw.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl ChunkRenderer for DrawQueue {
    fn submit(&mut self, mesh: &ChunkMesh, translation: [f32; 3]) {
        self.commands.push(DrawCommand {
            translation,
            vertex_count: mesh.vertex_count(),
            index_count: mesh.indices.len(),
            triangle_count: mesh.triangle_count(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Face;

    #[test]
    fn test_draw_queue_records() {
        let mut mesh = ChunkMesh::default();
        mesh.push_face([0.0; 3], Face::Front, 1);

        let mut queue = DrawQueue::new();
        queue.submit(&mesh, [1.0, 2.0, 3.0]);
        queue.submit(&mesh, [4.0, 5.0, 6.0]);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.total_triangles(), 4);
        assert_eq!(queue.commands()[1].translation, [4.0, 5.0, 6.0]);
        assert_eq!(queue.commands()[0].index_count, 6);

        queue.clear();
        assert!(queue.is_empty());
    }
}
