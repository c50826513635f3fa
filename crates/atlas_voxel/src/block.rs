//! Block type stored in chunks.

use bytemuck::{Pod, Zeroable};

/// A single block - one byte of material.
///
/// Material 0 is air; every other material is solid and opaque.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable, PartialEq, Eq, Hash)]
pub struct Block {
    /// Material ID (0 = air).
    pub material_id: u8,
}

impl Block {
    /// Air block - completely empty.
    pub const AIR: Self = Self { material_id: 0 };

    /// Creates a block of the given material.
    #[inline]
    #[must_use]
    pub const fn new(material_id: u8) -> Self {
        Self { material_id }
    }

    /// Returns true if this block is air (empty).
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.material_id == 0
    }

    /// Returns true if this block is solid (not air).
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        self.material_id != 0
    }
}
