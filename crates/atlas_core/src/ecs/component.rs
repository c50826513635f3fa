//! # Component System
//!
//! Components are plain data attached to entities. Each component type owns
//! one bit of the entity's component mask, assigned on first use.

use bytemuck::{Pod, Zeroable};

use super::bitmask::BitMask;
use super::registry::component_bit;
use crate::error::EcsResult;

/// Marker trait for ECS components.
///
/// Any `Send + Sync + 'static` type can be a component once it opts in.
/// The component's bit is assigned by the process-wide component registry
/// the first time [`Component::bit`] is called.
///
/// # Example
///
/// ```rust
/// use atlas_core::Component;
///
/// struct Health(u32);
/// impl Component for Health {}
///
/// let bit = Health::bit().unwrap();
/// assert_eq!(bit.count(), 1);
/// ```
pub trait Component: Send + Sync + 'static {
    /// Returns the bit identifying this component type.
    ///
    /// # Errors
    ///
    /// Fails if the component registry is full or frozen before this type
    /// was seen.
    #[inline]
    fn bit() -> EcsResult<BitMask>
    where
        Self: Sized,
    {
        component_bit::<Self>()
    }
}

/// Position component for entities.
///
/// Represents a 3D position in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Position {
    /// X coordinate in world space.
    pub x: f32,
    /// Y coordinate in world space.
    pub y: f32,
    /// Z coordinate in world space.
    pub z: f32,
    /// Padding for 16-byte alignment.
    pub _padding: f32,
}

impl Component for Position {}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            _padding: 0.0,
        }
    }

    /// Returns the position as a plain vector.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns the squared distance to another position.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

/// Velocity component for entities.
///
/// Movement speed in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Velocity {
    /// X velocity component.
    pub x: f32,
    /// Y velocity component.
    pub y: f32,
    /// Z velocity component.
    pub z: f32,
    /// Padding for alignment.
    pub _padding: f32,
}

impl Component for Velocity {}

impl Velocity {
    /// Creates a new velocity.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            _padding: 0.0,
        }
    }
}
