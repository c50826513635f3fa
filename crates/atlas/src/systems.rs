//! # Built-in Systems
//!
//! Stock systems and the components they operate on.
//!
//! | system | interest | behaviour |
//! |--------|----------|-----------|
//! | [`MovementSystem`] | Position + Velocity | integrates velocity |
//! | [`RenderListSystem`] | Position + Renderable | collects draw items |
//! | [`LifetimeSystem`] | none | counts down [`Lifetime`], despawns at zero |

use atlas_core::{
    Component, EcsResult, EntityId, FrameContext, Position, System, SystemState, Velocity,
};
use bytemuck::{Pod, Zeroable};

// =============================================================================
// Components
// =============================================================================

/// Seconds an entity has left before it is despawned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Lifetime {
    /// Remaining seconds. The entity is despawned once this reaches zero.
    pub remaining: f32,
}

impl Component for Lifetime {}

impl Lifetime {
    /// Creates a lifetime of `seconds`.
    #[inline]
    #[must_use]
    pub const fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }
}

/// Marks an entity as drawable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Renderable {
    /// Mesh to draw.
    pub mesh_id: u32,
    /// Material to draw it with.
    pub material_id: u32,
}

impl Component for Renderable {}

impl Renderable {
    /// Creates a renderable.
    #[inline]
    #[must_use]
    pub const fn new(mesh_id: u32, material_id: u32) -> Self {
        Self {
            mesh_id,
            material_id,
        }
    }
}

// =============================================================================
// Movement
// =============================================================================

/// Moves every entity with a position and a velocity.
#[derive(Debug)]
pub struct MovementSystem {
    state: SystemState,
}

impl MovementSystem {
    /// Creates the system.
    ///
    /// # Errors
    ///
    /// Fails if `Position` or `Velocity` cannot get a component bit.
    pub fn new() -> EcsResult<Self> {
        let state = SystemState::untracked()
            .with_component::<Position>()?
            .with_component::<Velocity>()?;
        Ok(Self { state })
    }
}

impl System for MovementSystem {
    fn state(&self) -> &SystemState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let dt = ctx.delta_seconds();
        for &id in self.state.subscribed() {
            let Some(&velocity) = ctx.components().get::<Velocity>(id) else {
                continue;
            };
            if let Some(position) = ctx.components_mut().get_mut::<Position>(id) {
                position.x += velocity.x * dt;
                position.y += velocity.y * dt;
                position.z += velocity.z * dt;
            }
        }
    }
}

// =============================================================================
// Render list
// =============================================================================

/// One entity to draw this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderItem {
    /// Owning entity.
    pub entity: EntityId,
    /// World-space position.
    pub position: [f32; 3],
    /// What to draw.
    pub renderable: Renderable,
}

/// Gathers every drawable entity into a list each frame.
///
/// The list keeps its allocation between frames.
#[derive(Debug)]
pub struct RenderListSystem {
    state: SystemState,
    items: Vec<RenderItem>,
}

impl RenderListSystem {
    /// Creates the system.
    ///
    /// # Errors
    ///
    /// Fails if `Position` or `Renderable` cannot get a component bit.
    pub fn new() -> EcsResult<Self> {
        let state = SystemState::untracked()
            .with_component::<Position>()?
            .with_component::<Renderable>()?;
        Ok(Self {
            state,
            items: Vec::new(),
        })
    }

    /// Items gathered by the last update, in subscription order.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }
}

impl System for RenderListSystem {
    fn state(&self) -> &SystemState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }

    fn start(&mut self) {
        self.items.reserve(self.state.subscribed().len());
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.items.clear();
        let components = ctx.components();
        for &entity in self.state.subscribed() {
            if let (Some(position), Some(&renderable)) = (
                components.get::<Position>(entity),
                components.get::<Renderable>(entity),
            ) {
                self.items.push(RenderItem {
                    entity,
                    position: position.to_array(),
                    renderable,
                });
            }
        }
    }
}

// =============================================================================
// Lifetime
// =============================================================================

/// Counts down every [`Lifetime`] and despawns entities that run out.
///
/// Has no interest mask: it walks the `Lifetime` column directly, so it
/// never holds a subscription list.
#[derive(Debug, Default)]
pub struct LifetimeSystem {
    state: SystemState,
    expired: Vec<EntityId>,
    despawned: u64,
}

impl LifetimeSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total despawns requested since creation.
    #[inline]
    #[must_use]
    pub const fn despawned(&self) -> u64 {
        self.despawned
    }
}

impl System for LifetimeSystem {
    fn state(&self) -> &SystemState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let dt = ctx.delta_seconds();

        self.expired.clear();
        for (id, lifetime) in ctx.components_mut().iter_mut::<Lifetime>() {
            lifetime.remaining -= dt;
            if lifetime.remaining <= 0.0 {
                self.expired.push(id);
            }
        }

        for &id in &self.expired {
            ctx.commands().despawn(id);
        }
        self.despawned += self.expired.len() as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::World;

    #[test]
    fn test_movement_integrates_all_axes() {
        let mut world = World::new(16);
        world.add_system(MovementSystem::new().unwrap()).unwrap();

        let e = world.spawn().unwrap();
        world.add_component(e, Position::new(1.0, 2.0, 3.0)).unwrap();
        world.add_component(e, Velocity::new(2.0, -4.0, 1.0)).unwrap();

        world.update(0.5);
        assert_eq!(
            world.get_component::<Position>(e).unwrap().to_array(),
            [2.0, 0.0, 3.5]
        );
    }

    #[test]
    fn test_render_list_tracks_drawables() {
        let mut world = World::new(16);
        world.add_system(RenderListSystem::new().unwrap()).unwrap();

        let drawn = world.spawn().unwrap();
        world.add_component(drawn, Position::new(4.0, 0.0, 0.0)).unwrap();
        world.add_component(drawn, Renderable::new(7, 1)).unwrap();

        let hidden = world.spawn().unwrap();
        world.add_component(hidden, Position::default()).unwrap();

        world.update(0.016);
        let items = world
            .systems()
            .get_system::<RenderListSystem>()
            .unwrap()
            .items()
            .to_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].entity, drawn);
        assert_eq!(items[0].position, [4.0, 0.0, 0.0]);
        assert_eq!(items[0].renderable.mesh_id, 7);

        world.remove_component::<Renderable>(drawn).unwrap();
        world.update(0.016);
        assert!(world
            .systems()
            .get_system::<RenderListSystem>()
            .unwrap()
            .items()
            .is_empty());
    }

    #[test]
    fn test_lifetime_expires_entities() {
        let mut world = World::new(16);
        world.add_system(LifetimeSystem::new()).unwrap();

        let short = world.spawn().unwrap();
        world.add_component(short, Lifetime::new(0.25)).unwrap();
        let long = world.spawn().unwrap();
        world.add_component(long, Lifetime::new(10.0)).unwrap();
        let forever = world.spawn().unwrap();

        let stats = world.update(0.5);
        assert_eq!(stats.commands_applied, 1);
        assert!(!world.is_alive(short));
        assert!(world.is_alive(long));
        assert!(world.is_alive(forever));

        let system = world.systems().get_system::<LifetimeSystem>().unwrap();
        assert_eq!(system.despawned(), 1);
        assert!(system.state().subscribed().is_empty());
        assert_eq!(world.get_component::<Lifetime>(long).unwrap().remaining, 9.5);
    }
}
