//! # Interest Subscription Integration Test
//!
//! Drives the world through its public API and checks that every system's
//! subscription list matches the entities' component masks at all times.

use atlas_core::{
    BitMask, Component, EcsError, EntityId, FrameContext, Position, System, SystemState,
    Velocity, World,
};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Health(u32);
impl Component for Health {}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Frozen;
impl Component for Frozen {}

type Trace = Arc<Mutex<Vec<(u64, &'static str)>>>;

/// Interested in Position + Velocity.
struct Physics {
    state: SystemState,
    trace: Trace,
}

/// Interested in Health only; kills entities at zero health.
struct Reaper {
    state: SystemState,
    trace: Trace,
}

/// No interest; counts frames.
struct Clock {
    state: SystemState,
    trace: Trace,
    ticks: u64,
}

impl System for Physics {
    fn state(&self) -> &SystemState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.trace.lock().push((ctx.frame(), "physics"));
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

impl System for Reaper {
    fn state(&self) -> &SystemState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.trace.lock().push((ctx.frame(), "reaper"));
        let dead: Vec<EntityId> = self
            .state
            .subscribed()
            .iter()
            .copied()
            .filter(|&id| ctx.components().get::<Health>(id).is_some_and(|h| h.0 == 0))
            .collect();
        for id in dead {
            ctx.commands().despawn(id);
        }
    }
}

impl System for Clock {
    fn state(&self) -> &SystemState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.trace.lock().push((ctx.frame(), "clock"));
        self.ticks += 1;
    }
}

fn world_with_systems() -> (World, Trace) {
    let trace = Trace::default();
    let mut world = World::new(256);

    let physics = SystemState::untracked()
        .with_component::<Position>()
        .and_then(SystemState::with_component::<Velocity>)
        .unwrap();
    let reaper = SystemState::untracked().with_component::<Health>().unwrap();

    world
        .add_system(Physics { state: physics, trace: trace.clone() })
        .unwrap();
    world
        .add_system(Reaper { state: reaper, trace: trace.clone() })
        .unwrap();
    world
        .add_system(Clock { state: SystemState::untracked(), trace: trace.clone(), ticks: 0 })
        .unwrap();
    world.start();

    (world, trace)
}

fn physics_subscribed(world: &World) -> Vec<EntityId> {
    world
        .systems()
        .get_system::<Physics>()
        .unwrap()
        .state()
        .subscribed()
        .to_vec()
}

/// Every subscribed id must satisfy the predicate, and every live entity that
/// satisfies it must be subscribed exactly once.
fn assert_subscriptions_consistent(world: &World) {
    for index in 0..world.systems().len() {
        let system = world.systems().system_at(index).unwrap();
        let state = system.state();
        if state.interest().is_empty() {
            assert!(state.subscribed().is_empty(), "{} tracks entities", system.name());
            continue;
        }

        let mut seen = state.subscribed().to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), state.subscribed().len(), "duplicate subscription");

        for entity in world.entities().iter_alive() {
            let interested = entity.mask().contains(state.interest());
            assert_eq!(
                interested,
                state.is_subscribed(entity.id()),
                "{} disagrees about {:?}",
                system.name(),
                entity.id()
            );
        }
    }
}

#[test]
fn test_component_bits_are_unique() {
    let bits = [
        Position::bit().unwrap(),
        Velocity::bit().unwrap(),
        Health::bit().unwrap(),
        Frozen::bit().unwrap(),
    ];
    let mut union = BitMask::EMPTY;
    for bit in bits {
        assert_eq!(bit.count(), 1);
        assert!(!union.intersects(bit), "bit reused");
        union |= bit;
    }
    assert_eq!(Health::bit().unwrap(), bits[2]);
}

#[test]
fn test_subscriptions_follow_random_mutations() {
    let (mut world, _) = world_with_systems();
    let mut ids = Vec::new();
    for _ in 0..32 {
        ids.push(world.spawn().unwrap());
    }

    // Deterministic xorshift drives a long sequence of adds and removes.
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    for _ in 0..2_000 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let id = ids[(state % ids.len() as u64) as usize];

        let outcome = match (state >> 8) % 6 {
            0 => world.add_component(id, Position::default()).map(|_| ()),
            1 => world.add_component(id, Velocity::default()).map(|_| ()),
            2 => world.add_component(id, Health(1)).map(|_| ()),
            3 => world.remove_component::<Position>(id).map(drop),
            4 => world.remove_component::<Velocity>(id).map(drop),
            _ => world.remove_component::<Health>(id).map(drop),
        };
        // Duplicate adds and missing removes are expected and must be harmless.
        if let Err(error) = outcome {
            assert!(matches!(
                error,
                EcsError::DuplicateComponent { .. } | EcsError::MissingComponent { .. }
            ));
        }

        assert_subscriptions_consistent(&world);
    }
}

#[test]
fn test_unrelated_component_does_not_change_subscription() {
    let (mut world, _) = world_with_systems();
    let e = world.spawn().unwrap();
    world.add_component(e, Position::default()).unwrap();
    world.add_component(e, Velocity::default()).unwrap();
    assert_eq!(physics_subscribed(&world), vec![e]);

    world.add_component(e, Frozen).unwrap();
    world.remove_component::<Frozen>(e).unwrap();
    assert_eq!(physics_subscribed(&world), vec![e]);
}

#[test]
fn test_update_order_stable_across_frames() {
    let (mut world, trace) = world_with_systems();
    for _ in 0..5 {
        let stats = world.update(1.0 / 60.0);
        assert_eq!(stats.systems_run, 3);
    }

    let trace = trace.lock();
    assert_eq!(trace.len(), 15);
    for (frame, chunk) in trace.chunks(3).enumerate() {
        let names: Vec<_> = chunk.iter().map(|&(_, name)| name).collect();
        assert_eq!(names, vec!["physics", "reaper", "clock"]);
        assert!(chunk.iter().all(|&(f, _)| f == frame as u64 + 1));
    }
}

#[test]
fn test_despawn_during_update_is_deferred() {
    let (mut world, _) = world_with_systems();
    let doomed = world.spawn().unwrap();
    let healthy = world.spawn().unwrap();
    world.add_component(doomed, Health(0)).unwrap();
    world.add_component(healthy, Health(10)).unwrap();
    world.add_component(doomed, Position::default()).unwrap();
    world.add_component(doomed, Velocity::new(1.0, 0.0, 0.0)).unwrap();

    let stats = world.update(1.0);
    assert_eq!(stats.commands_applied, 1);
    assert_eq!(stats.commands_failed, 0);

    assert!(!world.is_alive(doomed));
    assert!(world.is_alive(healthy));
    assert!(physics_subscribed(&world).is_empty());
    assert_subscriptions_consistent(&world);
}

#[test]
fn test_zero_interest_system_runs_without_subscriptions() {
    let (mut world, _) = world_with_systems();
    let e = world.spawn().unwrap();
    world.add_component(e, Health(3)).unwrap();
    world.update(0.1);
    world.update(0.1);

    let clock = world.systems().get_system::<Clock>().unwrap();
    assert_eq!(clock.ticks, 2);
    assert!(clock.state().subscribed().is_empty());
}

#[test]
fn test_duplicate_system_type_rejected() {
    let (mut world, trace) = world_with_systems();
    let err = world
        .add_system(Clock { state: SystemState::untracked(), trace, ticks: 0 })
        .err();
    assert!(matches!(err, Some(EcsError::DuplicateSystem(_))));
    assert_eq!(world.systems().len(), 3);
}
