//! # Systems
//!
//! A system declares the component types it is interested in and keeps the
//! list of entities that currently own all of them. The manager notifies it
//! on every component change, so the list is always current and `update`
//! never scans the whole world.
//!
//! ## Subscription state
//!
//! For each (entity, system) pair the state is either subscribed or not,
//! governed solely by `(entity.mask & interest) == interest`. Systems with an
//! empty interest mask are never subscribed automatically and iterate their
//! own data source instead.

use std::any::Any;
use std::collections::HashSet;

use super::bitmask::BitMask;
use super::commands::FrameContext;
use super::component::Component;
use super::entity::{Entity, EntityId};
use crate::error::EcsResult;

/// Upcast to [`Any`] for type-keyed system lookup.
///
/// Implemented for every sized `'static` type; never implement it by hand.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Interest and subscription bookkeeping shared by every system.
///
/// Systems embed one of these and hand it out through
/// [`System::state`] / [`System::state_mut`].
#[derive(Clone, Debug, Default)]
pub struct SystemState {
    interest: BitMask,
    system_bit: Option<BitMask>,
    subscribed: Vec<EntityId>,
    /// Membership index over `subscribed`.
    members: HashSet<EntityId>,
    started: bool,
}

impl SystemState {
    /// Creates state with a fixed interest mask.
    #[must_use]
    pub fn new(interest: BitMask) -> Self {
        Self {
            interest,
            ..Self::default()
        }
    }

    /// State for a system that tracks no entities.
    #[must_use]
    pub fn untracked() -> Self {
        Self::default()
    }

    /// Adds `C` to the interest mask. Construction-time only.
    ///
    /// # Errors
    ///
    /// Fails if `C` cannot be assigned a component bit.
    ///
    /// # Example
    ///
    /// ```rust
    /// use atlas_core::{Position, SystemState, Velocity};
    ///
    /// let state = SystemState::untracked()
    ///     .with_component::<Position>()
    ///     .and_then(SystemState::with_component::<Velocity>)
    ///     .unwrap();
    /// assert_eq!(state.interest().count(), 2);
    /// ```
    pub fn with_component<C: Component>(mut self) -> EcsResult<Self> {
        self.interest.insert(C::bit()?);
        Ok(self)
    }

    /// Component bits this system requires.
    #[inline]
    #[must_use]
    pub const fn interest(&self) -> BitMask {
        self.interest
    }

    /// Identity bit, set once by the manager at registration.
    #[inline]
    #[must_use]
    pub const fn system_bit(&self) -> Option<BitMask> {
        self.system_bit
    }

    /// Entities currently satisfying the interest mask, in subscription order.
    #[inline]
    #[must_use]
    pub fn subscribed(&self) -> &[EntityId] {
        &self.subscribed
    }

    /// Checks if `id` is subscribed.
    #[inline]
    #[must_use]
    pub fn is_subscribed(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    /// Whether `start` has run.
    #[inline]
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Applies the containment predicate to `entity`, subscribing or
    /// unsubscribing it. Returns whether it is subscribed afterwards.
    pub fn evaluate(&mut self, entity: &Entity) -> bool {
        if entity.has(self.interest) {
            if self.members.insert(entity.id()) {
                self.subscribed.push(entity.id());
            }
            true
        } else {
            self.unsubscribe(entity.id());
            false
        }
    }

    /// Drops `id` if present. Order of the remaining ids is preserved.
    pub fn unsubscribe(&mut self, id: EntityId) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        match self.subscribed.iter().position(|&s| s == id) {
            Some(at) => {
                self.subscribed.remove(at);
                true
            }
            None => false,
        }
    }

    /// Sets the identity bit. The first assignment wins.
    pub(crate) fn assign_system_bit(&mut self, bit: BitMask) {
        debug_assert!(
            self.system_bit.is_none(),
            "system bit assigned twice"
        );
        if self.system_bit.is_none() {
            self.system_bit = Some(bit);
        }
    }

    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }
}

/// A per-frame behaviour driven by the [`SystemManager`](super::SystemManager).
///
/// Implementors provide their [`SystemState`] and an `update`; interest
/// tracking comes for free.
///
/// # Example
///
/// ```rust
/// use atlas_core::{FrameContext, Position, System, SystemState, World};
///
/// struct CountPositions {
///     state: SystemState,
///     seen: usize,
/// }
///
/// impl System for CountPositions {
///     fn state(&self) -> &SystemState { &self.state }
///     fn state_mut(&mut self) -> &mut SystemState { &mut self.state }
///     fn update(&mut self, _ctx: &mut FrameContext<'_>) {
///         self.seen = self.state.subscribed().len();
///     }
/// }
///
/// let mut world = World::new(8);
/// let state = SystemState::untracked().with_component::<Position>().unwrap();
/// world.add_system(CountPositions { state, seen: 0 }).unwrap();
///
/// let e = world.spawn().unwrap();
/// world.add_component(e, Position::default()).unwrap();
/// world.update(0.016);
///
/// assert_eq!(world.systems().get_system::<CountPositions>().unwrap().seen, 1);
/// ```
pub trait System: AsAny + Send {
    /// Interest and subscription state.
    fn state(&self) -> &SystemState;

    /// Interest and subscription state, mutably.
    fn state_mut(&mut self) -> &mut SystemState;

    /// Runs once per frame, in registration order.
    fn update(&mut self, ctx: &mut FrameContext<'_>);

    /// One-time initialisation, called before the first update.
    fn start(&mut self) {}

    /// Re-evaluates whether `entity` belongs in the subscribed list.
    ///
    /// Systems with an empty interest mask skip this entirely.
    fn check_interest(&mut self, entity: &Entity) {
        let state = self.state_mut();
        if !state.interest().is_empty() {
            state.evaluate(entity);
        }
    }

    /// Forgets `id`, typically because the entity was destroyed.
    fn remove_object(&mut self, id: EntityId) {
        self.state_mut().unsubscribe(id);
    }

    /// Human-readable name for logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
