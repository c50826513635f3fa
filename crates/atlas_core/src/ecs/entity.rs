//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into the entity table
//! - A generation counter for safe reuse
//!
//! Each live entity carries the aggregate [`BitMask`] of the component types
//! it currently owns. The mask is only ever mutated by the world.

use super::bitmask::BitMask;
use crate::error::{EcsError, EcsResult};

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into the entity table
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-1)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

/// An entity slot: identity plus the mask of owned component types.
#[derive(Clone, Copy, Debug)]
pub struct Entity {
    id: EntityId,
    mask: BitMask,
    alive: bool,
}

impl Entity {
    #[inline]
    const fn new(id: EntityId) -> Self {
        Self {
            id,
            mask: BitMask::EMPTY,
            alive: true,
        }
    }

    #[inline]
    const fn dead() -> Self {
        Self {
            id: EntityId::NULL,
            mask: BitMask::EMPTY,
            alive: false,
        }
    }

    /// The entity's identifier.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Bits of every component type the entity currently owns.
    #[inline]
    #[must_use]
    pub const fn mask(&self) -> BitMask {
        self.mask
    }

    /// Whether this slot holds a live entity.
    #[inline]
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Checks if the entity owns every component in `bits`.
    #[inline]
    #[must_use]
    pub const fn has(&self, bits: BitMask) -> bool {
        self.mask.contains(bits)
    }
}

/// Fixed-capacity table of entity slots with free-list reuse.
///
/// All slots are allocated up front. The generation is bumped when a freed
/// slot is spawned into again, so stale ids never resolve.
#[derive(Debug)]
pub struct EntityTable {
    slots: Box<[Entity]>,
    /// Free slot indices, lowest index on top.
    free_indices: Vec<u32>,
    alive_count: usize,
}

impl EntityTable {
    /// Creates a table with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            u32::try_from(capacity).is_ok(),
            "Capacity cannot exceed u32::MAX"
        );

        let slots = vec![Entity::dead(); capacity].into_boxed_slice();
        #[allow(clippy::cast_possible_truncation)]
        let free_indices: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            slots,
            free_indices,
            alive_count: 0,
        }
    }

    /// Maximum number of simultaneously live entities.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Claims a free slot.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityCapacity`] when every slot is live.
    pub(crate) fn spawn(&mut self) -> EcsResult<EntityId> {
        let Some(index) = self.free_indices.pop() else {
            return Err(EcsError::EntityCapacity {
                capacity: self.capacity(),
            });
        };

        let slot = &mut self.slots[index as usize];
        let generation = if slot.id.is_null() {
            0
        } else {
            slot.id.generation().wrapping_add(1)
        };
        let id = EntityId::new(index, generation);
        *slot = Entity::new(id);
        self.alive_count += 1;

        Ok(id)
    }

    /// Frees the slot of a live entity. The slot keeps its id so the next
    /// spawn can bump the generation.
    pub(crate) fn despawn(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        slot.alive = false;
        slot.mask = BitMask::EMPTY;
        self.alive_count -= 1;
        self.free_indices.push(id.index());
        true
    }

    /// Checks if `id` refers to a live entity of the current generation.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Gets a live entity by ID.
    ///
    /// # Returns
    ///
    /// The entity, or None if the ID is null, dead or stale.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        if id.is_null() {
            return None;
        }
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.alive && slot.id == id)
    }

    /// Like [`get`](Self::get), but fails with [`EcsError::EntityNotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not alive.
    #[inline]
    pub fn try_get(&self, id: EntityId) -> EcsResult<&Entity> {
        self.get(id).ok_or(EcsError::EntityNotFound(id))
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if id.is_null() {
            return None;
        }
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.alive && slot.id == id)
    }

    /// Sets `bits` on the entity's mask.
    pub(crate) fn insert_bits(&mut self, id: EntityId, bits: BitMask) -> EcsResult<()> {
        let slot = self.slot_mut(id).ok_or(EcsError::EntityNotFound(id))?;
        slot.mask.insert(bits);
        Ok(())
    }

    /// Clears `bits` from the entity's mask.
    pub(crate) fn remove_bits(&mut self, id: EntityId, bits: BitMask) -> EcsResult<()> {
        let slot = self.slot_mut(id).ok_or(EcsError::EntityNotFound(id))?;
        slot.mask.remove(bits);
        Ok(())
    }

    /// Iterates over all live entities in slot order.
    pub fn iter_alive(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter(|slot| slot.alive)
    }
}
