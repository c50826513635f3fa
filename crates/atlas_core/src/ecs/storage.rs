//! # Component Storage
//!
//! Dense, per-type component columns owned by the world.
//!
//! Each column uses a sparse/dense strategy:
//! - Values are packed contiguously for cache-friendly iteration
//! - Access is O(1) via the entity index
//! - Removal is a swap-remove, so column order is not insertion order
//!
//! Only the world inserts and removes components, which keeps every entity's
//! component mask in step with what is stored here.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::component::Component;
use super::entity::EntityId;
use crate::error::{EcsError, EcsResult};

/// Sentinel for "no value" in the sparse index.
const VACANT: u32 = u32::MAX;

/// Storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
#[derive(Debug)]
pub struct ComponentColumn<C: Component> {
    /// Packed values.
    dense: Vec<C>,
    /// Owner of each packed value, same order as `dense`.
    owners: Vec<EntityId>,
    /// Entity index to position in `dense`.
    sparse: Vec<u32>,
}

impl<C: Component> ComponentColumn<C> {
    fn new() -> Self {
        Self {
            dense: Vec::new(),
            owners: Vec::new(),
            sparse: Vec::new(),
        }
    }

    #[inline]
    fn dense_index(&self, id: EntityId) -> Option<usize> {
        let slot = *self.sparse.get(id.index() as usize)?;
        if slot == VACANT {
            return None;
        }
        let slot = slot as usize;
        (self.owners[slot] == id).then_some(slot)
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns true if the column holds nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Checks if `id` owns a value in this column.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.dense_index(id).is_some()
    }

    /// Gets the component owned by `id`.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&C> {
        self.dense_index(id).map(|slot| &self.dense[slot])
    }

    /// Gets the component owned by `id` mutably.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut C> {
        self.dense_index(id).map(move |slot| &mut self.dense[slot])
    }

    /// Packed values.
    #[inline]
    #[must_use]
    pub fn slice(&self) -> &[C] {
        &self.dense
    }

    /// Packed values, mutably. Owners cannot change through this.
    #[inline]
    pub fn slice_mut(&mut self) -> &mut [C] {
        &mut self.dense
    }

    /// Owners of the packed values, same order as [`slice`](Self::slice).
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.owners
    }

    /// Iterates over `(owner, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.owners.iter().copied().zip(self.dense.iter())
    }

    /// Iterates mutably over `(owner, value)` pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        self.owners.iter().copied().zip(self.dense.iter_mut())
    }

    fn insert(&mut self, id: EntityId, value: C) -> EcsResult<&mut C> {
        if self.contains(id) {
            return Err(EcsError::DuplicateComponent {
                entity: id,
                component: std::any::type_name::<C>(),
            });
        }

        let index = id.index() as usize;
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, VACANT);
        }

        let slot = self.dense.len();
        #[allow(clippy::cast_possible_truncation)]
        {
            self.sparse[index] = slot as u32;
        }
        self.dense.push(value);
        self.owners.push(id);

        Ok(&mut self.dense[slot])
    }

    fn remove(&mut self, id: EntityId) -> Option<C> {
        let slot = self.dense_index(id)?;
        let last = self.dense.len() - 1;

        self.sparse[id.index() as usize] = VACANT;
        let value = self.dense.swap_remove(slot);
        self.owners.swap_remove(slot);

        if slot != last {
            let moved = self.owners[slot];
            #[allow(clippy::cast_possible_truncation)]
            {
                self.sparse[moved.index() as usize] = slot as u32;
            }
        }

        Some(value)
    }
}

/// Type-erased view of a column, used for whole-entity teardown.
trait ErasedColumn: Send + Sync {
    fn remove_entity(&mut self, id: EntityId) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedColumn for ComponentColumn<C> {
    fn remove_entity(&mut self, id: EntityId) -> bool {
        self.remove(id).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// All components of a world, one column per component type.
///
/// # Example
///
/// ```rust
/// use atlas_core::{Position, World};
///
/// let mut world = World::new(16);
/// let e = world.spawn().unwrap();
/// world.add_component(e, Position::new(1.0, 2.0, 3.0)).unwrap();
///
/// let store = world.components();
/// assert_eq!(store.get::<Position>(e), Some(&Position::new(1.0, 2.0, 3.0)));
/// assert_eq!(store.len::<Position>(), 1);
/// ```
#[derive(Default)]
pub struct ComponentStore {
    columns: HashMap<TypeId, Box<dyn ErasedColumn>>,
}

impl ComponentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The column for `C`, if any value of that type was ever stored.
    #[must_use]
    pub fn column<C: Component>(&self) -> Option<&ComponentColumn<C>> {
        self.columns
            .get(&TypeId::of::<C>())
            .and_then(|column| column.as_any().downcast_ref())
    }

    /// The column for `C`, mutably.
    pub fn column_mut<C: Component>(&mut self) -> Option<&mut ComponentColumn<C>> {
        self.columns
            .get_mut(&TypeId::of::<C>())
            .and_then(|column| column.as_any_mut().downcast_mut())
    }

    /// Gets the `C` owned by `id`.
    #[inline]
    #[must_use]
    pub fn get<C: Component>(&self, id: EntityId) -> Option<&C> {
        self.column::<C>()?.get(id)
    }

    /// Gets the `C` owned by `id` mutably.
    #[inline]
    pub fn get_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        self.column_mut::<C>()?.get_mut(id)
    }

    /// Checks if `id` owns a `C`.
    #[inline]
    #[must_use]
    pub fn contains<C: Component>(&self, id: EntityId) -> bool {
        self.column::<C>().is_some_and(|column| column.contains(id))
    }

    /// Number of stored `C` values.
    #[must_use]
    pub fn len<C: Component>(&self) -> usize {
        self.column::<C>().map_or(0, ComponentColumn::len)
    }

    /// Returns true if no `C` is stored.
    #[must_use]
    pub fn is_empty<C: Component>(&self) -> bool {
        self.len::<C>() == 0
    }

    /// All stored `C` values, packed.
    #[must_use]
    pub fn slice<C: Component>(&self) -> &[C] {
        match self.column::<C>() {
            Some(column) => column.slice(),
            None => &[],
        }
    }

    /// Owners of the stored `C` values.
    #[must_use]
    pub fn entities<C: Component>(&self) -> &[EntityId] {
        match self.column::<C>() {
            Some(column) => column.entities(),
            None => &[],
        }
    }

    /// Iterates over every `(owner, C)` pair.
    pub fn iter<C: Component>(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.column::<C>().into_iter().flat_map(|column| column.iter())
    }

    /// Iterates mutably over every `(owner, C)` pair.
    pub fn iter_mut<C: Component>(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        self.column_mut::<C>()
            .into_iter()
            .flat_map(|column| column.iter_mut())
    }

    /// Stores `value` for `id`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DuplicateComponent`] if `id` already owns a `C`.
    pub(crate) fn insert<C: Component>(&mut self, id: EntityId, value: C) -> EcsResult<&mut C> {
        let column = self
            .columns
            .entry(TypeId::of::<C>())
            .or_insert_with(|| Box::new(ComponentColumn::<C>::new()));

        match column.as_any_mut().downcast_mut::<ComponentColumn<C>>() {
            Some(column) => column.insert(id, value),
            // Columns are keyed by their own TypeId.
            None => unreachable!("component column type mismatch"),
        }
    }

    /// Removes and returns the `C` owned by `id`.
    pub(crate) fn remove<C: Component>(&mut self, id: EntityId) -> Option<C> {
        self.column_mut::<C>()?.remove(id)
    }

    /// Drops every component owned by `id`. Returns how many were removed.
    pub(crate) fn remove_all(&mut self, id: EntityId) -> usize {
        self.columns
            .values_mut()
            .map(|column| column.remove_entity(id))
            .filter(|removed| *removed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{Position, Velocity};

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn test_insert_get() {
        let mut store = ComponentStore::new();
        store.insert(id(3), Position::new(1.0, 2.0, 3.0)).unwrap();

        assert_eq!(store.get::<Position>(id(3)), Some(&Position::new(1.0, 2.0, 3.0)));
        assert!(store.contains::<Position>(id(3)));
        assert!(!store.contains::<Velocity>(id(3)));
        assert!(store.get::<Position>(id(4)).is_none());
        // Same index, other generation.
        assert!(store.get::<Position>(EntityId::new(3, 1)).is_none());
    }

    #[test]
    fn test_duplicate_rejected_without_overwrite() {
        let mut store = ComponentStore::new();
        store.insert(id(0), Position::new(1.0, 0.0, 0.0)).unwrap();

        let err = store.insert(id(0), Position::new(9.0, 9.0, 9.0)).unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponent { .. }));
        assert_eq!(store.get::<Position>(id(0)), Some(&Position::new(1.0, 0.0, 0.0)));
        assert_eq!(store.len::<Position>(), 1);
    }

    #[test]
    fn test_swap_remove_keeps_index_consistent() {
        let mut store = ComponentStore::new();
        for i in 0..4 {
            #[allow(clippy::cast_precision_loss)]
            store.insert(id(i), Position::new(i as f32, 0.0, 0.0)).unwrap();
        }

        let removed = store.remove::<Position>(id(1)).unwrap();
        assert!((removed.x - 1.0).abs() < f32::EPSILON);
        assert_eq!(store.len::<Position>(), 3);

        // The last value moved into the hole and is still reachable.
        assert!((store.get::<Position>(id(3)).unwrap().x - 3.0).abs() < f32::EPSILON);
        assert_eq!(store.entities::<Position>(), &[id(0), id(3), id(2)]);
        assert!(store.remove::<Position>(id(1)).is_none());
    }

    #[test]
    fn test_remove_all() {
        let mut store = ComponentStore::new();
        store.insert(id(0), Position::default()).unwrap();
        store.insert(id(0), Velocity::default()).unwrap();
        store.insert(id(1), Velocity::default()).unwrap();

        assert_eq!(store.remove_all(id(0)), 2);
        assert!(store.is_empty::<Position>());
        assert_eq!(store.entities::<Velocity>(), &[id(1)]);
    }

    #[test]
    fn test_iter_mut() {
        let mut store = ComponentStore::new();
        store.insert(id(0), Velocity::new(1.0, 0.0, 0.0)).unwrap();
        store.insert(id(1), Velocity::new(2.0, 0.0, 0.0)).unwrap();

        for (_, velocity) in store.iter_mut::<Velocity>() {
            velocity.x *= 10.0;
        }
        let total: f32 = store.iter::<Velocity>().map(|(_, v)| v.x).sum();
        assert!((total - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_type_queries() {
        let store = ComponentStore::new();
        assert_eq!(store.len::<Position>(), 0);
        assert!(store.slice::<Position>().is_empty());
        assert_eq!(store.iter::<Position>().count(), 0);
    }
}
