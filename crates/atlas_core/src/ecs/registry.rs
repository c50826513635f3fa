//! # Type Bit Registries
//!
//! Assigns every distinct component type, and separately every distinct
//! system type, a unique bit inside a [`BitMask`].
//!
//! ## Rules
//!
//! - Bits are handed out in first-use order and never recycled
//! - A registry holds at most [`BITSIZE`] types
//! - Once frozen, unseen types are rejected, known types still resolve
//!
//! The two process-wide registries live behind `OnceLock` and are never torn
//! down. Registration is expected to happen during a single-threaded setup
//! phase, the `RwLock` keeps concurrent lookups sound regardless.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::RwLock;

use super::bitmask::{BitMask, BITSIZE};
use crate::error::{EcsError, EcsResult};

/// Mutable part of a registry, guarded by the lock.
#[derive(Debug, Default)]
struct RegistryState {
    /// Type to bit index.
    bits: HashMap<TypeId, usize>,
    /// Type names, indexed by bit.
    names: Vec<&'static str>,
    /// Rejects unseen types once set.
    frozen: bool,
}

/// A bit allocator keyed by Rust type.
///
/// # Example
///
/// ```rust
/// use atlas_core::BitRegistry;
///
/// struct Health;
/// struct Mana;
///
/// let registry = BitRegistry::new("component");
/// let health = registry.bit_for::<Health>().unwrap();
/// let mana = registry.bit_for::<Mana>().unwrap();
///
/// assert_ne!(health, mana);
/// assert_eq!(registry.bit_for::<Health>().unwrap(), health);
/// ```
#[derive(Debug)]
pub struct BitRegistry {
    /// Label used in errors and logs.
    kind: &'static str,
    state: RwLock<RegistryState>,
}

impl BitRegistry {
    /// Creates an empty, unfrozen registry.
    ///
    /// # Arguments
    ///
    /// * `kind` - Label for errors and logs (e.g. `"component"`)
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Returns the registry's label.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns the bit for `T`, assigning the next free one on first use.
    ///
    /// # Errors
    ///
    /// - [`EcsError::RegistryFrozen`] if `T` is unseen and the registry is frozen
    /// - [`EcsError::RegistryFull`] if `T` is unseen and all bits are taken
    pub fn bit_for<T: ?Sized + 'static>(&self) -> EcsResult<BitMask> {
        let type_id = TypeId::of::<T>();

        // Fast path: already registered.
        if let Some(&index) = self.state.read().bits.get(&type_id) {
            return Ok(BitMask::from_bit(index));
        }

        let mut state = self.state.write();

        // Another caller may have won the race between the two locks.
        if let Some(&index) = state.bits.get(&type_id) {
            return Ok(BitMask::from_bit(index));
        }

        let type_name = std::any::type_name::<T>();
        if state.frozen {
            return Err(EcsError::RegistryFrozen {
                kind: self.kind,
                type_name,
            });
        }

        let index = state.names.len();
        if index >= BITSIZE {
            tracing::warn!(kind = self.kind, type_name, "bit registry full");
            return Err(EcsError::RegistryFull {
                kind: self.kind,
                capacity: BITSIZE,
                type_name,
            });
        }

        state.bits.insert(type_id, index);
        state.names.push(type_name);
        tracing::debug!(kind = self.kind, type_name, bit = index, "registered type bit");

        Ok(BitMask::from_bit(index))
    }

    /// Returns the bit for `T` without registering it.
    #[must_use]
    pub fn lookup<T: ?Sized + 'static>(&self) -> Option<BitMask> {
        self.state
            .read()
            .bits
            .get(&TypeId::of::<T>())
            .map(|&index| BitMask::from_bit(index))
    }

    /// Stops accepting new types.
    pub fn freeze(&self) {
        let mut state = self.state.write();
        if !state.frozen {
            state.frozen = true;
            tracing::info!(kind = self.kind, registered = state.names.len(), "bit registry frozen");
        }
    }

    /// Returns true once [`freeze`](Self::freeze) has been called.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.state.read().frozen
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().names.len()
    }

    /// Returns true if no type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the type holding bit `index`, if assigned.
    #[must_use]
    pub fn type_name(&self, index: usize) -> Option<&'static str> {
        self.state.read().names.get(index).copied()
    }
}

// =============================================================================
// Process-wide registries
// =============================================================================

static COMPONENT_REGISTRY: OnceLock<BitRegistry> = OnceLock::new();
static SYSTEM_REGISTRY: OnceLock<BitRegistry> = OnceLock::new();

/// The process-wide component type registry.
pub fn component_registry() -> &'static BitRegistry {
    COMPONENT_REGISTRY.get_or_init(|| BitRegistry::new("component"))
}

/// The process-wide system type registry.
pub fn system_registry() -> &'static BitRegistry {
    SYSTEM_REGISTRY.get_or_init(|| BitRegistry::new("system"))
}

/// Component bit for `T` from the process-wide registry.
///
/// # Errors
///
/// See [`BitRegistry::bit_for`].
#[inline]
pub fn component_bit<T: 'static>() -> EcsResult<BitMask> {
    component_registry().bit_for::<T>()
}

/// System bit for `T` from the process-wide registry.
///
/// # Errors
///
/// See [`BitRegistry::bit_for`].
#[inline]
pub fn system_bit<T: 'static>() -> EcsResult<BitMask> {
    system_registry().bit_for::<T>()
}
