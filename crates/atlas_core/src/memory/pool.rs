//! # Slab Pool
//!
//! Fixed-capacity pool of equally sized slabs, allocated once up front.
//!
//! A [`Slab`] is moved out of the pool on [`SlabPool::acquire`] and moved
//! back on [`SlabPool::release`], so ownership is enforced by the type
//! system. The pool never grows: once every slab is out, `acquire` fails.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::PoolError;

/// Source of pool identities, used to reject slabs from another pool.
static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(0);

/// A block of `T`s on loan from a [`SlabPool`].
///
/// Dropping a slab instead of releasing it leaks its slot for the lifetime
/// of the pool.
#[derive(Debug)]
pub struct Slab<T> {
    pool_id: u32,
    index: usize,
    data: Box<[T]>,
}

impl<T> Slab<T> {
    /// Slot index inside the owning pool.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The slab's contents.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The slab's contents, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Number of elements in the slab.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for a zero-length slab.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: Copy> Slab<T> {
    /// Overwrites every element with `value`.
    #[inline]
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

/// A pool allocator for fixed-size slabs.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Share it behind a mutex.
///
/// # Example
///
/// ```rust
/// use atlas_core::SlabPool;
///
/// let mut pool: SlabPool<u16> = SlabPool::new(2, 8, 0);
///
/// let slab = pool.acquire().unwrap();
/// assert_eq!(slab.len(), 8);
/// assert_eq!(pool.free_count(), 1);
///
/// pool.release(slab).unwrap();
/// assert_eq!(pool.free_count(), 2);
/// ```
#[derive(Debug)]
pub struct SlabPool<T> {
    id: u32,
    /// Slabs currently in the pool; `None` while on loan.
    slots: Box<[Option<Box<[T]>>]>,
    /// Free slot indices, lowest index on top.
    free_list: Vec<usize>,
    slab_len: usize,
}

impl<T: Copy> SlabPool<T> {
    /// Creates a pool of `capacity` slabs, each holding `slab_len` copies of
    /// `init`.
    ///
    /// All memory is allocated here; nothing is allocated afterwards.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of slabs
    /// * `slab_len` - Elements per slab
    /// * `init` - Initial element value
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize, slab_len: usize, init: T) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        let slots: Vec<Option<Box<[T]>>> = (0..capacity)
            .map(|_| Some(vec![init; slab_len].into_boxed_slice()))
            .collect();
        let free_list: Vec<usize> = (0..capacity).rev().collect();

        tracing::debug!(capacity, slab_len, "slab pool created");

        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            slots: slots.into_boxed_slice(),
            free_list,
            slab_len,
        }
    }
}

impl<T> SlabPool<T> {
    /// Total number of slabs.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Elements per slab.
    #[inline]
    #[must_use]
    pub const fn slab_len(&self) -> usize {
        self.slab_len
    }

    /// Slabs available to acquire.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Slabs currently on loan.
    #[inline]
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.capacity() - self.free_count()
    }

    /// Takes a slab out of the pool. Contents are whatever the previous
    /// holder left behind.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] if every slab is on loan. The pool is
    /// unchanged.
    pub fn acquire(&mut self) -> Result<Slab<T>, PoolError> {
        let exhausted = PoolError::Exhausted {
            capacity: self.capacity(),
        };
        let Some(index) = self.free_list.pop() else {
            tracing::warn!(capacity = self.capacity(), "slab pool exhausted");
            return Err(exhausted);
        };

        debug_assert!(
            self.slots[index].is_some(),
            "free list held slab index {index} that is still on loan"
        );
        match self.slots[index].take() {
            Some(data) => Ok(Slab {
                pool_id: self.id,
                index,
                data,
            }),
            None => {
                // Free list and slots disagree; keep the index out of circulation.
                tracing::warn!(index, "free slab slot was empty");
                Err(exhausted)
            }
        }
    }

    /// Returns a slab to the pool.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ForeignSlab`] if the slab came from another pool
    /// - [`PoolError::DoubleRelease`] if its slot is already occupied
    ///
    /// The pool is unchanged on error.
    pub fn release(&mut self, slab: Slab<T>) -> Result<(), PoolError> {
        if slab.pool_id != self.id || slab.index >= self.slots.len() {
            return Err(PoolError::ForeignSlab { index: slab.index });
        }

        let slot = &mut self.slots[slab.index];
        if slot.is_some() {
            return Err(PoolError::DoubleRelease { index: slab.index });
        }

        *slot = Some(slab.data);
        self.free_list.push(slab.index);
        Ok(())
    }
}
