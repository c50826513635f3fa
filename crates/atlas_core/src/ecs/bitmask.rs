//! # Bitmasks
//!
//! Fixed-width bitsets used for component ownership, system interest and
//! system identity. One bit per registered type, containment via bitwise AND.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use bytemuck::{Pod, Zeroable};

/// Width of every bitmask, and therefore the maximum number of distinct
/// component types (and, separately, system types) per process.
pub const BITSIZE: usize = 64;

/// A fixed-width set of type bits.
///
/// # Example
///
/// ```rust
/// use atlas_core::BitMask;
///
/// let owned = BitMask::from_bit(0) | BitMask::from_bit(3);
/// let wanted = BitMask::from_bit(3);
/// assert!(owned.contains(wanted));
/// assert!(!wanted.contains(owned));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct BitMask(u64);

impl BitMask {
    /// The empty mask.
    pub const EMPTY: Self = Self(0);

    /// Creates a mask with exactly one bit set.
    ///
    /// # Panics
    ///
    /// Panics if `index >= BITSIZE`.
    #[inline]
    #[must_use]
    pub const fn from_bit(index: usize) -> Self {
        assert!(index < BITSIZE, "bit index out of range");
        Self(1 << index)
    }

    /// Creates a mask from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns true if no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of set bits.
    #[inline]
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns true if every bit of `other` is also set in `self`.
    ///
    /// This is the interest predicate: `(owned & interest) == interest`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if the two masks share at least one bit.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Sets every bit of `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears every bit of `other`.
    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Index of the lowest set bit, if any.
    #[inline]
    #[must_use]
    pub const fn first_index(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// Iterates over the indices of the set bits, lowest first.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        let mut word = self.0;
        std::iter::from_fn(move || {
            if word == 0 {
                return None;
            }
            let bit = word.trailing_zeros() as usize;
            word &= word - 1;
            Some(bit)
        })
    }
}

impl BitOr for BitMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for BitMask {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for BitMask {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for BitMask {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for BitMask {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for BitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitMask({:#b})", self.0)
    }
}
