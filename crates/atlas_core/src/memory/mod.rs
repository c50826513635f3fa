//! # Memory Management
//!
//! Pre-allocated pools for data that is loaded and unloaded repeatedly.

mod pool;

pub use pool::{Slab, SlabPool};
