//! # SKYWAY Core
//!
//! Fixed-memory containers for the track generator:
//! - Tiles and addons live in a [`RingDeque`] sized once at startup
//! - Edge points, row metadata and rollback history live in
//!   [`OverflowBuffer`]s that recycle their slots
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations after construction** - every slot is pre-allocated
//! 2. **O(1) at both ends** - generation pushes at the back, trimming pops the front
//! 3. **Absolute indexing** - overflow buffers address entries by sequence number,
//!    so parallel buffers stay synchronized after eviction
//!
//! ## Example
//!
//! ```rust
//! use skyway_core::RingDeque;
//!
//! let mut tiles: RingDeque<u64> = RingDeque::new(4);
//! tiles.push_back(0).unwrap();
//! tiles.push_back(1).unwrap();
//! assert_eq!(tiles.pop_front(), Some(0));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod memory;

pub use memory::{CapacityError, OverflowBuffer, RingDeque};
