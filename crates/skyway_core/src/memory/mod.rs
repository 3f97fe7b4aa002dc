//! # Memory Management
//!
//! Pre-allocated buffers for zero-allocation track generation.
//!
//! ## Design Philosophy
//!
//! All memory is allocated once when the generator is built. During gameplay:
//! - No heap allocations
//! - Bounded footprint regardless of how far the player runs
//! - Predictable, flat latency

mod overflow;
mod ring;

pub use overflow::OverflowBuffer;
pub use ring::RingDeque;

use thiserror::Error;

/// A fixed-capacity container was asked to hold one element too many.
///
/// Buffers are sized for the longest supported track; hitting this is a
/// programming error, not a runtime condition.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("buffer full: capacity {capacity}")]
pub struct CapacityError {
    /// The capacity that was exceeded.
    pub capacity: usize,
}
