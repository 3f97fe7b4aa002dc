//! # Track Constants
//!
//! Defaults shared by the generator and its collaborators.
//!
//! **NOTE:** Gameplay tuning lives in `TrackConfig`; only values that every
//! crate must agree on belong here.

/// Tile-id distance behind the player beyond which a tile is discarded.
pub const DEFAULT_EVICTION_HORIZON: u64 = 50;

/// Lengths below this are treated as zero by the geometry code.
pub const GEOMETRY_EPSILON: f32 = 1e-5;

/// Tolerance used when comparing shared tile edges.
pub const CONTINUITY_EPSILON: f32 = 1e-3;
