//! # Track Error Types
//!
//! All errors that can occur while generating the ribbon.
//!
//! Every variant is a broken construction-time invariant: buffers sized too
//! small, or a structure asking for more grid than it was handed. None of
//! them is retried; they propagate out of the generation step.

use skyway_core::CapacityError;
use thiserror::Error;

use crate::grid::Orientation;

/// Errors that can occur in the track generator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    /// A fixed-capacity buffer overflowed.
    #[error("{buffer} buffer full: capacity {capacity}")]
    Capacity {
        /// Which buffer overflowed.
        buffer: &'static str,
        /// Its capacity.
        capacity: usize,
    },

    /// A reservation touched a cell that is already taken.
    #[error("grid cell ({row}, {col}) already reserved")]
    GridOverlap {
        /// Row of the first conflicting cell.
        row: usize,
        /// Column of the first conflicting cell.
        col: usize,
    },

    /// A reservation does not lie inside the grid.
    #[error("{orientation:?} run of {length} at ({row}, {col}) outside {rows}x{cols} grid")]
    GridOutOfRange {
        /// Requested origin row.
        row: usize,
        /// Requested origin column.
        col: usize,
        /// Requested run length.
        length: usize,
        /// Run orientation.
        orientation: Orientation,
        /// Grid row count.
        rows: usize,
        /// Grid column count.
        cols: usize,
    },

    /// No free run of the requested length exists.
    #[error("no free {orientation:?} run of {length} in {rows}x{cols} grid")]
    NoFit {
        /// Requested run length.
        length: usize,
        /// Run orientation.
        orientation: Orientation,
        /// Grid row count.
        rows: usize,
        /// Grid column count.
        cols: usize,
    },

    /// An addon phase started while another grid was still open.
    #[error("a structure grid is already active")]
    GridAlreadyActive,

    /// An addon opcode ran outside of an addon phase.
    #[error("no structure grid is active")]
    NoActiveGrid,

    /// Reservations and pre-supplied addons went out of step.
    #[error("addon supply mismatch: {pending} addons left, {requested} requested")]
    SupplyMismatch {
        /// Addons still waiting to be placed.
        pending: usize,
        /// Addons the failing operation needed.
        requested: usize,
    },

    /// An addon was bound to a second field.
    #[error("addon already placed")]
    AddonAlreadyPlaced,

    /// A row was evicted from the row buffer or never built.
    #[error("row {0} is not resident")]
    RowUnavailable(u64),

    /// Only the most recent tile may be rolled back, once.
    #[error("rollback depth exceeded: only the most recent tile can be retracted")]
    RollbackDepth,

    /// The ribbon has no tile to continue from.
    #[error("track has no tiles")]
    EmptyTrack,

    /// A finish opcode ran with no open structure.
    #[error("no open structure to finish")]
    NoOpenStructure,

    /// A start opcode ran with nothing waiting.
    #[error("no structure waiting to start")]
    NoWaitingStructure,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TrackError {
    /// Maps a [`CapacityError`] from a named buffer.
    #[must_use]
    pub fn capacity(buffer: &'static str) -> impl FnOnce(CapacityError) -> Self {
        move |err| Self::Capacity {
            buffer,
            capacity: err.capacity,
        }
    }
}

/// Result type for track operations.
pub type TrackResult<T> = Result<T, TrackError>;
