//! # Command Buffer
//!
//! Structures never build geometry directly. They emit opcodes into a bounded
//! FIFO that the dispatcher drains a few at a time, so generation cost is
//! spread over frames.
//!
//! Opcodes split into two families: [`LandscapeOp`] drives the tile builder,
//! [`AddonOp`] drives grid reservation. Every opcode carries at most three
//! numeric arguments.

use skyway_core::RingDeque;

use crate::error::{TrackError, TrackResult};

/// Geometry opcodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LandscapeOp {
    /// Set the cumulative heading for the next tile (radians).
    SetHorizontalAngle(f32),
    /// Turn the next tile by a delta (radians).
    AddHorizontalAngle(f32),
    /// Set the pitch of following tiles (radians).
    SetVerticalAngle(f32),
    /// Change the pitch of following tiles (radians).
    AddVerticalAngle(f32),
    /// Append a surface tile.
    AddSegment,
    /// Append a gap.
    AddEmptySegment,
    /// Raise the next tile.
    Lift(f32),
    /// Open the next nested or waiting structure.
    StartStructure,
    /// Close the innermost open structure and schedule its addons.
    FinishStructure,
}

/// Grid reservation opcodes. Rows and columns are relative to the active grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddonOp {
    /// Reserve `length` rows in one column.
    ReserveVertical {
        /// First row.
        row: usize,
        /// Column.
        col: usize,
        /// Rows to claim.
        length: usize,
    },
    /// Reserve `length` columns in one row.
    ReserveHorizontal {
        /// Row.
        row: usize,
        /// First column.
        col: usize,
        /// Columns to claim.
        length: usize,
    },
    /// Reserve any free vertical run of `length`.
    ReserveRandomVertical {
        /// Rows to claim.
        length: usize,
    },
    /// Reserve any free horizontal run of `length`.
    ReserveRandomHorizontal {
        /// Columns to claim.
        length: usize,
    },
    /// Open a grid over `rows` rows starting at absolute row `row_offset`.
    StartStructureAddons {
        /// Absolute sequence number of grid row 0.
        row_offset: u64,
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },
    /// Discard the active grid.
    FinishStructureAddons,
}

/// One queued unit of deferred work.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Routed to the landscape executor.
    Landscape(LandscapeOp),
    /// Routed to the addons executor.
    Addons(AddonOp),
}

impl From<LandscapeOp> for Command {
    fn from(op: LandscapeOp) -> Self {
        Self::Landscape(op)
    }
}

impl From<AddonOp> for Command {
    fn from(op: AddonOp) -> Self {
        Self::Addons(op)
    }
}

/// How much work one generation call may do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Budget {
    /// At most this many opcodes.
    Ops(usize),
    /// Run until nothing is queued or waiting.
    Drain,
}

impl Budget {
    /// Whether `executed` opcodes use up the budget.
    #[inline]
    #[must_use]
    pub const fn exhausted(self, executed: usize) -> bool {
        match self {
            Self::Ops(limit) => executed >= limit,
            Self::Drain => false,
        }
    }
}

/// Negative counts mean "drain".
impl From<i64> for Budget {
    fn from(count: i64) -> Self {
        usize::try_from(count).map_or(Self::Drain, Self::Ops)
    }
}

/// Bounded opcode FIFO.
#[derive(Debug)]
pub struct CommandBuffer {
    queue: RingDeque<Command>,
}

impl CommandBuffer {
    /// Creates an empty buffer.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: RingDeque::new(capacity),
        }
    }

    /// Number of queued opcodes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Maximum number of queued opcodes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Appends one opcode.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Capacity`] if the buffer is full.
    pub fn push(&mut self, command: impl Into<Command>) -> TrackResult<()> {
        self.queue
            .push_back(command.into())
            .map_err(TrackError::capacity("command"))
    }

    /// Inserts `batch` ahead of everything queued, keeping its order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Capacity`] if the whole batch does not fit.
    /// Nothing is inserted in that case.
    pub fn insert_front_batch(&mut self, batch: &[Command]) -> TrackResult<()> {
        if self.queue.len() + batch.len() > self.queue.capacity() {
            return Err(TrackError::Capacity {
                buffer: "command",
                capacity: self.queue.capacity(),
            });
        }
        for command in batch.iter().rev() {
            self.queue
                .push_front(*command)
                .map_err(TrackError::capacity("command"))?;
        }
        Ok(())
    }

    /// Takes the oldest opcode.
    pub fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    /// The oldest opcode, without taking it.
    #[must_use]
    pub fn peek(&self) -> Option<&Command> {
        self.queue.front()
    }

    /// Iterates queued opcodes in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> + '_ {
        self.queue.iter()
    }
}
