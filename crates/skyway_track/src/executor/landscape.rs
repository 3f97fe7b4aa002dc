//! # Landscape Executor
//!
//! Runs geometry opcodes against the tile builder and opens and closes
//! structures.
//!
//! Opening a structure expands it in place: its opcodes plus a closing
//! `FinishStructure` go to the front of the command buffer. Closing one does
//! the same with its addon phase.
//!
//! A closing structure's grid covers the rows not yet handed to any grid, up
//! to but excluding the newest tile: that tile's far edge is still
//! provisional, so its rows move when the next tile turns. They go to the
//! next structure that closes instead. Every row lands in exactly one grid,
//! and a nested child claims its rows before its parent closes.

use skyway_core::RingDeque;

use super::addons::AddonsExecutor;
use crate::builder::TileBuilder;
use crate::command::{AddonOp, Command, CommandBuffer, LandscapeOp};
use crate::config::TrackConfig;
use crate::error::{TrackError, TrackResult};
use crate::structure::{AddonEmitter, LandscapeEmitter, Structure};

/// A structure whose landscape is being generated.
struct OpenStructure {
    structure: Box<dyn Structure>,
    first_tile_id: u64,
}

/// Geometry opcodes and structure scheduling.
pub struct LandscapeExecutor {
    builder: TileBuilder,
    grid_columns: usize,
    claimed_tile: u64,
    waiting: RingDeque<Box<dyn Structure>>,
    nested: RingDeque<Box<dyn Structure>>,
    open: Vec<OpenStructure>,
    scratch: Vec<Command>,
    children: Vec<Box<dyn Structure>>,
}

impl LandscapeExecutor {
    /// Creates the executor and its tile builder.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidConfig`] if the config does not validate.
    pub fn new(config: &TrackConfig) -> TrackResult<Self> {
        Ok(Self {
            builder: TileBuilder::new(config)?,
            grid_columns: config.grid_columns,
            claimed_tile: 0,
            waiting: RingDeque::new(config.max_waiting_structures),
            nested: RingDeque::new(config.max_waiting_structures),
            open: Vec::new(),
            scratch: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Queues a structure behind every other waiting one.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Capacity`] if the waiting queue is full.
    pub fn enqueue(&mut self, structure: Box<dyn Structure>) -> TrackResult<()> {
        self.waiting
            .push_back(structure)
            .map_err(TrackError::capacity("waiting structure"))
    }

    /// Whether any structure waits to be opened.
    #[inline]
    #[must_use]
    pub const fn has_waiting(&self) -> bool {
        !self.waiting.is_empty()
    }

    /// Number of structures waiting to be opened.
    #[inline]
    #[must_use]
    pub const fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    /// Depth of the open-structure stack.
    #[inline]
    #[must_use]
    pub fn open_depth(&self) -> usize {
        self.open.len()
    }

    /// The tile builder.
    #[inline]
    #[must_use]
    pub const fn builder(&self) -> &TileBuilder {
        &self.builder
    }

    /// The tile builder, mutably.
    #[inline]
    pub fn builder_mut(&mut self) -> &mut TileBuilder {
        &mut self.builder
    }

    /// Executes one opcode.
    ///
    /// # Errors
    ///
    /// Propagates builder errors and command-buffer overflow, and returns
    /// [`TrackError::NoWaitingStructure`] or [`TrackError::NoOpenStructure`]
    /// on unbalanced structure opcodes.
    pub fn execute(
        &mut self,
        op: LandscapeOp,
        commands: &mut CommandBuffer,
        addons: &mut AddonsExecutor,
    ) -> TrackResult<()> {
        match op {
            LandscapeOp::SetHorizontalAngle(angle) => self.builder.set_horizontal_angle(angle),
            LandscapeOp::AddHorizontalAngle(delta) => self.builder.add_horizontal_angle(delta),
            LandscapeOp::SetVerticalAngle(angle) => self.builder.set_vertical_angle(angle),
            LandscapeOp::AddVerticalAngle(delta) => self.builder.add_vertical_angle(delta),
            LandscapeOp::AddSegment => self.builder.add_segment(false)?,
            LandscapeOp::AddEmptySegment => self.builder.add_segment(true)?,
            LandscapeOp::Lift(height) => self.builder.lift(height),
            LandscapeOp::StartStructure => self.start_structure(commands)?,
            LandscapeOp::FinishStructure => self.finish_structure(commands, addons)?,
        }
        Ok(())
    }

    fn start_structure(&mut self, commands: &mut CommandBuffer) -> TrackResult<()> {
        let structure = match self.nested.pop_front() {
            Some(child) => child,
            None => self.waiting.pop_front().ok_or(TrackError::NoWaitingStructure)?,
        };
        let first_tile_id = self.builder.next_id();

        self.scratch.clear();
        self.children.clear();
        structure.emit_landscape(&mut LandscapeEmitter::new(&mut self.scratch, &mut self.children));
        self.scratch.push(Command::Landscape(LandscapeOp::FinishStructure));
        commands.insert_front_batch(&self.scratch)?;

        // Children of this structure run before any child announced earlier
        for child in self.children.drain(..).rev() {
            self.nested
                .push_front(child)
                .map_err(TrackError::capacity("nested structure"))?;
        }

        tracing::debug!(
            "Structure open: {} from tile {} (depth {}, {} opcodes, {} waiting)",
            structure.name(),
            first_tile_id,
            self.open.len() + 1,
            self.scratch.len(),
            self.waiting_len()
        );
        self.open.push(OpenStructure {
            structure,
            first_tile_id,
        });
        Ok(())
    }

    fn finish_structure(&mut self, commands: &mut CommandBuffer, addons: &mut AddonsExecutor) -> TrackResult<()> {
        let OpenStructure {
            structure,
            first_tile_id,
        } = self.open.pop().ok_or(TrackError::NoOpenStructure)?;
        // The newest tile is provisional
        let end_tile = self.builder.next_id().saturating_sub(1).max(self.claimed_tile);
        let (row_offset, rows) = self.builder.rows_owned_between(self.claimed_tile, end_tile);
        self.claimed_tile = end_tile;
        let cols = self.grid_columns;

        self.scratch.clear();
        self.scratch.push(Command::Addons(AddonOp::StartStructureAddons {
            row_offset,
            rows,
            cols,
        }));
        let (supply, assets) = addons.supply_parts();
        structure.emit_addons(&mut AddonEmitter::new(&mut self.scratch, supply, assets), rows, cols);
        self.scratch.push(Command::Addons(AddonOp::FinishStructureAddons));
        commands.insert_front_batch(&self.scratch)?;

        tracing::debug!(
            "Structure close: {} opened at tile {}, grid of {} rows up to tile {}",
            structure.name(),
            first_tile_id,
            rows,
            end_tile
        );
        Ok(())
    }
}

impl std::fmt::Debug for LandscapeExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandscapeExecutor")
            .field("builder", &self.builder)
            .field("waiting", &self.waiting.len())
            .field("nested", &self.nested.len())
            .field("open", &self.open.len())
            .field("claimed_tile", &self.claimed_tile)
            .finish()
    }
}
