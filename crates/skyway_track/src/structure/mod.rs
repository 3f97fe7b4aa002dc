//! # Structures
//!
//! A structure is a recipe for a stretch of ribbon plus the addons on it.
//!
//! Structures are lazy. When the dispatcher opens one it calls
//! [`Structure::emit_landscape`], which only queues opcodes. Once those
//! opcodes have run, [`Structure::emit_addons`] is handed a grid sized to the
//! rows the structure actually produced and queues its reservations.
//!
//! A structure may splice other structures into its own landscape with
//! [`LandscapeEmitter::nest`]; the child expands in place when its start
//! opcode is reached.

mod catalog;

use std::collections::VecDeque;

use crate::addon::{Addon, AddonKind};
use crate::assets::AddonAssets;
use crate::command::{AddonOp, Command, LandscapeOp};

pub use catalog::{Chicane, Curve, Gap, Slope, Staircase, Straight};

/// A generator for a fixed run of tiles and their addons.
pub trait Structure {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Queues the landscape opcodes for this structure.
    fn emit_landscape(&self, out: &mut LandscapeEmitter<'_>);

    /// Queues addon reservations against a `rows x cols` grid covering this
    /// structure's rows. Requests must fit the grid.
    fn emit_addons(&self, out: &mut AddonEmitter<'_>, rows: usize, cols: usize);
}

/// Collects a structure's landscape opcodes.
pub struct LandscapeEmitter<'a> {
    ops: &'a mut Vec<Command>,
    children: &'a mut Vec<Box<dyn Structure>>,
}

impl<'a> LandscapeEmitter<'a> {
    /// Wraps pooled scratch storage.
    pub fn new(ops: &'a mut Vec<Command>, children: &'a mut Vec<Box<dyn Structure>>) -> Self {
        Self { ops, children }
    }

    fn push(&mut self, op: LandscapeOp) -> &mut Self {
        self.ops.push(Command::Landscape(op));
        self
    }

    /// Sets the cumulative heading of the next tile.
    pub fn set_horizontal_angle(&mut self, angle: f32) -> &mut Self {
        self.push(LandscapeOp::SetHorizontalAngle(angle))
    }

    /// Turns the next tile.
    pub fn add_horizontal_angle(&mut self, delta: f32) -> &mut Self {
        self.push(LandscapeOp::AddHorizontalAngle(delta))
    }

    /// Sets the pitch.
    pub fn set_vertical_angle(&mut self, angle: f32) -> &mut Self {
        self.push(LandscapeOp::SetVerticalAngle(angle))
    }

    /// Changes the pitch.
    pub fn add_vertical_angle(&mut self, delta: f32) -> &mut Self {
        self.push(LandscapeOp::AddVerticalAngle(delta))
    }

    /// Appends a surface tile.
    pub fn segment(&mut self) -> &mut Self {
        self.push(LandscapeOp::AddSegment)
    }

    /// Appends `count` surface tiles.
    pub fn segments(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.segment();
        }
        self
    }

    /// Appends a gap.
    pub fn empty_segment(&mut self) -> &mut Self {
        self.push(LandscapeOp::AddEmptySegment)
    }

    /// Raises the next tile.
    pub fn lift(&mut self, height: f32) -> &mut Self {
        self.push(LandscapeOp::Lift(height))
    }

    /// Splices `child` in at this point of the landscape.
    pub fn nest(&mut self, child: Box<dyn Structure>) -> &mut Self {
        self.children.push(child);
        self.push(LandscapeOp::StartStructure)
    }
}

/// Collects a structure's reservations, spawning the addon each one places.
pub struct AddonEmitter<'a> {
    ops: &'a mut Vec<Command>,
    supply: &'a mut VecDeque<Addon>,
    assets: &'a AddonAssets,
}

impl<'a> AddonEmitter<'a> {
    /// Wraps pooled scratch storage and the executor's supply queue.
    pub fn new(ops: &'a mut Vec<Command>, supply: &'a mut VecDeque<Addon>, assets: &'a AddonAssets) -> Self {
        Self { ops, supply, assets }
    }

    fn push(&mut self, kind: AddonKind, op: AddonOp) -> &mut Self {
        self.supply.push_back(self.assets.spawn(kind));
        self.ops.push(Command::Addons(op));
        self
    }

    /// Places `kind` over `length` rows of column `col`, from `row`.
    pub fn reserve_vertical(&mut self, kind: AddonKind, row: usize, col: usize, length: usize) -> &mut Self {
        self.push(kind, AddonOp::ReserveVertical { row, col, length })
    }

    /// Places `kind` over `length` columns of row `row`, from `col`.
    pub fn reserve_horizontal(&mut self, kind: AddonKind, row: usize, col: usize, length: usize) -> &mut Self {
        self.push(kind, AddonOp::ReserveHorizontal { row, col, length })
    }

    /// Places `kind` over any free vertical run of `length`.
    pub fn reserve_random_vertical(&mut self, kind: AddonKind, length: usize) -> &mut Self {
        self.push(kind, AddonOp::ReserveRandomVertical { length })
    }

    /// Places `kind` over any free horizontal run of `length`.
    pub fn reserve_random_horizontal(&mut self, kind: AddonKind, length: usize) -> &mut Self {
        self.push(kind, AddonOp::ReserveRandomHorizontal { length })
    }
}
