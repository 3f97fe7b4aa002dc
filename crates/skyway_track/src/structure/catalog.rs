//! Stock structures.
//!
//! Addon patterns only ask for what the handed grid can hold; a structure
//! whose tiles produced no rows places nothing.

use super::{AddonEmitter, LandscapeEmitter, Structure};
use crate::addon::AddonKind;

/// Rows per hazard on a straight.
const STRAIGHT_HAZARD_STRIDE: usize = 8;

/// Longest coin lane on a straight, in rows.
const COIN_LANE_ROWS: usize = 4;

/// Rows per saw on a slope.
const SLOPE_SAW_STRIDE: usize = 6;

/// Flat run of tiles with a coin lane and scattered hazards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Straight {
    /// Tiles to lay.
    pub tiles: usize,
}

impl Straight {
    /// Creates a straight of `tiles` tiles.
    #[must_use]
    pub const fn new(tiles: usize) -> Self {
        Self { tiles }
    }
}

impl Structure for Straight {
    fn name(&self) -> &str {
        "straight"
    }

    fn emit_landscape(&self, out: &mut LandscapeEmitter<'_>) {
        out.segments(self.tiles);
    }

    fn emit_addons(&self, out: &mut AddonEmitter<'_>, rows: usize, cols: usize) {
        if rows == 0 || cols == 0 {
            return;
        }
        out.reserve_random_vertical(AddonKind::Coin, rows.min(COIN_LANE_ROWS));

        // Single cells: the coin lane leaves at least `rows - 4` of them free
        for i in 0..rows / STRAIGHT_HAZARD_STRIDE {
            let kind = if i % 2 == 0 {
                AddonKind::Spikes
            } else {
                AddonKind::Barrier
            };
            out.reserve_random_horizontal(kind, 1);
        }
    }
}

/// Constant-rate turn. Positive `delta` steers right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Curve {
    /// Tiles to lay.
    pub tiles: usize,
    /// Turn per tile in radians.
    pub delta: f32,
}

impl Curve {
    /// Creates a curve turning `delta` radians per tile.
    #[must_use]
    pub const fn new(tiles: usize, delta: f32) -> Self {
        Self { tiles, delta }
    }
}

impl Structure for Curve {
    fn name(&self) -> &str {
        "curve"
    }

    fn emit_landscape(&self, out: &mut LandscapeEmitter<'_>) {
        for _ in 0..self.tiles {
            out.add_horizontal_angle(self.delta).segment();
        }
    }

    fn emit_addons(&self, out: &mut AddonEmitter<'_>, rows: usize, cols: usize) {
        if rows == 0 || cols == 0 {
            return;
        }
        out.reserve_horizontal(AddonKind::Coin, rows / 2, 0, cols);
    }
}

/// Pitched run that levels out afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slope {
    /// Tiles to lay.
    pub tiles: usize,
    /// Pitch in radians, positive climbs.
    pub angle: f32,
}

impl Slope {
    /// Creates a slope.
    #[must_use]
    pub const fn new(tiles: usize, angle: f32) -> Self {
        Self { tiles, angle }
    }
}

impl Structure for Slope {
    fn name(&self) -> &str {
        "slope"
    }

    fn emit_landscape(&self, out: &mut LandscapeEmitter<'_>) {
        out.set_vertical_angle(self.angle)
            .segments(self.tiles)
            .set_vertical_angle(0.0);
    }

    fn emit_addons(&self, out: &mut AddonEmitter<'_>, rows: usize, cols: usize) {
        if cols == 0 {
            return;
        }
        for _ in 0..rows / SLOPE_SAW_STRIDE {
            out.reserve_random_vertical(AddonKind::Saw, 1);
        }
    }
}

/// Tiles raised one step each, with a boost on the first step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Staircase {
    /// Number of steps (one tile each).
    pub steps: usize,
    /// Height of every step.
    pub rise: f32,
}

impl Staircase {
    /// Creates a staircase.
    #[must_use]
    pub const fn new(steps: usize, rise: f32) -> Self {
        Self { steps, rise }
    }
}

impl Structure for Staircase {
    fn name(&self) -> &str {
        "staircase"
    }

    fn emit_landscape(&self, out: &mut LandscapeEmitter<'_>) {
        for _ in 0..self.steps {
            out.lift(self.rise).segment();
        }
    }

    fn emit_addons(&self, out: &mut AddonEmitter<'_>, rows: usize, cols: usize) {
        if rows == 0 || cols == 0 {
            return;
        }
        out.reserve_vertical(AddonKind::Boost, 0, cols / 2, 1);
    }
}

/// Run of empty tiles the player has to jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gap {
    /// Empty tiles to lay.
    pub tiles: usize,
}

impl Gap {
    /// Creates a gap.
    #[must_use]
    pub const fn new(tiles: usize) -> Self {
        Self { tiles }
    }
}

impl Structure for Gap {
    fn name(&self) -> &str {
        "gap"
    }

    fn emit_landscape(&self, out: &mut LandscapeEmitter<'_>) {
        for _ in 0..self.tiles {
            out.empty_segment();
        }
    }

    fn emit_addons(&self, _out: &mut AddonEmitter<'_>, _rows: usize, _cols: usize) {}
}

/// S-bend: two opposite curves between single straight tiles. Ends on the
/// heading it started with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chicane {
    /// Tiles per curve.
    pub tiles: usize,
    /// Turn per tile of the first curve.
    pub delta: f32,
}

impl Chicane {
    /// Creates a chicane.
    #[must_use]
    pub const fn new(tiles: usize, delta: f32) -> Self {
        Self { tiles, delta }
    }
}

impl Structure for Chicane {
    fn name(&self) -> &str {
        "chicane"
    }

    fn emit_landscape(&self, out: &mut LandscapeEmitter<'_>) {
        out.segment()
            .nest(Box::new(Curve::new(self.tiles, self.delta)))
            .nest(Box::new(Curve::new(self.tiles, -self.delta)))
            .segment();
    }

    fn emit_addons(&self, out: &mut AddonEmitter<'_>, rows: usize, cols: usize) {
        if rows == 0 || cols == 0 {
            return;
        }
        out.reserve_horizontal(AddonKind::Boost, rows - 1, cols / 2, 1);
    }
}
