//! # Tile Builder
//!
//! Continues the ribbon one tile at a time and keeps the edge-point, row and
//! history streams in step with the tile ring.
//!
//! ## Continuation
//!
//! Every tile's far edge is provisional. Adding a tile retracts the previous
//! one and re-adds it with its far edge moved onto the new tile's near edge,
//! so the pair stays welded through turns. A turn pivots the near edge about
//! its right corner; the forward vector is the lateral vector rotated a
//! quarter turn about +Y and pitched by the vertical angle.
//!
//! ## Rows
//!
//! Both lateral edges are sampled every `row_spacing` world units. Leftover
//! distance carries across tiles, so the spacing never resets at a tile
//! boundary. A row line joins the next point on each edge; when one edge
//! lags the other by more than half a spacing along the tile heading (the
//! outer edge of a turn is longer), its points are skipped until the line is
//! lateral again. Each pair of consecutive row lines is one [`RowInfo`]. A
//! run is broken (and a new one started flush with the near edge) after a gap
//! or a lift.
//!
//! ## Rollback
//!
//! [`SegmentHistory`] records exactly what each tile pushed so the most recent
//! tile can be taken back without a trace.

use std::f32::consts::FRAC_PI_2;

use skyway_core::{OverflowBuffer, RingDeque};
use skyway_shared::{Quad, Vec3, GEOMETRY_EPSILON};

use crate::config::TrackConfig;
use crate::error::{TrackError, TrackResult};
use crate::render::Renderable;
use crate::tile::Tile;

/// One row of the addon grid: the strip between two consecutive row lines.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RowInfo {
    /// Tile that completed the row.
    pub tile_id: u64,
    /// Left point of the previous row line.
    pub prev_left: Vec3,
    /// Right point of the previous row line.
    pub prev_right: Vec3,
    /// Left point of this row line.
    pub left: Vec3,
    /// Right point of this row line.
    pub right: Vec3,
}

impl RowInfo {
    /// The four corners of the row as a field.
    #[inline]
    #[must_use]
    pub const fn field(&self) -> Quad {
        Quad::new(self.prev_left, self.prev_right, self.left, self.right)
    }
}

/// Sampling state carried from one tile to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RowCursor {
    /// Distance walked along the left edge since its last point.
    pub left_leftover: f32,
    /// Distance walked along the right edge since its last point.
    pub right_leftover: f32,
    /// Sequence number of the left point on the last row line.
    pub left_line: u64,
    /// Sequence number of the right point on the last row line.
    pub right_line: u64,
}

/// What a tile pushed into the point and row streams.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Contribution {
    /// A gap. Contributes nothing and has nothing to undo.
    #[default]
    Gap,
    /// A surface tile.
    Ribbon {
        /// Left points pushed.
        left_points: u64,
        /// Right points pushed.
        right_points: u64,
        /// Rows pushed.
        rows: u64,
        /// Cursor before the tile was sampled.
        cursor_before: RowCursor,
        /// Whether the tile opened a new row run.
        bridged: bool,
    },
}

/// Per-tile undo record.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SegmentHistory {
    /// Provisional far edge of the predecessor before this tile confirmed it.
    pub predecessor_far: [Vec3; 2],
    /// Cumulative horizontal angle before this tile's turn.
    pub horizontal_angle: f32,
    /// Stream contribution.
    pub contribution: Contribution,
}

impl SegmentHistory {
    const fn bridged(&self) -> bool {
        matches!(self.contribution, Contribution::Ribbon { bridged: true, .. })
    }
}

/// The geometric engine.
///
/// # Example
///
/// ```rust,ignore
/// let mut builder = TileBuilder::new(&TrackConfig::default())?;
/// builder.add_horizontal_angle(0.1);
/// builder.add_segment(false)?;
/// assert_eq!(builder.tile_count(), 2);
/// ```
pub struct TileBuilder {
    segment_length: f32,
    row_spacing: f32,
    eviction_horizon: u64,

    tiles: RingDeque<Tile>,
    left_points: OverflowBuffer<Vec3>,
    right_points: OverflowBuffer<Vec3>,
    rows: OverflowBuffer<RowInfo>,
    history: OverflowBuffer<SegmentHistory>,
    cursor: RowCursor,

    pending_horizontal: f32,
    horizontal_angle: f32,
    vertical_angle: f32,
    pending_lift: f32,
    next_id: u64,
    rollback_armed: bool,

    tiles_built: u64,
    tiles_evicted: u64,
    rollbacks: u64,
}

impl TileBuilder {
    /// Allocates every buffer and lays the guardian tile (id 0) at the
    /// origin, heading +Z.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidConfig`] if the config does not validate.
    pub fn new(config: &TrackConfig) -> TrackResult<Self> {
        config.validate()?;

        let mut builder = Self {
            segment_length: config.segment_length,
            row_spacing: config.row_spacing,
            eviction_horizon: config.eviction_horizon,
            tiles: RingDeque::new(config.tile_capacity()),
            left_points: OverflowBuffer::new(config.edge_point_capacity()),
            right_points: OverflowBuffer::new(config.edge_point_capacity()),
            rows: OverflowBuffer::new(config.row_capacity()),
            history: OverflowBuffer::new(config.history_capacity()),
            cursor: RowCursor::default(),
            pending_horizontal: 0.0,
            horizontal_angle: 0.0,
            vertical_angle: 0.0,
            pending_lift: 0.0,
            next_id: 0,
            rollback_armed: false,
            tiles_built: 0,
            tiles_evicted: 0,
            rollbacks: 0,
        };

        let half = config.ribbon_width * 0.5;
        let near_left = Vec3::new(-half, 0.0, 0.0);
        let near_right = Vec3::new(half, 0.0, 0.0);
        let forward = Vec3::Z * config.segment_length;
        let guardian = Tile::new(
            0,
            Quad::new(near_left, near_right, near_left + forward, near_right + forward),
            false,
        );
        builder.commit(guardian, true, [near_left, near_right], 0.0)?;
        builder.next_id = 1;
        builder.tiles_built = 1;

        Ok(builder)
    }

    // ------------------------------------------------------------------
    // Steering
    // ------------------------------------------------------------------

    /// Turns the next tile so the cumulative heading becomes `angle`
    /// radians. Positive angles steer right.
    pub fn set_horizontal_angle(&mut self, angle: f32) {
        self.pending_horizontal = angle - self.horizontal_angle;
    }

    /// Adds `delta` radians of turn to the next tile.
    pub fn add_horizontal_angle(&mut self, delta: f32) {
        self.pending_horizontal += delta;
    }

    /// Sets the pitch of every following tile. Positive angles climb.
    pub fn set_vertical_angle(&mut self, angle: f32) {
        self.vertical_angle = angle;
    }

    /// Adds to the pitch of every following tile.
    pub fn add_vertical_angle(&mut self, delta: f32) {
        self.vertical_angle += delta;
    }

    /// Raises the next tile by `height`, leaving a step behind it.
    pub fn lift(&mut self, height: f32) {
        self.pending_lift += height;
    }

    // ------------------------------------------------------------------
    // Continuation
    // ------------------------------------------------------------------

    /// Appends a tile (a gap if `is_empty`) and confirms its predecessor.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Capacity`] if the tile ring is full. Nothing is
    /// modified in that case.
    pub fn add_segment(&mut self, is_empty: bool) -> TrackResult<()> {
        if self.tiles.is_full() {
            return Err(TrackError::Capacity {
                buffer: "tile",
                capacity: self.tiles.capacity(),
            });
        }
        let last = self.tiles.back().ok_or(TrackError::EmptyTrack)?;
        let provisional_far = [last.far_left(), last.far_right()];
        let previous_forward = last.forward();

        let near_right = last.far_right();
        let near_left = near_right - (near_right - last.far_left()).rotate_y(self.pending_horizontal);

        let heading = (near_right - near_left)
            .flatten()
            .rotate_y(-FRAC_PI_2)
            .try_normalize()
            .unwrap_or_else(|| {
                tracing::warn!(
                    "Degenerate lateral edge after tile {}, continuing straight",
                    self.next_id - 1
                );
                previous_forward.flatten().try_normalize().unwrap_or(Vec3::Z)
            });
        let (sin, cos) = self.vertical_angle.sin_cos();
        let forward = (heading * cos + Vec3::Y * sin) * self.segment_length;

        // Confirm the predecessor onto the new near edge
        let (previous, previous_history) = self.retract()?;
        let follows_gap = previous.is_empty();
        self.commit(
            previous.with_far_edge(near_left, near_right),
            previous_history.bridged(),
            previous_history.predecessor_far,
            previous_history.horizontal_angle,
        )?;

        let lift = Vec3::Y * self.pending_lift;
        let lifted = self.pending_lift.abs() > GEOMETRY_EPSILON;
        let outline = Quad::new(
            near_left + lift,
            near_right + lift,
            near_left + forward + lift,
            near_right + forward + lift,
        );
        let bridged = !is_empty && (follows_gap || lifted);
        self.commit(
            Tile::new(self.next_id, outline, is_empty),
            bridged,
            provisional_far,
            self.horizontal_angle,
        )?;

        self.horizontal_angle += self.pending_horizontal;
        self.pending_horizontal = 0.0;
        self.pending_lift = 0.0;
        self.next_id += 1;
        self.tiles_built += 1;
        self.rollback_armed = true;
        Ok(())
    }

    /// Takes back the most recent tile and restores the predecessor's
    /// provisional far edge. The id is reissued to the next tile.
    ///
    /// One-shot turn and lift deltas consumed by the retracted tile are not
    /// re-armed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::RollbackDepth`] on a second consecutive rollback
    /// and [`TrackError::EmptyTrack`] if fewer than two tiles (or their undo
    /// records) are resident. Nothing is modified on error.
    pub fn rollback_last(&mut self) -> TrackResult<()> {
        if !self.rollback_armed {
            return Err(TrackError::RollbackDepth);
        }
        if self.tiles.len() < 2 || self.history.len() < 2 {
            return Err(TrackError::EmptyTrack);
        }

        let (mut retracted, history) = self.retract()?;
        retracted.release_gpu_resources();

        let (previous, previous_history) = self.retract()?;
        let [far_left, far_right] = history.predecessor_far;
        self.commit(
            previous.with_far_edge(far_left, far_right),
            previous_history.bridged(),
            previous_history.predecessor_far,
            previous_history.horizontal_angle,
        )?;

        self.horizontal_angle = history.horizontal_angle;
        self.next_id = retracted.id();
        self.rollback_armed = false;
        self.rollbacks += 1;
        Ok(())
    }

    /// Evicts tiles more than the eviction horizon behind `player_tile_id`.
    /// The newest tile always survives.
    ///
    /// Returns the number of evicted tiles.
    pub fn remove_old_tiles(&mut self, player_tile_id: u64) -> usize {
        let mut evicted = 0;
        while self.tiles.len() > 1 {
            let Some(front) = self.tiles.get_mut(0) else {
                break;
            };
            if player_tile_id.saturating_sub(front.id()) <= self.eviction_horizon {
                break;
            }
            front.release_gpu_resources();
            self.tiles.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            tracing::debug!(
                "Evicted {} tiles behind player tile {}",
                evicted,
                player_tile_id
            );
        }
        self.tiles_evicted += evicted as u64;
        evicted
    }

    /// Pops the newest tile and everything it pushed.
    fn retract(&mut self) -> TrackResult<(Tile, SegmentHistory)> {
        let tile = self.tiles.pop_back().ok_or(TrackError::EmptyTrack)?;
        let history = self.history.pop_back().ok_or(TrackError::EmptyTrack)?;

        if let Contribution::Ribbon {
            left_points,
            right_points,
            rows,
            cursor_before,
            ..
        } = history.contribution
        {
            for _ in 0..left_points {
                self.left_points.pop_back();
            }
            for _ in 0..right_points {
                self.right_points.pop_back();
            }
            for _ in 0..rows {
                self.rows.pop_back();
            }
            self.cursor = cursor_before;
        }
        Ok((tile, history))
    }

    /// Pushes a tile, samples its edges and records its history.
    fn commit(
        &mut self,
        tile: Tile,
        bridged: bool,
        predecessor_far: [Vec3; 2],
        horizontal_angle: f32,
    ) -> TrackResult<()> {
        let contribution = if tile.is_empty() {
            Contribution::Gap
        } else {
            self.sample(&tile, bridged)?
        };
        self.tiles
            .push_back(tile)
            .map_err(TrackError::capacity("tile"))?;
        self.history.push(SegmentHistory {
            predecessor_far,
            horizontal_angle,
            contribution,
        });
        Ok(())
    }

    fn sample(&mut self, tile: &Tile, bridged: bool) -> TrackResult<Contribution> {
        let cursor_before = self.cursor;
        let left_before = self.left_points.total();
        let right_before = self.right_points.total();
        let rows_before = self.rows.total();

        if bridged {
            self.cursor = RowCursor {
                left_leftover: 0.0,
                right_leftover: 0.0,
                left_line: left_before,
                right_line: right_before,
            };
            self.left_points.push(tile.near_left());
            self.right_points.push(tile.near_right());
        }

        self.cursor.left_leftover = sample_edge(
            &mut self.left_points,
            tile.near_left(),
            tile.far_left(),
            self.row_spacing,
            self.cursor.left_leftover,
        );
        self.cursor.right_leftover = sample_edge(
            &mut self.right_points,
            tile.near_right(),
            tile.far_right(),
            self.row_spacing,
            self.cursor.right_leftover,
        );
        let heading = tile.forward().try_normalize().unwrap_or(Vec3::Z);
        self.emit_rows(tile.id(), heading)?;

        Ok(Contribution::Ribbon {
            left_points: self.left_points.total() - left_before,
            right_points: self.right_points.total() - right_before,
            rows: self.rows.total() - rows_before,
            cursor_before,
            bridged,
        })
    }

    /// Closes row lines across the current run until an edge runs out.
    ///
    /// A line that would need a point the next tile has not sampled yet waits
    /// for that tile.
    fn emit_rows(&mut self, owner: u64, heading: Vec3) -> TrackResult<()> {
        let tolerance = self.row_spacing * 0.5;
        loop {
            let mut left_seq = self.cursor.left_line + 1;
            let mut right_seq = self.cursor.right_line + 1;
            loop {
                if left_seq >= self.left_points.total() || right_seq >= self.right_points.total() {
                    return Ok(());
                }
                let left = point(&self.left_points, left_seq)?;
                let lead = (left - point(&self.right_points, right_seq)?).dot(heading);
                if lead > tolerance {
                    right_seq += 1;
                } else if lead < -tolerance {
                    left_seq += 1;
                } else {
                    break;
                }
            }

            let row = RowInfo {
                tile_id: owner,
                prev_left: point(&self.left_points, self.cursor.left_line)?,
                prev_right: point(&self.right_points, self.cursor.right_line)?,
                left: point(&self.left_points, left_seq)?,
                right: point(&self.right_points, right_seq)?,
            };
            self.rows.push(row);
            self.cursor.left_line = left_seq;
            self.cursor.right_line = right_seq;
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Number of live tiles.
    #[inline]
    #[must_use]
    pub const fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Live tile by index, 0 = oldest.
    #[inline]
    #[must_use]
    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// The newest tile.
    #[inline]
    #[must_use]
    pub fn last_tile(&self) -> Option<&Tile> {
        self.tiles.back()
    }

    /// Live tiles, oldest first.
    pub fn tiles(&self) -> impl DoubleEndedIterator<Item = &Tile> + '_ {
        self.tiles.iter()
    }

    /// Live tiles, mutably.
    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> + '_ {
        self.tiles.iter_mut()
    }

    /// Id the next tile will receive.
    #[inline]
    #[must_use]
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Rows ever completed (= sequence number of the next row).
    #[inline]
    #[must_use]
    pub const fn row_total(&self) -> u64 {
        self.rows.total()
    }

    /// Row by sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::RowUnavailable`] if the row was overwritten or
    /// not built yet.
    pub fn row(&self, seq: u64) -> TrackResult<&RowInfo> {
        self.rows.get(seq).ok_or(TrackError::RowUnavailable(seq))
    }

    /// Range of rows owned by tiles with ids in `first_tile_id..end_tile_id`,
    /// as `(first sequence number, count)`.
    #[must_use]
    pub fn rows_owned_between(&self, first_tile_id: u64, end_tile_id: u64) -> (u64, usize) {
        let mut end = self.rows.total();
        while end > self.rows.oldest() {
            match self.rows.get(end - 1) {
                Some(row) if row.tile_id >= end_tile_id => end -= 1,
                _ => break,
            }
        }
        let mut start = end;
        while start > self.rows.oldest() {
            match self.rows.get(start - 1) {
                Some(row) if row.tile_id >= first_tile_id => start -= 1,
                _ => break,
            }
        }
        (start, usize::try_from(end - start).unwrap_or(usize::MAX))
    }

    /// Left points ever sampled.
    #[inline]
    #[must_use]
    pub const fn left_point_total(&self) -> u64 {
        self.left_points.total()
    }

    /// Right points ever sampled.
    #[inline]
    #[must_use]
    pub const fn right_point_total(&self) -> u64 {
        self.right_points.total()
    }

    /// Left point by sequence number.
    #[must_use]
    pub fn left_point(&self, seq: u64) -> Option<Vec3> {
        self.left_points.get(seq).copied()
    }

    /// Right point by sequence number.
    #[must_use]
    pub fn right_point(&self, seq: u64) -> Option<Vec3> {
        self.right_points.get(seq).copied()
    }

    /// Resident history entries.
    #[inline]
    #[must_use]
    pub const fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Cumulative applied horizontal angle in radians.
    #[inline]
    #[must_use]
    pub const fn horizontal_angle(&self) -> f32 {
        self.horizontal_angle
    }

    /// Current pitch in radians.
    #[inline]
    #[must_use]
    pub const fn vertical_angle(&self) -> f32 {
        self.vertical_angle
    }

    /// Tiles created over the builder's lifetime (the guardian included).
    #[inline]
    #[must_use]
    pub const fn tiles_built(&self) -> u64 {
        self.tiles_built
    }

    /// Tiles evicted by distance trim.
    #[inline]
    #[must_use]
    pub const fn tiles_evicted(&self) -> u64 {
        self.tiles_evicted
    }

    /// Successful calls to [`TileBuilder::rollback_last`].
    #[inline]
    #[must_use]
    pub const fn rollbacks(&self) -> u64 {
        self.rollbacks
    }
}

impl std::fmt::Debug for TileBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileBuilder")
            .field("tiles", &self.tiles.len())
            .field("next_id", &self.next_id)
            .field("rows", &self.rows.total())
            .field("horizontal_angle", &self.horizontal_angle)
            .field("vertical_angle", &self.vertical_angle)
            .finish()
    }
}

fn point(points: &OverflowBuffer<Vec3>, seq: u64) -> TrackResult<Vec3> {
    points.get(seq).copied().ok_or(TrackError::Capacity {
        buffer: "edge point",
        capacity: points.capacity(),
    })
}

/// Samples one edge from `from` to `to`, `leftover` units after the last
/// point. Returns the new leftover.
///
/// Positions are computed as `first + k * spacing` from the edge start, so
/// rounding does not accumulate within an edge.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_edge(points: &mut OverflowBuffer<Vec3>, from: Vec3, to: Vec3, spacing: f32, leftover: f32) -> f32 {
    let length = from.distance(to);
    let Some(direction) = (to - from).try_normalize() else {
        return leftover + length;
    };
    let first = (spacing - leftover).max(0.0);
    if first > length + GEOMETRY_EPSILON {
        return leftover + length;
    }

    let steps = ((length - first) / spacing + GEOMETRY_EPSILON).floor().max(0.0) as u64;
    for k in 0..=steps {
        let distance = (first + k as f32 * spacing).min(length);
        points.push(from + direction * distance);
    }
    let last = first + steps as f32 * spacing;
    (length - last).max(0.0)
}
