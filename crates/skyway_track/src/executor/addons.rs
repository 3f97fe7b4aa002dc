//! # Addons Executor
//!
//! Runs grid reservation opcodes and places one addon per accepted run.
//!
//! Only one grid is open at a time. Addons spawned by the structure wait in a
//! FIFO supply and are bound in the order their reservations were requested.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skyway_core::RingDeque;
use skyway_shared::Quad;

use crate::addon::Addon;
use crate::assets::AddonAssets;
use crate::builder::TileBuilder;
use crate::command::AddonOp;
use crate::config::TrackConfig;
use crate::error::{TrackError, TrackResult};
use crate::grid::{GridCreator, GridSegment};
use crate::render::Renderable;

/// Grid reservation and addon placement.
pub struct AddonsExecutor {
    assets: AddonAssets,
    grid: GridCreator,
    grid_active: bool,
    supply: VecDeque<Addon>,
    addons: RingDeque<Addon>,
    rng: ChaCha8Rng,
    addons_placed: u64,
    addons_evicted: u64,
}

impl AddonsExecutor {
    /// Creates the executor with an empty addon ring.
    #[must_use]
    pub fn new(config: &TrackConfig, assets: AddonAssets) -> Self {
        Self {
            assets,
            grid: GridCreator::default(),
            grid_active: false,
            supply: VecDeque::new(),
            addons: RingDeque::new(config.addon_capacity()),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            addons_placed: 0,
            addons_evicted: 0,
        }
    }

    /// Executes one opcode against the rows held by `builder`.
    ///
    /// # Errors
    ///
    /// Propagates grid errors, [`TrackError::NoActiveGrid`],
    /// [`TrackError::GridAlreadyActive`], [`TrackError::SupplyMismatch`] and
    /// addon ring overflow.
    pub fn execute(&mut self, op: AddonOp, builder: &TileBuilder) -> TrackResult<()> {
        match op {
            AddonOp::StartStructureAddons {
                row_offset,
                rows,
                cols,
            } => {
                if self.grid_active {
                    return Err(TrackError::GridAlreadyActive);
                }
                self.grid.reset(rows, cols, row_offset);
                self.grid_active = true;
                tracing::debug!(
                    "Addon phase start: {} rows x {} cols at row {}, {} addons supplied",
                    rows,
                    cols,
                    row_offset,
                    self.supply.len()
                );
                Ok(())
            }
            AddonOp::FinishStructureAddons => {
                self.require_grid()?;
                self.grid_active = false;
                tracing::debug!(
                    "Addon phase finish: {} cells reserved",
                    self.grid.occupied_count()
                );
                if !self.supply.is_empty() {
                    let pending = self.supply.len();
                    self.supply.clear();
                    return Err(TrackError::SupplyMismatch {
                        pending,
                        requested: 0,
                    });
                }
                Ok(())
            }
            AddonOp::ReserveVertical { row, col, length } => {
                self.place(builder, |grid, _| grid.reserve_vertical(row, col, length))
            }
            AddonOp::ReserveHorizontal { row, col, length } => {
                self.place(builder, |grid, _| grid.reserve_horizontal(row, col, length))
            }
            AddonOp::ReserveRandomVertical { length } => self.place(builder, |grid, rng| {
                grid.reserve_random_fitting_vertical(length, rng)
            }),
            AddonOp::ReserveRandomHorizontal { length } => self.place(builder, |grid, rng| {
                grid.reserve_random_fitting_horizontal(length, rng)
            }),
        }
    }

    fn require_grid(&self) -> TrackResult<()> {
        if self.grid_active {
            Ok(())
        } else {
            Err(TrackError::NoActiveGrid)
        }
    }

    /// Reserves a run and binds the next supplied addon to it.
    fn place<F>(&mut self, builder: &TileBuilder, reserve: F) -> TrackResult<()>
    where
        F: FnOnce(&mut GridCreator, &mut ChaCha8Rng) -> TrackResult<GridSegment>,
    {
        self.require_grid()?;
        if self.supply.is_empty() {
            return Err(TrackError::SupplyMismatch {
                pending: 0,
                requested: 1,
            });
        }
        if self.addons.is_full() {
            return Err(TrackError::Capacity {
                buffer: "addon",
                capacity: self.addons.capacity(),
            });
        }

        let segment = reserve(&mut self.grid, &mut self.rng)?;
        let (field, anchor) = field_for(&self.grid, &segment, builder)?;

        let mut addon = self.supply.pop_front().ok_or(TrackError::SupplyMismatch {
            pending: 0,
            requested: 1,
        })?;
        addon.bind(field, anchor)?;
        self.addons
            .push_back(addon)
            .map_err(TrackError::capacity("addon"))?;
        self.addons_placed += 1;
        Ok(())
    }

    /// Evicts every addon anchored on a tile older than `oldest_tile_id`,
    /// keeping the survivors in order. Returns the number evicted.
    ///
    /// Anchors are not sorted, so the whole ring is walked.
    pub fn remove_anchored_before(&mut self, oldest_tile_id: u64) -> usize {
        let mut evicted = 0;
        for _ in 0..self.addons.len() {
            let Some(mut addon) = self.addons.pop_front() else {
                break;
            };
            if addon.anchor_tile_id().is_some_and(|id| id < oldest_tile_id) {
                addon.release_gpu_resources();
                evicted += 1;
            } else if let Err(err) = self.addons.push_back(addon) {
                tracing::warn!("Addon ring rejected a survivor: {}", err);
            }
        }
        self.addons_evicted += evicted as u64;
        evicted
    }

    /// The shared assets and the supply queue a structure fills.
    pub fn supply_parts(&mut self) -> (&mut VecDeque<Addon>, &AddonAssets) {
        (&mut self.supply, &self.assets)
    }

    /// Whether a grid is open.
    #[inline]
    #[must_use]
    pub const fn grid_active(&self) -> bool {
        self.grid_active
    }

    /// The grid of the current (or last) addon phase.
    #[inline]
    #[must_use]
    pub const fn grid(&self) -> &GridCreator {
        &self.grid
    }

    /// Addons waiting for their reservation.
    #[inline]
    #[must_use]
    pub fn pending_supply(&self) -> usize {
        self.supply.len()
    }

    /// Number of live addons.
    #[inline]
    #[must_use]
    pub const fn addon_count(&self) -> usize {
        self.addons.len()
    }

    /// Live addon by index, 0 = oldest.
    #[inline]
    #[must_use]
    pub fn addon(&self, index: usize) -> Option<&Addon> {
        self.addons.get(index)
    }

    /// Live addons, oldest first.
    pub fn addons(&self) -> impl DoubleEndedIterator<Item = &Addon> + '_ {
        self.addons.iter()
    }

    /// Live addons, mutably.
    pub fn addons_mut(&mut self) -> impl Iterator<Item = &mut Addon> + '_ {
        self.addons.iter_mut()
    }

    /// Addons placed over the executor's lifetime.
    #[inline]
    #[must_use]
    pub const fn addons_placed(&self) -> u64 {
        self.addons_placed
    }

    /// Addons evicted over the executor's lifetime.
    #[inline]
    #[must_use]
    pub const fn addons_evicted(&self) -> u64 {
        self.addons_evicted
    }
}

impl std::fmt::Debug for AddonsExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddonsExecutor")
            .field("grid_active", &self.grid_active)
            .field("supply", &self.supply.len())
            .field("addons", &self.addons.len())
            .finish()
    }
}

/// Field covered by a reserved run: from the near line of its first row to
/// the far line of its last row, narrowed to its lanes.
#[allow(clippy::cast_precision_loss)]
fn field_for(grid: &GridCreator, segment: &GridSegment, builder: &TileBuilder) -> TrackResult<(Quad, u64)> {
    let first = builder.row(grid.absolute_row(segment.row))?;
    let last = builder.row(grid.absolute_row(segment.last_row()))?;

    let span = Quad::new(first.prev_left, first.prev_right, last.left, last.right);
    let (from, to) = segment.col_span();
    let lanes = grid.cols() as f32;
    Ok((
        span.lateral_band(from as f32 / lanes, to as f32 / lanes),
        first.tile_id,
    ))
}
