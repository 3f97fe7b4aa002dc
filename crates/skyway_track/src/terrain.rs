//! # Terrain
//!
//! The facade the game loop talks to.
//!
//! ```rust,ignore
//! let mut terrain = Terrain::new(&TrackConfig::production(), assets)?;
//! terrain.enqueue_structure(Box::new(Straight::new(5)))?;
//!
//! // Every frame
//! terrain.generate_chunks(Budget::Ops(16))?;
//! terrain.remove_old_tiles(player_tile_id);
//! terrain.draw(&mut renderer, &view_projection);
//! ```

use skyway_shared::{Mat4, Vec3};

use crate::addon::Addon;
use crate::assets::AddonAssets;
use crate::builder::TileBuilder;
use crate::command::Budget;
use crate::config::TrackConfig;
use crate::error::TrackResult;
use crate::executor::Dispatcher;
use crate::render::{RenderSink, Renderable};
use crate::structure::Structure;
use crate::tile::Tile;

/// Lifetime counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackStats {
    /// Tiles created, guardian included.
    pub tiles_built: u64,
    /// Tiles evicted behind the player.
    pub tiles_evicted: u64,
    /// Addons bound to a field.
    pub addons_placed: u64,
    /// Addons evicted with their anchor tile.
    pub addons_evicted: u64,
    /// Opcodes executed.
    pub opcodes_executed: u64,
    /// Explicit single-tile rollbacks.
    pub rollbacks: u64,
}

/// Endless ribbon generator.
#[derive(Debug)]
pub struct Terrain {
    dispatcher: Dispatcher,
}

impl Terrain {
    /// Builds the guardian tile and preallocates every buffer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TrackError::InvalidConfig`] if the config does not
    /// validate.
    pub fn new(config: &TrackConfig, assets: AddonAssets) -> TrackResult<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(config, assets)?,
        })
    }

    /// Queues a structure behind every other waiting one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TrackError::Capacity`] if too many structures wait.
    pub fn enqueue_structure(&mut self, structure: Box<dyn Structure>) -> TrackResult<()> {
        self.dispatcher.enqueue_structure(structure)
    }

    /// Runs at most `budget` opcodes. Returns how many ran.
    ///
    /// # Errors
    ///
    /// Any error is a broken generation invariant and leaves the terrain in
    /// an unspecified state.
    pub fn generate_chunks(&mut self, budget: Budget) -> TrackResult<usize> {
        self.dispatcher.generate_chunks(budget)
    }

    /// Whether nothing is queued or waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.dispatcher.is_idle()
    }

    fn builder(&self) -> &TileBuilder {
        self.dispatcher.landscape().builder()
    }

    /// Read access to the tile builder (rows, edge points, angles).
    #[must_use]
    pub fn tile_builder(&self) -> &TileBuilder {
        self.builder()
    }

    /// Number of live tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.builder().tile_count()
    }

    /// Live tile by index, 0 = oldest.
    #[must_use]
    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.builder().tile(index)
    }

    /// Live tiles, oldest first.
    pub fn tiles(&self) -> impl DoubleEndedIterator<Item = &Tile> + '_ {
        self.builder().tiles()
    }

    /// Number of live addons.
    #[must_use]
    pub fn addon_count(&self) -> usize {
        self.dispatcher.addons().addon_count()
    }

    /// Live addon by index, 0 = oldest.
    #[must_use]
    pub fn addon(&self, index: usize) -> Option<&Addon> {
        self.dispatcher.addons().addon(index)
    }

    /// Live addons, oldest first.
    pub fn addons(&self) -> impl DoubleEndedIterator<Item = &Addon> + '_ {
        self.dispatcher.addons().addons()
    }

    /// Evicts tiles more than the eviction horizon behind the player, and
    /// the addons anchored on them. Returns the number of evicted tiles.
    pub fn remove_old_tiles(&mut self, player_tile_id: u64) -> usize {
        let evicted = self
            .dispatcher
            .landscape_mut()
            .builder_mut()
            .remove_old_tiles(player_tile_id);
        if evicted > 0 {
            if let Some(oldest) = self.builder().tile(0).map(Tile::id) {
                let addons = self.dispatcher.addons_mut().remove_anchored_before(oldest);
                if addons > 0 {
                    tracing::debug!("Evicted {} addons anchored before tile {}", addons, oldest);
                }
            }
        }
        evicted
    }

    /// Id of the live surface tile under `point` (XZ projection). Gaps never
    /// match. Searches newest first.
    #[must_use]
    pub fn locate_tile(&self, point: Vec3) -> Option<u64> {
        self.tiles()
            .rev()
            .find(|tile| !tile.is_empty() && tile.outline().contains_xz(point))
            .map(Tile::id)
    }

    /// Submits every live tile and addon.
    pub fn draw(&self, sink: &mut dyn RenderSink, view_projection: &Mat4) {
        for tile in self.tiles() {
            tile.draw(sink, view_projection);
        }
        for addon in self.addons() {
            addon.draw(sink, view_projection);
        }
    }

    /// Forwards a context loss to every live tile and addon.
    pub fn release_gpu_resources(&mut self) {
        for tile in self.dispatcher.landscape_mut().builder_mut().tiles_mut() {
            tile.release_gpu_resources();
        }
        for addon in self.dispatcher.addons_mut().addons_mut() {
            addon.release_gpu_resources();
        }
    }

    /// Forwards a context restore to every live tile and addon.
    pub fn restore_gpu_resources(&mut self) {
        for tile in self.dispatcher.landscape_mut().builder_mut().tiles_mut() {
            tile.restore_gpu_resources();
        }
        for addon in self.dispatcher.addons_mut().addons_mut() {
            addon.restore_gpu_resources();
        }
    }

    /// Lifetime counters.
    #[must_use]
    pub fn stats(&self) -> TrackStats {
        let builder = self.builder();
        let addons = self.dispatcher.addons();
        TrackStats {
            tiles_built: builder.tiles_built(),
            tiles_evicted: builder.tiles_evicted(),
            addons_placed: addons.addons_placed(),
            addons_evicted: addons.addons_evicted(),
            opcodes_executed: self.dispatcher.executed(),
            rollbacks: builder.rollbacks(),
        }
    }
}
