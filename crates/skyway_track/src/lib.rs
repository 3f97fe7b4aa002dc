//! # SKYWAY Track
//!
//! Endless ribbon generation for the SKYWAY runner.
//!
//! ## Pipeline
//!
//! 1. **Structures** - named recipes queue geometry opcodes, then addon
//!    opcodes sized to the rows their tiles produced
//! 2. **Command buffer** - a bounded FIFO drained a budget at a time, so a
//!    frame never does more than it can afford
//! 3. **Tile builder** - continues the ribbon edge-to-edge, samples both
//!    edges into rows, and can undo the last tile exactly
//! 4. **Grid** - addons reserve lanes on a per-structure grid of rows, then
//!    bind to the world-space field under their cells
//!
//! ## Memory
//!
//! Every buffer is sized from [`TrackConfig`] at construction. Tiles and
//! addons behind the player are evicted with [`Terrain::remove_old_tiles`].
//!
//! ## Example
//!
//! ```rust
//! use skyway_track::{AddonAssets, Budget, Straight, Terrain, TrackConfig};
//!
//! let mut terrain = Terrain::new(&TrackConfig::default(), AddonAssets::headless()).unwrap();
//! terrain.enqueue_structure(Box::new(Straight::new(5))).unwrap();
//! while !terrain.is_idle() {
//!     terrain.generate_chunks(Budget::Ops(16)).unwrap();
//! }
//! assert_eq!(terrain.tile_count(), 6);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod addon;
pub mod assets;
pub mod builder;
pub mod command;
pub mod config;
pub mod error;
pub mod executor;
pub mod grid;
pub mod render;
pub mod structure;
pub mod terrain;
pub mod tile;

pub use addon::{Addon, AddonKind, Placement};
pub use assets::{AddonAssets, MeshHandle};
pub use builder::{RowInfo, TileBuilder};
pub use command::{AddonOp, Budget, Command, CommandBuffer, LandscapeOp};
pub use config::TrackConfig;
pub use error::{TrackError, TrackResult};
pub use executor::{AddonsExecutor, Dispatcher, LandscapeExecutor};
pub use grid::{GridCreator, GridSegment, Orientation};
pub use render::{DrawCall, RenderSink, Renderable};
pub use structure::{AddonEmitter, Chicane, Curve, Gap, LandscapeEmitter, Slope, Staircase, Straight, Structure};
pub use terrain::{Terrain, TrackStats};
pub use tile::Tile;
