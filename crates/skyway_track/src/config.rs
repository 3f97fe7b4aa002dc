//! # Track Configuration
//!
//! Geometry and buffer sizing, loaded once at startup from TOML.
//!
//! ```toml
//! segment_length = 4.0
//! ribbon_width = 6.0
//! row_spacing = 1.0
//! grid_columns = 3
//! max_segments = 128
//! seed = 42
//! ```
//!
//! Every key is optional. Buffer capacities that are left out are derived
//! from `max_segments` so the live window always fits.

use std::path::Path;

use serde::Deserialize;
use skyway_shared::DEFAULT_EVICTION_HORIZON;

use crate::error::{TrackError, TrackResult};

/// Configuration for a [`crate::Terrain`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackConfig {
    /// Forward length of one tile in world units.
    pub segment_length: f32,
    /// Distance between the left and right edge of the guardian tile.
    pub ribbon_width: f32,
    /// Distance between consecutive grid rows along each edge.
    pub row_spacing: f32,
    /// Number of lateral lanes in every structure grid.
    pub grid_columns: usize,
    /// Tiles kept alive at once (the tile ring holds one more).
    pub max_segments: usize,
    /// Tile-id distance behind the player before a tile is evicted.
    pub eviction_horizon: u64,
    /// Maximum number of queued opcodes.
    pub command_capacity: usize,
    /// Maximum number of structures waiting to start.
    pub max_waiting_structures: usize,
    /// Live addon capacity (defaults to `max_segments + 1`).
    pub max_addons: Option<usize>,
    /// Edge points kept per side (derived when unset).
    pub edge_point_capacity: Option<usize>,
    /// Row entries kept (derived when unset).
    pub row_capacity: Option<usize>,
    /// Rollback history entries kept (derived when unset).
    pub history_capacity: Option<usize>,
    /// Seed for random-fit reservations.
    pub seed: u64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            segment_length: 4.0,
            ribbon_width: 6.0,
            row_spacing: 1.0,
            grid_columns: 3,
            max_segments: 128,
            eviction_horizon: DEFAULT_EVICTION_HORIZON,
            command_capacity: 4096,
            max_waiting_structures: 64,
            max_addons: None,
            edge_point_capacity: None,
            row_capacity: None,
            history_capacity: None,
            seed: 0x5EED_0F_5C1A,
        }
    }
}

impl TrackConfig {
    /// Configuration for shipping builds: a long live window.
    #[must_use]
    pub fn production() -> Self {
        Self {
            max_segments: 256,
            max_addons: Some(1024),
            ..Self::default()
        }
    }

    /// Small configuration for tests.
    #[must_use]
    pub fn test() -> Self {
        Self {
            max_segments: 64,
            command_capacity: 1024,
            max_waiting_structures: 32,
            max_addons: Some(256),
            seed: 42,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidConfig`] on parse or validation failure.
    pub fn from_toml_str(source: &str) -> TrackResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| TrackError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidConfig`] if the file cannot be read or is invalid.
    pub fn from_toml_file(path: &Path) -> TrackResult<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| TrackError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks that the geometry is usable and every buffer can hold something.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::InvalidConfig`] naming the first bad key.
    pub fn validate(&self) -> TrackResult<()> {
        let invalid = |msg: &str| -> TrackResult<()> { Err(TrackError::InvalidConfig(msg.to_string())) };

        if !(self.segment_length.is_finite() && self.segment_length > 0.0) {
            return invalid("segment_length must be positive");
        }
        if !(self.ribbon_width.is_finite() && self.ribbon_width > 0.0) {
            return invalid("ribbon_width must be positive");
        }
        if !(self.row_spacing.is_finite() && self.row_spacing > 0.0) {
            return invalid("row_spacing must be positive");
        }
        if self.row_spacing > self.segment_length {
            return invalid("row_spacing must not exceed segment_length");
        }
        if self.grid_columns == 0 {
            return invalid("grid_columns must be at least 1");
        }
        if self.max_segments < 2 {
            return invalid("max_segments must be at least 2");
        }
        if self.command_capacity == 0 {
            return invalid("command_capacity must be positive");
        }
        if self.max_waiting_structures == 0 {
            return invalid("max_waiting_structures must be positive");
        }
        if self.max_addons == Some(0) {
            return invalid("max_addons must be positive");
        }
        // Confirming a tile retracts and re-samples its predecessor
        if self.history_capacity() < 2 {
            return invalid("history_capacity must be at least 2");
        }
        let per_tile_pair = 2 * self.points_per_tile_bound();
        if self.edge_point_capacity() < per_tile_pair {
            return invalid("edge_point_capacity must hold two tiles of points");
        }
        if self.row_capacity() < per_tile_pair {
            return invalid("row_capacity must hold two tiles of rows");
        }
        Ok(())
    }

    /// Tile ring capacity: the live window plus the tile under construction.
    #[must_use]
    pub const fn tile_capacity(&self) -> usize {
        self.max_segments + 1
    }

    /// Addon ring capacity.
    #[must_use]
    pub fn addon_capacity(&self) -> usize {
        self.max_addons.unwrap_or(self.max_segments + 1)
    }

    /// Upper bound on edge points one tile contributes per side.
    ///
    /// A turn can stretch an edge by at most the ribbon width; one extra
    /// point covers the bridging row.
    #[must_use]
    pub fn points_per_tile_bound(&self) -> usize {
        let longest_edge = self.segment_length + self.ribbon_width;
        // Truncation is fine: the ratio is positive and small.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (longest_edge / self.row_spacing).ceil() as usize;
        steps + 2
    }

    /// Edge-point buffer capacity per side.
    #[must_use]
    pub fn edge_point_capacity(&self) -> usize {
        self.edge_point_capacity
            .unwrap_or_else(|| self.tile_capacity() * self.points_per_tile_bound())
    }

    /// Row buffer capacity.
    #[must_use]
    pub fn row_capacity(&self) -> usize {
        self.row_capacity
            .unwrap_or_else(|| self.tile_capacity() * self.points_per_tile_bound())
    }

    /// Rollback history capacity.
    #[must_use]
    pub fn history_capacity(&self) -> usize {
        self.history_capacity.unwrap_or_else(|| self.tile_capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(TrackConfig::default().validate().is_ok());
        assert!(TrackConfig::production().validate().is_ok());
        assert!(TrackConfig::test().validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = TrackConfig::from_toml_str(
            r#"
            segment_length = 8.0
            grid_columns = 5
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.segment_length, 8.0);
        assert_eq!(config.grid_columns, 5);
        assert_eq!(config.seed, 7);
        assert_eq!(config.row_spacing, TrackConfig::default().row_spacing);
    }

    #[test]
    fn test_from_toml_rejects_unknown_key() {
        let err = TrackConfig::from_toml_str("segment_lenght = 8.0").unwrap_err();
        assert!(matches!(err, TrackError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_spacing_longer_than_segment() {
        let config = TrackConfig {
            row_spacing: 10.0,
            ..TrackConfig::default()
        };
        assert!(matches!(config.validate(), Err(TrackError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_small_history() {
        for history in [0, 1] {
            let config = TrackConfig {
                history_capacity: Some(history),
                ..TrackConfig::test()
            };
            assert!(matches!(config.validate(), Err(TrackError::InvalidConfig(_))));
        }
        let config = TrackConfig {
            history_capacity: Some(2),
            ..TrackConfig::test()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_small_point_and_row_buffers() {
        let config = TrackConfig::default();
        let minimum = 2 * config.points_per_tile_bound();

        let points = TrackConfig {
            edge_point_capacity: Some(minimum - 1),
            ..config.clone()
        };
        assert!(matches!(points.validate(), Err(TrackError::InvalidConfig(_))));

        let rows = TrackConfig {
            row_capacity: Some(minimum - 1),
            ..config.clone()
        };
        assert!(matches!(rows.validate(), Err(TrackError::InvalidConfig(_))));

        let exact = TrackConfig {
            edge_point_capacity: Some(minimum),
            row_capacity: Some(minimum),
            ..config
        };
        assert!(exact.validate().is_ok());
    }

    #[test]
    fn test_derived_capacities() {
        let config = TrackConfig::default();
        assert_eq!(config.tile_capacity(), 129);
        assert_eq!(config.addon_capacity(), 129);
        assert_eq!(config.points_per_tile_bound(), 12);
        assert_eq!(config.edge_point_capacity(), 129 * 12);
    }
}
