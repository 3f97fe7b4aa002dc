//! # Addons
//!
//! Hazards and pickups placed on the ribbon.
//!
//! An addon is created unplaced by a structure, queued until its reservation
//! opcode runs, and then bound exactly once to the field of the grid cells it
//! reserved. Addons are not owned by tiles; they remember the id of the tile
//! they were anchored on so the trim pass can evict them alongside it.

use std::sync::Arc;

use skyway_shared::{Mat4, Quad};

use crate::assets::MeshHandle;
use crate::error::{TrackError, TrackResult};
use crate::render::{DrawCall, RenderSink, Renderable};

/// Every kind of gameplay object the generator places.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AddonKind {
    /// Floor spikes, jumped over.
    Spikes = 0,
    /// Wall segment, steered around.
    Barrier = 1,
    /// Rotating blade.
    Saw = 2,
    /// Score pickup.
    Coin = 3,
    /// Speed pickup.
    Boost = 4,
}

impl AddonKind {
    /// Number of kinds.
    pub const COUNT: usize = 5;

    /// All kinds, in index order.
    pub const ALL: [Self; Self::COUNT] =
        [Self::Spikes, Self::Barrier, Self::Saw, Self::Coin, Self::Boost];

    /// Dense index, stable across builds.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether touching this addon hurts the player.
    #[inline]
    #[must_use]
    pub const fn is_hazard(self) -> bool {
        matches!(self, Self::Spikes | Self::Barrier | Self::Saw)
    }

    /// Asset name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spikes => "spikes",
            Self::Barrier => "barrier",
            Self::Saw => "saw",
            Self::Coin => "coin",
            Self::Boost => "boost",
        }
    }
}

/// Where an addon ended up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Surface patch the addon covers.
    pub field: Quad,
    /// Tile that owns the first reserved row.
    pub anchor_tile_id: u64,
}

/// A hazard or pickup.
#[derive(Clone, Debug)]
pub struct Addon {
    kind: AddonKind,
    mesh: Arc<MeshHandle>,
    placement: Option<Placement>,
    gpu_resident: bool,
}

impl Addon {
    /// Creates an unplaced addon. Use [`crate::AddonAssets::spawn`] in
    /// gameplay code so meshes are shared.
    #[must_use]
    pub fn new(kind: AddonKind, mesh: Arc<MeshHandle>) -> Self {
        Self {
            kind,
            mesh,
            placement: None,
            gpu_resident: true,
        }
    }

    /// The addon kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> AddonKind {
        self.kind
    }

    /// Shared mesh data.
    #[inline]
    #[must_use]
    pub fn mesh(&self) -> &Arc<MeshHandle> {
        &self.mesh
    }

    /// Placement, once bound.
    #[inline]
    #[must_use]
    pub const fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    /// Bound field, once placed.
    #[inline]
    #[must_use]
    pub fn field(&self) -> Option<&Quad> {
        self.placement.as_ref().map(|p| &p.field)
    }

    /// Anchor tile id, once placed.
    #[inline]
    #[must_use]
    pub fn anchor_tile_id(&self) -> Option<u64> {
        self.placement.map(|p| p.anchor_tile_id)
    }

    /// Binds the addon to its field. Placement is final.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::AddonAlreadyPlaced`] on a second bind.
    pub fn bind(&mut self, field: Quad, anchor_tile_id: u64) -> TrackResult<()> {
        if self.placement.is_some() {
            return Err(TrackError::AddonAlreadyPlaced);
        }
        self.placement = Some(Placement {
            field,
            anchor_tile_id,
        });
        Ok(())
    }
}

impl Renderable for Addon {
    fn draw(&self, sink: &mut dyn RenderSink, view_projection: &Mat4) {
        if !self.gpu_resident {
            return;
        }
        if let Some(placement) = &self.placement {
            sink.submit(
                DrawCall::Addon {
                    kind: self.kind,
                    mesh: &self.mesh,
                    field: &placement.field,
                },
                view_projection,
            );
        }
    }

    fn release_gpu_resources(&mut self) {
        self.gpu_resident = false;
    }

    fn restore_gpu_resources(&mut self) {
        self.gpu_resident = true;
    }

    fn is_gpu_resident(&self) -> bool {
        self.gpu_resident
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AddonAssets;
    use skyway_shared::Vec3;

    fn unit_quad() -> Quad {
        Quad::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
        )
    }

    #[test]
    fn test_bind_is_one_shot() {
        let mut addon = AddonAssets::headless().spawn(AddonKind::Saw);
        assert!(addon.field().is_none());

        addon.bind(unit_quad(), 7).unwrap();
        assert_eq!(addon.anchor_tile_id(), Some(7));
        assert_eq!(addon.bind(unit_quad(), 8), Err(TrackError::AddonAlreadyPlaced));
        assert_eq!(addon.anchor_tile_id(), Some(7));
    }

    #[test]
    fn test_hazard_classification() {
        assert!(AddonKind::Spikes.is_hazard());
        assert!(!AddonKind::Coin.is_hazard());
        for (i, kind) in AddonKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
