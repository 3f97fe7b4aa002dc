//! # Addon Assets
//!
//! Shared mesh handles for addons.
//!
//! The asset loader builds one [`AddonAssets`] per graphics context and injects
//! it into the [`crate::Terrain`]. Every addon of a kind shares the same
//! `Arc<MeshHandle>`; nothing here is a process-wide static, so tearing down
//! the context tears down the handles with it.

use std::sync::Arc;

use crate::addon::{Addon, AddonKind};

/// Opaque handle to mesh data the asset provider already uploaded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    /// Provider-assigned id.
    pub id: u32,
    /// Asset name, for debugging.
    pub name: String,
    /// Number of vertices in the mesh.
    pub vertex_count: u32,
}

impl MeshHandle {
    /// Creates a new handle.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, vertex_count: u32) -> Self {
        Self {
            id,
            name: name.into(),
            vertex_count,
        }
    }
}

/// Per-kind shared meshes, injected into the generator.
#[derive(Clone, Debug)]
pub struct AddonAssets {
    meshes: [Arc<MeshHandle>; AddonKind::COUNT],
}

impl AddonAssets {
    /// Creates the asset set from one mesh per kind, indexed by
    /// [`AddonKind::index`].
    #[must_use]
    pub fn new(meshes: [Arc<MeshHandle>; AddonKind::COUNT]) -> Self {
        Self { meshes }
    }

    /// Placeholder meshes for headless runs (server, tests, tools).
    #[must_use]
    pub fn headless() -> Self {
        Self::new(AddonKind::ALL.map(|kind| {
            Arc::new(MeshHandle::new(
                u32::try_from(kind.index()).unwrap_or(u32::MAX),
                kind.name(),
                24,
            ))
        }))
    }

    /// The shared mesh for a kind.
    #[inline]
    #[must_use]
    pub fn mesh(&self, kind: AddonKind) -> &Arc<MeshHandle> {
        &self.meshes[kind.index()]
    }

    /// Creates an unplaced addon of the given kind.
    #[must_use]
    pub fn spawn(&self, kind: AddonKind) -> Addon {
        Addon::new(kind, Arc::clone(self.mesh(kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addons_share_meshes() {
        let assets = AddonAssets::headless();
        let a = assets.spawn(AddonKind::Coin);
        let b = assets.spawn(AddonKind::Coin);

        assert!(Arc::ptr_eq(a.mesh(), b.mesh()));
        assert_eq!(Arc::strong_count(assets.mesh(AddonKind::Coin)), 3);
        assert!(!Arc::ptr_eq(a.mesh(), assets.mesh(AddonKind::Spikes)));
    }
}
