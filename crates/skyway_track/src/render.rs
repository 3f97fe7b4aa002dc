//! # Renderer Contract
//!
//! The track never talks to the GPU. Tiles and addons describe themselves as
//! [`DrawCall`]s and hand them to whatever [`RenderSink`] the renderer plugs in.
//!
//! ## Context Loss
//!
//! When the graphics context is lost the renderer calls
//! [`Renderable::release_gpu_resources`] on every live object, and
//! [`Renderable::restore_gpu_resources`] once a new context exists. Released
//! objects submit nothing.

use std::sync::Arc;

use skyway_shared::{Mat4, Quad};

use crate::addon::AddonKind;
use crate::assets::MeshHandle;

/// One unit of work for the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall<'a> {
    /// A ribbon tile surface.
    Ribbon {
        /// Id of the tile being drawn.
        tile_id: u64,
        /// Tile outline.
        outline: &'a Quad,
    },
    /// An addon mesh stretched over its field.
    Addon {
        /// What kind of addon this is.
        kind: AddonKind,
        /// Shared mesh data.
        mesh: &'a Arc<MeshHandle>,
        /// Field the mesh is fitted to.
        field: &'a Quad,
    },
}

/// Implemented by the renderer.
pub trait RenderSink {
    /// Queues a draw for the current frame.
    fn submit(&mut self, call: DrawCall<'_>, view_projection: &Mat4);
}

/// Implemented by everything the track hands to the renderer.
pub trait Renderable {
    /// Submits this object's draw calls, if it has any GPU presence.
    fn draw(&self, sink: &mut dyn RenderSink, view_projection: &Mat4);

    /// Drops GPU-side state (context lost or object evicted).
    fn release_gpu_resources(&mut self);

    /// Re-creates GPU-side state after a context loss.
    fn restore_gpu_resources(&mut self);

    /// Whether the object currently has GPU-side state.
    fn is_gpu_resident(&self) -> bool;
}
