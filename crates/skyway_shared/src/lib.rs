//! # SKYWAY Shared
//!
//! Leaf math types used by the track generator, the physics collaborator and
//! the renderer.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - `wgpu`
//! - Any GPU or window-related crate
//!
//! If you need graphics types, put them behind the renderer's `RenderSink`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{CONTINUITY_EPSILON, DEFAULT_EVICTION_HORIZON, GEOMETRY_EPSILON};
pub use math::{Mat4, Quad, Triangle, Vec3};
