//! # Tiles
//!
//! One quadrilateral segment of the ribbon.
//!
//! Tiles are immutable once confirmed. The only tile that ever changes is the
//! most recent one: its far edge is provisional until the next tile is built,
//! at which point the builder retracts it and re-adds it with the confirmed
//! edge.

use skyway_shared::{Mat4, Quad, Triangle, Vec3, GEOMETRY_EPSILON};

use crate::render::{DrawCall, RenderSink, Renderable};

/// A ribbon tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    id: u64,
    outline: Quad,
    triangles: [Triangle; 2],
    slope: f32,
    empty: bool,
    gpu_resident: bool,
}

impl Tile {
    /// Creates a tile. Gaps keep their outline (the ribbon continues from it)
    /// but expose no collision triangles and draw nothing.
    #[must_use]
    pub fn new(id: u64, outline: Quad, empty: bool) -> Self {
        Self {
            id,
            outline,
            triangles: outline.triangles(),
            slope: slope_of(&outline),
            empty,
            gpu_resident: true,
        }
    }

    /// Same tile with its far edge moved. Id, gap flag and residency carry over.
    #[must_use]
    pub fn with_far_edge(&self, far_left: Vec3, far_right: Vec3) -> Self {
        let outline = Quad::new(self.outline.near_left, self.outline.near_right, far_left, far_right);
        Self {
            outline,
            triangles: outline.triangles(),
            slope: slope_of(&outline),
            ..self.clone()
        }
    }

    /// Strictly increasing id, starting at 0 for the guardian.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The four corners.
    #[inline]
    #[must_use]
    pub const fn outline(&self) -> &Quad {
        &self.outline
    }

    /// Near-left corner.
    #[inline]
    #[must_use]
    pub const fn near_left(&self) -> Vec3 {
        self.outline.near_left
    }

    /// Near-right corner.
    #[inline]
    #[must_use]
    pub const fn near_right(&self) -> Vec3 {
        self.outline.near_right
    }

    /// Far-left corner.
    #[inline]
    #[must_use]
    pub const fn far_left(&self) -> Vec3 {
        self.outline.far_left
    }

    /// Far-right corner.
    #[inline]
    #[must_use]
    pub const fn far_right(&self) -> Vec3 {
        self.outline.far_right
    }

    /// Rise over horizontal run of the centre line.
    #[inline]
    #[must_use]
    pub const fn slope(&self) -> f32 {
        self.slope
    }

    /// Whether this tile is a gap.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.empty
    }

    /// Collision triangles: two for a surface tile, none for a gap.
    #[inline]
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        if self.empty {
            &[]
        } else {
            &self.triangles
        }
    }

    /// Near-to-far vector of the centre line.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        let near = self.outline.near_left.lerp(self.outline.near_right, 0.5);
        let far = self.outline.far_left.lerp(self.outline.far_right, 0.5);
        far - near
    }
}

fn slope_of(outline: &Quad) -> f32 {
    let near = outline.near_left.lerp(outline.near_right, 0.5);
    let far = outline.far_left.lerp(outline.far_right, 0.5);
    let run = (far - near).flatten().length();
    if run < GEOMETRY_EPSILON {
        0.0
    } else {
        (far.y - near.y) / run
    }
}

impl Renderable for Tile {
    fn draw(&self, sink: &mut dyn RenderSink, view_projection: &Mat4) {
        if self.empty || !self.gpu_resident {
            return;
        }
        sink.submit(
            DrawCall::Ribbon {
                tile_id: self.id,
                outline: &self.outline,
            },
            view_projection,
        );
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

    fn ramp() -> Quad {
        Quad::new(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 2.0, 4.0),
            Vec3::new(1.0, 2.0, 4.0),
        )
    }

    #[test]
    fn test_slope() {
        let tile = Tile::new(3, ramp(), false);
        assert!((tile.slope() - 0.5).abs() < 1e-6);
        assert_eq!(tile.id(), 3);
    }

    #[test]
    fn test_gap_has_no_triangles() {
        assert_eq!(Tile::new(0, ramp(), false).triangles().len(), 2);
        assert!(Tile::new(1, ramp(), true).triangles().is_empty());
    }

    struct Counter(usize);

    impl RenderSink for Counter {
        fn submit(&mut self, _call: DrawCall<'_>, _view_projection: &Mat4) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_released_tile_draws_nothing() {
        let mut tile = Tile::new(0, ramp(), false);
        let mut sink = Counter(0);

        tile.draw(&mut sink, &Mat4::IDENTITY);
        tile.release_gpu_resources();
        tile.draw(&mut sink, &Mat4::IDENTITY);
        assert_eq!(sink.0, 1);

        tile.restore_gpu_resources();
        tile.draw(&mut sink, &Mat4::IDENTITY);
        assert_eq!(sink.0, 2);
    }
}
