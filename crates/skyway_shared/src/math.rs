//! Mathematical types shared between the track generator, physics and renderer.
//!
//! World space is right-handed with +Y up. The ribbon starts heading along +Z
//! with its right edge on the +X side.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::constants::GEOMETRY_EPSILON;

/// 3D Vector - position, direction, offset
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit X vector
    pub const X: Self = Self::new(1.0, 0.0, 0.0);

    /// Unit Y vector
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);

    /// Unit Z vector
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or `None` when the length is
    /// below [`GEOMETRY_EPSILON`].
    #[must_use]
    pub fn try_normalize(self) -> Option<Self> {
        let length = self.length();
        if length < GEOMETRY_EPSILON {
            None
        } else {
            Some(self * (1.0 / length))
        }
    }

    /// Linear interpolation, `t = 0` yields `self`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    /// Rotates about the +Y axis by `angle` radians.
    ///
    /// Rotating the lateral vector (+X) by `-FRAC_PI_2` yields the forward
    /// vector (+Z), so positive angles steer toward the right edge.
    #[must_use]
    pub fn rotate_y(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            self.x * cos + self.z * sin,
            self.y,
            -self.x * sin + self.z * cos,
        )
    }

    /// Projection onto the horizontal XZ plane.
    #[must_use]
    pub const fn flatten(self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    /// Component-wise comparison within `epsilon`.
    #[must_use]
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// 4x4 matrix, column-major. Only carried through to the renderer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Mat4 {
    /// Columns, each `[x, y, z, w]`
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    /// Identity matrix
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Four-cornered patch of the ribbon surface.
///
/// Used both for tile outlines and for addon fields.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Quad {
    /// Corner closest to the player on the left edge
    pub near_left: Vec3,
    /// Corner closest to the player on the right edge
    pub near_right: Vec3,
    /// Far corner on the left edge
    pub far_left: Vec3,
    /// Far corner on the right edge
    pub far_right: Vec3,
}

impl Quad {
    /// Creates a new quad
    #[must_use]
    pub const fn new(near_left: Vec3, near_right: Vec3, far_left: Vec3, far_right: Vec3) -> Self {
        Self {
            near_left,
            near_right,
            far_left,
            far_right,
        }
    }

    /// Average of the four corners
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.near_left + self.near_right + self.far_left + self.far_right) * 0.25
    }

    /// Splits the quad along the near-left/far-right diagonal.
    #[must_use]
    pub const fn triangles(&self) -> [Triangle; 2] {
        [
            Triangle([self.near_left, self.far_right, self.near_right]),
            Triangle([self.near_left, self.far_left, self.far_right]),
        ]
    }

    /// Sub-quad covering the lateral band `[from, to]`, both in `0..=1`
    /// measured from the left edge.
    #[must_use]
    pub fn lateral_band(&self, from: f32, to: f32) -> Self {
        Self::new(
            self.near_left.lerp(self.near_right, from),
            self.near_left.lerp(self.near_right, to),
            self.far_left.lerp(self.far_right, from),
            self.far_left.lerp(self.far_right, to),
        )
    }

    /// Whether the XZ projection of `point` lies inside the quad.
    ///
    /// Corners are walked as a convex polygon; degenerate quads contain nothing.
    #[must_use]
    pub fn contains_xz(&self, point: Vec3) -> bool {
        let ring = [self.near_left, self.near_right, self.far_right, self.far_left];
        let mut sign = 0.0f32;
        for i in 0..4 {
            let a = ring[i];
            let b = ring[(i + 1) % 4];
            let edge = (b.x - a.x) * (point.z - a.z) - (b.z - a.z) * (point.x - a.x);
            if edge.abs() < GEOMETRY_EPSILON {
                continue;
            }
            if sign == 0.0 {
                sign = edge.signum();
            } else if edge.signum() != sign {
                return false;
            }
        }
        sign != 0.0
    }
}

/// Collision triangle, counter-clockwise when seen from above.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Triangle(pub [Vec3; 3]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        let sum = a + b;
        assert_eq!(sum.x, 5.0);
        assert_eq!(sum.y, 7.0);
        assert_eq!(sum.z, 9.0);

        let dot = a.dot(b);
        assert_eq!(dot, 32.0); // 1*4 + 2*5 + 3*6
    }

    #[test]
    fn test_lateral_rotates_to_forward() {
        let forward = Vec3::X.rotate_y(-std::f32::consts::FRAC_PI_2);
        assert!(forward.approx_eq(Vec3::Z, 1e-6));

        // Positive angle steers toward +X
        let steered = Vec3::X.rotate_y(0.3).rotate_y(-std::f32::consts::FRAC_PI_2);
        assert!(steered.x > 0.0);
        assert!(steered.z > 0.0);
    }

    #[test]
    fn test_try_normalize_degenerate() {
        assert!(Vec3::new(1e-9, 0.0, 0.0).try_normalize().is_none());
        let n = Vec3::new(3.0, 0.0, 4.0).try_normalize().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_quad_contains_xz() {
        let quad = Quad::new(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(1.0, 0.0, 2.0),
        );
        assert!(quad.contains_xz(Vec3::new(0.0, 5.0, 1.0)));
        assert!(!quad.contains_xz(Vec3::new(0.0, 0.0, 3.0)));
        assert!(!quad.contains_xz(Vec3::new(1.5, 0.0, 1.0)));
    }

    #[test]
    fn test_quad_triangles_face_up() {
        let quad = Quad::new(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(1.0, 0.0, 2.0),
        );
        // Counter-clockwise from above: the XZ winding is negative in a
        // right-handed frame with +Y up
        for Triangle([a, b, c]) in quad.triangles() {
            let winding = (b.x - a.x) * (c.z - a.z) - (b.z - a.z) * (c.x - a.x);
            assert!(winding < 0.0);
        }
    }

    #[test]
    fn test_vec3_bytemuck() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 12); // 3 * 4 bytes
    }
}
