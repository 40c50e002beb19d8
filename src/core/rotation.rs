//! Rotation math for the simulated rigid body.
//!
//! # Conventions
//!
//! - Euler angles are given in **degrees** as (yaw, pitch, roll) and compose
//!   intrinsically in Z-Y-X order: `R = Rz(yaw) · Ry(pitch) · Rx(roll)`.
//! - [`Quaternion`] is stored scalar-first `(w, x, y, z)`.
//! - Tracking consumers expect scalar-last `(x, y, z, w)`; use
//!   [`Quaternion::to_xyzw`] at that boundary and nowhere else.
//!
//! All functions here are pure and reentrant.

use serde::{Deserialize, Serialize};

/// 3x3 rotation matrix, row-major.
pub type RotationMatrix = [[f64; 3]; 3];

/// Quaternion representation [w, x, y, z].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// Create a quaternion from scalar-first components.
    #[inline]
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Create identity quaternion (no rotation).
    #[inline]
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Euclidean norm of the four components.
    #[inline]
    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Return a unit-length copy.
    ///
    /// A zero quaternion is returned unchanged.
    pub fn normalized(&self) -> Self {
        let norm = self.norm();
        if norm == 0.0 {
            return *self;
        }
        Self::new(self.w / norm, self.x / norm, self.y / norm, self.z / norm)
    }

    /// Hamilton product `self ⊗ rhs`.
    pub fn hamilton_product(&self, rhs: &Quaternion) -> Self {
        Self {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }

    /// Scalar-first components `[w, x, y, z]`.
    #[inline]
    pub fn to_wxyz(&self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }

    /// Scalar-last components `[x, y, z, w]`, the order tracking clients consume.
    #[inline]
    pub fn to_xyzw(&self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Rotation matrix for this quaternion.
    #[inline]
    pub fn to_rotation_matrix(&self) -> RotationMatrix {
        quaternion_to_rotation_matrix(self.w, self.x, self.y, self.z)
    }
}

/// Convert yaw/pitch/roll in degrees to a unit quaternion.
///
/// Uses the half-angle product form of the Z-Y-X composition. The result is
/// unit length by construction and is not renormalized.
pub fn euler_to_quaternion(yaw: f64, pitch: f64, roll: f64) -> Quaternion {
    let (sy, cy) = (yaw.to_radians() * 0.5).sin_cos();
    let (sp, cp) = (pitch.to_radians() * 0.5).sin_cos();
    let (sr, cr) = (roll.to_radians() * 0.5).sin_cos();

    Quaternion {
        w: cy * cp * cr + sy * sp * sr,
        x: cy * cp * sr - sy * sp * cr,
        y: sy * cp * sr + cy * sp * cr,
        z: sy * cp * cr - cy * sp * sr,
    }
}

/// Convert a quaternion `(w, x, y, z)` to a rotation matrix.
///
/// The input is normalized first. Precondition: the quaternion must be
/// non-zero. A zero quaternion produces a matrix of NaNs; it is not replaced
/// with identity.
pub fn quaternion_to_rotation_matrix(w: f64, x: f64, y: f64, z: f64) -> RotationMatrix {
    let norm = (w * w + x * x + y * y + z * z).sqrt();
    let (w, x, y, z) = (w / norm, x / norm, y / norm, z / norm);

    [
        [
            1.0 - 2.0 * y * y - 2.0 * z * z,
            2.0 * x * y - 2.0 * z * w,
            2.0 * x * z + 2.0 * y * w,
        ],
        [
            2.0 * x * y + 2.0 * z * w,
            1.0 - 2.0 * x * x - 2.0 * z * z,
            2.0 * y * z - 2.0 * x * w,
        ],
        [
            2.0 * x * z - 2.0 * y * w,
            2.0 * y * z + 2.0 * x * w,
            1.0 - 2.0 * x * x - 2.0 * y * y,
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Direct Z-Y-X Euler to matrix, used as a reference.
    fn euler_to_matrix(yaw: f64, pitch: f64, roll: f64) -> RotationMatrix {
        let (sy, cy) = yaw.to_radians().sin_cos();
        let (sp, cp) = pitch.to_radians().sin_cos();
        let (sr, cr) = roll.to_radians().sin_cos();
        [
            [cy * cp, cy * sp * sr - sy * cr, cy * sp * cr + sy * sr],
            [sy * cp, sy * sp * sr + cy * cr, sy * sp * cr - cy * sr],
            [-sp, cp * sr, cp * cr],
        ]
    }

    #[test]
    fn test_euler_zero_is_identity() {
        let q = euler_to_quaternion(0.0, 0.0, 0.0);
        assert_eq!(q, Quaternion::identity());
    }

    #[test]
    fn test_euler_quaternion_is_unit() {
        let angles = [-720.0, -270.0, -180.0, -45.5, 0.0, 13.0, 90.0, 179.9, 400.0];
        for &yaw in &angles {
            for &pitch in &angles {
                for &roll in &angles {
                    let q = euler_to_quaternion(yaw, pitch, roll);
                    assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_pure_yaw() {
        let q = euler_to_quaternion(90.0, 0.0, 0.0);
        let half = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(q.w, half, epsilon = 1e-12);
        assert_relative_eq!(q.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(q.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(q.z, half, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_matrix() {
        let r = quaternion_to_rotation_matrix(1.0, 0.0, 0.0, 0.0);
        for (i, row) in r.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(*value, expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_matrix_normalizes_input() {
        // Scaled identity still maps to identity
        let r = quaternion_to_rotation_matrix(3.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(r[0][0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(r[1][1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(r[2][2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_quaternion_yields_nan() {
        let r = quaternion_to_rotation_matrix(0.0, 0.0, 0.0, 0.0);
        assert!(r.iter().flatten().all(|v| v.is_nan()));
    }

    #[test]
    fn test_matrix_matches_direct_euler() {
        let samples = [
            (0.5, -0.3, 0.2),
            (-2.0, 1.5, 3.0),
            (4.0, -4.0, -1.0),
            (10.0, 5.0, -7.5),
            (-0.01, 0.02, 0.03),
        ];
        for (yaw, pitch, roll) in samples {
            let q = euler_to_quaternion(yaw, pitch, roll);
            let from_quat = quaternion_to_rotation_matrix(q.w, q.x, q.y, q.z);
            let direct = euler_to_matrix(yaw, pitch, roll);
            for i in 0..3 {
                for j in 0..3 {
                    assert_relative_eq!(from_quat[i][j], direct[i][j], epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_hamilton_identity() {
        let q = euler_to_quaternion(30.0, 20.0, 10.0);
        let p = Quaternion::identity().hamilton_product(&q);
        assert_relative_eq!(p.w, q.w, epsilon = 1e-12);
        assert_relative_eq!(p.x, q.x, epsilon = 1e-12);
        assert_relative_eq!(p.y, q.y, epsilon = 1e-12);
        assert_relative_eq!(p.z, q.z, epsilon = 1e-12);
    }

    #[test]
    fn test_hamilton_composes_yaw() {
        // Two 45° yaws make one 90° yaw
        let q45 = euler_to_quaternion(45.0, 0.0, 0.0);
        let q90 = q45.hamilton_product(&q45);
        let expected = euler_to_quaternion(90.0, 0.0, 0.0);
        assert_relative_eq!(q90.w, expected.w, epsilon = 1e-12);
        assert_relative_eq!(q90.z, expected.z, epsilon = 1e-12);
    }

    #[test]
    fn test_xyzw_order() {
        let q = Quaternion::new(0.1, 0.2, 0.3, 0.4);
        assert_eq!(q.to_xyzw(), [0.2, 0.3, 0.4, 0.1]);
        assert_eq!(q.to_wxyz(), [0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_normalized_zero_unchanged() {
        let zero = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(zero.normalized(), zero);
        let q = Quaternion::new(2.0, 0.0, 0.0, 0.0).normalized();
        assert_eq!(q, Quaternion::identity());
    }
}
