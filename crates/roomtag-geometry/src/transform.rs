//! Affine link transforms
//!
//! A link places the linked model inside the host model with a rigid
//! transform: an origin offset plus three basis vectors. Applying it maps a
//! linked-space point into host space.

use crate::point::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Origin offset plus basis, mapping linked-model space into host space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    /// Host-space position of the linked model's origin
    pub origin: Point3,
    /// Host-space direction of the linked X axis
    pub basis_x: Vector3,
    /// Host-space direction of the linked Y axis
    pub basis_y: Vector3,
    /// Host-space direction of the linked Z axis
    pub basis_z: Vector3,
}

impl AffineTransform {
    /// Create transform from origin and basis
    #[inline]
    #[must_use]
    pub const fn new(origin: Point3, basis_x: Vector3, basis_y: Vector3, basis_z: Vector3) -> Self {
        Self {
            origin,
            basis_x,
            basis_y,
            basis_z,
        }
    }

    /// Identity transform (link placed origin-to-origin)
    #[inline]
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(Point3::ORIGIN, Vector3::X, Vector3::Y, Vector3::Z)
    }

    /// Pure translation
    #[inline]
    #[must_use]
    pub const fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(Point3::new(dx, dy, dz), Vector3::X, Vector3::Y, Vector3::Z)
    }

    /// Rotation about the vertical axis by `angle` radians, then a move to `origin`
    ///
    /// This is the shape of almost every real link: a plan rotation plus a
    /// shared-coordinates offset.
    #[must_use]
    pub fn rotation_z(origin: Point3, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            origin,
            Vector3::new(cos, sin, 0.0),
            Vector3::new(-sin, cos, 0.0),
            Vector3::Z,
        )
    }

    /// Map a linked-space point into host space
    ///
    /// `origin + x*basis_x + y*basis_y + z*basis_z`
    #[inline]
    #[must_use]
    pub fn apply(&self, point: Point3) -> Point3 {
        self.origin + (self.basis_x * point.x + self.basis_y * point.y + self.basis_z * point.z)
    }

    /// Check origin and basis are all finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.origin.is_finite()
            && self.basis_x.is_finite()
            && self.basis_y.is_finite()
            && self.basis_z.is_finite()
    }

    /// Check this is the identity within tolerance
    #[must_use]
    pub fn is_identity(&self, tolerance: f64) -> bool {
        self.origin.approx_eq(Point3::ORIGIN, tolerance)
            && (self.basis_x - Vector3::X).length() <= tolerance
            && (self.basis_y - Vector3::Y).length() <= tolerance
            && (self.basis_z - Vector3::Z).length() <= tolerance
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}
