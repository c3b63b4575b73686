//! Geometry primitives.
//!
//! Vectors, quaternions and matrices are nalgebra types over `f64`. None of
//! the values here carry a frame tag: a [`Pose`] read from the server is NED
//! and stays NED until it is explicitly passed through [`crate::frames`].

use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// A 2D vector.
pub type Vector2 = nalgebra::Vector2<f64>;

/// A 3D vector.
pub type Vector3 = nalgebra::Vector3<f64>;

/// A rotation quaternion. Not normalized on construction.
pub type Quaternion = nalgebra::Quaternion<f64>;

/// A 4x4 matrix, used for camera projections.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// A position and orientation pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation.
    pub position: Vector3,
    /// Rotation.
    pub orientation: Quaternion,
}

impl Pose {
    /// Create a new pose.
    pub fn new(position: Vector3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Create a pose from a position only (identity rotation).
    pub fn from_position(position: Vector3) -> Self {
        Self::new(position, Quaternion::identity())
    }

    /// The origin with no rotation.
    pub fn identity() -> Self {
        Self::from_position(Vector3::zeros())
    }

    /// True when any component is NaN; the server reports missing objects this way.
    pub fn has_nan(&self) -> bool {
        self.position.iter().any(|c| c.is_nan()) || self.orientation.coords.iter().any(|c| c.is_nan())
    }

    /// The pose as a rigid transform. The orientation is normalized.
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::from(self.position),
            UnitQuaternion::new_normalize(self.orientation),
        )
    }

    /// Express a point given in the parent frame relative to this pose.
    pub fn to_local(&self, point: &Vector3) -> Vector3 {
        let rotation = UnitQuaternion::new_normalize(self.orientation);
        rotation.inverse_transform_vector(&(point - self.position))
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned 2D box. `min <= max` is assumed, not checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Box2 {
    /// Lower corner.
    pub min: Vector2,
    /// Upper corner.
    pub max: Vector2,
}

impl Box2 {
    /// Create a box from its corners.
    pub fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vector2 {
        self.max - self.min
    }

    /// Midpoint of the two corners.
    pub fn center(&self) -> Vector2 {
        (self.min + self.max) * 0.5
    }
}

/// Axis-aligned 3D box. `min <= max` is assumed, not checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Box3 {
    /// Lower corner.
    pub min: Vector3,
    /// Upper corner.
    pub max: Vector3,
}

impl Box3 {
    /// Create a box from its corners.
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// Midpoint of the two corners.
    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }
}

/// A geodetic location. Never converted to or from Cartesian vectors here.
///
/// The field names match the wire schema, so the same type is used on both sides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
    /// Meters above the reference ellipsoid.
    pub altitude: f64,
}

impl GeoPoint {
    /// Create a geo point.
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_pose_identity() {
        let pose = Pose::default();
        assert_eq!(pose.position, Vector3::zeros());
        assert_eq!(pose.orientation, Quaternion::identity());
        assert!(!pose.has_nan());
    }

    #[test]
    fn test_pose_has_nan() {
        let pose = Pose::from_position(Vector3::new(f64::NAN, 0.0, 0.0));
        assert!(pose.has_nan());
    }

    #[test]
    fn test_to_local_undoes_yaw() {
        // Facing +y: a point one meter ahead lands on the local +x axis.
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let pose = Pose::new(Vector3::new(10.0, 0.0, 0.0), yaw.into_inner());
        let local = pose.to_local(&Vector3::new(10.0, 1.0, 0.0));
        assert!((local.x - 1.0).abs() < 1e-12);
        assert!(local.y.abs() < 1e-12);
        assert!(local.z.abs() < 1e-12);
    }

    #[test]
    fn test_box_size_and_center() {
        let b = Box3::new(Vector3::new(-1.0, 0.0, 2.0), Vector3::new(1.0, 4.0, 3.0));
        assert_eq!(b.size(), Vector3::new(2.0, 4.0, 1.0));
        assert_eq!(b.center(), Vector3::new(0.0, 2.0, 2.5));

        let b = Box2::new(Vector2::new(0.0, 0.0), Vector2::new(640.0, 480.0));
        assert_eq!(b.center(), Vector2::new(320.0, 240.0));
    }
}
