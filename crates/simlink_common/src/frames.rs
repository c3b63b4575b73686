//! Coordinate frame transforms between NED, ENU and the local XYZ frame.
//!
//! - NED: North-East-Down. Everything the server sends and receives.
//! - ENU: East-North-Up.
//! - XYZ: the right-handed display frame, +Y up and +Z toward the viewer.
//!
//! The server never tags values with a frame, so these are never applied
//! implicitly. Each transform is defined for vectors, quaternions and poses
//! through [`FrameTransform`], and the free functions accept all three.
//!
//! Vectors are mapped by a fixed rotation `M`. A quaternion `q` mapping body
//! to world is mapped to `P * q`, where `P` is the unit quaternion of `M`: the
//! body frame stays as it is and only the world frame changes, so rotating a
//! body vector by the converted quaternion gives the converted world vector.
//! Both families are proper rotations and every result is renormalized.
//!
//! The XYZ family is the pure rotation `(x, y, z) -> (-z, x, -y)`. It does not
//! reproduce the Euler-angle composition some AirSim client libraries use for
//! their display frame, so orientations from those libraries differ.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2};
use std::sync::LazyLock;

use nalgebra::{Matrix3, Unit, UnitQuaternion};

use crate::geometry::{Pose, Quaternion, Vector3};

/// Norm below which a quaternion is left as-is instead of renormalized.
const MIN_NORM: f64 = 1e-12;

/// 180 degrees about (1, 1, 0): swaps north and east, flips up and down.
static ENU_TO_NED: LazyLock<Quaternion> =
    LazyLock::new(|| Quaternion::new(0.0, -FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0));

/// Conjugate of [`ENU_TO_NED`].
static NED_TO_ENU: LazyLock<Quaternion> = LazyLock::new(|| ENU_TO_NED.conjugate());

/// Rotation of `(x, y, z) -> (-z, x, -y)`: -90 degrees about X, then 90 about Z.
static XYZ_TO_NED: LazyLock<Quaternion> = LazyLock::new(|| {
    let about_z = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
    let about_x = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2);
    (about_z * about_x).into_inner()
});

/// Conjugate of [`XYZ_TO_NED`].
static NED_TO_XYZ: LazyLock<Quaternion> = LazyLock::new(|| XYZ_TO_NED.conjugate());

/// A value that can be moved between coordinate frames.
pub trait FrameTransform: Sized {
    /// ENU to NED.
    fn enu_to_ned(&self) -> Self;
    /// NED to ENU.
    fn ned_to_enu(&self) -> Self;
    /// Local XYZ to NED.
    fn xyz_to_ned(&self) -> Self;
    /// NED to local XYZ.
    fn ned_to_xyz(&self) -> Self;
}

impl FrameTransform for Vector3 {
    fn enu_to_ned(&self) -> Self {
        Vector3::new(self.y, self.x, -self.z)
    }

    fn ned_to_enu(&self) -> Self {
        let swap = Matrix3::new(
            0.0, 1.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 0.0, -1.0,
        );
        swap * self
    }

    fn xyz_to_ned(&self) -> Self {
        Vector3::new(-self.z, self.x, -self.y)
    }

    fn ned_to_xyz(&self) -> Self {
        Vector3::new(self.y, -self.z, -self.x)
    }
}

impl FrameTransform for Quaternion {
    fn enu_to_ned(&self) -> Self {
        normalized(*ENU_TO_NED * self)
    }

    fn ned_to_enu(&self) -> Self {
        normalized(*NED_TO_ENU * self)
    }

    fn xyz_to_ned(&self) -> Self {
        normalized(*XYZ_TO_NED * self)
    }

    fn ned_to_xyz(&self) -> Self {
        normalized(*NED_TO_XYZ * self)
    }
}

impl FrameTransform for Pose {
    fn enu_to_ned(&self) -> Self {
        Pose::new(self.position.enu_to_ned(), self.orientation.enu_to_ned())
    }

    fn ned_to_enu(&self) -> Self {
        Pose::new(self.position.ned_to_enu(), self.orientation.ned_to_enu())
    }

    fn xyz_to_ned(&self) -> Self {
        Pose::new(self.position.xyz_to_ned(), self.orientation.xyz_to_ned())
    }

    fn ned_to_xyz(&self) -> Self {
        Pose::new(self.position.ned_to_xyz(), self.orientation.ned_to_xyz())
    }
}

fn normalized(q: Quaternion) -> Quaternion {
    Unit::try_new(q, MIN_NORM).map_or(q, Unit::into_inner)
}

/// ENU to NED, for a vector, quaternion or pose.
pub fn enu_to_ned<T: FrameTransform>(value: &T) -> T {
    value.enu_to_ned()
}

/// NED to ENU, for a vector, quaternion or pose.
pub fn ned_to_enu<T: FrameTransform>(value: &T) -> T {
    value.ned_to_enu()
}

/// Local XYZ to NED, for a vector, quaternion or pose.
pub fn xyz_to_ned<T: FrameTransform>(value: &T) -> T {
    value.xyz_to_ned()
}

/// NED to local XYZ, for a vector, quaternion or pose.
pub fn ned_to_xyz<T: FrameTransform>(value: &T) -> T {
    value.ned_to_xyz()
}
