//! Domain twins of the wire records, built from the geometry primitives.

use crate::geometry::{Box2, Box3, GeoPoint, Matrix4, Pose, Quaternion, Vector3};
use crate::types::{LandedState, RcData};

/// Camera pose, field of view and projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraInfo {
    /// Camera pose relative to its vehicle.
    pub pose: Pose,
    /// Horizontal field of view, degrees.
    pub fov: f64,
    /// Projection matrix.
    pub proj_mat: Matrix4,
}

/// Partial camera pose update. `None` leaves that part of the pose untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraPoseUpdate {
    /// New position, relative to the vehicle.
    pub position: Option<Vector3>,
    /// New orientation, relative to the vehicle.
    pub orientation: Option<Quaternion>,
}

impl CameraPoseUpdate {
    /// Move and rotate the camera.
    pub fn pose(pose: Pose) -> Self {
        Self {
            position: Some(pose.position),
            orientation: Some(pose.orientation),
        }
    }

    /// Move the camera, keep its orientation.
    pub fn position(position: Vector3) -> Self {
        Self {
            position: Some(position),
            orientation: None,
        }
    }

    /// Rotate the camera, keep its position.
    pub fn orientation(orientation: Quaternion) -> Self {
        Self {
            position: None,
            orientation: Some(orientation),
        }
    }
}

impl From<Pose> for CameraPoseUpdate {
    fn from(pose: Pose) -> Self {
        Self::pose(pose)
    }
}

/// An object found by a detection search.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionInfo {
    /// Name of the detected object.
    pub name: String,
    /// Global location of the detection.
    pub geo_point: GeoPoint,
    /// Bounding box in image pixels.
    pub box2d: Box2,
    /// Bounding box in meters, relative to the camera.
    pub box3d: Box3,
    /// Object pose relative to the camera.
    pub relative_pose: Pose,
}

/// Last collision of a vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionInfo {
    pub has_collided: bool,
    pub normal: Vector3,
    pub impact_point: Vector3,
    pub position: Vector3,
    pub penetration_depth: f64,
    pub time_stamp: u64,
    pub object_name: String,
    pub object_id: i32,
}

/// Position, orientation and their derivatives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KinematicsState {
    pub position: Vector3,
    pub orientation: Quaternion,
    pub linear_velocity: Vector3,
    pub angular_velocity: Vector3,
    pub linear_acceleration: Vector3,
    pub angular_acceleration: Vector3,
}

impl KinematicsState {
    /// Position and orientation only.
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.orientation)
    }
}

/// Environment at a vehicle's location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvironmentState {
    pub position: Vector3,
    pub geo_point: GeoPoint,
    pub gravity: Vector3,
    pub air_pressure: f64,
    pub temperature: f64,
    pub air_density: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImuData {
    pub time_stamp: u64,
    pub orientation: Quaternion,
    pub angular_velocity: Vector3,
    pub linear_acceleration: Vector3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MagnetometerData {
    pub time_stamp: u64,
    pub magnetic_field_body: Vector3,
    pub magnetic_field_covariance: Vec<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GnssReport {
    pub geo_point: GeoPoint,
    /// Horizontal position error, meters.
    pub eph: f64,
    /// Vertical position error, meters.
    pub epv: f64,
    pub velocity: Vector3,
    pub fix_type: i32,
    pub time_utc: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GpsData {
    pub time_stamp: u64,
    pub gnss: GnssReport,
    pub is_valid: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceSensorData {
    pub time_stamp: u64,
    pub distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub relative_pose: Pose,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LidarData {
    pub time_stamp: u64,
    pub points: Vec<Vector3>,
    pub pose: Pose,
    pub segmentation: Vec<i32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CarState {
    pub speed: f64,
    pub gear: i32,
    pub rpm: f64,
    pub maxrpm: f64,
    pub handbrake: bool,
    pub collision: CollisionInfo,
    pub kinematics_estimated: KinematicsState,
    pub timestamp: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultirotorState {
    pub collision: CollisionInfo,
    pub kinematics_estimated: KinematicsState,
    pub gps_location: GeoPoint,
    pub timestamp: u64,
    pub landed_state: LandedState,
    pub rc_data: RcData,
    pub ready: bool,
    pub ready_message: String,
    pub can_arm: bool,
}

/// A captured image. Only one of the two data buffers is filled, depending
/// on whether float pixels were requested.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageResponse {
    pub image_data_uint8: Vec<u8>,
    pub image_data_float: Vec<f64>,
    pub camera_name: String,
    pub camera_position: Vector3,
    pub camera_orientation: Quaternion,
    pub time_stamp: u64,
    pub message: String,
    pub pixels_as_float: bool,
    pub compress: bool,
    pub width: i32,
    pub height: i32,
    pub image_type: crate::types::ImageType,
}
