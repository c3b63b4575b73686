//! The server's flat record schema.
//!
//! Field names are reproduced exactly as the server expects them; records
//! are encoded as msgpack maps keyed by these names. All positions and
//! orientations in here are NED. Use [`crate::convert`] to move between these
//! records and the geometry types.

use serde::{Deserialize, Serialize};

use crate::geometry::GeoPoint;
use crate::types::{LandedState, RcData};

/// Wire 2D vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2r {
    pub x_val: f64,
    pub y_val: f64,
}

/// Wire 3D vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3r {
    pub x_val: f64,
    pub y_val: f64,
    pub z_val: f64,
}

impl Vector3r {
    /// A vector with every component NaN; the server reads it as "unchanged".
    pub const NAN: Self = Self {
        x_val: f64::NAN,
        y_val: f64::NAN,
        z_val: f64::NAN,
    };
}

/// Wire quaternion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quaternionr {
    pub w_val: f64,
    pub x_val: f64,
    pub y_val: f64,
    pub z_val: f64,
}

impl Quaternionr {
    /// A quaternion with every component NaN; the server reads it as "unchanged".
    pub const NAN: Self = Self {
        w_val: f64::NAN,
        x_val: f64::NAN,
        y_val: f64::NAN,
        z_val: f64::NAN,
    };
}

impl Default for Quaternionr {
    fn default() -> Self {
        Self {
            w_val: 1.0,
            x_val: 0.0,
            y_val: 0.0,
            z_val: 0.0,
        }
    }
}

/// Wire pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3r,
    pub orientation: Quaternionr,
}

/// Wire 2D box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Box2 {
    pub min: Vector2r,
    pub max: Vector2r,
}

/// Wire 3D box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Box3 {
    pub min: Vector3r,
    pub max: Vector3r,
}

/// Wire projection matrix, rows first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionMatrix {
    pub matrix: [[f64; 4]; 4],
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub pose: Pose,
    pub fov: f64,
    pub proj_mat: ProjectionMatrix,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionInfo {
    pub name: String,
    pub geo_point: GeoPoint,
    #[serde(rename = "box2D")]
    pub box2d: Box2,
    #[serde(rename = "box3D")]
    pub box3d: Box3,
    pub relative_pose: Pose,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionInfo {
    pub has_collided: bool,
    pub normal: Vector3r,
    pub impact_point: Vector3r,
    pub position: Vector3r,
    pub penetration_depth: f64,
    pub time_stamp: u64,
    pub object_name: String,
    pub object_id: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicsState {
    pub position: Vector3r,
    pub orientation: Quaternionr,
    pub linear_velocity: Vector3r,
    pub angular_velocity: Vector3r,
    pub linear_acceleration: Vector3r,
    pub angular_acceleration: Vector3r,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    pub position: Vector3r,
    pub geo_point: GeoPoint,
    pub gravity: Vector3r,
    pub air_pressure: f64,
    pub temperature: f64,
    pub air_density: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuData {
    pub time_stamp: u64,
    pub orientation: Quaternionr,
    pub angular_velocity: Vector3r,
    pub linear_acceleration: Vector3r,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MagnetometerData {
    pub time_stamp: u64,
    pub magnetic_field_body: Vector3r,
    pub magnetic_field_covariance: Vec<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GnssReport {
    pub geo_point: GeoPoint,
    pub eph: f64,
    pub epv: f64,
    pub velocity: Vector3r,
    pub fix_type: i32,
    pub time_utc: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsData {
    pub time_stamp: u64,
    pub gnss: GnssReport,
    pub is_valid: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceSensorData {
    pub time_stamp: u64,
    pub distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub relative_pose: Pose,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LidarData {
    pub time_stamp: u64,
    /// Flat `x, y, z` triples.
    pub point_cloud: Vec<f64>,
    pub pose: Pose,
    pub segmentation: Vec<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
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

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
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

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageResponse {
    #[serde(with = "serde_bytes")]
    pub image_data_uint8: Vec<u8>,
    pub image_data_float: Vec<f64>,
    pub camera_name: String,
    pub camera_position: Vector3r,
    pub camera_orientation: Quaternionr,
    pub time_stamp: u64,
    pub message: String,
    pub pixels_as_float: bool,
    pub compress: bool,
    pub width: i32,
    pub height: i32,
    pub image_type: crate::types::ImageType,
}
