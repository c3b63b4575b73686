//! Wire <-> domain conversion.
//!
//! Every conversion is a pure field mapping with no math, so a round trip
//! through the wire representation reproduces its input exactly. Nothing
//! here validates ranges or normalizes quaternions. Missing fields never
//! reach this module; the decoder rejects them first.

use crate::geometry::{Box2, Box3, Matrix4, Pose, Quaternion, Vector2, Vector3};
use crate::state::{
    CameraInfo, CameraPoseUpdate, CarState, CollisionInfo, DetectionInfo, DistanceSensorData,
    EnvironmentState, GnssReport, GpsData, ImageResponse, ImuData, KinematicsState, LidarData,
    MagnetometerData, MultirotorState,
};
use crate::wire;

pub use crate::color::color_to_rgba;

/// A domain type with a wire twin.
pub trait WireConversion: Sized {
    /// The wire record.
    type Wire;

    /// Build the domain value from its wire record.
    fn from_wire(wire: &Self::Wire) -> Self;

    /// Build the wire record for this value.
    fn to_wire(&self) -> Self::Wire;
}

impl WireConversion for Vector2 {
    type Wire = wire::Vector2r;

    fn from_wire(wire: &Self::Wire) -> Self {
        Vector2::new(wire.x_val, wire.y_val)
    }

    fn to_wire(&self) -> Self::Wire {
        wire::Vector2r {
            x_val: self.x,
            y_val: self.y,
        }
    }
}

impl WireConversion for Vector3 {
    type Wire = wire::Vector3r;

    fn from_wire(wire: &Self::Wire) -> Self {
        Vector3::new(wire.x_val, wire.y_val, wire.z_val)
    }

    fn to_wire(&self) -> Self::Wire {
        wire::Vector3r {
            x_val: self.x,
            y_val: self.y,
            z_val: self.z,
        }
    }
}

impl WireConversion for Quaternion {
    type Wire = wire::Quaternionr;

    fn from_wire(wire: &Self::Wire) -> Self {
        Quaternion::new(wire.w_val, wire.x_val, wire.y_val, wire.z_val)
    }

    fn to_wire(&self) -> Self::Wire {
        wire::Quaternionr {
            w_val: self.w,
            x_val: self.i,
            y_val: self.j,
            z_val: self.k,
        }
    }
}

impl WireConversion for Pose {
    type Wire = wire::Pose;

    fn from_wire(wire: &Self::Wire) -> Self {
        Pose::new(to_vector3(&wire.position), to_quaternion(&wire.orientation))
    }

    fn to_wire(&self) -> Self::Wire {
        wire::Pose {
            position: to_vector3_wire(&self.position),
            orientation: to_quaternion_wire(&self.orientation),
        }
    }
}

impl WireConversion for Box2 {
    type Wire = wire::Box2;

    fn from_wire(wire: &Self::Wire) -> Self {
        Box2::new(to_vector2(&wire.min), to_vector2(&wire.max))
    }

    fn to_wire(&self) -> Self::Wire {
        wire::Box2 {
            min: to_vector2_wire(&self.min),
            max: to_vector2_wire(&self.max),
        }
    }
}

impl WireConversion for Box3 {
    type Wire = wire::Box3;

    fn from_wire(wire: &Self::Wire) -> Self {
        Box3::new(to_vector3(&wire.min), to_vector3(&wire.max))
    }

    fn to_wire(&self) -> Self::Wire {
        wire::Box3 {
            min: to_vector3_wire(&self.min),
            max: to_vector3_wire(&self.max),
        }
    }
}

impl WireConversion for Matrix4 {
    type Wire = wire::ProjectionMatrix;

    fn from_wire(wire: &Self::Wire) -> Self {
        Matrix4::from_fn(|row, col| wire.matrix[row][col])
    }

    fn to_wire(&self) -> Self::Wire {
        wire::ProjectionMatrix {
            matrix: std::array::from_fn(|row| std::array::from_fn(|col| self[(row, col)])),
        }
    }
}

impl WireConversion for CameraInfo {
    type Wire = wire::CameraInfo;

    fn from_wire(wire: &Self::Wire) -> Self {
        CameraInfo {
            pose: to_pose(&wire.pose),
            fov: wire.fov,
            proj_mat: to_projection_matrix(&wire.proj_mat),
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::CameraInfo {
            pose: to_pose_wire(&self.pose),
            fov: self.fov,
            proj_mat: self.proj_mat.to_wire(),
        }
    }
}

impl WireConversion for DetectionInfo {
    type Wire = wire::DetectionInfo;

    fn from_wire(wire: &Self::Wire) -> Self {
        DetectionInfo {
            name: wire.name.clone(),
            geo_point: wire.geo_point,
            box2d: to_box2(&wire.box2d),
            box3d: to_box3(&wire.box3d),
            relative_pose: to_pose(&wire.relative_pose),
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::DetectionInfo {
            name: self.name.clone(),
            geo_point: self.geo_point,
            box2d: to_box2_wire(&self.box2d),
            box3d: to_box3_wire(&self.box3d),
            relative_pose: to_pose_wire(&self.relative_pose),
        }
    }
}

impl WireConversion for CollisionInfo {
    type Wire = wire::CollisionInfo;

    fn from_wire(wire: &Self::Wire) -> Self {
        CollisionInfo {
            has_collided: wire.has_collided,
            normal: to_vector3(&wire.normal),
            impact_point: to_vector3(&wire.impact_point),
            position: to_vector3(&wire.position),
            penetration_depth: wire.penetration_depth,
            time_stamp: wire.time_stamp,
            object_name: wire.object_name.clone(),
            object_id: wire.object_id,
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::CollisionInfo {
            has_collided: self.has_collided,
            normal: to_vector3_wire(&self.normal),
            impact_point: to_vector3_wire(&self.impact_point),
            position: to_vector3_wire(&self.position),
            penetration_depth: self.penetration_depth,
            time_stamp: self.time_stamp,
            object_name: self.object_name.clone(),
            object_id: self.object_id,
        }
    }
}

impl WireConversion for KinematicsState {
    type Wire = wire::KinematicsState;

    fn from_wire(wire: &Self::Wire) -> Self {
        KinematicsState {
            position: to_vector3(&wire.position),
            orientation: to_quaternion(&wire.orientation),
            linear_velocity: to_vector3(&wire.linear_velocity),
            angular_velocity: to_vector3(&wire.angular_velocity),
            linear_acceleration: to_vector3(&wire.linear_acceleration),
            angular_acceleration: to_vector3(&wire.angular_acceleration),
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::KinematicsState {
            position: to_vector3_wire(&self.position),
            orientation: to_quaternion_wire(&self.orientation),
            linear_velocity: to_vector3_wire(&self.linear_velocity),
            angular_velocity: to_vector3_wire(&self.angular_velocity),
            linear_acceleration: to_vector3_wire(&self.linear_acceleration),
            angular_acceleration: to_vector3_wire(&self.angular_acceleration),
        }
    }
}

impl WireConversion for EnvironmentState {
    type Wire = wire::EnvironmentState;

    fn from_wire(wire: &Self::Wire) -> Self {
        EnvironmentState {
            position: to_vector3(&wire.position),
            geo_point: wire.geo_point,
            gravity: to_vector3(&wire.gravity),
            air_pressure: wire.air_pressure,
            temperature: wire.temperature,
            air_density: wire.air_density,
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::EnvironmentState {
            position: to_vector3_wire(&self.position),
            geo_point: self.geo_point,
            gravity: to_vector3_wire(&self.gravity),
            air_pressure: self.air_pressure,
            temperature: self.temperature,
            air_density: self.air_density,
        }
    }
}

impl WireConversion for ImuData {
    type Wire = wire::ImuData;

    fn from_wire(wire: &Self::Wire) -> Self {
        ImuData {
            time_stamp: wire.time_stamp,
            orientation: to_quaternion(&wire.orientation),
            angular_velocity: to_vector3(&wire.angular_velocity),
            linear_acceleration: to_vector3(&wire.linear_acceleration),
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::ImuData {
            time_stamp: self.time_stamp,
            orientation: to_quaternion_wire(&self.orientation),
            angular_velocity: to_vector3_wire(&self.angular_velocity),
            linear_acceleration: to_vector3_wire(&self.linear_acceleration),
        }
    }
}

impl WireConversion for MagnetometerData {
    type Wire = wire::MagnetometerData;

    fn from_wire(wire: &Self::Wire) -> Self {
        MagnetometerData {
            time_stamp: wire.time_stamp,
            magnetic_field_body: to_vector3(&wire.magnetic_field_body),
            magnetic_field_covariance: wire.magnetic_field_covariance.clone(),
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::MagnetometerData {
            time_stamp: self.time_stamp,
            magnetic_field_body: to_vector3_wire(&self.magnetic_field_body),
            magnetic_field_covariance: self.magnetic_field_covariance.clone(),
        }
    }
}

impl WireConversion for GnssReport {
    type Wire = wire::GnssReport;

    fn from_wire(wire: &Self::Wire) -> Self {
        GnssReport {
            geo_point: wire.geo_point,
            eph: wire.eph,
            epv: wire.epv,
            velocity: to_vector3(&wire.velocity),
            fix_type: wire.fix_type,
            time_utc: wire.time_utc,
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::GnssReport {
            geo_point: self.geo_point,
            eph: self.eph,
            epv: self.epv,
            velocity: to_vector3_wire(&self.velocity),
            fix_type: self.fix_type,
            time_utc: self.time_utc,
        }
    }
}

impl WireConversion for GpsData {
    type Wire = wire::GpsData;

    fn from_wire(wire: &Self::Wire) -> Self {
        GpsData {
            time_stamp: wire.time_stamp,
            gnss: GnssReport::from_wire(&wire.gnss),
            is_valid: wire.is_valid,
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::GpsData {
            time_stamp: self.time_stamp,
            gnss: self.gnss.to_wire(),
            is_valid: self.is_valid,
        }
    }
}

impl WireConversion for DistanceSensorData {
    type Wire = wire::DistanceSensorData;

    fn from_wire(wire: &Self::Wire) -> Self {
        DistanceSensorData {
            time_stamp: wire.time_stamp,
            distance: wire.distance,
            min_distance: wire.min_distance,
            max_distance: wire.max_distance,
            relative_pose: to_pose(&wire.relative_pose),
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::DistanceSensorData {
            time_stamp: self.time_stamp,
            distance: self.distance,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            relative_pose: to_pose_wire(&self.relative_pose),
        }
    }
}

impl WireConversion for LidarData {
    type Wire = wire::LidarData;

    /// A trailing partial triple in the point cloud is dropped.
    fn from_wire(wire: &Self::Wire) -> Self {
        LidarData {
            time_stamp: wire.time_stamp,
            points: wire
                .point_cloud
                .chunks_exact(3)
                .map(|p| Vector3::new(p[0], p[1], p[2]))
                .collect(),
            pose: to_pose(&wire.pose),
            segmentation: wire.segmentation.clone(),
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::LidarData {
            time_stamp: self.time_stamp,
            point_cloud: self.points.iter().flat_map(|p| [p.x, p.y, p.z]).collect(),
            pose: to_pose_wire(&self.pose),
            segmentation: self.segmentation.clone(),
        }
    }
}

impl WireConversion for CarState {
    type Wire = wire::CarState;

    fn from_wire(wire: &Self::Wire) -> Self {
        CarState {
            speed: wire.speed,
            gear: wire.gear,
            rpm: wire.rpm,
            maxrpm: wire.maxrpm,
            handbrake: wire.handbrake,
            collision: CollisionInfo::from_wire(&wire.collision),
            kinematics_estimated: KinematicsState::from_wire(&wire.kinematics_estimated),
            timestamp: wire.timestamp,
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::CarState {
            speed: self.speed,
            gear: self.gear,
            rpm: self.rpm,
            maxrpm: self.maxrpm,
            handbrake: self.handbrake,
            collision: self.collision.to_wire(),
            kinematics_estimated: self.kinematics_estimated.to_wire(),
            timestamp: self.timestamp,
        }
    }
}

impl WireConversion for MultirotorState {
    type Wire = wire::MultirotorState;

    fn from_wire(wire: &Self::Wire) -> Self {
        MultirotorState {
            collision: CollisionInfo::from_wire(&wire.collision),
            kinematics_estimated: KinematicsState::from_wire(&wire.kinematics_estimated),
            gps_location: wire.gps_location,
            timestamp: wire.timestamp,
            landed_state: wire.landed_state,
            rc_data: wire.rc_data,
            ready: wire.ready,
            ready_message: wire.ready_message.clone(),
            can_arm: wire.can_arm,
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::MultirotorState {
            collision: self.collision.to_wire(),
            kinematics_estimated: self.kinematics_estimated.to_wire(),
            gps_location: self.gps_location,
            timestamp: self.timestamp,
            landed_state: self.landed_state,
            rc_data: self.rc_data,
            ready: self.ready,
            ready_message: self.ready_message.clone(),
            can_arm: self.can_arm,
        }
    }
}

impl WireConversion for ImageResponse {
    type Wire = wire::ImageResponse;

    fn from_wire(wire: &Self::Wire) -> Self {
        ImageResponse {
            image_data_uint8: wire.image_data_uint8.clone(),
            image_data_float: wire.image_data_float.clone(),
            camera_name: wire.camera_name.clone(),
            camera_position: to_vector3(&wire.camera_position),
            camera_orientation: to_quaternion(&wire.camera_orientation),
            time_stamp: wire.time_stamp,
            message: wire.message.clone(),
            pixels_as_float: wire.pixels_as_float,
            compress: wire.compress,
            width: wire.width,
            height: wire.height,
            image_type: wire.image_type,
        }
    }

    fn to_wire(&self) -> Self::Wire {
        wire::ImageResponse {
            image_data_uint8: self.image_data_uint8.clone(),
            image_data_float: self.image_data_float.clone(),
            camera_name: self.camera_name.clone(),
            camera_position: to_vector3_wire(&self.camera_position),
            camera_orientation: to_quaternion_wire(&self.camera_orientation),
            time_stamp: self.time_stamp,
            message: self.message.clone(),
            pixels_as_float: self.pixels_as_float,
            compress: self.compress,
            width: self.width,
            height: self.height,
            image_type: self.image_type,
        }
    }
}

/// Wire 2D vector to domain.
pub fn to_vector2(wire: &wire::Vector2r) -> Vector2 {
    Vector2::from_wire(wire)
}

/// Domain 2D vector to wire.
pub fn to_vector2_wire(v: &Vector2) -> wire::Vector2r {
    v.to_wire()
}

/// Wire vector to domain.
pub fn to_vector3(wire: &wire::Vector3r) -> Vector3 {
    Vector3::from_wire(wire)
}

/// Domain vector to wire.
pub fn to_vector3_wire(v: &Vector3) -> wire::Vector3r {
    v.to_wire()
}

/// Wire quaternion to domain, without renormalizing.
pub fn to_quaternion(wire: &wire::Quaternionr) -> Quaternion {
    Quaternion::from_wire(wire)
}

/// Domain quaternion to wire.
pub fn to_quaternion_wire(q: &Quaternion) -> wire::Quaternionr {
    q.to_wire()
}

/// Wire pose to domain.
pub fn to_pose(wire: &wire::Pose) -> Pose {
    Pose::from_wire(wire)
}

/// Domain pose to wire.
pub fn to_pose_wire(pose: &Pose) -> wire::Pose {
    pose.to_wire()
}

/// Wire 2D box to domain.
pub fn to_box2(wire: &wire::Box2) -> Box2 {
    Box2::from_wire(wire)
}

/// Domain 2D box to wire.
pub fn to_box2_wire(b: &Box2) -> wire::Box2 {
    b.to_wire()
}

/// Wire 3D box to domain.
pub fn to_box3(wire: &wire::Box3) -> Box3 {
    Box3::from_wire(wire)
}

/// Domain 3D box to wire.
pub fn to_box3_wire(b: &Box3) -> wire::Box3 {
    b.to_wire()
}

/// Unpack the server's row-major 4x4 array.
pub fn to_projection_matrix(wire: &wire::ProjectionMatrix) -> Matrix4 {
    Matrix4::from_wire(wire)
}

/// The wire pose for a partial camera update.
///
/// The server keeps whichever half of the pose arrives as NaN, so a missing
/// part is only turned into NaN here, at the wire boundary.
pub fn to_camera_pose_wire(update: &CameraPoseUpdate) -> wire::Pose {
    wire::Pose {
        position: update
            .position
            .as_ref()
            .map_or(wire::Vector3r::NAN, to_vector3_wire),
        orientation: update
            .orientation
            .as_ref()
            .map_or(wire::Quaternionr::NAN, to_quaternion_wire),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const SAMPLES: usize = 256;

    fn random_vector3(rng: &mut StdRng) -> wire::Vector3r {
        wire::Vector3r {
            x_val: rng.random_range(-1e4..1e4),
            y_val: rng.random_range(-1e4..1e4),
            z_val: rng.random_range(-1e4..1e4),
        }
    }

    fn random_quaternion(rng: &mut StdRng) -> wire::Quaternionr {
        // Deliberately not normalized; conversion must not care.
        wire::Quaternionr {
            w_val: rng.random_range(-2.0..2.0),
            x_val: rng.random_range(-2.0..2.0),
            y_val: rng.random_range(-2.0..2.0),
            z_val: rng.random_range(-2.0..2.0),
        }
    }

    fn random_pose(rng: &mut StdRng) -> wire::Pose {
        wire::Pose {
            position: random_vector3(rng),
            orientation: random_quaternion(rng),
        }
    }

    fn assert_round_trips<T>(wire: T::Wire)
    where
        T: WireConversion + PartialEq + std::fmt::Debug,
        T::Wire: PartialEq + std::fmt::Debug,
    {
        let domain = T::from_wire(&wire);
        assert_eq!(domain.to_wire(), wire);
        assert_eq!(T::from_wire(&domain.to_wire()), domain);
    }

    #[test]
    fn test_primitive_round_trips() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..SAMPLES {
            assert_round_trips::<Vector3>(random_vector3(&mut rng));
            assert_round_trips::<Quaternion>(random_quaternion(&mut rng));
            assert_round_trips::<Pose>(random_pose(&mut rng));
            assert_round_trips::<Box2>(wire::Box2 {
                min: wire::Vector2r {
                    x_val: rng.random_range(-1e3..0.0),
                    y_val: rng.random_range(-1e3..0.0),
                },
                max: wire::Vector2r {
                    x_val: rng.random_range(0.0..1e3),
                    y_val: rng.random_range(0.0..1e3),
                },
            });
            assert_round_trips::<Box3>(wire::Box3 {
                min: random_vector3(&mut rng),
                max: random_vector3(&mut rng),
            });
        }
    }

    #[test]
    fn test_record_round_trips() {
        let mut rng = StdRng::seed_from_u64(41451);
        for _ in 0..SAMPLES {
            let collision = wire::CollisionInfo {
                has_collided: rng.random(),
                normal: random_vector3(&mut rng),
                impact_point: random_vector3(&mut rng),
                position: random_vector3(&mut rng),
                penetration_depth: rng.random_range(0.0..1.0),
                time_stamp: rng.random(),
                object_name: "Cube_12".into(),
                object_id: rng.random_range(-1..100),
            };
            let kinematics = wire::KinematicsState {
                position: random_vector3(&mut rng),
                orientation: random_quaternion(&mut rng),
                linear_velocity: random_vector3(&mut rng),
                angular_velocity: random_vector3(&mut rng),
                linear_acceleration: random_vector3(&mut rng),
                angular_acceleration: random_vector3(&mut rng),
            };
            assert_round_trips::<CollisionInfo>(collision.clone());
            assert_round_trips::<KinematicsState>(kinematics);
            assert_round_trips::<CarState>(wire::CarState {
                speed: rng.random_range(0.0..40.0),
                gear: rng.random_range(-1..6),
                rpm: rng.random_range(0.0..7000.0),
                maxrpm: 7500.0,
                handbrake: rng.random(),
                collision,
                kinematics_estimated: kinematics,
                timestamp: rng.random(),
            });
            assert_round_trips::<DetectionInfo>(wire::DetectionInfo {
                name: "Cylinder3".into(),
                geo_point: Default::default(),
                box2d: wire::Box2::default(),
                box3d: wire::Box3 {
                    min: random_vector3(&mut rng),
                    max: random_vector3(&mut rng),
                },
                relative_pose: random_pose(&mut rng),
            });
        }
    }

    #[test]
    fn test_wire_pose_scenario() {
        let wire = wire::Pose {
            position: wire::Vector3r {
                x_val: 1.0,
                y_val: 2.0,
                z_val: 3.0,
            },
            orientation: wire::Quaternionr {
                w_val: 1.0,
                x_val: 0.0,
                y_val: 0.0,
                z_val: 0.0,
            },
        };
        let pose = to_pose(&wire);
        assert_eq!(pose.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(pose.orientation, Quaternion::identity());
        assert_eq!(to_pose_wire(&pose), wire);
    }

    #[test]
    fn test_projection_matrix_is_row_major() {
        let mut raw = [[0.0; 4]; 4];
        for (row, values) in raw.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = (row * 4 + col) as f64;
            }
        }
        let m = to_projection_matrix(&wire::ProjectionMatrix { matrix: raw });
        assert_eq!(m[(0, 1)], 1.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(m[(3, 2)], 14.0);
        assert_eq!(m.to_wire().matrix, raw);
    }

    #[test]
    fn test_lidar_points_are_grouped() {
        let wire = wire::LidarData {
            point_cloud: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            ..Default::default()
        };
        let data = LidarData::from_wire(&wire);
        assert_eq!(data.points, vec![Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0)]);
        assert_eq!(data.to_wire().point_cloud, wire.point_cloud);
    }

    #[test]
    fn test_camera_update_marks_missing_half_as_nan() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 1.0);
        let wire = to_camera_pose_wire(&CameraPoseUpdate::orientation(q));
        assert!(wire.position.x_val.is_nan());
        assert!(wire.position.y_val.is_nan());
        assert!(wire.position.z_val.is_nan());
        assert_eq!(wire.orientation.z_val, 1.0);

        let wire = to_camera_pose_wire(&CameraPoseUpdate::position(Vector3::new(0.5, 0.0, 0.0)));
        assert_eq!(wire.position.x_val, 0.5);
        assert!(wire.orientation.w_val.is_nan());
    }
}
