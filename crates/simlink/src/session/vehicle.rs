//! Operations every vehicle type supports: control authority, pose, ground
//! truth, cameras, detection, sensors and tasks.
//!
//! An empty `vehicle_name` addresses the default vehicle.

use rmpv::Value;
use simlink_common::error::{Result, SimError};
use simlink_common::types::{BarometerData, CameraName, ImageRequest, ImageType};
use simlink_common::wire::{
    CameraInfo, CollisionInfo, DetectionInfo, DistanceSensorData, EnvironmentState, GpsData, ImageResponse,
    ImuData, KinematicsState, LidarData, MagnetometerData, Pose,
};
use simlink_common::GeoPoint;

use super::Session;

impl Session {
    /// Give the API control of the vehicle, or hand it back to the RC.
    pub async fn enable_api_control(&self, enabled: bool, vehicle_name: &str) -> Result<()> {
        self.call("enableApiControl", (enabled, vehicle_name)).await
    }

    /// Whether the API controls the vehicle.
    pub async fn is_api_control_enabled(&self, vehicle_name: &str) -> Result<bool> {
        self.call("isApiControlEnabled", (vehicle_name,)).await
    }

    /// Arm or disarm the motors.
    pub async fn arm_disarm(&self, arm: bool, vehicle_name: &str) -> Result<bool> {
        self.call("armDisarm", (arm, vehicle_name)).await
    }

    /// Vehicle pose in the world NED frame.
    pub async fn sim_get_vehicle_pose(&self, vehicle_name: &str) -> Result<Pose> {
        self.call("simGetVehiclePose", (vehicle_name,)).await
    }

    /// Teleport the vehicle. NaN components keep their current value.
    pub async fn sim_set_vehicle_pose(&self, pose: Pose, ignore_collision: bool, vehicle_name: &str) -> Result<()> {
        self.call("simSetVehiclePose", (pose, ignore_collision, vehicle_name)).await
    }

    /// Where the vehicle started.
    pub async fn get_home_geo_point(&self, vehicle_name: &str) -> Result<GeoPoint> {
        self.call("getHomeGeoPoint", (vehicle_name,)).await
    }

    /// Last collision of the vehicle.
    pub async fn sim_get_collision_info(&self, vehicle_name: &str) -> Result<CollisionInfo> {
        self.call("simGetCollisionInfo", (vehicle_name,)).await
    }

    /// Kinematics straight from the physics engine.
    pub async fn sim_get_ground_truth_kinematics(&self, vehicle_name: &str) -> Result<KinematicsState> {
        self.call("simGetGroundTruthKinematics", (vehicle_name,)).await
    }

    /// Environment at the vehicle straight from the physics engine.
    pub async fn sim_get_ground_truth_environment(&self, vehicle_name: &str) -> Result<EnvironmentState> {
        self.call("simGetGroundTruthEnvironment", (vehicle_name,)).await
    }

    /// Whether the vehicle can see `point`.
    pub async fn sim_test_line_of_sight_to_point(&self, point: GeoPoint, vehicle_name: &str) -> Result<bool> {
        self.call("simTestLineOfSightToPoint", (point, vehicle_name)).await
    }

    /// Cancel the running task of the vehicle.
    pub async fn cancel_last_task(&self, vehicle_name: &str) -> Result<()> {
        self.call("cancelLastTask", (vehicle_name,)).await
    }

    /// Wait for the running task of the vehicle. Returns false on timeout.
    pub async fn wait_on_last_task(&self, vehicle_name: &str, timeout_sec: f64) -> Result<bool> {
        self.call("waitOnLastTask", (vehicle_name, timeout_sec)).await
    }

    /// Pose, field of view and projection of a camera.
    pub async fn sim_get_camera_info(&self, camera_name: &CameraName, vehicle_name: &str, external: bool) -> Result<CameraInfo> {
        self.call("simGetCameraInfo", (camera_name, vehicle_name, external)).await
    }

    /// Move a camera relative to its vehicle. NaN components stay unchanged.
    pub async fn sim_set_camera_pose(
        &self,
        camera_name: &CameraName,
        pose: Pose,
        vehicle_name: &str,
        external: bool,
    ) -> Result<()> {
        self.call("simSetCameraPose", (camera_name, pose, vehicle_name, external)).await
    }

    /// Change the field of view of a camera.
    pub async fn sim_set_camera_fov(
        &self,
        camera_name: &CameraName,
        fov_degrees: f64,
        vehicle_name: &str,
        external: bool,
    ) -> Result<()> {
        self.call("simSetCameraFov", (camera_name, fov_degrees, vehicle_name, external)).await
    }

    /// Capture one image, compressed as PNG. `None` when the camera produced
    /// nothing.
    pub async fn sim_get_image(
        &self,
        camera_name: &CameraName,
        image_type: ImageType,
        vehicle_name: &str,
        external: bool,
    ) -> Result<Option<Vec<u8>>> {
        let image: Value = self
            .call("simGetImage", (camera_name, image_type, vehicle_name, external))
            .await?;
        let bytes = match image {
            Value::Binary(bytes) => bytes,
            Value::String(text) => text.into_bytes(),
            Value::Nil => Vec::new(),
            other => return Err(SimError::Decode(format!("result of `simGetImage`: expected bytes, got {}", other))),
        };
        // The server answers an empty image or a single NUL when capture fails.
        Ok((!bytes.is_empty() && bytes != [0]).then_some(bytes))
    }

    /// Capture several images in one round trip.
    pub async fn sim_get_images(
        &self,
        requests: &[ImageRequest],
        vehicle_name: &str,
        external: bool,
    ) -> Result<Vec<ImageResponse>> {
        self.call("simGetImages", (requests, vehicle_name, external)).await
    }

    /// Add a mesh name pattern to the detection filter of a camera.
    pub async fn sim_add_detection_filter_mesh_name(
        &self,
        camera_name: &CameraName,
        image_type: ImageType,
        mesh_name: &str,
        vehicle_name: &str,
        external: bool,
    ) -> Result<()> {
        self.call(
            "simAddDetectionFilterMeshName",
            (camera_name, image_type, mesh_name, vehicle_name, external),
        )
        .await
    }

    /// Limit detections of a camera to `radius_cm`.
    pub async fn sim_set_detection_filter_radius(
        &self,
        camera_name: &CameraName,
        image_type: ImageType,
        radius_cm: f64,
        vehicle_name: &str,
        external: bool,
    ) -> Result<()> {
        self.call(
            "simSetDetectionFilterRadius",
            (camera_name, image_type, radius_cm, vehicle_name, external),
        )
        .await
    }

    /// Remove every mesh name pattern from the detection filter of a camera.
    pub async fn sim_clear_detection_mesh_names(
        &self,
        camera_name: &CameraName,
        image_type: ImageType,
        vehicle_name: &str,
        external: bool,
    ) -> Result<()> {
        self.call(
            "simClearDetectionMeshNames",
            (camera_name, image_type, vehicle_name, external),
        )
        .await
    }

    /// Objects currently matched by the detection filter of a camera.
    pub async fn sim_get_detections(
        &self,
        camera_name: &CameraName,
        image_type: ImageType,
        vehicle_name: &str,
        external: bool,
    ) -> Result<Vec<DetectionInfo>> {
        self.call("simGetDetections", (camera_name, image_type, vehicle_name, external))
            .await
    }

    /// Read an IMU. An empty `imu_name` picks the first one.
    pub async fn get_imu_data(&self, imu_name: &str, vehicle_name: &str) -> Result<ImuData> {
        self.call("getImuData", (imu_name, vehicle_name)).await
    }

    /// Read a barometer.
    pub async fn get_barometer_data(&self, barometer_name: &str, vehicle_name: &str) -> Result<BarometerData> {
        self.call("getBarometerData", (barometer_name, vehicle_name)).await
    }

    /// Read a magnetometer.
    pub async fn get_magnetometer_data(&self, magnetometer_name: &str, vehicle_name: &str) -> Result<MagnetometerData> {
        self.call("getMagnetometerData", (magnetometer_name, vehicle_name)).await
    }

    /// Read a GPS receiver.
    pub async fn get_gps_data(&self, gps_name: &str, vehicle_name: &str) -> Result<GpsData> {
        self.call("getGpsData", (gps_name, vehicle_name)).await
    }

    /// Read a distance sensor.
    pub async fn get_distance_sensor_data(&self, distance_sensor_name: &str, vehicle_name: &str) -> Result<DistanceSensorData> {
        self.call("getDistanceSensorData", (distance_sensor_name, vehicle_name)).await
    }

    /// Read a lidar.
    pub async fn get_lidar_data(&self, lidar_name: &str, vehicle_name: &str) -> Result<LidarData> {
        self.call("getLidarData", (lidar_name, vehicle_name)).await
    }
}
