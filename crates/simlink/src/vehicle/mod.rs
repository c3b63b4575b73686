//! Typed per-vehicle views over a [`Session`].
//!
//! A vehicle holds only a weak reference to the session it was created
//! from. Once the owning client closes or drops that session, every call on
//! the vehicle fails with [`SimError::NoSession`] instead of reaching a dead
//! connection.
//!
//! Wire records are converted to geometry types here; the session stays
//! wire-pure.

mod camera;
mod car;
mod multirotor;

use std::sync::{Arc, Weak};

use simlink_common::convert::{WireConversion, to_pose, to_pose_wire};
use simlink_common::error::{Result, SimError};
use simlink_common::geometry::{GeoPoint, Pose};
use simlink_common::state::{
    CollisionInfo, DetectionInfo, DistanceSensorData, EnvironmentState, GpsData, ImageResponse, ImuData,
    KinematicsState, LidarData, MagnetometerData,
};
use simlink_common::types::{BarometerData, CameraName, DetectionSearch, ImageRequest, ImageType};

pub use camera::Camera;
pub use car::Car;
pub use multirotor::{MoveOptions, Multirotor};

use crate::session::Session;

/// Non-owning handle to the session a vehicle or camera talks through.
#[derive(Clone, Debug, Default)]
pub struct SessionRef(Weak<Session>);

impl SessionRef {
    /// Refer to `session` without keeping it alive.
    pub fn new(session: &Arc<Session>) -> Self {
        Self(Arc::downgrade(session))
    }

    /// A handle that never resolves; every call through it fails with
    /// [`SimError::NoSession`].
    pub fn detached() -> Self {
        Self(Weak::new())
    }

    /// The session, if it is still alive.
    pub fn get(&self) -> Result<Arc<Session>> {
        self.0.upgrade().ok_or(SimError::NoSession)
    }

    /// Whether both handles refer to the same session.
    pub fn ptr_eq(&self, other: &SessionRef) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

/// Identity of a vehicle and the session it is reached through.
#[derive(Clone, Debug)]
pub struct VehicleCore {
    /// Vehicle name as listed by the simulator.
    pub name: String,
    /// Vehicle type as given to `simAddVehicle`, such as `PhysXCar`.
    pub vehicle_type: String,
    /// Blueprint path; empty for the default of `vehicle_type`.
    pub pawn_path: String,
    /// The session calls are made through.
    pub session: SessionRef,
}

impl VehicleCore {
    /// A vehicle of unspecified type and blueprint.
    pub fn new(name: impl Into<String>, session: SessionRef) -> Self {
        Self {
            name: name.into(),
            vehicle_type: String::new(),
            pawn_path: String::new(),
            session,
        }
    }

    /// Set the vehicle type.
    pub fn with_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.vehicle_type = vehicle_type.into();
        self
    }

    /// Set the blueprint path.
    pub fn with_pawn_path(mut self, pawn_path: impl Into<String>) -> Self {
        self.pawn_path = pawn_path.into();
        self
    }

    fn or_type(mut self, default_type: &str) -> Self {
        if self.vehicle_type.is_empty() {
            self.vehicle_type = default_type.to_owned();
        }
        self
    }
}

/// Capabilities shared by every vehicle type.
///
/// Implementors provide [`Vehicle::core`] and their default camera names;
/// everything else is built on those.
#[allow(async_fn_in_trait)]
pub trait Vehicle: Send + Sync + 'static {
    /// Identity and session of this vehicle.
    fn core(&self) -> &VehicleCore;

    /// Cameras the simulator attaches to this vehicle type by default.
    fn default_camera_names(&self) -> &'static [&'static str];

    /// Vehicle name.
    fn name(&self) -> &str {
        &self.core().name
    }

    /// Vehicle type.
    fn vehicle_type(&self) -> &str {
        &self.core().vehicle_type
    }

    /// Blueprint path.
    fn pawn_path(&self) -> &str {
        &self.core().pawn_path
    }

    /// The session, or [`SimError::NoSession`] once it is gone.
    fn session(&self) -> Result<Arc<Session>> {
        self.core().session.get()
    }

    /// Take API control of the vehicle.
    async fn enable_api_control(&self) -> Result<()> {
        self.session()?.enable_api_control(true, self.name()).await
    }

    /// Hand control back to the RC.
    async fn disable_api_control(&self) -> Result<()> {
        self.session()?.enable_api_control(false, self.name()).await
    }

    /// Whether the API controls the vehicle.
    async fn is_api_control_enabled(&self) -> Result<bool> {
        self.session()?.is_api_control_enabled(self.name()).await
    }

    /// Arm the motors.
    async fn arm(&self) -> Result<bool> {
        self.session()?.arm_disarm(true, self.name()).await
    }

    /// Disarm the motors.
    async fn disarm(&self) -> Result<bool> {
        self.session()?.arm_disarm(false, self.name()).await
    }

    /// Pose in the world NED frame.
    async fn pose(&self) -> Result<Pose> {
        let pose = self.session()?.sim_get_vehicle_pose(self.name()).await?;
        Ok(to_pose(&pose))
    }

    /// Teleport the vehicle.
    async fn set_pose(&self, pose: &Pose, ignore_collision: bool) -> Result<()> {
        self.session()?
            .sim_set_vehicle_pose(to_pose_wire(pose), ignore_collision, self.name())
            .await
    }

    /// Where the vehicle started.
    async fn home(&self) -> Result<GeoPoint> {
        self.session()?.get_home_geo_point(self.name()).await
    }

    /// Last collision.
    async fn collision_info(&self) -> Result<CollisionInfo> {
        let info = self.session()?.sim_get_collision_info(self.name()).await?;
        Ok(CollisionInfo::from_wire(&info))
    }

    /// Kinematics from the physics engine.
    async fn kinematics(&self) -> Result<KinematicsState> {
        let state = self.session()?.sim_get_ground_truth_kinematics(self.name()).await?;
        Ok(KinematicsState::from_wire(&state))
    }

    /// Environment at the vehicle from the physics engine.
    async fn environment(&self) -> Result<EnvironmentState> {
        let state = self.session()?.sim_get_ground_truth_environment(self.name()).await?;
        Ok(EnvironmentState::from_wire(&state))
    }

    /// Whether the vehicle can see `point`.
    async fn test_line_of_sight_to_point(&self, point: GeoPoint) -> Result<bool> {
        self.session()?.sim_test_line_of_sight_to_point(point, self.name()).await
    }

    /// A handle to one of this vehicle's cameras.
    fn camera(&self, name: impl Into<CameraName>) -> Camera {
        Camera::new(name.into(), self.name().to_owned(), false, self.core().session.clone())
    }

    /// Handles to the default cameras of this vehicle type.
    fn cameras(&self) -> Vec<Camera> {
        self.default_camera_names().iter().map(|name| self.camera(*name)).collect()
    }

    /// One compressed image from a camera.
    async fn image(&self, camera_name: impl Into<CameraName>, image_type: ImageType) -> Result<Option<Vec<u8>>> {
        self.camera(camera_name).image(image_type).await
    }

    /// Several images in one round trip.
    async fn images(&self, requests: &[ImageRequest]) -> Result<Vec<ImageResponse>> {
        let responses = self.session()?.sim_get_images(requests, self.name(), false).await?;
        Ok(responses.iter().map(ImageResponse::from_wire).collect())
    }

    /// Read an IMU; an empty name picks the first.
    async fn imu_data(&self, imu_name: &str) -> Result<ImuData> {
        let data = self.session()?.get_imu_data(imu_name, self.name()).await?;
        Ok(ImuData::from_wire(&data))
    }

    /// Read a barometer.
    async fn barometer_data(&self, barometer_name: &str) -> Result<BarometerData> {
        self.session()?.get_barometer_data(barometer_name, self.name()).await
    }

    /// Read a magnetometer.
    async fn magnetometer_data(&self, magnetometer_name: &str) -> Result<MagnetometerData> {
        let data = self.session()?.get_magnetometer_data(magnetometer_name, self.name()).await?;
        Ok(MagnetometerData::from_wire(&data))
    }

    /// Read a GPS receiver.
    async fn gps_data(&self, gps_name: &str) -> Result<GpsData> {
        let data = self.session()?.get_gps_data(gps_name, self.name()).await?;
        Ok(GpsData::from_wire(&data))
    }

    /// Read a distance sensor.
    async fn distance_sensor_data(&self, distance_sensor_name: &str) -> Result<DistanceSensorData> {
        let data = self
            .session()?
            .get_distance_sensor_data(distance_sensor_name, self.name())
            .await?;
        Ok(DistanceSensorData::from_wire(&data))
    }

    /// Read a lidar.
    async fn lidar_data(&self, lidar_name: &str) -> Result<LidarData> {
        let data = self.session()?.get_lidar_data(lidar_name, self.name()).await?;
        Ok(LidarData::from_wire(&data))
    }

    /// Start detecting meshes matching `search` on one of this vehicle's
    /// cameras. The radius is applied before the mesh filter.
    async fn start_detection(&self, search: &DetectionSearch) -> Result<()> {
        let session = self.session()?;
        if let Some(radius_cm) = search.radius_cm {
            session
                .sim_set_detection_filter_radius(&search.camera_name, search.image_type, radius_cm, self.name(), false)
                .await?;
        }
        session
            .sim_add_detection_filter_mesh_name(
                &search.camera_name,
                search.image_type,
                &search.mesh_name,
                self.name(),
                false,
            )
            .await
    }

    /// Objects currently detected by the camera of `search`.
    async fn detections(&self, search: &DetectionSearch) -> Result<Vec<DetectionInfo>> {
        let detections = self
            .session()?
            .sim_get_detections(&search.camera_name, search.image_type, self.name(), false)
            .await?;
        Ok(detections.iter().map(DetectionInfo::from_wire).collect())
    }

    /// Stop the detection search of `search`'s camera.
    async fn clear_detection(&self, search: &DetectionSearch) -> Result<()> {
        self.session()?
            .sim_clear_detection_mesh_names(&search.camera_name, search.image_type, self.name(), false)
            .await
    }

    /// Cancel the running task.
    async fn cancel_last_task(&self) -> Result<()> {
        self.session()?.cancel_last_task(self.name()).await
    }

    /// Wait for the running task. Returns false if the server timed it out.
    async fn wait_on_last_task(&self, timeout_sec: f64) -> Result<bool> {
        self.session()?.wait_on_last_task(self.name(), timeout_sec).await
    }
}

/// A vehicle of unknown type, limited to the shared capabilities.
#[derive(Clone, Debug)]
pub struct GenericVehicle {
    core: VehicleCore,
}

impl GenericVehicle {
    /// Cameras every vehicle type has.
    pub const DEFAULT_CAMERA_NAMES: &'static [&'static str] = &["front_center", "front_right", "front_left", "back_center"];

    /// A vehicle named `name` reached through `session`.
    pub fn new(name: impl Into<String>, session: SessionRef) -> Self {
        Self::from_core(VehicleCore::new(name, session))
    }

    /// Wrap an existing identity.
    pub fn from_core(core: VehicleCore) -> Self {
        Self { core }
    }
}

impl Vehicle for GenericVehicle {
    fn core(&self) -> &VehicleCore {
        &self.core
    }

    fn default_camera_names(&self) -> &'static [&'static str] {
        Self::DEFAULT_CAMERA_NAMES
    }
}
