use nalgebra::UnitQuaternion;
use simlink_common::convert::{WireConversion, to_camera_pose_wire, to_pose};
use simlink_common::error::Result;
use simlink_common::geometry::{Pose, Quaternion, Vector3};
use simlink_common::state::{CameraInfo, CameraPoseUpdate};
use simlink_common::types::{CameraName, ImageType};
use tracing::debug;

use super::SessionRef;

/// A camera on a vehicle, or an external camera placed in the world.
///
/// Poses of vehicle cameras are relative to the vehicle body; poses of
/// external cameras are in the world NED frame.
#[derive(Clone, Debug)]
pub struct Camera {
    name: CameraName,
    vehicle_name: String,
    external: bool,
    session: SessionRef,
}

impl Camera {
    pub(crate) fn new(name: CameraName, vehicle_name: String, external: bool, session: SessionRef) -> Self {
        Self {
            name,
            vehicle_name,
            external,
            session,
        }
    }

    /// Camera name.
    pub fn name(&self) -> &CameraName {
        &self.name
    }

    /// Name of the vehicle carrying the camera; empty for external cameras.
    pub fn vehicle_name(&self) -> &str {
        &self.vehicle_name
    }

    /// Whether this is an external camera.
    pub fn is_external(&self) -> bool {
        self.external
    }

    /// Pose, field of view and projection matrix.
    pub async fn info(&self) -> Result<CameraInfo> {
        let info = self
            .session
            .get()?
            .sim_get_camera_info(&self.name, &self.vehicle_name, self.external)
            .await?;
        Ok(CameraInfo::from_wire(&info))
    }

    /// Current pose.
    pub async fn pose(&self) -> Result<Pose> {
        Ok(self.info().await?.pose)
    }

    /// Move and/or rotate the camera. Parts of `update` that are `None`
    /// keep their current value.
    pub async fn set_pose(&self, update: impl Into<CameraPoseUpdate>) -> Result<()> {
        let pose = to_camera_pose_wire(&update.into());
        self.session
            .get()?
            .sim_set_camera_pose(&self.name, pose, &self.vehicle_name, self.external)
            .await
    }

    /// Change the horizontal field of view.
    pub async fn set_fov(&self, fov_degrees: f64) -> Result<()> {
        self.session
            .get()?
            .sim_set_camera_fov(&self.name, fov_degrees, &self.vehicle_name, self.external)
            .await
    }

    /// One compressed image; `None` if the camera produced nothing.
    pub async fn image(&self, image_type: ImageType) -> Result<Option<Vec<u8>>> {
        self.session
            .get()?
            .sim_get_image(&self.name, image_type, &self.vehicle_name, self.external)
            .await
    }

    /// Point the camera at `target`, a position in the world NED frame, and
    /// return the orientation it was given.
    ///
    /// Only the orientation changes. Roll is always zero.
    pub async fn look_at(&self, target: &Vector3) -> Result<Quaternion> {
        let session = self.session.get()?;
        let camera = to_pose(
            &session
                .sim_get_camera_info(&self.name, &self.vehicle_name, self.external)
                .await?
                .pose,
        );

        let direction = if self.external {
            target - camera.position
        } else {
            let vehicle = to_pose(&session.sim_get_vehicle_pose(&self.vehicle_name).await?);
            vehicle.to_local(target) - camera.position
        };

        let orientation = look_rotation(&direction);
        debug!("Pointing camera {} at {:?}", self.name, target);
        session
            .sim_set_camera_pose(
                &self.name,
                to_camera_pose_wire(&CameraPoseUpdate::orientation(orientation)),
                &self.vehicle_name,
                self.external,
            )
            .await?;
        Ok(orientation)
    }
}

/// Rotation turning the NED +X axis toward `direction`, without roll.
pub(crate) fn look_rotation(direction: &Vector3) -> Quaternion {
    let yaw = direction.y.atan2(direction.x);
    let pitch = (-direction.z).atan2(direction.x.hypot(direction.y));
    UnitQuaternion::from_euler_angles(0.0, pitch, yaw).into_inner()
}
