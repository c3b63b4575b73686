//! Multirotor tasks. Each returns once the server finished or timed out the
//! task; `timeout_sec` is enforced by the server, not here.

use simlink_common::error::Result;
use simlink_common::types::{DrivetrainType, RotorStates, YawMode};
use simlink_common::wire::{MultirotorState, Vector3r};

use super::Session;

impl Session {
    /// Take off to a small height above the start point.
    pub async fn takeoff(&self, timeout_sec: f64, vehicle_name: &str) -> Result<bool> {
        self.call("takeoff", (timeout_sec, vehicle_name)).await
    }

    /// Land where the vehicle is.
    pub async fn land(&self, timeout_sec: f64, vehicle_name: &str) -> Result<bool> {
        self.call("land", (timeout_sec, vehicle_name)).await
    }

    /// Fly back to the home point.
    pub async fn go_home(&self, timeout_sec: f64, vehicle_name: &str) -> Result<bool> {
        self.call("goHome", (timeout_sec, vehicle_name)).await
    }

    /// Hold the current position.
    pub async fn hover(&self, vehicle_name: &str) -> Result<bool> {
        self.call("hover", (vehicle_name,)).await
    }

    /// Fly to an NED position.
    #[allow(clippy::too_many_arguments)]
    pub async fn move_to_position(
        &self,
        x: f64,
        y: f64,
        z: f64,
        velocity: f64,
        timeout_sec: f64,
        drivetrain: DrivetrainType,
        yaw_mode: YawMode,
        lookahead: f64,
        adaptive_lookahead: f64,
        vehicle_name: &str,
    ) -> Result<bool> {
        self.call(
            "moveToPosition",
            (
                x,
                y,
                z,
                velocity,
                timeout_sec,
                drivetrain,
                yaw_mode,
                lookahead,
                adaptive_lookahead,
                vehicle_name,
            ),
        )
        .await
    }

    /// Climb or descend to `z`, keeping the horizontal position.
    #[allow(clippy::too_many_arguments)]
    pub async fn move_to_z(
        &self,
        z: f64,
        velocity: f64,
        timeout_sec: f64,
        yaw_mode: YawMode,
        lookahead: f64,
        adaptive_lookahead: f64,
        vehicle_name: &str,
    ) -> Result<bool> {
        self.call(
            "moveToZ",
            (z, velocity, timeout_sec, yaw_mode, lookahead, adaptive_lookahead, vehicle_name),
        )
        .await
    }

    /// Fly to a geographic position.
    #[allow(clippy::too_many_arguments)]
    pub async fn move_to_gps(
        &self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        velocity: f64,
        timeout_sec: f64,
        drivetrain: DrivetrainType,
        yaw_mode: YawMode,
        lookahead: f64,
        adaptive_lookahead: f64,
        vehicle_name: &str,
    ) -> Result<bool> {
        self.call(
            "moveToGPS",
            (
                latitude,
                longitude,
                altitude,
                velocity,
                timeout_sec,
                drivetrain,
                yaw_mode,
                lookahead,
                adaptive_lookahead,
                vehicle_name,
            ),
        )
        .await
    }

    /// Fly at a world NED velocity for `duration` seconds.
    #[allow(clippy::too_many_arguments)]
    pub async fn move_by_velocity(
        &self,
        vx: f64,
        vy: f64,
        vz: f64,
        duration: f64,
        drivetrain: DrivetrainType,
        yaw_mode: YawMode,
        vehicle_name: &str,
    ) -> Result<bool> {
        self.call(
            "moveByVelocity",
            (vx, vy, vz, duration, drivetrain, yaw_mode, vehicle_name),
        )
        .await
    }

    /// Fly at a horizontal velocity for `duration` seconds, holding height `z`.
    #[allow(clippy::too_many_arguments)]
    pub async fn move_by_velocity_z(
        &self,
        vx: f64,
        vy: f64,
        z: f64,
        duration: f64,
        drivetrain: DrivetrainType,
        yaw_mode: YawMode,
        vehicle_name: &str,
    ) -> Result<bool> {
        self.call(
            "moveByVelocityZ",
            (vx, vy, z, duration, drivetrain, yaw_mode, vehicle_name),
        )
        .await
    }

    /// Fly through the waypoints of `path` in order.
    #[allow(clippy::too_many_arguments)]
    pub async fn move_on_path(
        &self,
        path: &[Vector3r],
        velocity: f64,
        timeout_sec: f64,
        drivetrain: DrivetrainType,
        yaw_mode: YawMode,
        lookahead: f64,
        adaptive_lookahead: f64,
        vehicle_name: &str,
    ) -> Result<bool> {
        self.call(
            "moveOnPath",
            (
                path,
                velocity,
                timeout_sec,
                drivetrain,
                yaw_mode,
                lookahead,
                adaptive_lookahead,
                vehicle_name,
            ),
        )
        .await
    }

    /// Turn to an absolute yaw in degrees, to within `margin` degrees.
    pub async fn rotate_to_yaw(&self, yaw: f64, timeout_sec: f64, margin: f64, vehicle_name: &str) -> Result<bool> {
        self.call("rotateToYaw", (yaw, timeout_sec, margin, vehicle_name)).await
    }

    /// Turn at `yaw_rate` deg/s for `duration` seconds.
    pub async fn rotate_by_yaw_rate(&self, yaw_rate: f64, duration: f64, vehicle_name: &str) -> Result<bool> {
        self.call("rotateByYawRate", (yaw_rate, duration, vehicle_name)).await
    }

    /// Estimated state of a multirotor.
    pub async fn get_multirotor_state(&self, vehicle_name: &str) -> Result<MultirotorState> {
        self.call("getMultirotorState", (vehicle_name,)).await
    }

    /// Thrust, torque and speed of each rotor.
    pub async fn get_rotor_states(&self, vehicle_name: &str) -> Result<RotorStates> {
        self.call("getRotorStates", (vehicle_name,)).await
    }
}
