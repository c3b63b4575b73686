use simlink_common::convert::{WireConversion, to_vector3_wire};
use simlink_common::error::Result;
use simlink_common::geometry::{GeoPoint, Vector3};
use simlink_common::state::MultirotorState;
use simlink_common::types::{DrivetrainType, RotorStates, YawMode};

use super::{SessionRef, Vehicle, VehicleCore};

/// Tuning shared by the `move_*` tasks of a [`Multirotor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOptions {
    /// Seconds the server lets the task run.
    pub timeout_sec: f64,
    /// Whether yaw follows the direction of flight.
    pub drivetrain: DrivetrainType,
    /// Yaw held during the task.
    pub yaw_mode: YawMode,
    /// Carrot distance of the path follower; -1 lets the server choose.
    pub lookahead: f64,
    /// Lookahead scaling with speed; 0 disables it.
    pub adaptive_lookahead: f64,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            timeout_sec: 3e38,
            drivetrain: DrivetrainType::MaxDegreeOfFreedom,
            yaw_mode: YawMode::default(),
            lookahead: -1.0,
            adaptive_lookahead: 1.0,
        }
    }
}

impl MoveOptions {
    /// Give up after `timeout_sec`.
    pub fn with_timeout(mut self, timeout_sec: f64) -> Self {
        self.timeout_sec = timeout_sec;
        self
    }

    /// Use `drivetrain`.
    pub fn with_drivetrain(mut self, drivetrain: DrivetrainType) -> Self {
        self.drivetrain = drivetrain;
        self
    }

    /// Hold `yaw_mode`.
    pub fn with_yaw_mode(mut self, yaw_mode: YawMode) -> Self {
        self.yaw_mode = yaw_mode;
        self
    }
}

/// A multirotor flown by tasks such as takeoff, move and land.
///
/// Positions are in the world NED frame, so flying up means a negative `z`.
#[derive(Clone, Debug)]
pub struct Multirotor {
    core: VehicleCore,
}

impl Multirotor {
    /// Vehicle type used when none is given.
    pub const DEFAULT_TYPE: &'static str = "SimpleFlight";

    /// Cameras the simulator puts on a multirotor.
    pub const DEFAULT_CAMERA_NAMES: &'static [&'static str] =
        &["front_center", "front_right", "front_left", "bottom_center", "back_center"];

    /// Default takeoff timeout, seconds.
    pub const TAKEOFF_TIMEOUT: f64 = 20.0;
    /// Default landing timeout, seconds.
    pub const LAND_TIMEOUT: f64 = 60.0;
    /// Default go-home timeout: effectively none.
    pub const GO_HOME_TIMEOUT: f64 = 3e38;
    /// Default tolerance of [`Multirotor::rotate_to_yaw`], degrees.
    pub const YAW_MARGIN: f64 = 5.0;

    /// A multirotor named `name` reached through `session`.
    pub fn new(name: impl Into<String>, session: SessionRef) -> Self {
        Self::from_core(VehicleCore::new(name, session))
    }

    /// Wrap an existing identity, defaulting the type to [`Multirotor::DEFAULT_TYPE`].
    pub fn from_core(core: VehicleCore) -> Self {
        Self {
            core: core.or_type(Self::DEFAULT_TYPE),
        }
    }

    /// Take off and wait up to `timeout_sec`.
    pub async fn takeoff(&self, timeout_sec: f64) -> Result<bool> {
        self.session()?.takeoff(timeout_sec, self.name()).await
    }

    /// Land and wait up to `timeout_sec`.
    pub async fn land(&self, timeout_sec: f64) -> Result<bool> {
        self.session()?.land(timeout_sec, self.name()).await
    }

    /// Fly back to the home point.
    pub async fn go_home(&self, timeout_sec: f64) -> Result<bool> {
        self.session()?.go_home(timeout_sec, self.name()).await
    }

    /// Hold position.
    pub async fn hover(&self) -> Result<bool> {
        self.session()?.hover(self.name()).await
    }

    /// Fly to `position` at `velocity` m/s.
    pub async fn move_to_position(&self, position: &Vector3, velocity: f64, options: &MoveOptions) -> Result<bool> {
        self.session()?
            .move_to_position(
                position.x,
                position.y,
                position.z,
                velocity,
                options.timeout_sec,
                options.drivetrain,
                options.yaw_mode,
                options.lookahead,
                options.adaptive_lookahead,
                self.name(),
            )
            .await
    }

    /// Change height to `z`. The drivetrain in `options` is not used.
    pub async fn move_to_z(&self, z: f64, velocity: f64, options: &MoveOptions) -> Result<bool> {
        self.session()?
            .move_to_z(
                z,
                velocity,
                options.timeout_sec,
                options.yaw_mode,
                options.lookahead,
                options.adaptive_lookahead,
                self.name(),
            )
            .await
    }

    /// Fly to a geographic position.
    pub async fn move_to_gps(&self, target: &GeoPoint, velocity: f64, options: &MoveOptions) -> Result<bool> {
        self.session()?
            .move_to_gps(
                target.latitude,
                target.longitude,
                target.altitude,
                velocity,
                options.timeout_sec,
                options.drivetrain,
                options.yaw_mode,
                options.lookahead,
                options.adaptive_lookahead,
                self.name(),
            )
            .await
    }

    /// Fly at `velocity` for `duration` seconds.
    pub async fn move_by_velocity(&self, velocity: &Vector3, duration: f64, options: &MoveOptions) -> Result<bool> {
        self.session()?
            .move_by_velocity(
                velocity.x,
                velocity.y,
                velocity.z,
                duration,
                options.drivetrain,
                options.yaw_mode,
                self.name(),
            )
            .await
    }

    /// Fly at a horizontal velocity `(vx, vy)` for `duration` seconds at height `z`.
    pub async fn move_by_velocity_z(
        &self,
        vx: f64,
        vy: f64,
        z: f64,
        duration: f64,
        options: &MoveOptions,
    ) -> Result<bool> {
        self.session()?
            .move_by_velocity_z(vx, vy, z, duration, options.drivetrain, options.yaw_mode, self.name())
            .await
    }

    /// Fly through `path` at `velocity` m/s.
    pub async fn move_on_path(&self, path: &[Vector3], velocity: f64, options: &MoveOptions) -> Result<bool> {
        let path: Vec<_> = path.iter().map(to_vector3_wire).collect();
        self.session()?
            .move_on_path(
                &path,
                velocity,
                options.timeout_sec,
                options.drivetrain,
                options.yaw_mode,
                options.lookahead,
                options.adaptive_lookahead,
                self.name(),
            )
            .await
    }

    /// Turn to `yaw` degrees, within `margin` degrees.
    pub async fn rotate_to_yaw(&self, yaw: f64, timeout_sec: f64, margin: f64) -> Result<bool> {
        self.session()?
            .rotate_to_yaw(yaw, timeout_sec, margin, self.name())
            .await
    }

    /// Turn at `yaw_rate` deg/s for `duration` seconds.
    pub async fn rotate_by_yaw_rate(&self, yaw_rate: f64, duration: f64) -> Result<bool> {
        self.session()?
            .rotate_by_yaw_rate(yaw_rate, duration, self.name())
            .await
    }

    /// Estimated state.
    pub async fn state(&self) -> Result<MultirotorState> {
        let state = self.session()?.get_multirotor_state(self.name()).await?;
        Ok(MultirotorState::from_wire(&state))
    }

    /// Thrust, torque and speed of each rotor.
    pub async fn rotor_states(&self) -> Result<RotorStates> {
        self.session()?.get_rotor_states(self.name()).await
    }
}

impl Vehicle for Multirotor {
    fn core(&self) -> &VehicleCore {
        &self.core
    }

    fn default_camera_names(&self) -> &'static [&'static str] {
        Self::DEFAULT_CAMERA_NAMES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_defaults() {
        let options = MoveOptions::default();
        assert_eq!(options.timeout_sec, 3e38);
        assert_eq!(options.drivetrain, DrivetrainType::MaxDegreeOfFreedom);
        assert_eq!(options.yaw_mode, YawMode::rate(0.0));
        assert_eq!(options.lookahead, -1.0);
        assert_eq!(options.adaptive_lookahead, 1.0);

        let options = options.with_timeout(5.0).with_yaw_mode(YawMode::angle(90.0));
        assert_eq!(options.timeout_sec, 5.0);
        assert!(!options.yaw_mode.is_rate);
    }

    #[test]
    fn test_type_override() {
        let core = VehicleCore::new("Drone1", SessionRef::detached()).with_type("PX4Multirotor");
        assert_eq!(Multirotor::from_core(core).vehicle_type(), "PX4Multirotor");
        assert_eq!(Multirotor::new("Drone2", SessionRef::detached()).vehicle_type(), "SimpleFlight");
    }
}
