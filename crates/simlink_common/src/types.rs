//! Enumerations and plain value types that look the same on the wire and in
//! the API.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SimError;

/// Declares an enumeration that travels on the wire as its integer discriminant.
///
/// Integers without a named variant decode to `Unknown` and are sent back
/// unchanged, so a newer server never fails a whole response over one field.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "i32", from = "i32")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value this client has no name for.
            Unknown(i32),
        }

        impl $name {
            /// Only a named variant; anything else is [`SimError::InvalidEnumValue`].
            pub fn checked(value: i32) -> Result<Self, SimError> {
                match $name::from(value) {
                    $name::Unknown(value) => Err(SimError::InvalidEnumValue {
                        kind: stringify!($name),
                        value: i64::from(value),
                    }),
                    known => Ok(known),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $value,)+
                    $name::Unknown(value) => value,
                }
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    _ => $name::Unknown(value),
                }
            }
        }
    };
}

wire_enum! {
    /// Kind of image a camera renders.
    #[derive(Default)]
    ImageType {
        #[default]
        Scene = 0,
        DepthPlanar = 1,
        DepthPerspective = 2,
        DepthVis = 3,
        DisparityNormalized = 4,
        Segmentation = 5,
        SurfaceNormals = 6,
        Infrared = 7,
        OpticalFlow = 8,
        OpticalFlowVis = 9,
    }
}

wire_enum! {
    /// Weather effect selector for `simSetWeatherParameter`.
    WeatherParameter {
        Rain = 0,
        Roadwetness = 1,
        Snow = 2,
        RoadSnow = 3,
        MapleLeaf = 4,
        RoadLeaf = 5,
        Dust = 6,
        Fog = 7,
        Enabled = 8,
    }
}

wire_enum! {
    /// How a multirotor's heading relates to its direction of travel.
    #[derive(Default)]
    DrivetrainType {
        /// Yaw is independent of the direction of flight.
        #[default]
        MaxDegreeOfFreedom = 0,
        /// Yaw is locked to the direction of flight.
        ForwardOnly = 1,
    }
}

wire_enum! {
    /// Whether a multirotor is on the ground.
    #[derive(Default)]
    LandedState {
        #[default]
        Landed = 0,
        Flying = 1,
    }
}

wire_enum! {
    /// Severity of a message printed in the simulator window; selects its color.
    #[derive(Default)]
    LogSeverity {
        Debug = 0,
        #[default]
        Info = 1,
        Warn = 2,
        Error = 3,
    }
}

/// A yaw command: either an absolute angle or an angular rate, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct YawMode {
    /// `yaw_or_rate` is a rate (deg/s) when true, an angle (deg) when false.
    pub is_rate: bool,
    /// Yaw angle or rate.
    pub yaw_or_rate: f64,
}

impl YawMode {
    /// Hold a yaw rate in deg/s.
    pub fn rate(deg_per_sec: f64) -> Self {
        Self {
            is_rate: true,
            yaw_or_rate: deg_per_sec,
        }
    }

    /// Hold an absolute yaw in degrees.
    pub fn angle(degrees: f64) -> Self {
        Self {
            is_rate: false,
            yaw_or_rate: degrees,
        }
    }
}

impl Default for YawMode {
    /// A rate of 0 deg/s.
    fn default() -> Self {
        Self::rate(0.0)
    }
}

/// Car actuator inputs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarControls {
    /// 0.0 to 1.0.
    pub throttle: f64,
    /// -1.0 (left) to 1.0 (right).
    pub steering: f64,
    /// 0.0 to 1.0.
    pub brake: f64,
    /// Handbrake engaged.
    pub handbrake: bool,
    /// Use `manual_gear` instead of the automatic gearbox.
    pub is_manual_gear: bool,
    /// -1 to 5, 0 is neutral.
    pub manual_gear: i32,
    /// Shift immediately instead of waiting for the gearbox.
    pub gear_immediate: bool,
}

impl Default for CarControls {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            steering: 0.0,
            brake: 0.0,
            handbrake: false,
            is_manual_gear: false,
            manual_gear: 0,
            gear_immediate: true,
        }
    }
}

/// A camera identified by name or, for backwards compatibility, by index.
///
/// Always sent to the server as a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CameraName {
    /// Camera name from the simulator settings, such as `front_center`.
    Name(String),
    /// Legacy numeric camera id.
    Id(u32),
}

impl Default for CameraName {
    fn default() -> Self {
        CameraName::Id(0)
    }
}

impl fmt::Display for CameraName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraName::Name(name) => f.write_str(name),
            CameraName::Id(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for CameraName {
    fn from(name: &str) -> Self {
        CameraName::Name(name.to_owned())
    }
}

impl From<String> for CameraName {
    fn from(name: String) -> Self {
        CameraName::Name(name)
    }
}

impl From<u32> for CameraName {
    fn from(id: u32) -> Self {
        CameraName::Id(id)
    }
}

impl Serialize for CameraName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CameraName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Id(u32),
            Name(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Id(id) => CameraName::Id(id),
            Repr::Name(name) => CameraName::Name(name),
        })
    }
}

/// One entry of a batched image capture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// Camera to capture from.
    pub camera_name: CameraName,
    /// What to render.
    pub image_type: ImageType,
    /// Return float pixels instead of bytes.
    pub pixels_as_float: bool,
    /// Return a compressed PNG.
    pub compress: bool,
}

impl ImageRequest {
    /// A compressed byte image from `camera_name`.
    pub fn new(camera_name: impl Into<CameraName>, image_type: ImageType) -> Self {
        Self {
            camera_name: camera_name.into(),
            image_type,
            pixels_as_float: false,
            compress: true,
        }
    }

    /// Request float pixels (uncompressed).
    pub fn as_float(mut self) -> Self {
        self.pixels_as_float = true;
        self.compress = false;
        self
    }

    /// Request raw uncompressed bytes.
    pub fn uncompressed(mut self) -> Self {
        self.compress = false;
        self
    }
}

impl Default for ImageRequest {
    fn default() -> Self {
        Self::new(CameraName::default(), ImageType::Scene)
    }
}

/// Criteria for an object detection search on one camera.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionSearch {
    /// Camera to search with.
    pub camera_name: CameraName,
    /// Image type the detection filter is attached to.
    pub image_type: ImageType,
    /// Wildcard pattern naming the target mesh, such as `Cylinder*`.
    pub mesh_name: String,
    /// Maximum distance from the camera, in centimeters. Server default when `None`.
    pub radius_cm: Option<f64>,
}

impl DetectionSearch {
    /// Search scene images from `camera_name` for meshes matching `mesh_name`.
    pub fn new(camera_name: impl Into<CameraName>, mesh_name: impl Into<String>) -> Self {
        Self {
            camera_name: camera_name.into(),
            image_type: ImageType::Scene,
            mesh_name: mesh_name.into(),
            radius_cm: None,
        }
    }

    /// Limit the search radius.
    pub fn with_radius_cm(mut self, radius_cm: f64) -> Self {
        self.radius_cm = Some(radius_cm);
        self
    }

    /// Attach the filter to a different image type.
    pub fn with_image_type(mut self, image_type: ImageType) -> Self {
        self.image_type = image_type;
        self
    }
}

/// Barometer reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BarometerData {
    /// Nanoseconds.
    pub time_stamp: u64,
    /// Meters.
    pub altitude: f64,
    /// Pascal.
    pub pressure: f64,
    /// Sea level pressure setting, hectopascal.
    pub qnh: f64,
}

/// Raw RC input as seen by the flight controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RcData {
    pub timestamp: u64,
    pub pitch: f64,
    pub roll: f64,
    pub throttle: f64,
    pub yaw: f64,
    pub switch1: u32,
    pub switch2: u32,
    pub switch3: u32,
    pub switch4: u32,
    pub switch5: u32,
    pub switch6: u32,
    pub switch7: u32,
    pub switch8: u32,
    pub is_initialized: bool,
    pub is_valid: bool,
}

/// Output of one rotor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RotorParameters {
    /// Newton.
    pub thrust: f64,
    /// Newton meter.
    pub torque_scaler: f64,
    /// Radians per second.
    pub speed: f64,
}

/// Output of all rotors of a multirotor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RotorStates {
    /// One entry per rotor.
    pub rotors: Vec<RotorParameters>,
    /// Nanoseconds.
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_discriminants() {
        assert_eq!(i32::from(ImageType::OpticalFlowVis), 9);
        assert_eq!(i32::from(WeatherParameter::Enabled), 8);
        assert_eq!(DrivetrainType::from(1), DrivetrainType::ForwardOnly);
        assert_eq!(i32::from(LogSeverity::Error), 3);
        assert_eq!(DrivetrainType::checked(1).ok(), Some(DrivetrainType::ForwardOnly));
        assert!(matches!(
            LandedState::checked(7),
            Err(SimError::InvalidEnumValue { kind: "LandedState", value: 7 })
        ));
    }

    #[test]
    fn test_unknown_values_survive_the_wire() {
        assert_eq!(LandedState::from(7), LandedState::Unknown(7));
        assert_eq!(i32::from(ImageType::Unknown(12)), 12);

        let bytes = rmp_serde::to_vec(&42).expect("encode");
        let decoded: ImageType = rmp_serde::from_slice(&bytes).expect("decode");
        assert_eq!(decoded, ImageType::Unknown(42));

        let bytes = rmp_serde::to_vec(&decoded).expect("encode");
        let value: i32 = rmp_serde::from_slice(&bytes).expect("decode");
        assert_eq!(value, 42);
    }

    #[test]
    fn test_enum_wire_is_integer() {
        let bytes = rmp_serde::to_vec(&ImageType::Segmentation).expect("encode");
        let value: i32 = rmp_serde::from_slice(&bytes).expect("decode");
        assert_eq!(value, 5);
    }

    #[test]
    fn test_defaults() {
        let yaw = YawMode::default();
        assert!(yaw.is_rate);
        assert_eq!(yaw.yaw_or_rate, 0.0);

        let controls = CarControls::default();
        assert_eq!(controls.throttle, 0.0);
        assert!(!controls.handbrake);
        assert!(controls.gear_immediate);
        assert_eq!(controls.manual_gear, 0);

        assert_eq!(LogSeverity::default(), LogSeverity::Info);
        assert_eq!(DrivetrainType::default(), DrivetrainType::MaxDegreeOfFreedom);
    }

    #[test]
    fn test_camera_name_always_a_string_on_the_wire() {
        let bytes = rmp_serde::to_vec(&CameraName::Id(3)).expect("encode");
        let s: String = rmp_serde::from_slice(&bytes).expect("decode");
        assert_eq!(s, "3");

        let bytes = rmp_serde::to_vec(&CameraName::from("fpv")).expect("encode");
        let s: String = rmp_serde::from_slice(&bytes).expect("decode");
        assert_eq!(s, "fpv");
    }

    #[test]
    fn test_image_request_builders() {
        let request = ImageRequest::new("front_center", ImageType::DepthPlanar).as_float();
        assert_eq!(request.camera_name, CameraName::Name("front_center".into()));
        assert!(request.pixels_as_float);
        assert!(!request.compress);
    }
}
