//! Types shared by the simlink client: geometry, the serialized wire schema,
//! conversions between the two, coordinate frame transforms, named colors and
//! the msgpack-RPC codec.

pub mod codec;

pub mod color;

pub mod convert;

pub mod error;

pub mod frames;

pub mod geometry;

pub mod state;

pub mod types;

pub mod wire;

pub use color::{Color, NamedColor, Rgba, color_to_rgba};
pub use convert::WireConversion;
pub use error::{Result, SimError};
pub use frames::{FrameTransform, enu_to_ned, ned_to_enu, ned_to_xyz, xyz_to_ned};
pub use geometry::{Box2, Box3, GeoPoint, Matrix4, Pose, Quaternion, Vector2, Vector3};
pub use state::*;
pub use types::*;
