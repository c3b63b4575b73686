//! Codecs for the simulator's RPC transport.

pub mod framing;
pub mod msgpack_rpc;

pub use framing::FrameScanner;
pub use msgpack_rpc::*;
