use std::io;

use thiserror::Error;

/// Result alias used across simlink.
pub type Result<T, E = SimError> = std::result::Result<T, E>;

/// Every failure the client can report.
///
/// Nothing in simlink retries or recovers locally; these surface straight to
/// the caller of the operation that produced them.
#[derive(Debug, Error)]
pub enum SimError {
    /// No session exists, either because the client never connected or
    /// because the session a vehicle was created from has been dropped.
    #[error("no session available; use connect() to create a session")]
    NoSession,

    /// The session exists but `connect()` has not completed yet.
    #[error("session is not connected")]
    NotConnected,

    /// `connect()` was called on a session that is connecting or connected.
    #[error("session is already connected")]
    AlreadyConnected,

    /// The session was closed with `close()`.
    #[error("session has been closed")]
    SessionClosed,

    /// The TCP connection could not be established.
    #[error("failed to connect: {0}")]
    Connection(#[source] io::Error),

    /// The server went away while the session was connected.
    #[error("connection closed by the server")]
    ConnectionClosed,

    /// The server answered the call with an error object.
    #[error("remote call `{method}` failed: {payload}")]
    Remote {
        /// Remote method name.
        method: String,
        /// Error object exactly as the server sent it.
        payload: rmpv::Value,
    },

    /// Parameters could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(String),

    /// A response did not match the expected shape.
    #[error("failed to decode message: {0}")]
    Decode(String),

    /// A complete msgpack value arrived that is not a valid RPC message.
    #[error("malformed rpc frame: {0}")]
    MalformedFrame(String),

    /// A partially received frame grew past the configured limit.
    #[error("frame of {size} bytes exceeds the maximum of {max}")]
    FrameTooLarge {
        /// Buffered size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A color keyword that is not in the named color table.
    #[error("unknown color name `{0}`")]
    UnknownColor(String),

    /// An integer received for an enumeration is out of range.
    #[error("invalid {kind} value {value}")]
    InvalidEnumValue {
        /// Enumeration name.
        kind: &'static str,
        /// Offending value.
        value: i64,
    },
}

impl From<rmp_serde::encode::Error> for SimError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        SimError::Encode(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for SimError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        SimError::Decode(err.to_string())
    }
}

impl From<rmpv::ext::Error> for SimError {
    fn from(err: rmpv::ext::Error) -> Self {
        SimError::Decode(err.to_string())
    }
}
