use serde::{Deserialize, Serialize};

/// Default simulator address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default simulator RPC port.
pub const DEFAULT_PORT: u16 = 41451;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Settings to configure the connection to the simulator
///
/// Deserializing a partial document fills the missing fields from
/// [`ConnectionSettings::default`].
pub struct ConnectionSettings {
    /// Host name or IP address of the simulator.
    pub host: String,
    /// TCP port of the simulator's RPC server.
    pub port: u16,
    /// Maximum size in bytes of a single incoming message. A server that
    /// exceeds it is disconnected.
    ///
    /// ## Default
    /// The default is set to 64MiB, enough for an uncompressed float image
    pub max_frame_length: usize,
    /// Number of outgoing requests that can be queued before callers wait.
    pub channel_capacity: usize,
}

impl ConnectionSettings {
    /// Settings for the simulator at `host:port`, defaults elsewhere.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Replace the incoming message size limit.
    pub fn with_max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = max_frame_length;
        self
    }

    /// Replace the outgoing queue length.
    pub fn with_channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = channel_capacity;
        self
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            max_frame_length: 64 * 1024 * 1024,
            channel_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ConnectionSettings::default();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 41451);
        assert_eq!(settings.max_frame_length, 64 * 1024 * 1024);
    }

    #[test]
    fn test_partial_document() {
        let settings: ConnectionSettings =
            serde_json::from_str(r#"{ "host": "10.0.0.7" }"#).expect("settings");
        assert_eq!(settings, ConnectionSettings::new("10.0.0.7", DEFAULT_PORT));
    }
}
