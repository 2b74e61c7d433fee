//! Server configuration.

/// Port used when none is given.
pub const DEFAULT_PORT: u16 = 12345;

/// Largest frame body a client may send (1 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

/// Settings for one server instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub bind_addr: String,

    /// Frames announcing a longer body close the connection.
    pub max_frame_len: usize,
}

impl ServerConfig {
    /// Defaults with the listen address built from `host` and `port`.
    pub fn with_host_port(host: &str, port: u16) -> Self {
        Self {
            bind_addr: format!("{host}:{port}"),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}
