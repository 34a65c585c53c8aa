use std::time::Duration;

use mingle_shared::constants::{
    CHANNEL_BUFFER, DEFAULT_HTTP_PORT, EMIT_QUEUE_CAPACITY, RECONNECT_DELAY_SECS,
};

/// Channel connection settings.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Base WebSocket URL of the server, without the socket path.
    /// Env: `MINGLE_SERVER_URL`
    /// Default: `ws://127.0.0.1:8080`
    pub server_url: String,

    /// Outbound frames parked while the link is down before the oldest are
    /// dropped.
    pub emit_queue_capacity: usize,

    /// Depth of the command / notification channels.
    pub buffer: usize,

    /// Delay between reconnect attempts.
    pub reconnect_delay: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            server_url: format!("ws://127.0.0.1:{DEFAULT_HTTP_PORT}"),
            emit_queue_capacity: EMIT_QUEUE_CAPACITY,
            buffer: CHANNEL_BUFFER,
            reconnect_delay: Duration::from_secs(RECONNECT_DELAY_SECS),
        }
    }
}

impl ChannelConfig {
    /// Load settings from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("MINGLE_SERVER_URL") {
            if !url.is_empty() {
                config.server_url = url;
            }
        }
        config
    }
}
