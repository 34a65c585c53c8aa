/// Application name
pub const APP_NAME: &str = "Mingle";

/// Protocol version advertised on the socket handshake
pub const PROTOCOL_VERSION: &str = "mingle/1.0";

/// Maximum JSON frame size in bytes (256 KiB)
pub const MAX_FRAME_SIZE: usize = 262_144;

/// Maximum upload size in bytes (50 MiB)
pub const MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;

/// Default HTTP API / socket port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// WebSocket endpoint path on the server
pub const SOCKET_PATH: &str = "/socket";

/// Upload endpoint path on the server
pub const UPLOAD_PATH: &str = "/upload";

/// Download path prefix for uploaded files
pub const FILES_PATH: &str = "/files";

/// Outbound frames parked while the link is down, before oldest are dropped
pub const EMIT_QUEUE_CAPACITY: usize = 128;

/// Buffer depth of the command / notification channels
pub const CHANNEL_BUFFER: usize = 256;

/// Delay between reconnect attempts, in seconds
pub const RECONNECT_DELAY_SECS: u64 = 2;

/// Upload request timeout, in seconds
pub const UPLOAD_TIMEOUT_SECS: u64 = 30;
