use thiserror::Error;

/// Errors raised while opening the event channel. Once the channel is up,
/// failures are handled inside the background task (reconnect, drop, log);
/// emit itself never returns an error.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The session credential is absent or incomplete. Opening a channel is
    /// a blocking precondition for every screen, so this is surfaced rather
    /// than retried.
    #[error("Missing session credentials")]
    MissingCredentials,

    /// The initial socket connection failed.
    #[error("Connection error: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
}
