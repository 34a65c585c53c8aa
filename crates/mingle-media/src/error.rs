use thiserror::Error;

/// Errors from the one-shot upload exchange. The caller aborts the pending
/// send/save on any of these; no store state is committed.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Transport failure (connect, timeout, read, or body decode).
    #[error("Upload transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Upload rejected with status {code}")]
    Status { code: u16 },

    /// The server answered 2xx but the body was not a usable file URL.
    #[error("Malformed upload response: {0}")]
    MalformedResponse(String),
}
