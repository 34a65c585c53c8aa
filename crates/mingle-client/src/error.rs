use thiserror::Error;

use mingle_channel::ChannelError;
use mingle_media::UploadError;

/// Errors surfaced to the user by screen action handlers.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// A chat action was attempted before a correspondent was selected.
    #[error("No active conversation selected")]
    NoActiveConversation,

    /// A profile action was attempted before the record was loaded.
    #[error("No profile record loaded")]
    ProfileNotLoaded,

    /// The media upload failed; the pending send/save was aborted.
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),
}
