//! Per-screen view bindings.
//!
//! Each screen is a pure projection of store slices into a view struct,
//! plus a fixed set of action handlers that may call the upload adapter,
//! emit a channel event, and apply an optimistic local reducer. Screens
//! never write across slices; cross-slice effects arrive back through the
//! bridge.

pub mod chat;
pub mod feed;
pub mod friends;
pub mod profile;

pub use chat::{ChatScreen, ChatView};
pub use feed::{FeedScreen, FeedView};
pub use friends::{FriendsScreen, FriendsView};
pub use profile::{ProfileDraft, ProfileScreen};
