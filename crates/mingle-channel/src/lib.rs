//! # mingle-channel
//!
//! The persistent bidirectional event channel between client and server.
//! A background tokio task owns the WebSocket; callers hold a cloneable
//! [`ChannelHandle`] for fire-and-forget emits and consume inbound events
//! from a notification receiver, one at a time, in arrival order.

pub mod config;
pub mod handle;
pub mod queue;
pub mod socket;

mod error;

pub use config::ChannelConfig;
pub use error::ChannelError;
pub use handle::{ChannelCommand, ChannelHandle, ChannelNotification};
pub use socket::Channel;
