//! Command / notification types and the cloneable channel handle.

use mingle_shared::protocol::{ClientEvent, ServerEvent};
use tokio::sync::mpsc;
use tracing::warn;

/// Commands sent *into* the channel task.
#[derive(Debug)]
pub enum ChannelCommand {
    /// Emit a named event to the server. Fire-and-forget.
    Emit(ClientEvent),
    /// Gracefully close the socket and end the task.
    Shutdown,
}

/// Notifications sent *from* the channel task to the application.
#[derive(Debug, Clone)]
pub enum ChannelNotification {
    /// Socket is up (initially, or again after a reconnect).
    Connected,
    /// Link dropped; the task is retrying and parking outbound frames.
    Disconnected,
    /// An inbound named event, delivered in arrival order.
    Event(ServerEvent),
    /// The channel is gone for good (shutdown or all handles dropped).
    Closed,
}

/// Shared handle to the session's event channel. Cheap to clone; every
/// screen holds one.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    cmd_tx: mpsc::Sender<ChannelCommand>,
}

impl ChannelHandle {
    pub fn new(cmd_tx: mpsc::Sender<ChannelCommand>) -> Self {
        Self { cmd_tx }
    }

    /// Emit a named event. Never blocks and never fails: if the command
    /// buffer is full or the task is gone, the event is dropped with a
    /// warning, matching the protocol's lack of delivery guarantees.
    pub fn emit(&self, event: ClientEvent) {
        if let Err(e) = self.cmd_tx.try_send(ChannelCommand::Emit(event)) {
            warn!(error = %e, "Dropped outbound event");
        }
    }

    /// Close the socket and terminate the channel task.
    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(ChannelCommand::Shutdown).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mingle_shared::protocol::{ClientEvent, ProfileQuery};
    use mingle_shared::types::UserId;

    #[test]
    fn test_emit_after_task_death_does_not_panic() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = ChannelHandle::new(tx);
        handle.emit(ClientEvent::GetProfileRequest(ProfileQuery {
            user_id: UserId::from("u1"),
        }));
    }

    #[tokio::test]
    async fn test_emit_delivers_command() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ChannelHandle::new(tx);
        handle.emit(ClientEvent::GetProfileRequest(ProfileQuery {
            user_id: UserId::from("u1"),
        }));
        match rx.recv().await {
            Some(ChannelCommand::Emit(ClientEvent::GetProfileRequest(q))) => {
                assert_eq!(q.user_id, UserId::from("u1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
