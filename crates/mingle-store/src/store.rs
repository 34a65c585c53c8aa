//! The observable store.
//!
//! All four slices sit behind one mutex with a single commit entry point,
//! so every state transition is a total function of (previous snapshot,
//! event). Observers subscribe to a `watch` channel that carries the
//! snapshot published by each commit.

use std::sync::Mutex;

use tokio::sync::watch;

use crate::auth::AuthSlice;
use crate::chats::ChatSlice;
use crate::posts::PostSlice;
use crate::profile::ProfileSlice;

/// One immutable-per-commit snapshot of all client state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    pub auth: AuthSlice,
    pub chats: ChatSlice,
    pub posts: PostSlice,
    pub profile: ProfileSlice,
}

pub struct Store {
    state: Mutex<StoreState>,
    publish: watch::Sender<StoreState>,
}

impl Store {
    pub fn new() -> Self {
        let state = StoreState::default();
        let (publish, _) = watch::channel(state.clone());
        Self {
            state: Mutex::new(state),
            publish,
        }
    }

    /// Apply a reducer under the lock and publish the resulting snapshot.
    /// The closure must not block; reducers are plain state transitions.
    pub fn commit<R>(&self, reduce: impl FnOnce(&mut StoreState) -> R) -> R {
        // A poisoned lock means a reducer panicked; the state itself is
        // still coherent because reducers are total, so keep going.
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let result = reduce(&mut guard);
        self.publish.send_replace(guard.clone());
        result
    }

    /// A point-in-time copy of the state for rendering.
    pub fn snapshot(&self) -> StoreState {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Observe commits. The receiver always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.publish.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mingle_shared::models::ChatMessage;
    use mingle_shared::types::{MediaKind, MessageId, UserId};

    fn msg() -> ChatMessage {
        ChatMessage {
            id: MessageId::new(),
            sender: UserId::from("a"),
            receiver: UserId::from("b"),
            message: "hi".into(),
            kind: MediaKind::Text,
            media: None,
            timestamp: Utc.timestamp_opt(1, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_snapshot() {
        let store = Store::new();
        let mut rx = store.subscribe();

        store.commit(|state| state.chats.apply_incoming(vec![msg()]));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().chats.len(), 1);
        assert_eq!(store.snapshot().chats.len(), 1);
    }

    #[test]
    fn test_commit_returns_reducer_result() {
        let store = Store::new();
        let applied = store.commit(|state| {
            state.chats.apply_incoming(vec![msg()]);
            state.chats.len()
        });
        assert_eq!(applied, 1);
    }
}
