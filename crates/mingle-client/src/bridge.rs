//! Bridge between the event channel and the store.
//!
//! A single task consumes channel notifications in arrival order and routes
//! each inbound event into the matching reducer commit. This is the only
//! place inbound events touch state; screens never write across slices.
//! Every cross-slice effect comes back through here.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use mingle_channel::ChannelNotification;
use mingle_shared::protocol::ServerEvent;
use mingle_shared::types::{ConnectionState, UserId};
use mingle_store::Store;

/// Spawn the notification processing loop for the session of `me`.
///
/// Returns the task handle and a watch receiver carrying the channel's
/// connection state, so screens can gate feature use on the link being up.
pub fn spawn_bridge(
    store: Arc<Store>,
    me: UserId,
    mut notif_rx: mpsc::Receiver<ChannelNotification>,
) -> (JoinHandle<()>, watch::Receiver<ConnectionState>) {
    let (conn_tx, conn_rx) = watch::channel(ConnectionState::Connected);

    let handle = tokio::spawn(async move {
        info!("Channel bridge started");

        while let Some(notification) = notif_rx.recv().await {
            match notification {
                ChannelNotification::Connected => {
                    let _ = conn_tx.send(ConnectionState::Connected);
                }
                ChannelNotification::Disconnected => {
                    warn!("Channel link down, store updates paused");
                    let _ = conn_tx.send(ConnectionState::Reconnecting);
                }
                ChannelNotification::Closed => {
                    let _ = conn_tx.send(ConnectionState::Closed);
                    break;
                }
                ChannelNotification::Event(event) => route_event(&store, &me, event),
            }
        }

        info!("Channel bridge terminated");
    });

    (handle, conn_rx)
}

/// Route one inbound event into its reducer. Missing targets are no-ops by
/// the reducer contract; they are only worth a debug line here.
pub fn route_event(store: &Store, me: &UserId, event: ServerEvent) {
    match event {
        ServerEvent::MessageHistory { messages } => {
            store.commit(|state| state.chats.apply_incoming(messages));
        }
        ServerEvent::NewMessage(message) => {
            store.commit(|state| state.chats.apply_incoming(vec![message]));
        }

        ServerEvent::PostsSnapshot { posts } => {
            store.commit(|state| state.posts.replace_all(posts));
        }
        ServerEvent::PostCreated(post) => {
            store.commit(|state| state.posts.upsert(post));
        }
        ServerEvent::PostLiked(r) => {
            let outcome = store.commit(|state| state.posts.apply_like(&r.post_id, &r.user_id));
            if !outcome.is_applied() {
                debug!(post = %r.post_id, "Like for unknown post ignored");
            }
        }
        ServerEvent::PostUnliked(r) => {
            let outcome = store.commit(|state| state.posts.apply_unlike(&r.post_id, &r.user_id));
            if !outcome.is_applied() {
                debug!(post = %r.post_id, "Unlike for unknown post ignored");
            }
        }
        ServerEvent::PostCommented { post_id, comment } => {
            let outcome = store.commit(|state| state.posts.apply_comment(&post_id, comment));
            if !outcome.is_applied() {
                debug!(post = %post_id, "Comment for unknown post ignored");
            }
        }

        ServerEvent::ProfileResponse(record) | ServerEvent::ProfileUpdated(record) => {
            store.commit(|state| state.profile.set_record(record));
        }

        ServerEvent::FriendAccepted(a) => {
            store.commit(|state| state.auth.apply_friend_accept(&a.sender, &a.receiver));
        }
        ServerEvent::FriendRejected(a) => {
            store.commit(|state| state.auth.apply_friend_reject(&a.sender, &a.receiver));
        }
        ServerEvent::Unfriended(a) => {
            store.commit(|state| state.auth.apply_unfriend(&a.sender, &a.receiver));
        }

        ServerEvent::UserUpdated(user) => {
            // the first record for the session user installs it
            if user.id == *me {
                store.commit(|state| state.auth.set_user(user));
            } else {
                store.commit(|state| state.auth.apply_user_updated(user));
            }
        }
        ServerEvent::DirectorySnapshot { users } => {
            store.commit(|state| {
                for user in users {
                    if user.id == *me {
                        state.auth.set_user(user);
                    } else {
                        state.auth.apply_user_updated(user);
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mingle_shared::models::{ChatMessage, Post};
    use mingle_shared::protocol::PostReaction;
    use mingle_shared::types::{MediaKind, MessageId, PostId, UserId};

    fn msg(id: MessageId, sender: &str, receiver: &str, ts: i64) -> ChatMessage {
        ChatMessage {
            id,
            sender: UserId::from(sender),
            receiver: UserId::from(receiver),
            message: "m".into(),
            kind: MediaKind::Text,
            media: None,
            timestamp: Utc.timestamp_opt(ts, 0).unwrap(),
        }
    }

    fn post(id: &str) -> Post {
        Post {
            id: PostId::from(id),
            owner: UserId::from("owner"),
            kind: MediaKind::Text,
            content: "c".into(),
            text: String::new(),
            likes: Vec::new(),
            comments: Vec::new(),
            timestamp: Utc.timestamp_opt(1, 0).unwrap(),
        }
    }

    #[test]
    fn test_echoed_message_does_not_duplicate() {
        let store = Store::new();
        let message = msg(MessageId::new(), "a", "b", 42);

        // optimistic local add, then the echo arrives through the bridge
        store.commit(|state| state.chats.apply_incoming(vec![message.clone()]));
        route_event(&store, &UserId::from("a"), ServerEvent::NewMessage(message));

        assert_eq!(store.snapshot().chats.len(), 1);
    }

    #[test]
    fn test_reverse_order_delivery_renders_ascending() {
        let store = Store::new();
        let late = msg(MessageId::new(), "a", "b", 10);
        let early = msg(MessageId::new(), "b", "a", 5);

        route_event(&store, &UserId::from("a"), ServerEvent::NewMessage(late.clone()));
        route_event(&store, &UserId::from("a"), ServerEvent::NewMessage(early.clone()));

        let snapshot = store.snapshot();
        let rendered = snapshot
            .chats
            .conversation(&UserId::from("a"), &UserId::from("b"));
        assert_eq!(rendered[0].id, early.id);
        assert_eq!(rendered[1].id, late.id);
    }

    #[test]
    fn test_like_echo_after_optimistic_like_stays_single() {
        let store = Store::new();
        store.commit(|state| state.posts.upsert(post("p1")));
        store.commit(|state| state.posts.apply_like(&PostId::from("p1"), &UserId::from("u1")));

        route_event(
            &store,
            &UserId::from("u1"),
            ServerEvent::PostLiked(PostReaction {
                post_id: PostId::from("p1"),
                user_id: UserId::from("u1"),
            }),
        );

        let snapshot = store.snapshot();
        assert_eq!(snapshot.posts.get(&PostId::from("p1")).unwrap().likes.len(), 1);
    }

    #[test]
    fn test_event_for_missing_target_leaves_state_untouched() {
        let store = Store::new();
        let before = store.snapshot();

        route_event(
            &store,
            &UserId::from("u1"),
            ServerEvent::PostLiked(PostReaction {
                post_id: PostId::from("ghost"),
                user_id: UserId::from("u1"),
            }),
        );

        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_directory_snapshot_installs_session_user() {
        let store = Store::new();
        let me = UserId::from("me");
        let users = vec![
            mingle_shared::models::User::skeleton(UserId::from("me")),
            mingle_shared::models::User::skeleton(UserId::from("other")),
        ];

        route_event(&store, &me, ServerEvent::DirectorySnapshot { users });

        let snapshot = store.snapshot();
        assert_eq!(snapshot.auth.user().unwrap().id, me);
        assert!(snapshot.auth.lookup(&UserId::from("other")).is_some());
    }

    #[tokio::test]
    async fn test_bridge_task_routes_and_reports_connection_state() {
        let store = Arc::new(Store::new());
        let (tx, rx) = mpsc::channel(8);
        let (handle, conn_rx) = spawn_bridge(store.clone(), UserId::from("me"), rx);

        tx.send(ChannelNotification::Event(ServerEvent::NewMessage(msg(
            MessageId::new(),
            "a",
            "b",
            1,
        ))))
        .await
        .unwrap();
        tx.send(ChannelNotification::Closed).await.unwrap();

        handle.await.unwrap();
        assert_eq!(store.snapshot().chats.len(), 1);
        assert_eq!(*conn_rx.borrow(), ConnectionState::Closed);
    }
}
