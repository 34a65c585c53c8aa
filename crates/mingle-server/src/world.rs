//! In-memory world state behind the relay.
//!
//! Each inbound client event mutates the world and yields a list of
//! deliveries: targeted pushes, broadcasts, or both. Keeping this pure
//! (state in, deliveries out) lets the event semantics be tested without
//! sockets.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use mingle_shared::models::{ChatMessage, Comment, Post, ProfileRecord, User};
use mingle_shared::protocol::{ClientEvent, ServerEvent};
use mingle_shared::types::{PostId, UserId};

/// Where a server event should go.
#[derive(Debug, Clone)]
pub enum Delivery {
    To(UserId, ServerEvent),
    Broadcast(ServerEvent),
}

#[derive(Debug, Default)]
pub struct World {
    users: HashMap<UserId, User>,
    posts: Vec<Post>,
    messages: Vec<ChatMessage>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial pushes for a freshly connected session: the session user's
    /// record, the known-users directory, and the full feed.
    pub fn session_opening(&mut self, user_id: &UserId) -> Vec<Delivery> {
        let user = self.user_mut(user_id).clone();
        let users: Vec<User> = self.users.values().cloned().collect();
        vec![
            Delivery::To(user_id.clone(), ServerEvent::UserUpdated(user)),
            Delivery::To(user_id.clone(), ServerEvent::DirectorySnapshot { users }),
            Delivery::To(
                user_id.clone(),
                ServerEvent::PostsSnapshot {
                    posts: self.posts.clone(),
                },
            ),
        ]
    }

    /// Apply one client event and produce the resulting deliveries.
    pub fn handle(&mut self, from: &UserId, event: ClientEvent) -> Vec<Delivery> {
        match event {
            ClientEvent::GetMessagesRequest(key) => {
                let messages: Vec<ChatMessage> = self
                    .messages
                    .iter()
                    .filter(|m| m.is_between(&key.sender, &key.receiver))
                    .cloned()
                    .collect();
                vec![Delivery::To(
                    from.clone(),
                    ServerEvent::MessageHistory { messages },
                )]
            }

            ClientEvent::SendMessageRequest(message) => {
                // at-least-once delivery from the client side too: keep one
                // copy per id
                match self.messages.iter_mut().find(|m| m.id == message.id) {
                    Some(existing) => *existing = message.clone(),
                    None => self.messages.push(message.clone()),
                }

                let mut deliveries = vec![Delivery::To(
                    message.sender.clone(),
                    ServerEvent::NewMessage(message.clone()),
                )];
                if message.receiver != message.sender {
                    deliveries.push(Delivery::To(
                        message.receiver.clone(),
                        ServerEvent::NewMessage(message),
                    ));
                }
                deliveries
            }

            ClientEvent::LikePost(r) => {
                let Some(post) = self.post_mut(&r.post_id) else {
                    return Vec::new();
                };
                if !post.likes.contains(&r.user_id) {
                    post.likes.push(r.user_id.clone());
                }
                vec![Delivery::Broadcast(ServerEvent::PostLiked(r))]
            }

            ClientEvent::UnlikePost(r) => {
                let Some(post) = self.post_mut(&r.post_id) else {
                    return Vec::new();
                };
                post.likes.retain(|u| u != &r.user_id);
                vec![Delivery::Broadcast(ServerEvent::PostUnliked(r))]
            }

            ClientEvent::CommentPost(req) => {
                let comment = Comment {
                    user: req.user_id,
                    text: req.text,
                    timestamp: Utc::now(),
                };
                let Some(post) = self.post_mut(&req.post_id) else {
                    return Vec::new();
                };
                post.comments.push(comment.clone());
                vec![Delivery::Broadcast(ServerEvent::PostCommented {
                    post_id: req.post_id,
                    comment,
                })]
            }

            ClientEvent::CreatePost(req) => {
                let post = Post {
                    id: PostId(Uuid::new_v4().to_string()),
                    owner: req.owner,
                    kind: req.kind,
                    content: req.content,
                    text: req.text,
                    likes: Vec::new(),
                    comments: Vec::new(),
                    timestamp: Utc::now(),
                };
                self.posts.push(post.clone());
                vec![Delivery::Broadcast(ServerEvent::PostCreated(post))]
            }

            ClientEvent::GetProfileRequest(q) => {
                let record = ProfileRecord::from(&*self.user_mut(&q.user_id));
                vec![Delivery::To(
                    from.clone(),
                    ServerEvent::ProfileResponse(record),
                )]
            }

            ClientEvent::UpdateProfile(record) => {
                let user = self.user_mut(&record.id);
                user.display_name = record.display_name.clone();
                user.photo_url = record.photo_url.clone();
                user.cover_url = record.cover_url.clone();
                user.phone_number = record.phone_number.clone();
                user.dob = record.dob.clone();
                user.address = record.address.clone();
                let updated = user.clone();
                vec![
                    Delivery::To(from.clone(), ServerEvent::ProfileUpdated(record)),
                    Delivery::Broadcast(ServerEvent::UserUpdated(updated)),
                ]
            }

            ClientEvent::AcceptFriendRequest(a) => {
                let receiver = self.user_mut(&a.receiver);
                let Some(pos) = receiver.requests.iter().position(|r| r == &a.sender) else {
                    return Vec::new();
                };
                receiver.requests.remove(pos);
                if !receiver.friends.contains(&a.sender) {
                    receiver.friends.push(a.sender.clone());
                }
                let receiver_rec = receiver.clone();

                let sender = self.user_mut(&a.sender);
                if !sender.friends.contains(&a.receiver) {
                    sender.friends.push(a.receiver.clone());
                }
                let sender_rec = sender.clone();

                vec![
                    Delivery::To(a.receiver.clone(), ServerEvent::FriendAccepted(a.clone())),
                    Delivery::To(a.sender.clone(), ServerEvent::FriendAccepted(a)),
                    Delivery::Broadcast(ServerEvent::UserUpdated(receiver_rec)),
                    Delivery::Broadcast(ServerEvent::UserUpdated(sender_rec)),
                ]
            }

            ClientEvent::RejectFriendRequest(a) => {
                let receiver = self.user_mut(&a.receiver);
                let Some(pos) = receiver.requests.iter().position(|r| r == &a.sender) else {
                    return Vec::new();
                };
                receiver.requests.remove(pos);
                let receiver_rec = receiver.clone();

                vec![
                    Delivery::To(a.receiver.clone(), ServerEvent::FriendRejected(a)),
                    Delivery::Broadcast(ServerEvent::UserUpdated(receiver_rec)),
                ]
            }

            ClientEvent::UnfriendUser(a) => {
                let receiver = self.user_mut(&a.receiver);
                receiver.friends.retain(|f| f != &a.sender);
                let receiver_rec = receiver.clone();

                let sender = self.user_mut(&a.sender);
                sender.friends.retain(|f| f != &a.receiver);
                let sender_rec = sender.clone();

                vec![
                    Delivery::To(a.receiver.clone(), ServerEvent::Unfriended(a.clone())),
                    Delivery::To(a.sender.clone(), ServerEvent::Unfriended(a)),
                    Delivery::Broadcast(ServerEvent::UserUpdated(receiver_rec)),
                    Delivery::Broadcast(ServerEvent::UserUpdated(sender_rec)),
                ]
            }
        }
    }

    /// Seed a user record (tests and fixtures).
    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    fn user_mut(&mut self, id: &UserId) -> &mut User {
        self.users
            .entry(id.clone())
            .or_insert_with(|| User::skeleton(id.clone()))
    }

    fn post_mut(&mut self, id: &PostId) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mingle_shared::protocol::{ConversationKey, CreatePostRequest, FriendAction, PostReaction};
    use mingle_shared::types::{MediaKind, MessageId};

    fn msg(sender: &str, receiver: &str, ts: i64) -> ChatMessage {
        ChatMessage {
            id: MessageId::new(),
            sender: UserId::from(sender),
            receiver: UserId::from(receiver),
            message: "m".into(),
            kind: MediaKind::Text,
            media: None,
            timestamp: Utc.timestamp_opt(ts, 0).unwrap(),
        }
    }

    #[test]
    fn test_send_message_echoes_to_both_parties() {
        let mut world = World::new();
        let message = msg("a", "b", 1);

        let deliveries =
            world.handle(&UserId::from("a"), ClientEvent::SendMessageRequest(message));

        let targets: Vec<&UserId> = deliveries
            .iter()
            .map(|d| match d {
                Delivery::To(user, ServerEvent::NewMessage(_)) => user,
                other => panic!("unexpected delivery: {other:?}"),
            })
            .collect();
        assert_eq!(targets, vec![&UserId::from("a"), &UserId::from("b")]);
    }

    #[test]
    fn test_history_is_filtered_by_conversation_pair() {
        let mut world = World::new();
        world.handle(&UserId::from("a"), ClientEvent::SendMessageRequest(msg("a", "b", 1)));
        world.handle(&UserId::from("a"), ClientEvent::SendMessageRequest(msg("a", "c", 2)));
        world.handle(&UserId::from("b"), ClientEvent::SendMessageRequest(msg("b", "a", 3)));

        let deliveries = world.handle(
            &UserId::from("a"),
            ClientEvent::GetMessagesRequest(ConversationKey {
                sender: UserId::from("a"),
                receiver: UserId::from("b"),
            }),
        );

        match &deliveries[0] {
            Delivery::To(user, ServerEvent::MessageHistory { messages }) => {
                assert_eq!(user, &UserId::from("a"));
                assert_eq!(messages.len(), 2);
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
    }

    #[test]
    fn test_like_on_unknown_post_delivers_nothing() {
        let mut world = World::new();
        let deliveries = world.handle(
            &UserId::from("a"),
            ClientEvent::LikePost(PostReaction {
                post_id: PostId::from("ghost"),
                user_id: UserId::from("a"),
            }),
        );
        assert!(deliveries.is_empty());
    }

    #[test]
    fn test_repeated_like_keeps_set_semantics() {
        let mut world = World::new();
        let deliveries = world.handle(
            &UserId::from("a"),
            ClientEvent::CreatePost(CreatePostRequest {
                owner: UserId::from("a"),
                kind: MediaKind::Text,
                content: "hello".into(),
                text: String::new(),
            }),
        );
        let post_id = match &deliveries[0] {
            Delivery::Broadcast(ServerEvent::PostCreated(post)) => post.id.clone(),
            other => panic!("unexpected delivery: {other:?}"),
        };

        let reaction = PostReaction {
            post_id: post_id.clone(),
            user_id: UserId::from("b"),
        };
        world.handle(&UserId::from("b"), ClientEvent::LikePost(reaction.clone()));
        world.handle(&UserId::from("b"), ClientEvent::LikePost(reaction));

        assert_eq!(world.post_mut(&post_id).unwrap().likes.len(), 1);
    }

    #[test]
    fn test_accept_friend_updates_both_records() {
        let mut world = World::new();
        let mut receiver = User::skeleton(UserId::from("r"));
        receiver.requests = vec![UserId::from("s")];
        world.insert_user(receiver);

        let deliveries = world.handle(
            &UserId::from("r"),
            ClientEvent::AcceptFriendRequest(FriendAction {
                receiver: UserId::from("r"),
                sender: UserId::from("s"),
            }),
        );

        assert_eq!(deliveries.len(), 4);
        let receiver = world.user_mut(&UserId::from("r")).clone();
        assert!(receiver.requests.is_empty());
        assert_eq!(receiver.friends, vec![UserId::from("s")]);
        let sender = world.user_mut(&UserId::from("s")).clone();
        assert_eq!(sender.friends, vec![UserId::from("r")]);
    }

    #[test]
    fn test_accept_without_request_is_silent() {
        let mut world = World::new();
        let deliveries = world.handle(
            &UserId::from("r"),
            ClientEvent::AcceptFriendRequest(FriendAction {
                receiver: UserId::from("r"),
                sender: UserId::from("s"),
            }),
        );
        assert!(deliveries.is_empty());
    }

    #[test]
    fn test_session_opening_pushes_state() {
        let mut world = World::new();
        world.handle(
            &UserId::from("a"),
            ClientEvent::CreatePost(CreatePostRequest {
                owner: UserId::from("a"),
                kind: MediaKind::Text,
                content: "hi".into(),
                text: String::new(),
            }),
        );

        let deliveries = world.session_opening(&UserId::from("b"));
        assert_eq!(deliveries.len(), 3);
        match &deliveries[2] {
            Delivery::To(user, ServerEvent::PostsSnapshot { posts }) => {
                assert_eq!(user, &UserId::from("b"));
                assert_eq!(posts.len(), 1);
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
    }
}
