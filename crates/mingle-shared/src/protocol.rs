//! Named events exchanged over the persistent channel.
//!
//! Frames are JSON objects `{"event": <name>, "data": <payload>}`; the
//! event names on the wire are the kebab-case variant names below.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::models::{ChatMessage, Comment, Post, ProfileRecord, User};
use crate::types::{MediaKind, PostId, UserId};

/// Events emitted by the client. Fire-and-forget: the protocol defines no
/// acknowledgement for any of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Ask the server to push the message history for one conversation.
    GetMessagesRequest(ConversationKey),

    /// Send a chat message; the server relays to the receiver and echoes
    /// back to the sender.
    SendMessageRequest(ChatMessage),

    LikePost(PostReaction),
    UnlikePost(PostReaction),
    CommentPost(CommentRequest),

    /// Publish a new feed post. The server assigns the post id.
    CreatePost(CreatePostRequest),

    GetProfileRequest(ProfileQuery),
    /// Persist the full (already patched) profile record.
    UpdateProfile(ProfileRecord),

    AcceptFriendRequest(FriendAction),
    RejectFriendRequest(FriendAction),
    UnfriendUser(FriendAction),
}

/// Events pushed by the server, routed into the matching store reducer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// History for one conversation, answering `get-messages-request`.
    MessageHistory { messages: Vec<ChatMessage> },
    /// A relayed or echoed chat message. May repeat an id the client
    /// already holds (at-least-once delivery).
    NewMessage(ChatMessage),

    /// Full feed replacement, sent once on session start.
    PostsSnapshot { posts: Vec<Post> },
    PostCreated(Post),
    PostLiked(PostReaction),
    PostUnliked(PostReaction),
    PostCommented { post_id: PostId, comment: Comment },

    ProfileResponse(ProfileRecord),
    ProfileUpdated(ProfileRecord),

    FriendAccepted(FriendAction),
    FriendRejected(FriendAction),
    Unfriended(FriendAction),

    /// Authoritative replacement for one user record.
    UserUpdated(User),
    /// Known-users snapshot, sent once on session start.
    DirectorySnapshot { users: Vec<User> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationKey {
    pub sender: UserId,
    pub receiver: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostReaction {
    pub post_id: PostId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentRequest {
    pub post_id: PostId,
    pub user_id: UserId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePostRequest {
    pub owner: UserId,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub content: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileQuery {
    pub user_id: UserId,
}

/// Friend relationship change. `receiver` is the account whose request
/// list is being acted on; `sender` is the account that sent the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendAction {
    pub receiver: UserId,
    pub sender: UserId,
}

impl ClientEvent {
    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from a JSON text frame.
    pub fn from_json(frame: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(frame)?)
    }
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(frame: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_name(frame: &str) -> String {
        let value: serde_json::Value = serde_json::from_str(frame).unwrap();
        value["event"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_outbound_event_names() {
        let cases = vec![
            (
                ClientEvent::GetMessagesRequest(ConversationKey {
                    sender: UserId::from("a"),
                    receiver: UserId::from("b"),
                }),
                "get-messages-request",
            ),
            (
                ClientEvent::LikePost(PostReaction {
                    post_id: PostId::from("p1"),
                    user_id: UserId::from("u1"),
                }),
                "like-post",
            ),
            (
                ClientEvent::UnlikePost(PostReaction {
                    post_id: PostId::from("p1"),
                    user_id: UserId::from("u1"),
                }),
                "unlike-post",
            ),
            (
                ClientEvent::CommentPost(CommentRequest {
                    post_id: PostId::from("p1"),
                    user_id: UserId::from("u1"),
                    text: "nice".into(),
                }),
                "comment-post",
            ),
            (
                ClientEvent::AcceptFriendRequest(FriendAction {
                    receiver: UserId::from("r"),
                    sender: UserId::from("s"),
                }),
                "accept-friend-request",
            ),
            (
                ClientEvent::RejectFriendRequest(FriendAction {
                    receiver: UserId::from("r"),
                    sender: UserId::from("s"),
                }),
                "reject-friend-request",
            ),
            (
                ClientEvent::UnfriendUser(FriendAction {
                    receiver: UserId::from("r"),
                    sender: UserId::from("s"),
                }),
                "unfriend-user",
            ),
            (
                ClientEvent::GetProfileRequest(ProfileQuery {
                    user_id: UserId::from("u1"),
                }),
                "get-profile-request",
            ),
        ];
        for (event, name) in cases {
            assert_eq!(event_name(&event.to_json().unwrap()), name);
        }
    }

    #[test]
    fn test_send_message_round_trip() {
        use crate::types::{MediaKind, MessageId};
        use chrono::Utc;

        let event = ClientEvent::SendMessageRequest(ChatMessage {
            id: MessageId::new(),
            sender: UserId::from("a"),
            receiver: UserId::from("b"),
            message: "hello".into(),
            kind: MediaKind::Image,
            media: Some("http://files/x.png".into()),
            timestamp: Utc::now(),
        });

        let frame = event.to_json().unwrap();
        assert_eq!(event_name(&frame), "send-message-request");
        // the media kind travels under the original "type" key
        assert!(frame.contains("\"type\":\"image\""));
        let restored = ClientEvent::from_json(&frame).unwrap();
        assert_eq!(event, restored);
    }

    #[test]
    fn test_unknown_inbound_event_is_an_error() {
        let frame = r#"{"event":"no-such-event","data":{}}"#;
        assert!(ServerEvent::from_json(frame).is_err());
    }

    #[test]
    fn test_server_event_round_trip() {
        let event = ServerEvent::PostLiked(PostReaction {
            post_id: PostId::from("p1"),
            user_id: UserId::from("u1"),
        });
        let frame = event.to_json().unwrap();
        assert_eq!(event_name(&frame), "post-liked");
        assert_eq!(ServerEvent::from_json(&frame).unwrap(), event);
    }
}
