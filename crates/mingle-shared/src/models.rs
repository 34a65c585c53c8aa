//! Domain records pushed by the server and held in the client store.
//!
//! Every struct derives `Serialize` and `Deserialize` because the same
//! shapes travel on the wire and sit in the store slices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MediaKind, MessageId, PostId, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user account. `friends` and `requests` are reference lists of ids,
/// resolved against the directory at render time, never embedded copies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default, rename = "cover")]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub friends: Vec<UserId>,
    #[serde(default)]
    pub requests: Vec<UserId>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl User {
    /// A minimal record for a user the server has not described yet.
    pub fn skeleton(id: UserId) -> Self {
        Self {
            id,
            email: String::new(),
            display_name: String::new(),
            photo_url: None,
            cover_url: None,
            friends: Vec::new(),
            requests: Vec::new(),
            phone_number: None,
            dob: None,
            address: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// A single chat message. The id is client-assigned, so the optimistic local
/// add and the server echo carry the same identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: UserId,
    pub receiver: UserId,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default)]
    pub media: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Whether this message belongs to the conversation between `a` and `b`,
    /// in either direction.
    pub fn is_between(&self, a: &UserId, b: &UserId) -> bool {
        (self.sender == *a && self.receiver == *b) || (self.sender == *b && self.receiver == *a)
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// A public feed post. `likes` has set semantics: a user id appears at
/// most once no matter how many like events are delivered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub owner: UserId,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Body of the post: the text itself, or the media URL for image/video.
    pub content: String,
    /// Caption shown next to media posts.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub likes: Vec<UserId>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub user: UserId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// The editable slice of a user account, as exchanged with
/// `get-profile-request` / `update-profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default, rename = "cover")]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl From<&User> for ProfileRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            cover_url: user.cover_url.clone(),
            phone_number: user.phone_number.clone(),
            dob: user.dob.clone(),
            address: user.address.clone(),
        }
    }
}

/// Shallow-merge patch for a profile record. Absent fields are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, rename = "cover", skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfilePatch {
    /// Merge every present field into `record`, leaving the rest alone.
    pub fn merge_into(&self, record: &mut ProfileRecord) {
        if let Some(ref v) = self.display_name {
            record.display_name = v.clone();
        }
        if let Some(ref v) = self.photo_url {
            record.photo_url = Some(v.clone());
        }
        if let Some(ref v) = self.cover_url {
            record.cover_url = Some(v.clone());
        }
        if let Some(ref v) = self.phone_number {
            record.phone_number = Some(v.clone());
        }
        if let Some(ref v) = self.dob {
            record.dob = Some(v.clone());
        }
        if let Some(ref v) = self.address {
            record.address = Some(v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProfileRecord {
        ProfileRecord {
            id: UserId::from("u1"),
            email: "a@b.c".into(),
            display_name: "Ada".into(),
            photo_url: None,
            cover_url: None,
            phone_number: Some("123".into()),
            dob: None,
            address: None,
        }
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut rec = record();
        let patch = ProfilePatch {
            display_name: Some("Ada L.".into()),
            photo_url: Some("http://x/p.png".into()),
            ..Default::default()
        };
        patch.merge_into(&mut rec);
        assert_eq!(rec.display_name, "Ada L.");
        assert_eq!(rec.photo_url.as_deref(), Some("http://x/p.png"));
        // untouched
        assert_eq!(rec.phone_number.as_deref(), Some("123"));
        assert_eq!(rec.email, "a@b.c");
    }

    #[test]
    fn test_message_conversation_membership() {
        let msg = ChatMessage {
            id: MessageId::new(),
            sender: UserId::from("a"),
            receiver: UserId::from("b"),
            message: "hi".into(),
            kind: MediaKind::Text,
            media: None,
            timestamp: Utc::now(),
        };
        assert!(msg.is_between(&UserId::from("a"), &UserId::from("b")));
        assert!(msg.is_between(&UserId::from("b"), &UserId::from("a")));
        assert!(!msg.is_between(&UserId::from("a"), &UserId::from("c")));
    }
}
