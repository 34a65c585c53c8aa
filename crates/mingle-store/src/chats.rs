//! Chat message slice.
//!
//! Messages arrive at least once: the optimistic local add and the server
//! echo carry the same id, and history pushes can repeat earlier relays.
//! The slice unions by id; display order is produced at render time by
//! sorting on timestamp, never by arrival order.

use mingle_shared::models::ChatMessage;
use mingle_shared::types::UserId;

/// All chat messages known to the session, across conversations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSlice {
    messages: Vec<ChatMessage>,
}

impl ChatSlice {
    /// Union `incoming` into the slice by id. Exactly one copy is kept per
    /// id; on conflicting fields the incoming copy wins (last write wins).
    pub fn apply_incoming(&mut self, incoming: Vec<ChatMessage>) {
        for message in incoming {
            match self.messages.iter_mut().find(|m| m.id == message.id) {
                Some(existing) => *existing = message,
                None => self.messages.push(message),
            }
        }
    }

    /// The conversation between `me` and `other`, chronologically ascending.
    /// Ties on timestamp break on id so the order is stable.
    pub fn conversation(&self, me: &UserId, other: &UserId) -> Vec<&ChatMessage> {
        let mut messages: Vec<&ChatMessage> = self
            .messages
            .iter()
            .filter(|m| m.is_between(me, other))
            .collect();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        messages
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
