//! Chat screen binding: friend roster, one active conversation, text and
//! media sends.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use mingle_channel::ChannelHandle;
use mingle_media::{MediaFile, Uploader};
use mingle_shared::models::{ChatMessage, User};
use mingle_shared::protocol::{ClientEvent, ConversationKey};
use mingle_shared::types::{MediaKind, MessageId, UserId};
use mingle_store::Store;

use crate::error::ClientError;

/// Render output of the chat screen.
#[derive(Debug, Clone)]
pub struct ChatView {
    /// The session user's friends, resolved against the directory.
    pub roster: Vec<User>,
    pub active: Option<UserId>,
    /// Active conversation, deduped and chronologically ascending.
    pub messages: Vec<ChatMessage>,
}

pub struct ChatScreen {
    store: Arc<Store>,
    channel: ChannelHandle,
    me: UserId,
    active: Option<UserId>,
}

impl ChatScreen {
    pub fn new(store: Arc<Store>, channel: ChannelHandle, me: UserId) -> Self {
        Self {
            store,
            channel,
            me,
            active: None,
        }
    }

    /// Open a conversation and ask the server for its history.
    pub fn select_correspondent(&mut self, other: UserId) {
        self.channel
            .emit(ClientEvent::GetMessagesRequest(ConversationKey {
                sender: self.me.clone(),
                receiver: other.clone(),
            }));
        self.active = Some(other);
    }

    /// Send a plain text message to the active correspondent.
    pub fn send_text(&self, text: &str) -> Result<MessageId, ClientError> {
        let receiver = self
            .active
            .clone()
            .ok_or(ClientError::NoActiveConversation)?;

        self.dispatch(ChatMessage {
            id: MessageId::new(),
            sender: self.me.clone(),
            receiver,
            message: text.to_string(),
            kind: MediaKind::Text,
            media: None,
            timestamp: Utc::now(),
        })
    }

    /// Upload a media file, then send a message carrying its URL. An upload
    /// failure aborts the whole send: nothing is committed, nothing emitted.
    pub async fn send_media<U: Uploader>(
        &self,
        uploader: &U,
        file: MediaFile,
        caption: &str,
    ) -> Result<MessageId, ClientError> {
        let receiver = self
            .active
            .clone()
            .ok_or(ClientError::NoActiveConversation)?;

        let uploaded = uploader.upload(file).await?;

        self.dispatch(ChatMessage {
            id: MessageId::new(),
            sender: self.me.clone(),
            receiver,
            message: caption.to_string(),
            kind: uploaded.kind,
            media: Some(uploaded.file_url),
            timestamp: Utc::now(),
        })
    }

    // Optimistic local commit, then the fire-and-forget emit. The server
    // echo carries the same id and collapses onto this entry.
    fn dispatch(&self, message: ChatMessage) -> Result<MessageId, ClientError> {
        let id = message.id;
        self.store
            .commit(|state| state.chats.apply_incoming(vec![message.clone()]));
        self.channel.emit(ClientEvent::SendMessageRequest(message));
        info!(msg_id = %id, "Message sent");
        Ok(id)
    }

    pub fn view(&self) -> ChatView {
        let snapshot = self.store.snapshot();
        let roster = snapshot
            .auth
            .user()
            .map(|u| snapshot.auth.resolve(&u.friends))
            .unwrap_or_default();
        let messages = match &self.active {
            Some(other) => snapshot
                .chats
                .conversation(&self.me, other)
                .into_iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        ChatView {
            roster,
            active: self.active.clone(),
            messages,
        }
    }
}
