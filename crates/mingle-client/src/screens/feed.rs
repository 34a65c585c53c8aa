//! Public feed binding: like toggling, comments, post creation.

use std::sync::Arc;

use mingle_channel::ChannelHandle;
use mingle_media::{MediaFile, Uploader};
use mingle_shared::models::Post;
use mingle_shared::protocol::{ClientEvent, CommentRequest, CreatePostRequest, PostReaction};
use mingle_shared::types::{MediaKind, PostId, UserId};
use mingle_store::{Apply, Store};

use crate::error::ClientError;

/// Render output of the feed screen: posts newest first, each post's
/// comments newest first.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub posts: Vec<Post>,
}

pub struct FeedScreen {
    store: Arc<Store>,
    channel: ChannelHandle,
    me: UserId,
}

impl FeedScreen {
    pub fn new(store: Arc<Store>, channel: ChannelHandle, me: UserId) -> Self {
        Self { store, channel, me }
    }

    /// Like the post, or unlike it when the session user already likes it.
    /// The local set mutation is optimistic; the broadcast confirmation
    /// lands on the same set idempotently.
    pub fn toggle_like(&self, post_id: &PostId) -> Apply {
        let already_liked = match self.store.snapshot().posts.get(post_id) {
            Some(post) => post.likes.contains(&self.me),
            None => return Apply::NotFound,
        };

        let reaction = PostReaction {
            post_id: post_id.clone(),
            user_id: self.me.clone(),
        };

        if already_liked {
            let outcome = self
                .store
                .commit(|state| state.posts.apply_unlike(post_id, &self.me));
            self.channel.emit(ClientEvent::UnlikePost(reaction));
            outcome
        } else {
            let outcome = self
                .store
                .commit(|state| state.posts.apply_like(post_id, &self.me));
            self.channel.emit(ClientEvent::LikePost(reaction));
            outcome
        }
    }

    /// Submit a comment. No optimistic apply: the authoritative copy comes
    /// back with the server-assigned timestamp.
    pub fn submit_comment(&self, post_id: &PostId, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.channel.emit(ClientEvent::CommentPost(CommentRequest {
            post_id: post_id.clone(),
            user_id: self.me.clone(),
            text: text.to_string(),
        }));
    }

    /// Publish a post. Media posts upload first and abort on failure; the
    /// post itself appears when the server broadcasts it with its id.
    pub async fn create_post<U: Uploader>(
        &self,
        uploader: &U,
        text: &str,
        media: Option<MediaFile>,
    ) -> Result<(), ClientError> {
        let request = match media {
            Some(file) => {
                let uploaded = uploader.upload(file).await?;
                CreatePostRequest {
                    owner: self.me.clone(),
                    kind: uploaded.kind,
                    content: uploaded.file_url,
                    text: text.to_string(),
                }
            }
            None => CreatePostRequest {
                owner: self.me.clone(),
                kind: MediaKind::Text,
                content: text.to_string(),
                text: String::new(),
            },
        };
        self.channel.emit(ClientEvent::CreatePost(request));
        Ok(())
    }

    pub fn view(&self) -> FeedView {
        let snapshot = self.store.snapshot();
        let posts = snapshot
            .posts
            .ordered()
            .into_iter()
            .cloned()
            .map(|mut post| {
                post.comments
                    .sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                post
            })
            .collect();
        FeedView { posts }
    }
}
