//! Public feed slice.
//!
//! Posts are append-only from the server's perspective; likes and comments
//! mutate in place via targeted events. A full replacement happens only on
//! the initial `posts-snapshot`.

use mingle_shared::models::{Comment, Post};
use mingle_shared::types::{PostId, UserId};

use crate::apply::Apply;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostSlice {
    posts: Vec<Post>,
}

impl PostSlice {
    /// Replace the whole feed (initial load). Repeated ids collapse to the
    /// last delivered copy.
    pub fn replace_all(&mut self, posts: Vec<Post>) {
        self.posts.clear();
        for post in posts {
            self.upsert(post);
        }
    }

    /// Insert a post, or replace the copy already held under the same id.
    pub fn upsert(&mut self, post: Post) {
        match self.posts.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => *existing = post,
            None => self.posts.push(post),
        }
    }

    /// Add `user_id` to the post's like set. Idempotent: repeated likes
    /// from the same user never grow the set.
    pub fn apply_like(&mut self, post_id: &PostId, user_id: &UserId) -> Apply {
        let Some(post) = self.posts.iter_mut().find(|p| p.id == *post_id) else {
            return Apply::NotFound;
        };
        if !post.likes.contains(user_id) {
            post.likes.push(user_id.clone());
        }
        Apply::Applied
    }

    /// Remove `user_id` from the post's like set.
    pub fn apply_unlike(&mut self, post_id: &PostId, user_id: &UserId) -> Apply {
        let Some(post) = self.posts.iter_mut().find(|p| p.id == *post_id) else {
            return Apply::NotFound;
        };
        post.likes.retain(|u| u != user_id);
        Apply::Applied
    }

    /// Append a comment to the matching post.
    pub fn apply_comment(&mut self, post_id: &PostId, comment: Comment) -> Apply {
        let Some(post) = self.posts.iter_mut().find(|p| p.id == *post_id) else {
            return Apply::NotFound;
        };
        post.comments.push(comment);
        Apply::Applied
    }

    pub fn get(&self, post_id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == *post_id)
    }

    /// Feed order: newest first.
    pub fn ordered(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        posts
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mingle_shared::types::MediaKind;

    fn post(id: &str, ts: i64) -> Post {
        Post {
            id: PostId::from(id),
            owner: UserId::from("owner"),
            kind: MediaKind::Text,
            content: "body".into(),
            text: String::new(),
            likes: Vec::new(),
            comments: Vec::new(),
            timestamp: Utc.timestamp_opt(ts, 0).unwrap(),
        }
    }

    #[test]
    fn test_like_is_idempotent() {
        let mut slice = PostSlice::default();
        slice.upsert(post("p1", 1));

        assert_eq!(slice.apply_like(&PostId::from("p1"), &UserId::from("u1")), Apply::Applied);
        assert_eq!(slice.apply_like(&PostId::from("p1"), &UserId::from("u1")), Apply::Applied);

        assert_eq!(slice.get(&PostId::from("p1")).unwrap().likes.len(), 1);
    }

    #[test]
    fn test_optimistic_like_plus_server_echo_stays_a_set() {
        let mut slice = PostSlice::default();
        slice.upsert(post("p1", 1));

        // optimistic local apply, then the broadcast confirmation
        slice.apply_like(&PostId::from("p1"), &UserId::from("u1"));
        slice.apply_like(&PostId::from("p1"), &UserId::from("u1"));

        let likes = &slice.get(&PostId::from("p1")).unwrap().likes;
        assert_eq!(likes.as_slice(), &[UserId::from("u1")]);
    }

    #[test]
    fn test_like_then_unlike_restores_prior_state() {
        let mut slice = PostSlice::default();
        slice.upsert(post("p1", 1));
        let before = slice.clone();

        slice.apply_like(&PostId::from("p1"), &UserId::from("u1"));
        slice.apply_unlike(&PostId::from("p1"), &UserId::from("u1"));

        assert_eq!(slice, before);
    }

    #[test]
    fn test_missing_post_degrades_to_not_found() {
        let mut slice = PostSlice::default();
        let before = slice.clone();

        assert_eq!(slice.apply_like(&PostId::from("nope"), &UserId::from("u1")), Apply::NotFound);
        assert_eq!(slice.apply_unlike(&PostId::from("nope"), &UserId::from("u1")), Apply::NotFound);
        let comment = Comment {
            user: UserId::from("u1"),
            text: "hi".into(),
            timestamp: Utc.timestamp_opt(9, 0).unwrap(),
        };
        assert_eq!(slice.apply_comment(&PostId::from("nope"), comment), Apply::NotFound);
        assert_eq!(slice, before);
    }

    #[test]
    fn test_comment_appends() {
        let mut slice = PostSlice::default();
        slice.upsert(post("p1", 1));

        let comment = Comment {
            user: UserId::from("u1"),
            text: "first".into(),
            timestamp: Utc.timestamp_opt(2, 0).unwrap(),
        };
        assert_eq!(slice.apply_comment(&PostId::from("p1"), comment), Apply::Applied);
        assert_eq!(slice.get(&PostId::from("p1")).unwrap().comments.len(), 1);
    }

    #[test]
    fn test_upsert_dedups_by_id() {
        let mut slice = PostSlice::default();
        slice.upsert(post("p1", 1));
        slice.upsert(post("p1", 1));
        assert_eq!(slice.len(), 1);
    }

    #[test]
    fn test_ordered_is_newest_first() {
        let mut slice = PostSlice::default();
        slice.upsert(post("old", 10));
        slice.upsert(post("new", 20));

        let ordered = slice.ordered();
        assert_eq!(ordered[0].id, PostId::from("new"));
        assert_eq!(ordered[1].id, PostId::from("old"));
    }
}
