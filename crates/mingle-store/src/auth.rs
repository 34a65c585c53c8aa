//! Session user and known-user directory.
//!
//! Friend and request lists on the session user are id references; the
//! directory resolves them to full records for rendering. Cross-slice
//! effects (a profile change touching the session user) arrive back through
//! channel events, never from a screen writing here directly.

use std::collections::HashMap;

use mingle_shared::models::User;
use mingle_shared::types::UserId;

use crate::apply::Apply;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSlice {
    user: Option<User>,
    directory: HashMap<UserId, User>,
}

impl AuthSlice {
    /// Install or replace the session user record.
    pub fn set_user(&mut self, user: User) {
        self.directory.insert(user.id.clone(), user.clone());
        self.user = Some(user);
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Move `sender` from the receiver's request list to their friend list.
    /// No-op when the session user is not the receiver or the request is
    /// absent; a friend entry is never duplicated.
    pub fn apply_friend_accept(&mut self, sender: &UserId, receiver: &UserId) -> Apply {
        let Some(user) = self.user.as_mut().filter(|u| u.id == *receiver) else {
            return Apply::NotFound;
        };
        let Some(pos) = user.requests.iter().position(|r| r == sender) else {
            return Apply::NotFound;
        };
        user.requests.remove(pos);
        if !user.friends.contains(sender) {
            user.friends.push(sender.clone());
        }
        self.mirror_user();
        Apply::Applied
    }

    /// Drop `sender` from the receiver's request list.
    pub fn apply_friend_reject(&mut self, sender: &UserId, receiver: &UserId) -> Apply {
        let Some(user) = self.user.as_mut().filter(|u| u.id == *receiver) else {
            return Apply::NotFound;
        };
        let Some(pos) = user.requests.iter().position(|r| r == sender) else {
            return Apply::NotFound;
        };
        user.requests.remove(pos);
        self.mirror_user();
        Apply::Applied
    }

    /// Remove the other party from the session user's friend list, whichever
    /// side of the action the session user is on.
    pub fn apply_unfriend(&mut self, a: &UserId, b: &UserId) -> Apply {
        let Some(user) = self.user.as_mut() else {
            return Apply::NotFound;
        };
        let other = if user.id == *a {
            b
        } else if user.id == *b {
            a
        } else {
            return Apply::NotFound;
        };
        let before = user.friends.len();
        user.friends.retain(|f| f != other);
        if user.friends.len() == before {
            return Apply::NotFound;
        }
        self.mirror_user();
        Apply::Applied
    }

    /// Authoritative replacement for one user record. Replaces the session
    /// user too when the ids match.
    pub fn apply_user_updated(&mut self, user: User) {
        if self.user.as_ref().is_some_and(|u| u.id == user.id) {
            self.user = Some(user.clone());
        }
        self.directory.insert(user.id.clone(), user);
    }

    /// Known-users snapshot (session start).
    pub fn apply_directory(&mut self, users: Vec<User>) {
        for user in users {
            self.apply_user_updated(user);
        }
    }

    pub fn lookup(&self, id: &UserId) -> Option<&User> {
        self.directory.get(id)
    }

    /// Resolve an id reference list against the directory, skipping ids the
    /// server has not described yet.
    pub fn resolve(&self, ids: &[UserId]) -> Vec<User> {
        ids.iter()
            .filter_map(|id| self.directory.get(id).cloned())
            .collect()
    }

    // Keep the directory copy of the session user in sync after a mutation.
    fn mirror_user(&mut self) {
        if let Some(ref user) = self.user {
            self.directory.insert(user.id.clone(), user.clone());
        }
    }
}
