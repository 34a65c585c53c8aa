//! Friends screen binding: pending requests and the friend roster.

use std::sync::Arc;

use mingle_channel::ChannelHandle;
use mingle_shared::models::User;
use mingle_shared::protocol::{ClientEvent, FriendAction};
use mingle_shared::types::UserId;
use mingle_store::{Apply, Store};

/// Render output: both lists resolved against the directory.
#[derive(Debug, Clone)]
pub struct FriendsView {
    pub requests: Vec<User>,
    pub friends: Vec<User>,
}

pub struct FriendsScreen {
    store: Arc<Store>,
    channel: ChannelHandle,
    me: UserId,
}

impl FriendsScreen {
    pub fn new(store: Arc<Store>, channel: ChannelHandle, me: UserId) -> Self {
        Self { store, channel, me }
    }

    /// Accept a pending request: optimistic move from requests to friends,
    /// then the relationship event. Re-accepting an already handled request
    /// no-ops locally but still informs the server.
    pub fn accept(&self, sender: &UserId) -> Apply {
        let outcome = self
            .store
            .commit(|state| state.auth.apply_friend_accept(sender, &self.me));
        self.channel
            .emit(ClientEvent::AcceptFriendRequest(self.action(sender)));
        outcome
    }

    pub fn reject(&self, sender: &UserId) -> Apply {
        let outcome = self
            .store
            .commit(|state| state.auth.apply_friend_reject(sender, &self.me));
        self.channel
            .emit(ClientEvent::RejectFriendRequest(self.action(sender)));
        outcome
    }

    pub fn unfriend(&self, friend: &UserId) -> Apply {
        let outcome = self
            .store
            .commit(|state| state.auth.apply_unfriend(friend, &self.me));
        self.channel
            .emit(ClientEvent::UnfriendUser(self.action(friend)));
        outcome
    }

    fn action(&self, sender: &UserId) -> FriendAction {
        FriendAction {
            receiver: self.me.clone(),
            sender: sender.clone(),
        }
    }

    pub fn view(&self) -> FriendsView {
        let snapshot = self.store.snapshot();
        match snapshot.auth.user() {
            Some(user) => FriendsView {
                requests: snapshot.auth.resolve(&user.requests),
                friends: snapshot.auth.resolve(&user.friends),
            },
            None => FriendsView {
                requests: Vec::new(),
                friends: Vec::new(),
            },
        }
    }
}
