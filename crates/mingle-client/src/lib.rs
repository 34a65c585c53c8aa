//! # mingle-client
//!
//! Session wiring for the four screens: opens the event channel once per
//! session, bridges inbound events into the store, and hands out screen
//! bindings that share the channel handle and store.

pub mod bridge;
pub mod screens;

mod error;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use mingle_channel::{Channel, ChannelConfig, ChannelHandle};
use mingle_media::MediaClient;
use mingle_shared::types::{ConnectionState, SessionCredentials, UserId};
use mingle_store::Store;

use crate::bridge::spawn_bridge;
use crate::screens::{ChatScreen, FeedScreen, FriendsScreen, ProfileScreen};

pub use error::ClientError;

/// Initialise tracing for a client process (respects `RUST_LOG`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("mingle_client=debug,mingle_channel=debug,mingle_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// A live session: one channel, one store, one bridge, one uploader.
pub struct Client {
    me: UserId,
    store: Arc<Store>,
    channel: ChannelHandle,
    uploader: MediaClient,
    connection: watch::Receiver<ConnectionState>,
    bridge: JoinHandle<()>,
}

impl Client {
    /// Open the channel for `credentials` and start the bridge. Called once
    /// at session start; the returned client is the session.
    pub async fn connect(
        credentials: SessionCredentials,
        config: ChannelConfig,
    ) -> Result<Self, ClientError> {
        let me = credentials.user_id.clone();
        let uploader = MediaClient::new(http_base_url(&config.server_url))?;
        let (channel, notif_rx) = Channel::connect(credentials, config).await?;

        let store = Arc::new(Store::new());
        let (bridge, connection) = spawn_bridge(store.clone(), me.clone(), notif_rx);

        info!(user = %me, "Session started");
        Ok(Self {
            me,
            store,
            channel,
            uploader,
            connection,
            bridge,
        })
    }

    pub fn chat(&self) -> ChatScreen {
        ChatScreen::new(self.store.clone(), self.channel.clone(), self.me.clone())
    }

    pub fn feed(&self) -> FeedScreen {
        FeedScreen::new(self.store.clone(), self.channel.clone(), self.me.clone())
    }

    pub fn friends(&self) -> FriendsScreen {
        FriendsScreen::new(self.store.clone(), self.channel.clone(), self.me.clone())
    }

    pub fn profile(&self) -> ProfileScreen {
        ProfileScreen::new(self.store.clone(), self.channel.clone(), self.me.clone())
    }

    pub fn store(&self) -> Arc<Store> {
        self.store.clone()
    }

    /// The session's upload adapter, shared by the chat and profile screens.
    pub fn uploader(&self) -> &MediaClient {
        &self.uploader
    }

    /// Observe the channel link state, to gate feature use.
    pub fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.clone()
    }

    /// Tear the session down: close the socket and wait for the bridge.
    pub async fn logout(self) {
        info!(user = %self.me, "Session ending");
        self.channel.shutdown().await;
        let _ = self.bridge.await;
    }
}

/// The upload endpoint lives on the same host as the socket; swap the
/// scheme (`ws` → `http`, `wss` → `https`).
fn http_base_url(ws_url: &str) -> String {
    ws_url.replacen("ws", "http", 1)
}
