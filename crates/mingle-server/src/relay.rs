//! WebSocket relay: one session per connected user, events in, deliveries
//! out.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use mingle_shared::protocol::{ClientEvent, ServerEvent};
use mingle_shared::types::UserId;

use crate::api::AppState;
use crate::error::ServerError;
use crate::world::{Delivery, World};

/// Shared relay state: the world plus one outbound sender per live session.
/// A reconnecting user replaces their previous session sender.
pub struct RelayHub {
    world: Mutex<World>,
    sessions: Mutex<HashMap<UserId, mpsc::UnboundedSender<ServerEvent>>>,
}

impl RelayHub {
    pub fn new() -> Self {
        Self {
            world: Mutex::new(World::new()),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a session and push the opening state to it.
    pub fn open_session(&self, user: &UserId, tx: mpsc::UnboundedSender<ServerEvent>) {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user.clone(), tx);

        let deliveries = self
            .world
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .session_opening(user);
        self.dispatch(deliveries);

        info!(user = %user, "Session opened");
    }

    pub fn close_session(&self, user: &UserId) {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(user);
        info!(user = %user, "Session closed");
    }

    /// Apply one client event to the world and fan out the deliveries.
    pub fn handle_event(&self, from: &UserId, event: ClientEvent) {
        let deliveries = self
            .world
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .handle(from, event);
        self.dispatch(deliveries);
    }

    fn dispatch(&self, deliveries: Vec<Delivery>) {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        for delivery in deliveries {
            match delivery {
                Delivery::To(user, event) => {
                    if let Some(tx) = sessions.get(&user) {
                        let _ = tx.send(event);
                    }
                }
                Delivery::Broadcast(event) => {
                    for tx in sessions.values() {
                        let _ = tx.send(event.clone());
                    }
                }
            }
        }
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
pub struct SocketQuery {
    user_id: String,
    #[serde(default)]
    token: String,
}

/// `GET /socket?user_id=..&token=..`: upgrade to the event channel.
pub async fn socket_upgrade(
    State(state): State<AppState>,
    Query(query): Query<SocketQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ServerError> {
    if query.user_id.is_empty() || query.token.is_empty() {
        return Err(ServerError::Unauthorized(
            "Missing session credentials".to_string(),
        ));
    }

    let user = UserId(query.user_id);
    let hub = state.hub.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(hub, user, socket)))
}

async fn handle_socket(hub: Arc<RelayHub>, user: UserId, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    hub.open_session(&user, tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let frame = match event.to_json() {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "Failed to encode outbound event");
                    continue;
                }
            };
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let inbound_hub = hub.clone();
    let inbound_user = user.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => match ClientEvent::from_json(text.as_str()) {
                    Ok(event) => inbound_hub.handle_event(&inbound_user, event),
                    Err(e) => {
                        debug!(error = %e, "Skipping undecodable client frame");
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // whichever half ends first tears down the other
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.close_session(&user);
}
