//! Channel connection and event loop.
//!
//! The socket is owned by a dedicated tokio task. External code talks to it
//! through typed command and notification channels, keeping every screen
//! decoupled from the transport. Inbound events are forwarded one at a
//! time, in arrival order, to a single consumer.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use mingle_shared::constants::SOCKET_PATH;
use mingle_shared::protocol::ServerEvent;
use mingle_shared::types::SessionCredentials;

use crate::config::ChannelConfig;
use crate::error::ChannelError;
use crate::handle::{ChannelCommand, ChannelHandle, ChannelNotification};
use crate::queue::PendingQueue;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The session's event channel. Created once at session start; every screen
/// shares the returned handle.
pub struct Channel;

impl Channel {
    /// Open the channel for a session.
    ///
    /// Fails with [`ChannelError::MissingCredentials`] when the credential
    /// is absent and with [`ChannelError::Connect`] when the first socket
    /// connection cannot be established. Later link drops are handled by
    /// the background task: outbound events are parked and flushed on
    /// reconnect, inbound delivery resumes transparently.
    ///
    /// # Returns
    ///
    /// `(handle, notification_rx)`
    pub async fn connect(
        credentials: SessionCredentials,
        config: ChannelConfig,
    ) -> Result<(ChannelHandle, mpsc::Receiver<ChannelNotification>), ChannelError> {
        if !credentials.is_complete() {
            return Err(ChannelError::MissingCredentials);
        }

        let url = format!(
            "{}{}?user_id={}&token={}",
            config.server_url.trim_end_matches('/'),
            SOCKET_PATH,
            credentials.user_id,
            credentials.token,
        );

        let (ws, _) = connect_async(&url).await?;
        info!(user = %credentials.user_id, "Channel connected");

        let (cmd_tx, cmd_rx) = mpsc::channel::<ChannelCommand>(config.buffer);
        let (notif_tx, notif_rx) = mpsc::channel::<ChannelNotification>(config.buffer);

        tokio::spawn(channel_loop(ws, url, config, cmd_rx, notif_tx));

        Ok((ChannelHandle::new(cmd_tx), notif_rx))
    }
}

enum LinkOutcome {
    /// The socket dropped; reconnect.
    Dropped,
    /// Shutdown was requested.
    Shutdown,
    /// Every handle was dropped; nothing can emit any more.
    HandlesGone,
}

async fn channel_loop(
    first: WsStream,
    url: String,
    config: ChannelConfig,
    mut cmd_rx: mpsc::Receiver<ChannelCommand>,
    notif_tx: mpsc::Sender<ChannelNotification>,
) {
    let mut pending = PendingQueue::new(config.emit_queue_capacity);
    let mut socket = Some(first);

    loop {
        let ws = match socket.take() {
            Some(ws) => ws,
            None => match connect_async(&url).await {
                Ok((ws, _)) => ws,
                Err(e) => {
                    warn!(error = %e, "Reconnect attempt failed");
                    if !park_until_retry(&mut cmd_rx, &mut pending, &config).await {
                        let _ = notif_tx.send(ChannelNotification::Closed).await;
                        return;
                    }
                    continue;
                }
            },
        };

        info!(queued = pending.len(), "Channel link up");
        let _ = notif_tx.send(ChannelNotification::Connected).await;
        let (mut sink, mut stream) = ws.split();

        // Flush frames parked while the link was down, oldest first.
        let mut flushed = true;
        while let Some(frame) = pending.pop() {
            if let Err(e) = sink.send(Message::Text(frame.clone())).await {
                warn!(error = %e, "Flush failed, link still down");
                pending.requeue_front(frame);
                flushed = false;
                break;
            }
        }

        if flushed {
            match run_link(&mut sink, &mut stream, &mut cmd_rx, &notif_tx, &mut pending).await {
                LinkOutcome::Dropped => {}
                LinkOutcome::Shutdown => {
                    let _ = sink.send(Message::Close(None)).await;
                    let _ = notif_tx.send(ChannelNotification::Closed).await;
                    info!("Channel shut down");
                    return;
                }
                LinkOutcome::HandlesGone => {
                    let _ = notif_tx.send(ChannelNotification::Closed).await;
                    info!("All channel handles dropped, closing");
                    return;
                }
            }
        }

        let _ = notif_tx.send(ChannelNotification::Disconnected).await;
        if !park_until_retry(&mut cmd_rx, &mut pending, &config).await {
            let _ = notif_tx.send(ChannelNotification::Closed).await;
            return;
        }
    }
}

/// Pump commands and inbound frames while the link is up.
async fn run_link(
    sink: &mut SplitSink<WsStream, Message>,
    stream: &mut SplitStream<WsStream>,
    cmd_rx: &mut mpsc::Receiver<ChannelCommand>,
    notif_tx: &mpsc::Sender<ChannelNotification>,
    pending: &mut PendingQueue,
) -> LinkOutcome {
    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(ChannelCommand::Emit(event)) => {
                    let frame = match event.to_json() {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(error = %e, "Failed to encode outbound event");
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(Message::Text(frame.clone())).await {
                        warn!(error = %e, "Send failed, parking frame");
                        pending.push(frame);
                        return LinkOutcome::Dropped;
                    }
                }
                Some(ChannelCommand::Shutdown) => return LinkOutcome::Shutdown,
                None => return LinkOutcome::HandlesGone,
            },

            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => match ServerEvent::from_json(&text) {
                    Ok(event) => {
                        let _ = notif_tx.send(ChannelNotification::Event(event)).await;
                    }
                    Err(e) => {
                        // Untrusted peer: skip what we cannot decode, keep order
                        debug!(error = %e, len = text.len(), "Skipping undecodable frame");
                    }
                },
                Some(Ok(Message::Close(_))) | None => return LinkOutcome::Dropped,
                Some(Ok(_)) => {} // ping/pong/binary: nothing to route
                Some(Err(e)) => {
                    warn!(error = %e, "Socket read error");
                    return LinkOutcome::Dropped;
                }
            },
        }
    }
}

/// Wait out the reconnect delay, parking any events emitted meanwhile.
/// Returns `false` when the channel should stop instead of retrying.
async fn park_until_retry(
    cmd_rx: &mut mpsc::Receiver<ChannelCommand>,
    pending: &mut PendingQueue,
    config: &ChannelConfig,
) -> bool {
    let deadline = tokio::time::sleep(config.reconnect_delay);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => return true,
            cmd = cmd_rx.recv() => match cmd {
                Some(ChannelCommand::Emit(event)) => match event.to_json() {
                    Ok(frame) => pending.push(frame),
                    Err(e) => warn!(error = %e, "Failed to encode outbound event"),
                },
                Some(ChannelCommand::Shutdown) | None => return false,
            },
        }
    }
}
