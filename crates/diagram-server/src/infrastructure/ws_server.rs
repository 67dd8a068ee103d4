//! WebSocket server: accept loop and per-connection sessions.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Upgrading each accepted connection to a WebSocket session.
//! 3. Parsing inbound text frames as [`ActionMessage`]s and routing them
//!    through the [`DiagramServerManager`].
//! 4. Writing outbound messages queued by the [`ClientHub`] back to the
//!    connection.
//! 5. Releasing the connection's clients (and disposing their servers) when
//!    it closes.
//! 6. Stopping the accept loop when the `running` flag is cleared.
//!
//! # Session layout (for beginners)
//!
//! ```text
//!            ┌──────────── session task ─────────────┐
//! WebSocket ─┤ reader loop: frame → ActionMessage    │
//!   (read)   │   hub.register(client_id, conn, tx)   │
//!            │   manager.send_message_to_server(msg) │
//!            └───────────────────────────────────────┘
//!
//!            ┌──────────── writer task ──────────────┐
//! WebSocket ◄┤ rx.recv() → WsMessage::Text           │◄── ClientHub::deliver
//!   (write)  └───────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use diagram_core::ActionMessage;

use crate::application::DiagramServerManager;
use crate::domain::config::ServerConfig;
use crate::infrastructure::client_hub::ClientHub;

/// How long `accept()` may block before the loop re-checks `running`.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds `config.ws_bind_addr` and serves diagram clients until `running`
/// is set to `false`.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound (for example, the port
/// is already in use).
pub async fn run_server(
    config: ServerConfig,
    manager: Arc<DiagramServerManager>,
    hub: Arc<ClientHub>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.ws_bind_addr)
        .await
        .with_context(|| {
            format!(
                "failed to bind WebSocket listener on {}",
                config.ws_bind_addr
            )
        })?;

    info!("diagram server listening on {}", config.ws_bind_addr);
    serve(listener, manager, hub, running).await;
    Ok(())
}

/// Runs the accept loop on an already bound listener.
///
/// Split out of [`run_server`] so tests can bind port 0 and learn the
/// actual address before serving.
pub async fn serve(
    listener: TcpListener,
    manager: Arc<DiagramServerManager>,
    hub: Arc<ClientHub>,
    running: Arc<AtomicBool>,
) {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        match timeout(ACCEPT_POLL_INTERVAL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                info!("new diagram connection from {peer_addr}");
                let manager = Arc::clone(&manager);
                let hub = Arc::clone(&hub);
                tokio::spawn(async move {
                    handle_connection(stream, peer_addr, manager, hub).await;
                });
            }
            Ok(Err(e)) => {
                error!("accept error: {e}");
            }
            Err(_) => {
                // No connection in the last poll interval.
            }
        }
    }
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Runs one session and cleans up after it, whatever the outcome.
async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    manager: Arc<DiagramServerManager>,
    hub: Arc<ClientHub>,
) {
    let connection_id = Uuid::new_v4();

    match run_session(stream, peer_addr, connection_id, &manager, &hub).await {
        Ok(()) => info!("session {peer_addr} closed normally"),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }

    for client_id in hub.release(connection_id) {
        manager.dispose_client(&client_id);
    }
}

/// Completes the handshake, then pumps frames until the client goes away.
async fn run_session(
    stream: TcpStream,
    peer_addr: SocketAddr,
    connection_id: Uuid,
    manager: &DiagramServerManager,
    hub: &ClientHub,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    info!("session {peer_addr} established as connection {connection_id}");

    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    let (out_tx, mut out_rx) = unbounded_channel::<String>();

    // ── Writer task ───────────────────────────────────────────────────────────
    let writer_peer = peer_addr;
    let writer = tokio::spawn(async move {
        while let Some(json) = out_rx.recv().await {
            if ws_tx.send(WsMessage::Text(json)).await.is_err() {
                debug!("session {writer_peer}: WebSocket send failed (client disconnected)");
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    // ── Reader loop ───────────────────────────────────────────────────────────
    loop {
        let frame = match ws_rx.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!("session {peer_addr}: WebSocket closed");
                break;
            }
            Some(Err(e)) => {
                warn!("session {peer_addr}: WebSocket error: {e}");
                break;
            }
            None => {
                debug!("session {peer_addr}: stream ended");
                break;
            }
        };

        match frame {
            WsMessage::Text(text) => {
                handle_text_frame(&text, connection_id, &out_tx, manager, hub);
            }
            WsMessage::Binary(_) => {
                warn!("session {peer_addr}: unexpected binary frame (ignored)");
            }
            WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {}
            WsMessage::Close(_) => {
                debug!("session {peer_addr}: Close frame received");
                break;
            }
        }
    }

    writer.abort();
    Ok(())
}

/// Parses one text frame and routes it.
///
/// Invalid frames and routing failures are logged; they never end the
/// session.
fn handle_text_frame(
    text: &str,
    connection_id: Uuid,
    sender: &UnboundedSender<String>,
    manager: &DiagramServerManager,
    hub: &ClientHub,
) {
    let message: ActionMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            warn!("connection {connection_id}: invalid action message: {e}");
            return;
        }
    };

    let client_id = message.client_id.clone();
    debug!("client {client_id}: ← {}", message.action.kind());

    if !client_id.is_empty() {
        hub.register(&client_id, connection_id, sender.clone());
    }
    if let Err(e) = manager.send_message_to_server(message) {
        warn!("client {client_id}: {e}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
