//! ClientHub: routes outbound action messages to the right WebSocket.
//!
//! Diagram servers only know client ids.  One WebSocket connection can carry
//! several clients (one per open diagram), so the hub keeps a map from
//! client id to the connection that last sent a message for it.
//!
//! # How outbound delivery works (for beginners)
//!
//! ```text
//! DiagramServer ── remote endpoint ──► ClientHub::deliver(msg)
//!                                         │ serialize to JSON
//!                                         │ look up msg.client_id
//!                                         ▼
//!                         mpsc::UnboundedSender<String> of that connection
//!                                         │
//!                                         ▼
//!                         per-connection writer task → WebSocket text frame
//! ```
//!
//! `deliver` is synchronous and never blocks: it only pushes into an
//! unbounded channel, which makes it safe to call from inside the
//! synchronous diagram server code.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};
use uuid::Uuid;

use diagram_core::ActionMessage;

/// One registered client: the connection it belongs to and that
/// connection's outbound queue.
struct Route {
    connection_id: Uuid,
    sender: UnboundedSender<String>,
}

/// Maps client ids to the WebSocket connections that own them.
#[derive(Default)]
pub struct ClientHub {
    routes: Mutex<HashMap<String, Route>>,
}

impl ClientHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `client_id` to a connection.
    ///
    /// A client that reconnects on a new connection is moved to it.
    pub fn register(&self, client_id: &str, connection_id: Uuid, sender: UnboundedSender<String>) {
        let mut routes = self.lock_routes();
        if let Some(existing) = routes.get(client_id) {
            if existing.connection_id == connection_id {
                return;
            }
            debug!(
                "client {client_id} moved from connection {} to {connection_id}",
                existing.connection_id
            );
        }
        routes.insert(
            client_id.to_string(),
            Route {
                connection_id,
                sender,
            },
        );
    }

    /// Serializes `message` and queues it on the owning connection.
    ///
    /// Messages for unknown clients, or for connections that are already
    /// gone, are logged and dropped.
    pub fn deliver(&self, message: ActionMessage) {
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                warn!(
                    "client {}: failed to serialize {}: {e}",
                    message.client_id,
                    message.action.kind()
                );
                return;
            }
        };

        let routes = self.lock_routes();
        match routes.get(&message.client_id) {
            Some(route) => {
                if route.sender.send(json).is_err() {
                    debug!(
                        "client {}: connection {} closed; dropping {}",
                        message.client_id,
                        route.connection_id,
                        message.action.kind()
                    );
                }
            }
            None => warn!(
                "no connection for client {}; dropping {}",
                message.client_id,
                message.action.kind()
            ),
        }
    }

    /// Removes every client bound to `connection_id` and returns their ids.
    pub fn release(&self, connection_id: Uuid) -> Vec<String> {
        let mut routes = self.lock_routes();
        let released: Vec<String> = routes
            .iter()
            .filter(|(_, route)| route.connection_id == connection_id)
            .map(|(client_id, _)| client_id.clone())
            .collect();
        for client_id in &released {
            routes.remove(client_id);
        }
        released
    }

    /// Number of clients currently bound to a connection.
    pub fn client_count(&self) -> usize {
        self.lock_routes().len()
    }

    fn lock_routes(&self) -> MutexGuard<'_, HashMap<String, Route>> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use diagram_core::protocol::actions::SelectAllAction;
    use diagram_core::Action;
    use tokio::sync::mpsc::unbounded_channel;

    fn select_all(client_id: &str) -> ActionMessage {
        ActionMessage::new(client_id, Action::AllSelected(SelectAllAction { select: true }))
    }

    #[tokio::test]
    async fn test_deliver_reaches_registered_connection() {
        // Arrange
        let hub = ClientHub::new();
        let (tx, mut rx) = unbounded_channel();
        hub.register("c1", Uuid::new_v4(), tx);

        // Act
        hub.deliver(select_all("c1"));

        // Assert
        let frame = rx.recv().await.expect("frame queued");
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["clientId"], "c1");
        assert_eq!(value["action"]["kind"], "allSelected");
    }

    #[tokio::test]
    async fn test_deliver_to_unknown_client_is_dropped() {
        let hub = ClientHub::new();
        let (tx, mut rx) = unbounded_channel();
        hub.register("c1", Uuid::new_v4(), tx);

        hub.deliver(select_all("other"));

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_release_removes_only_that_connections_clients() {
        // Arrange: two clients on one connection, one on another
        let hub = ClientHub::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let (tx1, _rx1) = unbounded_channel();
        let (tx2, _rx2) = unbounded_channel();
        hub.register("a", first, tx1.clone());
        hub.register("b", first, tx1);
        hub.register("c", second, tx2);

        // Act
        let mut released = hub.release(first);
        released.sort();

        // Assert
        assert_eq!(released, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(hub.client_count(), 1);
    }

    #[tokio::test]
    async fn test_reconnecting_client_moves_to_new_connection() {
        let hub = ClientHub::new();
        let old = Uuid::new_v4();
        let new = Uuid::new_v4();
        let (old_tx, mut old_rx) = unbounded_channel();
        let (new_tx, mut new_rx) = unbounded_channel();
        hub.register("c1", old, old_tx);
        hub.register("c1", new, new_tx);

        hub.deliver(select_all("c1"));

        assert!(old_rx.try_recv().is_err());
        assert!(new_rx.recv().await.is_some());
        // Releasing the old connection must not unbind the moved client.
        assert!(hub.release(old).is_empty());
    }

    #[tokio::test]
    async fn test_deliver_after_receiver_dropped_does_not_panic() {
        let hub = ClientHub::new();
        let (tx, rx) = unbounded_channel();
        hub.register("c1", Uuid::new_v4(), tx);
        drop(rx);

        hub.deliver(select_all("c1"));
    }
}
