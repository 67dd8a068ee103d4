//! DiagramServerManager: per-client server registry and message router.
//!
//! The manager is the single entry point for inbound diagram messages.  It
//! keeps one [`DiagramServer`] per client id, creating it on the first
//! message from that client, and forwards each message to it.
//!
//! # Message flow (for beginners)
//!
//! ```text
//! send_message_to_server(msg)
//!   │
//!   ├── get_or_create(msg.client_id) ── new server wired to layout engine,
//!   │                                    popup factory, bounds corrector and
//!   │                                    the shared remote endpoint
//!   ├── requestModel? ── generator.generate_model(client_id, request)
//!   │                    server.set_model(model)
//!   └── server.accept(msg) ── outbound actions ──► remote endpoint
//! ```
//!
//! # The remote endpoint
//!
//! Every server sends its outbound messages through one process-wide
//! callback.  It can be set exactly once; servers created before it is set
//! drop their outbound messages until it is.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use thiserror::Error;
use tracing::{debug, info, warn};

use diagram_core::{Action, ActionMessage, CorrectedBoundsApplicator};

use super::collaborators::{DiagramGenerator, LayoutEngine, PopupModelFactory, RemoteEndpoint};
use super::diagram_server::{DefaultDiagramServer, DiagramServer, ServerError};

/// Errors returned by [`DiagramServerManager`].
#[derive(Debug, Error, PartialEq)]
pub enum ManagerError {
    /// [`DiagramServerManager::set_remote_endpoint`] was called a second time.
    #[error("remote endpoint can only be set once")]
    RemoteEndpointAlreadySet,

    /// A diagram server could not be created for the client.
    #[error("failed to create diagram server for client '{client_id}': {source}")]
    ServerConstruction {
        client_id: String,
        #[source]
        source: ServerError,
    },

    /// The server rejected the message.
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Registry of per-client diagram servers plus the inbound message router.
pub struct DiagramServerManager {
    servers: Mutex<HashMap<String, Arc<dyn DiagramServer>>>,
    generator: Arc<dyn DiagramGenerator>,
    layout_engine: Arc<dyn LayoutEngine>,
    popups: Option<Arc<dyn PopupModelFactory>>,
    remote_endpoint: Arc<OnceLock<RemoteEndpoint>>,
}

impl DiagramServerManager {
    /// Creates a manager with no servers and no remote endpoint.
    pub fn new(
        generator: Arc<dyn DiagramGenerator>,
        layout_engine: Arc<dyn LayoutEngine>,
        popups: Option<Arc<dyn PopupModelFactory>>,
    ) -> Self {
        Self {
            servers: Mutex::new(HashMap::new()),
            generator,
            layout_engine,
            popups,
            remote_endpoint: Arc::new(OnceLock::new()),
        }
    }

    /// Installs the callback that carries outbound messages to clients.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::RemoteEndpointAlreadySet`] if an endpoint is
    /// already installed.  The first endpoint stays in place.
    pub fn set_remote_endpoint(&self, endpoint: RemoteEndpoint) -> Result<(), ManagerError> {
        self.remote_endpoint
            .set(endpoint)
            .map_err(|_| ManagerError::RemoteEndpointAlreadySet)
    }

    /// Returns the server for `client_id`, creating and registering it on
    /// first access.
    ///
    /// Lookup and creation happen under one lock, so concurrent first
    /// messages from the same client share a single server.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::ServerConstruction`] if the server cannot be
    /// built (for example, for an empty client id).
    pub fn get_or_create(&self, client_id: &str) -> Result<Arc<dyn DiagramServer>, ManagerError> {
        let mut servers = self.lock_servers();
        if let Some(server) = servers.get(client_id) {
            return Ok(Arc::clone(server));
        }

        let server: Arc<dyn DiagramServer> = Arc::new(
            DefaultDiagramServer::builder(client_id)
                .remote_endpoint(self.forwarding_endpoint())
                .layout_engine(Some(Arc::clone(&self.layout_engine)))
                .popup_factory(self.popups.clone())
                .bounds_applicator(Box::new(CorrectedBoundsApplicator))
                .build()
                .map_err(|source| ManagerError::ServerConstruction {
                    client_id: client_id.to_string(),
                    source,
                })?,
        );
        servers.insert(client_id.to_string(), Arc::clone(&server));
        info!("created diagram server for client {client_id}");
        Ok(server)
    }

    /// Returns the server for `client_id` without creating one.
    pub fn server(&self, client_id: &str) -> Option<Arc<dyn DiagramServer>> {
        self.lock_servers().get(client_id).cloned()
    }

    /// Number of registered servers.
    pub fn client_count(&self) -> usize {
        self.lock_servers().len()
    }

    /// Removes the server for `client_id`.  Returns `true` if one existed.
    pub fn dispose_client(&self, client_id: &str) -> bool {
        let removed = self.lock_servers().remove(client_id).is_some();
        if removed {
            info!("disposed diagram server for client {client_id}");
        }
        removed
    }

    /// Routes one inbound message to its client's server.
    ///
    /// A `requestModel` action first regenerates the client's model and
    /// installs it on the server; every message is then handed to the server.
    ///
    /// # Errors
    ///
    /// Propagates server construction failures and server rejections.
    pub fn send_message_to_server(&self, message: ActionMessage) -> Result<(), ManagerError> {
        let server = self.get_or_create(&message.client_id)?;

        if let Action::RequestModel(request) = &message.action {
            debug!("client {}: generating model", message.client_id);
            let model = self.generator.generate_model(&message.client_id, request);
            server.set_model(model);
        }

        server.accept(message)?;
        Ok(())
    }

    /// Builds the send callback handed to each new server.
    fn forwarding_endpoint(&self) -> RemoteEndpoint {
        let endpoint = Arc::clone(&self.remote_endpoint);
        Arc::new(move |message: ActionMessage| match endpoint.get() {
            Some(send) => send(message),
            None => warn!(
                "client {}: no remote endpoint set; dropping {}",
                message.client_id,
                message.action.kind()
            ),
        })
    }

    fn lock_servers(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn DiagramServer>>> {
        self.servers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
