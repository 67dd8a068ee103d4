//! Application layer for diagram-server.
//!
//! The application layer decides *what* happens to each diagram message: which
//! server owns it, when a model is generated, and which actions go back to
//! the client.  It never touches sockets or files.
//!
//! # Responsibilities
//!
//! - Keeping one [`DiagramServer`] per client id ([`DiagramServerManager`])
//! - Running the model / bounds / layout handshake ([`DefaultDiagramServer`])
//! - Declaring the collaborator seams (generator, layout engine, popups)
//!
//! # What does NOT belong here?
//!
//! - WebSocket framing and connection tracking (that is infrastructure)
//! - Reading model files from disk (that is infrastructure)

pub mod collaborators;
pub mod column_layout;
pub mod diagram_server;
pub mod manager;

pub use collaborators::{DiagramGenerator, LayoutEngine, PopupModelFactory, RemoteEndpoint};
pub use column_layout::ColumnLayoutEngine;
pub use diagram_server::{DefaultDiagramServer, DiagramServer, DiagramServerBuilder, ServerError};
pub use manager::{DiagramServerManager, ManagerError};
