//! diagram-server library crate.
//!
//! This crate keeps one diagram server per remote client and routes the
//! client's action messages to it.  Model generation, layout and popups are
//! delegated to pluggable collaborators.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Diagram client (JSON over WebSocket)
//!         ↕
//! [diagram-server]
//!   ├── domain/           ServerConfig
//!   ├── application/      DiagramServerManager (registry + router),
//!   │                     DefaultDiagramServer, collaborator traits
//!   └── infrastructure/
//!         ├── ws_server/       WebSocket accept loop (tokio-tungstenite)
//!         ├── client_hub/      client id → connection routing for outbound messages
//!         ├── model_directory/ JSON-file model generator
//!         └── config_file/     optional TOML configuration
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `diagram-core` only; it is fully
//!   synchronous.
//! - `infrastructure` depends on all other layers plus `tokio` and `tungstenite`.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: server registry, message routing, per-client servers.
pub mod application;

/// Infrastructure layer: WebSocket transport, model files, config files.
pub mod infrastructure;
