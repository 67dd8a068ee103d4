//! Infrastructure layer for diagram-server.
//!
//! The infrastructure layer handles all I/O: WebSocket connections, model
//! files, and the configuration file.
//!
//! # Responsibilities
//!
//! - Binding the WebSocket listener and running one task per connection
//! - Remembering which connection owns which client id ([`ClientHub`])
//! - Loading model trees from `<models_dir>/<diagramType>.json`
//! - Parsing the optional TOML configuration file
//!
//! # What does NOT belong here?
//!
//! - Deciding what to answer to an action (that is the application layer)
//! - Action and model types (those live in `diagram-core`)

pub mod client_hub;
pub mod config_file;
pub mod model_directory;
pub mod ws_server;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use client_hub::ClientHub;
pub use config_file::{load_config, ConfigError, FileConfig};
pub use model_directory::ModelDirectory;
pub use ws_server::{run_server, serve};
