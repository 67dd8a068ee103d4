//! Domain layer for diagram-server.
//!
//! Holds plain configuration types with no dependencies on I/O, networking,
//! or runtimes.  The model and action types live in `diagram-core`.

pub mod config;

pub use config::{LayoutConfig, ServerConfig};
