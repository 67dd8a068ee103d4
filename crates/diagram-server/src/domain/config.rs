//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for all runtime settings.
//! It is assembled in `main.rs` from, in increasing precedence: built-in
//! defaults, an optional TOML file, and CLI arguments / environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

/// All runtime configuration for the diagram server.
///
/// # Example
///
/// ```rust
/// use diagram_server::domain::ServerConfig;
///
/// let cfg = ServerConfig::default();
/// assert_eq!(cfg.ws_bind_addr.port(), 5007);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// The address and port the WebSocket server binds to.
    ///
    /// Defaults to loopback: diagram clients normally run in an editor on the
    /// same machine.
    pub ws_bind_addr: SocketAddr,

    /// Directory holding `<diagramType>.json` model files.
    pub models_dir: PathBuf,

    /// Spacing used by the column layout engine.
    pub layout: LayoutConfig,
}

/// Spacing for [`ColumnLayoutEngine`](crate::application::ColumnLayoutEngine).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Distance from the root's top-left corner to the first element.
    pub padding: f64,
    /// Vertical distance between consecutive elements.
    pub gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 20.0,
            gap: 30.0,
        }
    }
}

impl Default for ServerConfig {
    /// | Field        | Default          |
    /// |--------------|------------------|
    /// | ws_bind_addr | `127.0.0.1:5007` |
    /// | models_dir   | `./models`       |
    /// | layout       | padding 20, gap 30 |
    fn default() -> Self {
        Self {
            ws_bind_addr: SocketAddr::from(([127, 0, 0, 1], 5007)),
            models_dir: PathBuf::from("models"),
            layout: LayoutConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binds_loopback_5007() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.ws_bind_addr.to_string(), "127.0.0.1:5007");
    }

    #[test]
    fn test_default_models_dir_is_relative() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.models_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_default_layout_spacing() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.padding, 20.0);
        assert_eq!(layout.gap, 30.0);
    }
}
