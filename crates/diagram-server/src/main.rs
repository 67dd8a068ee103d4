//! Diagram server: entry point.
//!
//! This binary accepts WebSocket connections from diagram clients, keeps one
//! diagram server per client id, and answers model requests with models
//! loaded from a directory of JSON files.
//!
//! # Usage
//!
//! ```text
//! diagram-server [OPTIONS]
//!
//! Options:
//!   --ws-bind    <IP>    WebSocket bind address [default: 127.0.0.1]
//!   --ws-port    <PORT>  WebSocket listener port [default: 5007]
//!   --models-dir <DIR>   Directory of <diagramType>.json files [default: models]
//!   --config     <FILE>  Optional TOML configuration file
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable             | Description                      |
//! |----------------------|----------------------------------|
//! | `DIAGRAM_WS_BIND`    | WebSocket bind address           |
//! | `DIAGRAM_WS_PORT`    | WebSocket listener port          |
//! | `DIAGRAM_MODELS_DIR` | Model file directory             |
//! | `DIAGRAM_CONFIG`     | Path of the TOML config file     |
//!
//! # Precedence
//!
//! Built-in defaults, then the TOML file (if given), then CLI arguments or
//! environment variables.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use diagram_core::ActionMessage;
use diagram_server::application::{ColumnLayoutEngine, DiagramServerManager};
use diagram_server::domain::ServerConfig;
use diagram_server::infrastructure::{load_config, run_server, ClientHub, FileConfig, ModelDirectory};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Per-client diagram server for remote diagram clients.
///
/// Options left unset fall back to the config file, then to built-in
/// defaults.
#[derive(Debug, Parser)]
#[command(
    name = "diagram-server",
    about = "Per-client diagram server with a WebSocket transport",
    version
)]
struct Cli {
    /// IP address to bind the WebSocket server to.
    #[arg(long, env = "DIAGRAM_WS_BIND")]
    ws_bind: Option<String>,

    /// TCP port for the WebSocket server to listen on.
    #[arg(long, env = "DIAGRAM_WS_PORT")]
    ws_port: Option<u16>,

    /// Directory holding `<diagramType>.json` model files.
    #[arg(long, env = "DIAGRAM_MODELS_DIR")]
    models_dir: Option<PathBuf>,

    /// Optional TOML configuration file.
    #[arg(long, env = "DIAGRAM_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Merges the CLI arguments over the config file (or the defaults).
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the bind
    /// address is not a valid IP address.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let mut file = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?,
            None => FileConfig::default(),
        };

        if let Some(bind) = self.ws_bind {
            file.server.bind_address = bind;
        }
        if let Some(port) = self.ws_port {
            file.server.port = port;
        }
        if let Some(dir) = self.models_dir {
            file.models.directory = dir;
        }

        file.into_server_config()
            .context("invalid WebSocket bind address")
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `RUST_LOG` controls verbosity; fall back to `info`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_server_config()?;

    info!(
        "diagram server starting: ws={}, models={}",
        config.ws_bind_addr,
        config.models_dir.display()
    );

    // ── Wiring ────────────────────────────────────────────────────────────────
    let hub = Arc::new(ClientHub::new());
    let manager = Arc::new(DiagramServerManager::new(
        Arc::new(ModelDirectory::new(config.models_dir.clone())),
        Arc::new(ColumnLayoutEngine::new(config.layout)),
        None,
    ));
    let outbound = Arc::clone(&hub);
    manager.set_remote_endpoint(Arc::new(move |message: ActionMessage| {
        outbound.deliver(message)
    }))?;

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, manager, hub, running).await?;

    info!("diagram server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn bare() -> Cli {
        Cli {
            ws_bind: None,
            ws_port: None,
            models_dir: None,
            config: None,
        }
    }

    #[test]
    fn test_cli_without_arguments_leaves_everything_unset() {
        // Arrange: parse with no arguments
        let cli = Cli::try_parse_from(["diagram-server"]).unwrap();

        // Assert: unset unless the environment provides a value
        if std::env::var_os("DIAGRAM_WS_PORT").is_none() {
            assert!(cli.ws_port.is_none());
        }
        if std::env::var_os("DIAGRAM_CONFIG").is_none() {
            assert!(cli.config.is_none());
        }
    }

    #[test]
    fn test_cli_ws_port_override() {
        let cli = Cli::parse_from(["diagram-server", "--ws-port", "9999"]);
        assert_eq!(cli.ws_port, Some(9999));
    }

    #[test]
    fn test_cli_models_dir_override() {
        let cli = Cli::parse_from(["diagram-server", "--models-dir", "/tmp/models"]);
        assert_eq!(cli.models_dir, Some(PathBuf::from("/tmp/models")));
    }

    #[test]
    fn test_into_server_config_defaults() {
        // Arrange / Act
        let config = bare().into_server_config().unwrap();

        // Assert
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_into_server_config_applies_overrides() {
        let cli = Cli {
            ws_bind: Some("0.0.0.0".into()),
            ws_port: Some(8080),
            models_dir: Some(PathBuf::from("diagrams")),
            config: None,
        };

        let config = cli.into_server_config().unwrap();

        assert_eq!(config.ws_bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.models_dir, PathBuf::from("diagrams"));
    }

    #[test]
    fn test_cli_overrides_config_file() {
        // Arrange: file sets port and models dir; CLI overrides only the port
        let path = std::env::temp_dir().join(format!("diagram-cli-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nport = 7000\n[models]\ndirectory = \"from-file\"\n")
            .unwrap();
        let cli = Cli {
            ws_port: Some(7001),
            config: Some(path.clone()),
            ..bare()
        };

        // Act
        let config = cli.into_server_config();
        let _ = std::fs::remove_file(&path);
        let config = config.unwrap();

        // Assert
        assert_eq!(config.ws_bind_addr.port(), 7001);
        assert_eq!(config.models_dir, PathBuf::from("from-file"));
    }

    #[test]
    fn test_ipv6_ws_bind_is_accepted() {
        let cli = Cli {
            ws_bind: Some("::1".into()),
            ws_port: Some(5008),
            ..bare()
        };

        let config = cli.into_server_config().unwrap();

        assert_eq!(config.ws_bind_addr.to_string(), "[::1]:5008");
    }

    #[test]
    fn test_invalid_ws_bind_returns_error() {
        let cli = Cli {
            ws_bind: Some("not.an.ip".into()),
            ..bare()
        };
        assert!(cli.into_server_config().is_err());
    }

    #[test]
    fn test_missing_config_file_returns_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..bare()
        };
        assert!(cli.into_server_config().is_err());
    }
}
