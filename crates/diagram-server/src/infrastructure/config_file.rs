//! Optional TOML configuration file.
//!
//! The file is only read when `--config <path>` (or `DIAGRAM_CONFIG`) is
//! given.  Every field has a default, so a file only needs the settings it
//! wants to change:
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! port = 5007
//!
//! [models]
//! directory = "/srv/diagrams"
//!
//! [layout]
//! padding = 20.0
//! gap = 30.0
//! ```
//!
//! CLI arguments are applied on top of the loaded file in `main.rs`.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::config::{LayoutConfig, ServerConfig};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// `bind_address` is not an IPv4 or IPv6 address.
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),
}

// ── File schema ───────────────────────────────────────────────────────────────

/// Top-level layout of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub models: ModelsSection,
    #[serde(default)]
    pub layout: LayoutSection,
}

/// `[server]`: where the WebSocket listener binds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// `[models]`: where model files live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelsSection {
    #[serde(default = "default_models_dir")]
    pub directory: PathBuf,
}

/// `[layout]`: column layout spacing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutSection {
    #[serde(default = "default_padding")]
    pub padding: f64,
    #[serde(default = "default_gap")]
    pub gap: f64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> String {
    ServerConfig::default().ws_bind_addr.ip().to_string()
}
fn default_port() -> u16 {
    ServerConfig::default().ws_bind_addr.port()
}
fn default_models_dir() -> PathBuf {
    ServerConfig::default().models_dir
}
fn default_padding() -> f64 {
    LayoutConfig::default().padding
}
fn default_gap() -> f64 {
    LayoutConfig::default().gap
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for ModelsSection {
    fn default() -> Self {
        Self {
            directory: default_models_dir(),
        }
    }
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            gap: default_gap(),
        }
    }
}

// ── Loading and conversion ────────────────────────────────────────────────────

/// Reads and parses the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read (including when it
/// does not exist) and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

impl FileConfig {
    /// Converts the file settings into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBindAddress`] if `bind_address` is not
    /// an IP address.
    pub fn into_server_config(self) -> Result<ServerConfig, ConfigError> {
        let ip: IpAddr = self
            .server
            .bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.server.bind_address.clone()))?;
        let ws_bind_addr = SocketAddr::new(ip, self.server.port);

        Ok(ServerConfig {
            ws_bind_addr,
            models_dir: self.models.directory,
            layout: LayoutConfig {
                padding: self.layout.padding,
                gap: self.layout.gap,
            },
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
