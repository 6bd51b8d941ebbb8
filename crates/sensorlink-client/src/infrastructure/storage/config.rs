//! TOML-based configuration for the client application.
//!
//! The file is optional.  Every field has a default, so a missing file, an
//! empty file, or a file written by an older version all load cleanly:
//!
//! ```toml
//! [server]
//! host = "192.168.1.4"
//! port = 6666
//!
//! [timeouts]
//! connect_ms = 5000
//! write_ms = 5000
//! # read_ms = 2000   # bound on finishing a started frame; unset = no bound
//!
//! [limits]
//! max_frame_len = 65536
//!
//! [logging]
//! log_level = "info"
//! ```
//!
//! Fields annotated with `#[serde(default = "some_fn")]` take the value of
//! `some_fn()` when absent.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sensorlink_core::MAX_FRAME_LEN;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::network::{ConnectionConfig, DEFAULT_PORT};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The values parsed but cannot be used.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the sensor server listens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Network timeouts in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,
    #[serde(default = "default_write_ms")]
    pub write_ms: u64,
    /// Bound on completing a frame once it has started arriving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LimitsConfig {
    /// Largest accepted inbound frame body in bytes.
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_connect_ms() -> u64 {
    5_000
}
fn default_write_ms() -> u64 {
    5_000
}
fn default_max_frame_len() -> usize {
    MAX_FRAME_LEN
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            write_ms: default_write_ms(),
            read_ms: None,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_frame_len: default_max_frame_len(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Builds the network configuration, rejecting values the client cannot
    /// run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty host, port 0, a zero
    /// timeout or a zero frame limit.
    pub fn to_connection_config(&self) -> Result<ConnectionConfig, ConfigError> {
        let host = self.server.host.trim();
        if host.is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".into()));
        }
        let t = &self.timeouts;
        if t.connect_ms == 0 || t.write_ms == 0 || t.read_ms == Some(0) {
            return Err(ConfigError::Invalid("timeouts must be greater than 0 ms".into()));
        }
        if self.limits.max_frame_len == 0 {
            return Err(ConfigError::Invalid("limits.max_frame_len must not be 0".into()));
        }

        Ok(ConnectionConfig {
            host: host.to_string(),
            port: self.server.port,
            connect_timeout: Duration::from_millis(self.timeouts.connect_ms),
            write_timeout: Duration::from_millis(self.timeouts.write_ms),
            read_timeout: self.timeouts.read_ms.map(Duration::from_millis),
            max_frame_len: self.limits.max_frame_len,
        })
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Loads `ClientConfig` from `path`, returning `ClientConfig::default()` if
/// the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &ClientConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_config_matches_connection_defaults() {
        // Arrange
        let cfg = ClientConfig::default();

        // Act
        let conn = cfg.to_connection_config().expect("defaults are valid");

        // Assert
        assert_eq!(conn, ConnectionConfig::default());
    }

    #[test]
    fn test_default_log_level_is_info() {
        assert_eq!(LoggingConfig::default().log_level, "info");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: ClientConfig = toml::from_str("").expect("empty document parses");
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_partial_section_fills_missing_fields() {
        // Arrange
        let text = "[server]\nhost = \"192.168.1.4\"\n\n[timeouts]\nread_ms = 250\n";

        // Act
        let cfg: ClientConfig = toml::from_str(text).unwrap();

        // Assert
        assert_eq!(cfg.server.host, "192.168.1.4");
        assert_eq!(cfg.server.port, 6666);
        assert_eq!(cfg.timeouts.connect_ms, 5_000);
        assert_eq!(cfg.timeouts.read_ms, Some(250));
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn test_read_ms_becomes_read_timeout() {
        let mut cfg = ClientConfig::default();
        cfg.timeouts.read_ms = Some(2_000);

        let conn = cfg.to_connection_config().unwrap();

        assert_eq!(conn.read_timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_blank_host_is_invalid() {
        let mut cfg = ClientConfig::default();
        cfg.server.host = "  ".to_string();

        assert!(matches!(cfg.to_connection_config(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_port_is_invalid() {
        let mut cfg = ClientConfig::default();
        cfg.server.port = 0;

        assert!(matches!(cfg.to_connection_config(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_timeouts_and_limits_are_invalid() {
        let mut zero_read = ClientConfig::default();
        zero_read.timeouts.read_ms = Some(0);
        let mut zero_limit = ClientConfig::default();
        zero_limit.limits.max_frame_len = 0;

        assert!(zero_read.to_connection_config().is_err());
        assert!(zero_limit.to_connection_config().is_err());
    }

    // ── File I/O ──────────────────────────────────────────────────────────────

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = TempDir::new().unwrap();

        let cfg = load_config(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_save_then_load_preserves_values() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("client.toml");
        let mut cfg = ClientConfig::default();
        cfg.server.host = "10.0.0.7".to_string();
        cfg.server.port = 7000;
        cfg.timeouts.read_ms = Some(1_500);

        // Act
        save_config(&path, &cfg).expect("save");
        let loaded = load_config(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_directory_path_is_io_error() {
        let dir = TempDir::new().unwrap();

        assert!(matches!(load_config(dir.path()), Err(ConfigError::Io { .. })));
    }
}
