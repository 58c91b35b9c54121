//! Configuration system for the relay.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $RELAY_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/relay/config.toml
//!   3. ~/.config/relay/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chain::DURATION_PER_EPOCH;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Builder endpoints, `PUBKEY@host:port` or URL with userinfo.
    pub builders: Vec<String>,
    pub network: NetworkConfig,
    pub api: ApiConfig,
    pub datastore: DatastoreConfig,
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// One of the supported network names, e.g. "mainnet", "sepolia".
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub listen_addr: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatastoreBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatastoreConfig {
    pub backend: DatastoreBackend,
    pub sqlite_path: PathBuf,
    /// JSON array of known validators loaded into the store at startup.
    pub known_validators_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Known-validator refresh period. Defaults to one epoch.
    pub interval_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            builders: Vec::new(),
            network: NetworkConfig::default(),
            api: ApiConfig::default(),
            datastore: DatastoreConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "mainnet".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1".to_string(),
            port: 9062,
        }
    }
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            backend: DatastoreBackend::Memory,
            sqlite_path: data_dir().join("relay.sqlite"),
            known_validators_path: None,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: DURATION_PER_EPOCH.as_secs(),
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("relay")
}

pub fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".local").join("share"))
        .join("relay")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl RelayConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::file_path())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))?
        } else {
            RelayConfig::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("RELAY_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&RelayConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply RELAY_* overrides. `lookup` is the environment in production.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("RELAY_NETWORK__NAME") {
            self.network.name = v;
        }
        if let Some(v) = lookup("RELAY_API__LISTEN_ADDR") {
            self.api.listen_addr = v;
        }
        if let Some(v) = lookup("RELAY_API__PORT") {
            if let Ok(p) = v.parse() {
                self.api.port = p;
            }
        }
        if let Some(v) = lookup("RELAY_DATASTORE__BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "memory" => self.datastore.backend = DatastoreBackend::Memory,
                "sqlite" => self.datastore.backend = DatastoreBackend::Sqlite,
                _ => {}
            }
        }
        if let Some(v) = lookup("RELAY_DATASTORE__SQLITE_PATH") {
            self.datastore.sqlite_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("RELAY_DATASTORE__KNOWN_VALIDATORS_PATH") {
            self.datastore.known_validators_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("RELAY_REFRESH__INTERVAL_SECS") {
            if let Ok(secs) = v.parse() {
                self.refresh.interval_secs = secs;
            }
        }
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh.interval_secs.max(1))
    }
}
