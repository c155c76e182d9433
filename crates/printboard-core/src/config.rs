//! Printboard configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use crate::error::ConfigError;
use crate::protocol::{DEBUG_MAX_AGE_MS, LIST_MAX_AGE_MS};
use crate::types::BindMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Namespace mixed into every identifier. Two deployments only share
/// identifiers when they share this value.
pub const DEFAULT_NAMESPACE: &str = "1b671a64-40d5-491e-99b0-da01ff1f3341";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintboardConfig {
    /// UUID namespace for identifier derivation.
    pub namespace: String,
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub bind: BindMode,
    /// Directory for the durable backend. Without one the registry starts
    /// in memory.
    pub data_dir: Option<PathBuf>,
    /// Freshness window for listing and sweeping.
    pub max_age_ms: i64,
    /// Retention window for the debug view.
    pub debug_max_age_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    /// Re-registration period. Must leave room for one missed refresh
    /// inside `server.max_age_ms`.
    pub refresh_interval_ms: u64,
    pub list_interval_ms: u64,
    pub initial_list_delay_ms: u64,
    pub debug_interval_ms: u64,
    pub request_timeout_ms: u64,
}

// ============================================================
// Defaults
// ============================================================

impl Default for PrintboardConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.into(),
            server: ServerConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            bind: BindMode::default(),
            data_dir: None,
            max_age_ms: LIST_MAX_AGE_MS,
            debug_max_age_ms: DEBUG_MAX_AGE_MS,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".into(),
            refresh_interval_ms: 45_000,
            list_interval_ms: 30_000,
            initial_list_delay_ms: 1_000,
            debug_interval_ms: 30_000,
            request_timeout_ms: 10_000,
        }
    }
}

// ============================================================
// Loading
// ============================================================

impl PrintboardConfig {
    /// Load config from a TOML file, falling back to defaults when the file
    /// does not exist. A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let config: Self = toml::from_str(&content)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn namespace_uuid(&self) -> Result<uuid::Uuid, ConfigError> {
        uuid::Uuid::parse_str(&self.namespace)
            .map_err(|e| ConfigError::Invalid(format!("namespace {:?}: {}", self.namespace, e)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.namespace_uuid()?;
        if self.server.max_age_ms <= 0 {
            return Err(ConfigError::Invalid("server.max_age_ms must be positive".into()));
        }
        if self.server.debug_max_age_ms < self.server.max_age_ms {
            return Err(ConfigError::Invalid(
                "server.debug_max_age_ms must not be shorter than server.max_age_ms".into(),
            ));
        }
        let c = &self.client;
        if c.refresh_interval_ms == 0 || c.list_interval_ms == 0 {
            return Err(ConfigError::Invalid("client intervals must be non-zero".into()));
        }
        // One refresh may be lost without the entry aging out.
        if (c.refresh_interval_ms as i64).saturating_mul(2) >= self.server.max_age_ms {
            return Err(ConfigError::Invalid(format!(
                "client.refresh_interval_ms ({}) must be less than half of server.max_age_ms ({})",
                c.refresh_interval_ms, self.server.max_age_ms
            )));
        }
        if c.request_timeout_ms >= c.refresh_interval_ms.min(c.list_interval_ms) {
            return Err(ConfigError::Invalid(
                "client.request_timeout_ms must be shorter than every polling interval".into(),
            ));
        }
        Ok(())
    }
}

impl ClientConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn list_interval(&self) -> Duration {
        Duration::from_millis(self.list_interval_ms)
    }

    pub fn initial_list_delay(&self) -> Duration {
        Duration::from_millis(self.initial_list_delay_ms)
    }

    pub fn debug_interval(&self) -> Duration {
        Duration::from_millis(self.debug_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
