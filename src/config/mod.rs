//! Controller configuration: persisted store and precedence resolution
//!
//! Each field resolves through four tiers, independently:
//! CLI flag > persisted store > environment > built-in default.
//! Resolution is an explicit function invoked per command with every tier
//! threaded in as a parameter; nothing is captured at startup in
//! process-wide state.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Built-in default daemon address
pub const DEFAULT_HOST: &str = "127.0.0.1:9090";

/// Environment fallback for the daemon address
pub const HOST_ENV: &str = "CLASH_API_HOST";

/// Environment fallback for the API secret
pub const SECRET_ENV: &str = "CLASH_API_SECRET";

/// Environment override for the store path
pub const CONFIG_PATH_ENV: &str = "CLASH_CLI_CONFIG";

/// Persisted `{host, secret}` store
///
/// Read fully into memory when needed and rewritten wholesale on update.
/// The read-modify-write is not safe against concurrent external writers
/// of the same file; single-writer use is assumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl StoredConfig {
    /// Load the store. A missing file is an empty store; an unreadable or
    /// corrupt file degrades to an empty store with a warning.
    pub fn load(path: &Path) -> StoredConfig {
        if !path.exists() {
            return StoredConfig::default();
        }
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("failed to read config store at {}: {}", path.display(), e);
                return StoredConfig::default();
            }
        };
        match serde_json::from_str(&data) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("corrupt config store at {}, ignoring: {}", path.display(), e);
                StoredConfig::default()
            }
        }
    }

    /// Write the whole store, creating parent directories as needed.
    /// Unlike reads, an explicit write failure surfaces directly.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::config_io(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::config_io(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| Error::config_io(format!("cannot write {}: {}", path.display(), e)))
    }
}

/// Effective per-invocation configuration, never persisted implicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub host: String,
    pub secret: Option<String>,
}

/// Merge the four precedence tiers. Host falls back to the built-in
/// default; secret stays absent when no tier provides one.
pub fn resolve(
    flag_host: Option<String>,
    flag_secret: Option<String>,
    stored: &StoredConfig,
    env_host: Option<String>,
    env_secret: Option<String>,
) -> EffectiveConfig {
    let host = flag_host
        .or_else(|| stored.host.clone())
        .or(env_host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let secret = flag_secret.or_else(|| stored.secret.clone()).or(env_secret);
    EffectiveConfig { host, secret }
}

/// Read the environment tier. Empty variables count as unset.
pub fn env_tier() -> (Option<String>, Option<String>) {
    (env_var(HOST_ENV), env_var(SECRET_ENV))
}

/// Store path: `--config` flag > `CLASH_CLI_CONFIG` > user config dir.
pub fn store_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Some(path) = env_var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("mihomo-ctl").join("config.json"))
        .unwrap_or_else(|| PathBuf::from("mihomo-ctl.json"))
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
