//! Service configuration, read from a TOML file

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::registration::{RegistrationConfig, RegistrationError};
use crate::sessions::{SessionStore, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};
use std::time::Duration;

/// 8 MiB: leaves headroom above the 5 MiB photo limit so oversize photos
/// still reach validation instead of being cut off by the body limit.
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub registration: RegistrationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub max_body_bytes: usize,
    /// Lifetime of a form session, counted from when it was opened.
    pub session_ttl_secs: u64,
    pub max_sessions: usize,
}

impl ServerConfig {
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(Duration::from_secs(self.session_ttl_secs), self.max_sessions)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            session_ttl_secs: DEFAULT_SESSION_TTL.as_secs(),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl AppConfig {
    /// Loads the file at `path`; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistrationError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            RegistrationError::ConfigError(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text)?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, RegistrationError> {
        toml::from_str(text).map_err(|e| RegistrationError::ConfigError(e.to_string()))
    }
}
