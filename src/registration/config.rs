//! Configuration for member registration

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    Hosted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    pub backend: BackendKind,
    /// Artificial delay applied by the memory backend to every call.
    pub simulated_latency_ms: u64,
    pub hosted: HostedConfig,
}

impl RegistrationConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn hosted(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            backend: BackendKind::Hosted,
            hosted: HostedConfig {
                base_url: base_url.into(),
                api_key: api_key.into(),
                ..HostedConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            simulated_latency_ms: 1500,
            hosted: HostedConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub photo_bucket: String,
}

impl HostedConfig {
    pub fn with_photo_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.photo_bucket = bucket.into();
        self
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base(), self.table)
    }

    pub fn object_url(&self, name: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base(), self.photo_bucket, name)
    }

    pub fn public_photo_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base(),
            self.photo_bucket,
            name
        )
    }
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            table: "registrations".to_string(),
            photo_bucket: "registration-photos".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_storage_and_table_urls() {
        let config = RegistrationConfig::hosted("https://db.example.com/", "anon").hosted;

        assert_eq!(config.table_url(), "https://db.example.com/rest/v1/registrations");
        assert_eq!(
            config.object_url("1-a.png"),
            "https://db.example.com/storage/v1/object/registration-photos/1-a.png"
        );
        assert_eq!(
            config.with_photo_bucket("avatars").public_photo_url("1-a.png"),
            "https://db.example.com/storage/v1/object/public/avatars/1-a.png"
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: RegistrationConfig = toml::from_str(
            r#"
            backend = "hosted"

            [hosted]
            base_url = "https://db.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, BackendKind::Hosted);
        assert_eq!(config.simulated_latency(), Duration::from_millis(1500));
        assert_eq!(config.hosted.table, "registrations");
    }
}
