//! CLI configuration: optional `luxe.toml` overridden by `LUXE_*` variables

use anyhow::Result;
use luxe_http::config::DEFAULT_API_URL;
use luxe_http::{ApiTarget, PaymentConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings read at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Backend base URL, including the versioned prefix (`LUXE_API_URL`)
    pub api_url: String,
    /// When set, the API is served from this origin under `/api/v1`
    pub api_origin: Option<String>,
    /// Publishable key for the hosted card element (`LUXE_STRIPE_PUBLISHABLE_KEY`)
    pub stripe_publishable_key: Option<String>,
    /// Request timeout in seconds, 0 for none (`LUXE_TIMEOUT_SECS`)
    pub timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_origin: None,
            stripe_publishable_key: None,
            timeout_secs: 30,
        }
    }
}

impl CliConfig {
    /// Load configuration from `path` (if it exists) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file or a variable cannot be parsed
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    fn load_with_env(
        path: &Path,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let defaults = Self::default();

        let settings = config::Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("LUXE")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn api_target(&self) -> ApiTarget {
        match &self.api_origin {
            Some(origin) => ApiTarget::same_origin(origin.clone()),
            None => ApiTarget::server(self.api_url.clone()),
        }
    }

    pub fn payment(&self) -> PaymentConfig {
        PaymentConfig::new(self.stripe_publishable_key.clone())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
