//! Environment configuration for the storefront client

use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::error::ClientError;

/// API base used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5001/api/v1";

/// Versioned API prefix appended to a same-origin host
pub const API_PREFIX: &str = "/api/v1";

/// Marker left in sample environment files instead of a real key
pub const PAYMENT_KEY_PLACEHOLDER: &str = "YOUR_STRIPE";

/// Where the backend API lives
///
/// A server-side process talks to the backend directly; a client served from
/// the storefront's own host goes through its `/api/v1` proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ApiTarget {
    Server { url: String },
    SameOrigin { origin: String },
}

impl Default for ApiTarget {
    fn default() -> Self {
        Self::server(DEFAULT_API_URL)
    }
}

impl ApiTarget {
    pub fn server(url: impl Into<String>) -> Self {
        Self::Server { url: url.into() }
    }

    pub fn same_origin(origin: impl Into<String>) -> Self {
        Self::SameOrigin {
            origin: origin.into(),
        }
    }

    /// Resolve the absolute API base URL, without a trailing slash
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the result is not an absolute URL
    pub fn base_url(&self) -> Result<String, ClientError> {
        let base = match self {
            Self::Server { url } => url.trim_end_matches('/').to_string(),
            Self::SameOrigin { origin } => {
                format!("{}{API_PREFIX}", origin.trim_end_matches('/'))
            }
        };

        Url::parse(&base)
            .map_err(|err| ClientError::Configuration(format!("invalid API URL {base:?}: {err}")))?;

        Ok(base)
    }
}

/// Payment provider settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Publishable key handed to the hosted card element
    #[serde(default)]
    pub publishable_key: Option<String>,
}

impl PaymentConfig {
    pub fn new(publishable_key: Option<String>) -> Self {
        Self { publishable_key }
    }

    /// Payments activate only with a real, non-empty key
    pub fn is_enabled(&self) -> bool {
        self.publishable_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty() && !key.contains(PAYMENT_KEY_PLACEHOLDER))
    }

    /// The publishable key, or a configuration error naming what is missing
    pub fn require_key(&self) -> Result<&str, ClientError> {
        match self.publishable_key.as_deref() {
            Some(key) if self.is_enabled() => Ok(key.trim()),
            _ => Err(ClientError::Configuration(
                "payments are disabled: set LUXE_STRIPE_PUBLISHABLE_KEY to your publishable key"
                    .into(),
            )),
        }
    }
}
