//! Client error types

use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The session could not be refreshed; the caller must sign in again
    #[error("Session refresh failed: {0}")]
    Refresh(#[from] RefreshError),
}

impl ClientError {
    /// Create error from HTTP status code and response body
    ///
    /// The backend reports failures as `{"message": "..."}`; that message is
    /// preferred over the raw body when present.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = error_message(status, body);
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the backend rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// Whether the user has to sign in again
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, Self::Refresh(_))
    }
}

/// Outcome of a failed refresh, fanned out to every request waiting on it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// The refresh cookie was missing, expired or revoked
    #[error("refresh rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The refresh endpoint failed for another reason
    #[error("refresh endpoint returned {status}: {message}")]
    Server { status: u16, message: String },

    /// The refresh call never got a response
    #[error("refresh transport error: {0}")]
    Transport(String),

    /// The refresh succeeded but carried no usable token
    #[error("malformed refresh response: {0}")]
    MalformedResponse(String),

    /// The task driving the refresh was dropped before it finished
    #[error("refresh abandoned before completion")]
    Abandoned,
}

impl RefreshError {
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = error_message(status, body);
        match status.as_u16() {
            401 | 403 => Self::Rejected {
                status: status.as_u16(),
                message,
            },
            _ => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    if let Ok(ErrorBody {
        message: Some(message),
    }) = serde_json::from_str(body)
    {
        return message;
    }

    if body.trim().is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}
