//! Errors raised while reading persisted client state

/// Standard result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Unsupported snapshot version {found} (expected at most {supported})")]
    SnapshotVersion { found: u32, supported: u32 },
}

impl CoreError {
    /// Create a serialization error
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_error(err.to_string())
    }
}
