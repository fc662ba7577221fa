use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur while configuring the chunker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkerError {
    /// Invalid configuration
    #[error("Invalid chunker configuration: {0}")]
    InvalidConfig(String),
}

impl ChunkerError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
