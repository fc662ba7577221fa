use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Non-finite or non-numeric embedding value at position {position}: {value}")]
    NonFiniteValue { position: usize, value: f32 },

    #[error("Invalid embedding for {context}: {source}")]
    InvalidEmbedding {
        context: String,
        #[source]
        source: Box<VectorStoreError>,
    },

    #[error("Embedding provider failed for {context}: {message}")]
    Provider { context: String, message: String },

    #[error("Vector store is empty")]
    EmptyIndex,
}

impl VectorStoreError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn provider(context: impl Into<String>, error: &anyhow::Error) -> Self {
        Self::Provider {
            context: context.into(),
            message: format!("{error:#}"),
        }
    }

    /// Dimensionality or non-finite value problems, including wrapped ones
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimension { .. } | Self::NonFiniteValue { .. } | Self::InvalidEmbedding { .. }
        )
    }
}
