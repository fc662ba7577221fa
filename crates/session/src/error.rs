use docqa_answer::AnswerError;
use docqa_chunker::ChunkerError;
use docqa_vector_store::VectorStoreError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Chunker(#[from] ChunkerError),

    #[error(transparent)]
    VectorStore(#[from] VectorStoreError),

    #[error(transparent)]
    Answer(#[from] AnswerError),

    #[error("Document '{document}' unavailable: {message}")]
    Document { document: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Empty query")]
    EmptyQuery,
}

/// Coarse failure category, stable across crates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    Provider,
    EmptyIndex,
    Document,
}

impl SessionError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Chunker(_) | Self::Config(_) => ErrorKind::Configuration,
            Self::VectorStore(err) => match err {
                VectorStoreError::InvalidConfig(_) => ErrorKind::Configuration,
                VectorStoreError::InvalidDimension { .. }
                | VectorStoreError::NonFiniteValue { .. }
                | VectorStoreError::InvalidEmbedding { .. } => ErrorKind::Validation,
                VectorStoreError::Provider { .. } => ErrorKind::Provider,
                VectorStoreError::EmptyIndex => ErrorKind::EmptyIndex,
            },
            Self::Answer(AnswerError::Provider(_)) => ErrorKind::Provider,
            Self::Document { .. } => ErrorKind::Document,
            Self::EmptyQuery => ErrorKind::Validation,
        }
    }
}
