use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnswerError>;

#[derive(Error, Debug)]
pub enum AnswerError {
    #[error("Completion provider failed: {0}")]
    Provider(String),
}

impl AnswerError {
    pub fn provider(error: &anyhow::Error) -> Self {
        Self::Provider(format!("{error:#}"))
    }
}
