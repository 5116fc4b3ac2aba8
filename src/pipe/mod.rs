use crate::error::DomainError;
use async_trait::async_trait;

pub mod builtins;

pub type PipeResult<T> = Result<T, PipeError>;

#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    /// One message per violated rule, in field order
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),
}

impl PipeError {
    pub fn messages(&self) -> &[String] {
        match self {
            PipeError::Validation(messages) => messages,
        }
    }
}

impl From<PipeError> for DomainError {
    #[track_caller]
    fn from(err: PipeError) -> Self {
        DomainError::bad_request(err.to_string())
    }
}

/// The Pipe trait for transformation and validation
#[async_trait]
pub trait Pipe: Send + Sync + 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    async fn transform(&self, input: Self::Input) -> PipeResult<Self::Output>;
}
