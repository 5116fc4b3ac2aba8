use crate::pipe::{Pipe, PipeResult};
use async_trait::async_trait;

/// Strips leading and trailing whitespace
#[derive(Default)]
pub struct TrimPipe;

#[async_trait]
impl Pipe for TrimPipe {
    type Input = String;
    type Output = String;

    async fn transform(&self, input: String) -> PipeResult<String> {
        Ok(input.trim().to_owned())
    }
}

/// Trims and lower-cases an email address so lookups are case-insensitive
#[derive(Default)]
pub struct NormalizeEmailPipe;

#[async_trait]
impl Pipe for NormalizeEmailPipe {
    type Input = String;
    type Output = String;

    async fn transform(&self, input: String) -> PipeResult<String> {
        Ok(input.trim().to_lowercase())
    }
}
