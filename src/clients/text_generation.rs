use async_trait::async_trait;

use crate::{errors::AppResult, models::domain::GenerationParams};

/// Prompt-in, completions-out generation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns every candidate completion the backend produced, in backend order.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> AppResult<Vec<String>>;

    fn model(&self) -> &str;
}
