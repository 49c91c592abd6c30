use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    clients::TextGenerator,
    errors::{AppError, AppResult},
    models::domain::{GenerationOptions, GenerationParams, GenerationResult},
    services::stage::{Port, Stage},
};

#[derive(Debug, Deserialize)]
pub struct GenerateInput {
    pub prompt: String,
    #[serde(default)]
    pub options: Option<GenerationOptions>,
}

/// Sends the prompt to the generation backend and keeps the first completion.
///
/// Backend failures are returned as-is; there is no retry or fallback.
pub struct GenerateStage {
    generator: Arc<dyn TextGenerator>,
    defaults: GenerationParams,
}

impl GenerateStage {
    pub fn new(generator: Arc<dyn TextGenerator>, defaults: GenerationParams) -> Self {
        Self {
            generator,
            defaults,
        }
    }
}

#[async_trait]
impl Stage for GenerateStage {
    type Input = GenerateInput;
    type Output = GenerationResult;

    const INPUTS: &'static [Port] = &[Port::required("prompt"), Port::optional("options")];
    const OUTPUTS: &'static [&'static str] = &["text"];

    async fn run(&self, input: Self::Input) -> AppResult<Self::Output> {
        let params = self
            .defaults
            .merge(&input.options.unwrap_or_default());

        log::debug!(
            "Generating with {} (max_new_tokens={}, temperature={}, do_sample={})",
            self.generator.model(),
            params.max_new_tokens,
            params.temperature,
            params.do_sample
        );

        let completions = self
            .generator
            .generate(&input.prompt, &params)
            .await
            .map_err(|e| {
                log::error!("Generation with {} failed: {}", self.generator.model(), e);
                e
            })?;

        let text = completions.into_iter().next().ok_or_else(|| {
            AppError::Generation(format!(
                "{} returned no completions",
                self.generator.model()
            ))
        })?;

        Ok(GenerationResult { text })
    }
}
