use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::{
    clients::TextGenerator,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::GenerationParams,
};

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Generation through any OpenAI-compatible chat completions endpoint.
pub struct OpenAiCompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(config.openai_api_base.trim_end_matches('/'))
            .with_api_key(config.openai_api_key.expose_secret());

        Self {
            client: Client::with_config(openai_config),
            model: config.generation_model.clone(),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> AppResult<Vec<String>> {
        // Greedy decoding is expressed as zero temperature on chat endpoints.
        let temperature = if params.do_sample {
            params.temperature
        } else {
            0.0
        };

        let request = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": params.max_new_tokens,
            "temperature": temperature,
        });

        let response: ChatCompletionResponse = self
            .client
            .chat()
            .create_byot(request)
            .await
            .map_err(|e| AppError::Generation(format!("{}: {}", self.model, e)))?;

        Ok(response
            .choices
            .into_iter()
            .map(|choice| choice.message.content.unwrap_or_default())
            .collect())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
