use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    clients::TextGenerator,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::GenerationParams,
};

#[derive(Serialize)]
struct TextGenerationRequest<'a> {
    inputs: &'a str,
    parameters: TextGenerationParameters,
}

#[derive(Serialize)]
struct TextGenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    do_sample: bool,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextGenerationResponse {
    Many(Vec<GeneratedText>),
    One(GeneratedText),
    Error { error: String },
}

/// Hugging Face serverless text-generation client.
pub struct HuggingFaceClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    token: SecretString,
}

impl HuggingFaceClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.hf_inference_url.trim_end_matches('/').to_string(),
            model: config.generation_model.clone(),
            token: config.huggingface_api_key.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> AppResult<Vec<String>> {
        let url = format!("{}/{}", self.base_url, self.model);
        let body = TextGenerationRequest {
            inputs: prompt,
            parameters: TextGenerationParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
                do_sample: params.do_sample,
                return_full_text: false,
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Generation(format!("request to {} timed out", self.model))
                } else {
                    AppError::Generation(format!("request to {} failed: {}", self.model, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "{} returned {}: {}",
                self.model, status, body
            )));
        }

        let parsed: TextGenerationResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("invalid response body: {}", e)))?;

        match parsed {
            TextGenerationResponse::Many(items) => {
                Ok(items.into_iter().map(|g| g.generated_text).collect())
            }
            TextGenerationResponse::One(item) => Ok(vec![item.generated_text]),
            TextGenerationResponse::Error { error } => Err(AppError::Generation(error)),
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}
