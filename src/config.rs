use std::env;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};
use crate::models::domain::GenerationParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationBackend {
    HuggingFace,
    OpenAi,
}

impl FromStr for GenerationBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(GenerationBackend::HuggingFace),
            "openai" => Ok(GenerationBackend::OpenAi),
            other => Err(AppError::Config(format!(
                "unknown generation backend '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: String,
    pub pubmed_base_url: String,
    pub pubmed_tool: String,
    pub pubmed_email: String,
    pub ncbi_api_key: Option<SecretString>,
    pub pubmed_max_results: usize,
    pub generation_backend: GenerationBackend,
    pub hf_inference_url: String,
    pub huggingface_api_key: SecretString,
    pub openai_api_base: String,
    pub openai_api_key: SecretString,
    pub generation_model: String,
    pub generation_max_new_tokens: u32,
    pub generation_temperature: f32,
    pub generation_do_sample: bool,
    pub http_timeout_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            web_server_host: env_or("WEB_SERVER_HOST", "localhost"),
            web_server_port: env_parse("WEB_SERVER_PORT", 8080),
            cors_allowed_origin: env_or("CORS_ALLOWED_ORIGIN", "http://localhost:5173"),
            pubmed_base_url: env_or(
                "PUBMED_BASE_URL",
                "https://eutils.ncbi.nlm.nih.gov/entrez/eutils",
            ),
            pubmed_tool: env_or("PUBMED_TOOL", "medquiz-server"),
            pubmed_email: env_or("PUBMED_EMAIL", "medquiz@example.com"),
            ncbi_api_key: env::var("NCBI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
            pubmed_max_results: env_parse("PUBMED_MAX_RESULTS", 1),
            generation_backend: env::var("GENERATION_BACKEND")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(GenerationBackend::HuggingFace),
            hf_inference_url: env_or(
                "HF_INFERENCE_URL",
                "https://router.huggingface.co/hf-inference/models",
            ),
            huggingface_api_key: SecretString::from(env_or("HUGGINGFACE_API_KEY", "")),
            openai_api_base: env_or("OPENAI_API_BASE", "https://router.huggingface.co/v1"),
            openai_api_key: SecretString::from(env_or("OPENAI_API_KEY", "")),
            generation_model: env_or("GENERATION_MODEL", "mistralai/Mixtral-8x7B-Instruct-v0.1"),
            generation_max_new_tokens: env_parse("GENERATION_MAX_NEW_TOKENS", 500),
            generation_temperature: env_parse("GENERATION_TEMPERATURE", 0.6),
            generation_do_sample: env_parse("GENERATION_DO_SAMPLE", true),
            http_timeout_secs: env_parse("HTTP_TIMEOUT_SECS", 120),
        }
    }

    /// Default generation parameters handed to the generate stage.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.generation_max_new_tokens,
            temperature: self.generation_temperature,
            do_sample: self.generation_do_sample,
        }
    }

    /// Check that the credentials for the selected generation backend are present.
    pub fn validate_for_production(&self) -> AppResult<()> {
        let (name, key) = match self.generation_backend {
            GenerationBackend::HuggingFace => ("HUGGINGFACE_API_KEY", &self.huggingface_api_key),
            GenerationBackend::OpenAi => ("OPENAI_API_KEY", &self.openai_api_key),
        };

        if key.expose_secret().trim().is_empty() {
            return Err(AppError::Config(format!(
                "{} is not set for the selected generation backend",
                name
            )));
        }

        if self.pubmed_max_results == 0 {
            return Err(AppError::Config(
                "PUBMED_MAX_RESULTS must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            pubmed_base_url: "http://127.0.0.1:9".to_string(),
            pubmed_tool: "medquiz-test".to_string(),
            pubmed_email: "test@example.com".to_string(),
            ncbi_api_key: None,
            pubmed_max_results: 1,
            generation_backend: GenerationBackend::HuggingFace,
            hf_inference_url: "http://127.0.0.1:9".to_string(),
            huggingface_api_key: SecretString::from("hf_test_token".to_string()),
            openai_api_base: "http://127.0.0.1:9/v1".to_string(),
            openai_api_key: SecretString::from(String::new()),
            generation_model: "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string(),
            generation_max_new_tokens: 500,
            generation_temperature: 0.6,
            generation_do_sample: true,
            http_timeout_secs: 5,
        }
    }
}
