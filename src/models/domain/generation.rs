use serde::{Deserialize, Serialize};

/// Per-invocation overrides for the generation backend. Unset fields keep the stage default.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_new_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_sample: Option<bool>,
}

impl GenerationOptions {
    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = Some(max_new_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_do_sample(mut self, do_sample: bool) -> Self {
        self.do_sample = Some(do_sample);
        self
    }

    /// Fills every unset field from `fallback`.
    pub fn or(self, fallback: &GenerationOptions) -> Self {
        GenerationOptions {
            max_new_tokens: self.max_new_tokens.or(fallback.max_new_tokens),
            temperature: self.temperature.or(fallback.temperature),
            do_sample: self.do_sample.or(fallback.do_sample),
        }
    }
}

/// Fully resolved parameters sent to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub do_sample: bool,
}

impl GenerationParams {
    pub fn merge(self, overrides: &GenerationOptions) -> Self {
        GenerationParams {
            max_new_tokens: overrides.max_new_tokens.unwrap_or(self.max_new_tokens),
            temperature: overrides.temperature.unwrap_or(self.temperature),
            do_sample: overrides.do_sample.unwrap_or(self.do_sample),
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            max_new_tokens: 500,
            temperature: 0.6,
            do_sample: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenerationResult {
    pub text: String,
}
