use serde::Deserialize;
use validator::Validate;

use crate::models::domain::GenerationOptions;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuizRequestDto {
    /// Free-text topic; each line becomes its own literature query.
    #[validate(length(min = 1, max = 2000))]
    pub topic: String,

    #[serde(default)]
    #[validate(nested)]
    pub options: Option<GenerateQuizOptionsDto>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GenerateQuizOptionsDto {
    #[validate(range(min = 1, max = 4096))]
    pub max_new_tokens: Option<u32>,

    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: Option<f32>,

    pub do_sample: Option<bool>,
}

impl From<GenerateQuizOptionsDto> for GenerationOptions {
    fn from(dto: GenerateQuizOptionsDto) -> Self {
        GenerationOptions {
            max_new_tokens: dto.max_new_tokens,
            temperature: dto.temperature,
            do_sample: dto.do_sample,
        }
    }
}
