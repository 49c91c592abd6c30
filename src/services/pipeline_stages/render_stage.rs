use async_trait::async_trait;
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};

use crate::{
    constants::quiz_prompt::{QUIZ_PROMPT_TEMPLATE, QUIZ_PROMPT_TEMPLATE_NAME},
    errors::AppResult,
    models::domain::TemplateVariables,
    services::stage::{Port, Stage},
};

#[derive(Debug, Deserialize)]
pub struct RenderInput {
    pub variables: TemplateVariables,
}

#[derive(Debug, Serialize)]
pub struct RenderOutput {
    pub prompt: String,
}

/// Expands the built-in quiz prompt. Missing record fields render as empty text.
pub struct RenderStage {
    registry: Handlebars<'static>,
}

impl RenderStage {
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string(QUIZ_PROMPT_TEMPLATE_NAME, QUIZ_PROMPT_TEMPLATE)?;
        Ok(Self { registry })
    }
}

#[async_trait]
impl Stage for RenderStage {
    type Input = RenderInput;
    type Output = RenderOutput;

    const INPUTS: &'static [Port] = &[Port::required("variables")];
    const OUTPUTS: &'static [&'static str] = &["prompt"];

    async fn run(&self, input: Self::Input) -> AppResult<Self::Output> {
        let prompt = self
            .registry
            .render(QUIZ_PROMPT_TEMPLATE_NAME, &input.variables)?;
        Ok(RenderOutput { prompt })
    }
}
