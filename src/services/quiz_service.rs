use std::sync::Arc;

use crate::{
    clients::{LiteratureSearch, TextGenerator},
    errors::AppResult,
    models::domain::{GenerationOptions, GenerationParams},
    services::{
        pipeline_orchestrator_service::{Pipeline, PipelineInputs},
        pipeline_stages::{FetchStage, FormatStage, GenerateStage, RenderStage},
    },
};

pub const FETCH_STAGE: &str = "literature_fetcher";
pub const FORMAT_STAGE: &str = "record_formatter";
pub const RENDER_STAGE: &str = "prompt_renderer";
pub const GENERATE_STAGE: &str = "quiz_generator";

/// Builds the fixed fetch -> format -> render -> generate chain.
pub fn create_quiz_pipeline(
    search: Arc<dyn LiteratureSearch>,
    generator: Arc<dyn TextGenerator>,
    max_results: usize,
    defaults: GenerationParams,
) -> AppResult<Pipeline> {
    Pipeline::new()
        .add_stage(FETCH_STAGE, FetchStage::new(search, max_results))?
        .add_stage(FORMAT_STAGE, FormatStage)?
        .add_stage(RENDER_STAGE, RenderStage::new()?)?
        .add_stage(GENERATE_STAGE, GenerateStage::new(generator, defaults))?
        .connect(
            &format!("{}.records", FETCH_STAGE),
            &format!("{}.records", FORMAT_STAGE),
        )?
        .connect(
            &format!("{}.variables", FORMAT_STAGE),
            &format!("{}.variables", RENDER_STAGE),
        )?
        .connect(
            &format!("{}.prompt", RENDER_STAGE),
            &format!("{}.prompt", GENERATE_STAGE),
        )
}

pub struct QuizService {
    pipeline: Pipeline,
    call_options: GenerationOptions,
}

impl QuizService {
    /// `call_options` are sent with every run; per-request overrides take precedence.
    pub fn new(pipeline: Pipeline, call_options: GenerationOptions) -> Self {
        Self {
            pipeline,
            call_options,
        }
    }

    pub async fn generate_quiz(
        &self,
        topic: &str,
        overrides: Option<GenerationOptions>,
    ) -> AppResult<String> {
        let options = overrides
            .unwrap_or_default()
            .or(&self.call_options);

        let inputs = PipelineInputs::new()
            .with(FETCH_STAGE, "queries", &[topic])?
            .with(FORMAT_STAGE, "topic", &topic)?
            .with(GENERATE_STAGE, "options", &options)?;

        let outputs = self.pipeline.run(inputs).await?;
        let quiz: String = outputs.get(GENERATE_STAGE, "text")?;

        log::info!(
            "Generated quiz of {} chars for topic '{}'",
            quiz.len(),
            topic
        );
        Ok(quiz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clients::{MockLiteratureSearch, MockTextGenerator},
        errors::AppError,
        test_utils::fixtures::{covid_article, test_generation_params},
    };

    fn generator_returning(text: &'static str) -> MockTextGenerator {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_model()
            .return_const("test-model".to_string());
        generator
            .expect_generate()
            .returning(move |_, _| Ok(vec![text.to_string()]));
        generator
    }

    #[test]
    fn test_pipeline_topology() {
        let pipeline = create_quiz_pipeline(
            Arc::new(MockLiteratureSearch::new()),
            Arc::new(MockTextGenerator::new()),
            1,
            test_generation_params(),
        )
        .unwrap();

        assert_eq!(
            pipeline.topological_order().unwrap(),
            vec![FETCH_STAGE, FORMAT_STAGE, RENDER_STAGE, GENERATE_STAGE]
        );
        assert_eq!(pipeline.connections().len(), 3);
    }

    #[tokio::test]
    async fn test_generate_quiz_returns_generated_text() {
        let mut search = MockLiteratureSearch::new();
        search
            .expect_search()
            .withf(|q, max| q == "COVID-19 treatments" && *max == 1)
            .times(1)
            .returning(|_, _| Ok(vec![covid_article()]));

        let mut generator = MockTextGenerator::new();
        generator
            .expect_model()
            .return_const("test-model".to_string());
        generator
            .expect_generate()
            .withf(|prompt, params| {
                prompt.contains("COVID-19 treatments")
                    && prompt.contains("T1")
                    && prompt.contains("...abstract...")
                    && prompt.contains("covid")
                    && params.max_new_tokens == 500
            })
            .times(1)
            .returning(|_, _| Ok(vec!["**Multiple-choice (MCQ):** ...".to_string()]));

        let pipeline =
            create_quiz_pipeline(Arc::new(search), Arc::new(generator), 1, test_generation_params())
                .unwrap();
        let service = QuizService::new(
            pipeline,
            GenerationOptions::default().with_max_new_tokens(500),
        );

        let quiz = service
            .generate_quiz("COVID-19 treatments", None)
            .await
            .unwrap();
        assert_eq!(quiz, "**Multiple-choice (MCQ):** ...");
    }

    #[tokio::test]
    async fn test_request_overrides_win_over_call_options() {
        let mut search = MockLiteratureSearch::new();
        search.expect_search().returning(|_, _| Ok(Vec::new()));

        let mut generator = MockTextGenerator::new();
        generator
            .expect_model()
            .return_const("test-model".to_string());
        generator
            .expect_generate()
            .withf(|_, params| params.max_new_tokens == 64 && !params.do_sample)
            .times(1)
            .returning(|_, _| Ok(vec!["ok".to_string()]));

        let pipeline =
            create_quiz_pipeline(Arc::new(search), Arc::new(generator), 1, test_generation_params())
                .unwrap();
        let service = QuizService::new(
            pipeline,
            GenerationOptions::default().with_max_new_tokens(500),
        );

        let overrides = GenerationOptions::default()
            .with_max_new_tokens(64)
            .with_do_sample(false);
        assert_eq!(
            service.generate_quiz("Gout", Some(overrides)).await.unwrap(),
            "ok"
        );
    }

    #[tokio::test]
    async fn test_search_failure_still_generates() {
        let mut search = MockLiteratureSearch::new();
        search
            .expect_search()
            .returning(|_, _| Err(AppError::Search("unavailable".to_string())));

        let pipeline = create_quiz_pipeline(
            Arc::new(search),
            Arc::new(generator_returning("general knowledge quiz")),
            1,
            test_generation_params(),
        )
        .unwrap();
        let service = QuizService::new(pipeline, GenerationOptions::default());

        let quiz = service.generate_quiz("Asthma", None).await.unwrap();
        assert_eq!(quiz, "general knowledge quiz");
    }

    #[tokio::test]
    async fn test_generation_failure_fails_the_run() {
        let mut search = MockLiteratureSearch::new();
        search.expect_search().returning(|_, _| Ok(Vec::new()));

        let mut generator = MockTextGenerator::new();
        generator
            .expect_model()
            .return_const("test-model".to_string());
        generator
            .expect_generate()
            .returning(|_, _| Err(AppError::Generation("rate limited".to_string())));

        let pipeline =
            create_quiz_pipeline(Arc::new(search), Arc::new(generator), 1, test_generation_params())
                .unwrap();
        let service = QuizService::new(pipeline, GenerationOptions::default());

        let err = service.generate_quiz("Asthma", None).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }
}
