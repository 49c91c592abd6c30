use std::sync::Arc;

use crate::{
    clients::{
        HuggingFaceClient, LiteratureSearch, OpenAiCompatibleClient, PubmedClient, TextGenerator,
    },
    config::{Config, GenerationBackend},
    errors::AppResult,
    models::domain::GenerationOptions,
    services::quiz_service::{create_quiz_pipeline, QuizService},
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds the backend clients and the quiz pipeline once for the whole process.
    pub fn new(config: Config) -> AppResult<Self> {
        let search: Arc<dyn LiteratureSearch> = Arc::new(PubmedClient::new(&config)?);
        let generator: Arc<dyn TextGenerator> = match config.generation_backend {
            GenerationBackend::HuggingFace => Arc::new(HuggingFaceClient::new(&config)?),
            GenerationBackend::OpenAi => Arc::new(OpenAiCompatibleClient::new(&config)),
        };

        log::info!(
            "Quiz pipeline using {:?} backend with model {}",
            config.generation_backend,
            generator.model()
        );

        Self::with_clients(config, search, generator)
    }

    pub fn with_clients(
        config: Config,
        search: Arc<dyn LiteratureSearch>,
        generator: Arc<dyn TextGenerator>,
    ) -> AppResult<Self> {
        let pipeline = create_quiz_pipeline(
            search,
            generator,
            config.pubmed_max_results,
            config.generation_params(),
        )?;
        let call_options =
            GenerationOptions::default().with_max_new_tokens(config.generation_max_new_tokens);

        Ok(Self {
            quiz_service: Arc::new(QuizService::new(pipeline, call_options)),
            config: Arc::new(config),
        })
    }
}
