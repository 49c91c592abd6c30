pub mod huggingface_client;
pub mod literature_search;
pub mod openai_client;
pub mod text_generation;

pub use huggingface_client::HuggingFaceClient;
pub use literature_search::{LiteratureSearch, PubmedClient};
pub use openai_client::OpenAiCompatibleClient;
pub use text_generation::TextGenerator;

#[cfg(test)]
pub use literature_search::MockLiteratureSearch;
#[cfg(test)]
pub use text_generation::MockTextGenerator;
