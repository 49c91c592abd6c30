pub mod generation;
pub mod record;
pub mod template_variables;
pub use generation::{GenerationOptions, GenerationParams, GenerationResult};
pub use record::{Article, Record};
pub use template_variables::{FormattedRecord, TemplateVariables};
