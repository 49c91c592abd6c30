pub mod health_handler;
pub mod quiz_handler;

use actix_web::web;

use crate::errors::AppError;

pub use health_handler::health_check;
pub use quiz_handler::{example_topics, generate_quiz};

/// Registers every route and maps malformed JSON bodies to validation errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(err.to_string()).into()
    }))
    .service(health_check)
    .service(generate_quiz)
    .service(example_topics);
}
