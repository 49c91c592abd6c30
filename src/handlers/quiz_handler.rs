use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use validator::Validate;

use crate::{
    app_state::AppState,
    constants::quiz_prompt::EXAMPLE_TOPICS,
    errors::AppError,
    middleware::get_request_id,
    models::{
        domain::GenerationOptions,
        dto::{
            request::GenerateQuizRequestDto,
            response::{ExampleTopicsResponseDto, GenerateQuizResponseDto},
        },
    },
};

#[post("/api/quizzes/generate")]
async fn generate_quiz(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<GenerateQuizRequestDto>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let request_id = get_request_id(&req);
    log::info!(
        "Quiz requested (request {}) for {} topic line(s)",
        request_id.as_deref().unwrap_or("-"),
        request.topic.lines().count()
    );

    let overrides = request.options.map(GenerationOptions::from);
    let quiz = state
        .quiz_service
        .generate_quiz(&request.topic, overrides)
        .await?;

    Ok(HttpResponse::Ok().json(GenerateQuizResponseDto {
        topic: request.topic,
        quiz,
        generated_at: Utc::now(),
        request_id,
    }))
}

#[get("/api/quizzes/examples")]
async fn example_topics() -> HttpResponse {
    HttpResponse::Ok().json(ExampleTopicsResponseDto {
        examples: EXAMPLE_TOPICS.iter().map(|t| t.to_string()).collect(),
    })
}
