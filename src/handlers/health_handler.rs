use actix_web::{get, HttpResponse};

use crate::models::dto::response::HealthResponseDto;

#[get("/api/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponseDto {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
