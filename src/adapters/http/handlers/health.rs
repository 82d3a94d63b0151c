use actix_web::HttpResponse;

use crate::adapters::http::dtos::HealthResponse;

/// GET /api/v1/health
pub async fn health_handler() -> HttpResponse {
  HttpResponse::Ok().json(HealthResponse {
    status: "ok",
    version: env!("CARGO_PKG_VERSION"),
  })
}
