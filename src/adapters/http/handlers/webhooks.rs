use actix_web::{HttpRequest, HttpResponse, http::header::CONTENT_TYPE, web};
use std::sync::Arc;

use crate::{
  adapters::http::{dtos::WebhookQuery, errors::ApiError},
  application::webhook::{ReceiveWebhookCommand, ReceiveWebhookUseCase},
};

/// Store an inbound integration event. Public and rate limited; takes JSON
/// or form bodies.
/// POST /api/v1/webhooks?integration_id=...
pub async fn receive_webhook_handler(
  query: web::Query<WebhookQuery>,
  body: web::Bytes,
  use_case: web::Data<Arc<ReceiveWebhookUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let content_type = http_req
    .headers()
    .get(CONTENT_TYPE)
    .and_then(|value| value.to_str().ok())
    .map(str::to_string);

  let response = use_case
    .execute(ReceiveWebhookCommand {
      integration_id: query.into_inner().integration_id,
      content_type,
      body: body.to_vec(),
    })
    .await?;

  Ok(HttpResponse::Accepted().json(response))
}
