use serde::Serialize;
use std::sync::Arc;

use crate::domain::webhook::{PayloadFormat, WebhookError, WebhookEvent, WebhookEventRepository};

#[derive(Debug, Clone)]
pub struct ReceiveWebhookCommand {
  pub integration_id: Option<String>,
  pub content_type: Option<String>,
  pub body: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct ReceiveWebhookResponse {
  pub event_id: String,
  pub received: bool,
}

/// Stores an inbound integration event unprocessed
pub struct ReceiveWebhookUseCase {
  webhook_repo: Arc<dyn WebhookEventRepository>,
}

impl ReceiveWebhookUseCase {
  pub fn new(webhook_repo: Arc<dyn WebhookEventRepository>) -> Self {
    Self { webhook_repo }
  }

  pub async fn execute(
    &self,
    command: ReceiveWebhookCommand,
  ) -> Result<ReceiveWebhookResponse, WebhookError> {
    let integration_id = command
      .integration_id
      .ok_or(WebhookError::MissingIntegrationId)?;
    let format = PayloadFormat::from_content_type(command.content_type.as_deref().unwrap_or(""))?;

    let event = WebhookEvent::receive(&integration_id, format, &command.body)?;
    let event = self.webhook_repo.create(event).await?;
    tracing::info!(
      "Received webhook {} from integration {} ({} bytes)",
      event.id,
      event.integration_id,
      command.body.len()
    );

    Ok(ReceiveWebhookResponse {
      event_id: event.id.into(),
      received: true,
    })
  }
}
