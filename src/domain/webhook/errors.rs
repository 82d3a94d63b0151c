use thiserror::Error;

use crate::domain::shared::RepositoryError;

#[derive(Debug, Error)]
pub enum WebhookError {
  #[error("integration_id query parameter is required")]
  MissingIntegrationId,

  #[error("Invalid integration id: {0}")]
  InvalidIntegrationId(String),

  #[error("Unsupported content type: {0}")]
  UnsupportedContentType(String),

  #[error("Invalid payload: {0}")]
  InvalidPayload(String),

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),
}
