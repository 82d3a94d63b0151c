use async_trait::async_trait;

use super::entities::{WebhookEvent, WebhookEventId};
use crate::domain::shared::RepositoryError;

#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
  async fn create(&self, event: WebhookEvent) -> Result<WebhookEvent, RepositoryError>;
  async fn find_by_id(&self, id: &WebhookEventId) -> Result<Option<WebhookEvent>, RepositoryError>;
}
