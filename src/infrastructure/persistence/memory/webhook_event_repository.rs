use async_trait::async_trait;
use std::sync::Arc;

use super::MemoryStore;
use crate::domain::shared::RepositoryError;
use crate::domain::webhook::{WebhookEvent, WebhookEventId, WebhookEventRepository};

pub struct InMemoryWebhookEventRepository {
  store: Arc<MemoryStore>,
}

impl InMemoryWebhookEventRepository {
  pub fn new(store: Arc<MemoryStore>) -> Self {
    Self { store }
  }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEventRepository {
  async fn create(&self, event: WebhookEvent) -> Result<WebhookEvent, RepositoryError> {
    let mut state = self.store.state.write().await;
    if state.webhook_events.contains_key(&event.id) {
      return Err(RepositoryError::DuplicateKey(event.id.to_string()));
    }
    state.webhook_events.insert(event.id.clone(), event.clone());
    Ok(event)
  }

  async fn find_by_id(&self, id: &WebhookEventId) -> Result<Option<WebhookEvent>, RepositoryError> {
    Ok(self.store.state.read().await.webhook_events.get(id).cloned())
  }
}
