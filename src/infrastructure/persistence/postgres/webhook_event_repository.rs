use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::corrupt;
use crate::domain::shared::RepositoryError;
use crate::domain::webhook::{WebhookEvent, WebhookEventId, WebhookEventRepository};

#[derive(Debug, FromRow)]
struct WebhookEventRow {
  id: String,
  integration_id: String,
  content_type: String,
  payload: serde_json::Value,
  payload_sha256: String,
  processed: bool,
  received_at: DateTime<Utc>,
}

impl TryFrom<WebhookEventRow> for WebhookEvent {
  type Error = RepositoryError;

  fn try_from(row: WebhookEventRow) -> Result<Self, Self::Error> {
    Ok(WebhookEvent {
      id: WebhookEventId::parse(row.id).map_err(corrupt)?,
      integration_id: row.integration_id,
      content_type: row.content_type,
      payload: row.payload,
      payload_sha256: row.payload_sha256,
      processed: row.processed,
      received_at: row.received_at,
    })
  }
}

pub struct PostgresWebhookEventRepository {
  pool: PgPool,
}

impl PostgresWebhookEventRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
  async fn create(&self, event: WebhookEvent) -> Result<WebhookEvent, RepositoryError> {
    let row = sqlx::query_as::<_, WebhookEventRow>(
      r#"
            INSERT INTO webhook_events (
                id, integration_id, content_type, payload, payload_sha256, processed, received_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, integration_id, content_type, payload, payload_sha256, processed,
                      received_at
            "#,
    )
    .bind(event.id.as_str())
    .bind(&event.integration_id)
    .bind(&event.content_type)
    .bind(&event.payload)
    .bind(&event.payload_sha256)
    .bind(event.processed)
    .bind(event.received_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn find_by_id(&self, id: &WebhookEventId) -> Result<Option<WebhookEvent>, RepositoryError> {
    let row = sqlx::query_as::<_, WebhookEventRow>(
      r#"
            SELECT id, integration_id, content_type, payload, payload_sha256, processed,
                   received_at
            FROM webhook_events
            WHERE id = $1
            "#,
    )
    .bind(id.as_str())
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }
}
