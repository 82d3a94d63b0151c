use thiserror::Error;

/// Persistence failures surfaced through every repository port
#[derive(Debug, Error)]
pub enum RepositoryError {
  #[error("Record not found")]
  NotFound,

  #[error("Duplicate key violation: {0}")]
  DuplicateKey(String),

  /// A guarded write matched fewer rows than expected; nothing was committed
  #[error("Conflicting update: {0}")]
  Conflict(String),

  #[error("Stored record could not be decoded: {0}")]
  CorruptRecord(String),

  #[error("Database error: {0}")]
  Database(String),
}

impl From<sqlx::Error> for RepositoryError {
  fn from(error: sqlx::Error) -> Self {
    match &error {
      sqlx::Error::RowNotFound => RepositoryError::NotFound,
      sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
        RepositoryError::DuplicateKey(
          db_err
            .constraint()
            .map(str::to_string)
            .unwrap_or_else(|| db_err.message().to_string()),
        )
      }
      sqlx::Error::Database(db_err) => RepositoryError::Database(db_err.message().to_string()),
      sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
        RepositoryError::CorruptRecord(error.to_string())
      }
      _ => RepositoryError::Database(error.to_string()),
    }
  }
}

/// Pulls a human readable message out of an error payload returned by a
/// remote service. Looks at `message`, then `error`, then `statusText`.
pub fn extract_error_message(payload: &serde_json::Value, fallback: &str) -> String {
  ["message", "error", "statusText"]
    .iter()
    .find_map(|key| match payload.get(key) {
      Some(serde_json::Value::String(text)) if !text.trim().is_empty() => Some(text.clone()),
      Some(serde_json::Value::Object(inner)) => inner
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string),
      _ => None,
    })
    .unwrap_or_else(|| fallback.to_string())
}
