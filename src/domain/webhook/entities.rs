use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::errors::WebhookError;
use crate::domain::shared::ids::prefixed_id;

prefixed_id!(
  /// Webhook event identifier (`webhook_…`)
  WebhookEventId,
  "webhook_"
);

/// Body encodings accepted by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadFormat {
  Json,
  Form,
}

impl PayloadFormat {
  /// Picks the format from a `Content-Type` header value, ignoring parameters
  pub fn from_content_type(content_type: &str) -> Result<Self, WebhookError> {
    let essence = content_type
      .split(';')
      .next()
      .unwrap_or_default()
      .trim()
      .to_lowercase();
    match essence.as_str() {
      "application/json" => Ok(PayloadFormat::Json),
      "application/x-www-form-urlencoded" => Ok(PayloadFormat::Form),
      _ => Err(WebhookError::UnsupportedContentType(content_type.to_string())),
    }
  }

  pub fn content_type(&self) -> &'static str {
    match self {
      PayloadFormat::Json => "application/json",
      PayloadFormat::Form => "application/x-www-form-urlencoded",
    }
  }

  /// Decodes a raw body into JSON. Form fields become a string-valued
  /// object; a repeated key keeps every value, in order, as an array.
  pub fn decode(&self, body: &[u8]) -> Result<serde_json::Value, WebhookError> {
    match self {
      PayloadFormat::Json => {
        serde_json::from_slice(body).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
      }
      PayloadFormat::Form => {
        let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
          .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

        let mut object = serde_json::Map::new();
        for (key, value) in fields {
          let value = serde_json::Value::String(value);
          match object.get_mut(&key) {
            Some(serde_json::Value::Array(values)) => values.push(value),
            Some(existing) => {
              let first = existing.take();
              *existing = serde_json::Value::Array(vec![first, value]);
            }
            None => {
              object.insert(key, value);
            }
          }
        }
        Ok(serde_json::Value::Object(object))
      }
    }
  }
}

/// Raw inbound event stored for later processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
  pub id: WebhookEventId,
  pub integration_id: String,
  pub content_type: String,
  pub payload: serde_json::Value,
  pub payload_sha256: String,
  pub processed: bool,
  pub received_at: DateTime<Utc>,
}

impl WebhookEvent {
  const MAX_INTEGRATION_ID_LENGTH: usize = 128;

  pub fn receive(
    integration_id: &str,
    format: PayloadFormat,
    body: &[u8],
  ) -> Result<Self, WebhookError> {
    let integration_id = integration_id.trim();
    if integration_id.is_empty() {
      return Err(WebhookError::MissingIntegrationId);
    }
    if integration_id.len() > Self::MAX_INTEGRATION_ID_LENGTH {
      return Err(WebhookError::InvalidIntegrationId(integration_id.to_string()));
    }

    let payload = format.decode(body)?;

    Ok(Self {
      id: WebhookEventId::generate(),
      integration_id: integration_id.to_string(),
      content_type: format.content_type().to_string(),
      payload,
      payload_sha256: digest(body),
      processed: false,
      received_at: Utc::now(),
    })
  }
}

fn digest(body: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(body);
  hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_content_type_detection() {
    assert_eq!(
      PayloadFormat::from_content_type("application/json; charset=utf-8").unwrap(),
      PayloadFormat::Json
    );
    assert_eq!(
      PayloadFormat::from_content_type("application/x-www-form-urlencoded").unwrap(),
      PayloadFormat::Form
    );
    assert!(PayloadFormat::from_content_type("text/plain").is_err());
  }

  #[test]
  fn test_receive_json_event() {
    let body = br#"{"type":"payment.succeeded","amount":1200}"#;
    let event = WebhookEvent::receive("stripe", PayloadFormat::Json, body).unwrap();

    assert!(event.id.as_str().starts_with("webhook_"));
    assert_eq!(event.payload["type"], "payment.succeeded");
    assert!(!event.processed);
    assert_eq!(event.payload_sha256.len(), 64);
  }

  #[test]
  fn test_receive_form_event() {
    let body = b"status=delivered&job=JOB-1&note=left+at+gate";
    let event = WebhookEvent::receive("telematics", PayloadFormat::Form, body).unwrap();
    assert_eq!(
      event.payload,
      json!({"status": "delivered", "job": "JOB-1", "note": "left at gate"})
    );
  }

  #[test]
  fn test_receive_form_event_keeps_repeated_keys() {
    let body = b"scan=LS1&scan=M1&scan=BS1&job=JOB-1";
    let event = WebhookEvent::receive("telematics", PayloadFormat::Form, body).unwrap();
    assert_eq!(
      event.payload,
      json!({"scan": ["LS1", "M1", "BS1"], "job": "JOB-1"})
    );
  }

  #[test]
  fn test_receive_rejects_bad_input() {
    assert!(matches!(
      WebhookEvent::receive("  ", PayloadFormat::Json, b"{}"),
      Err(WebhookError::MissingIntegrationId)
    ));
    assert!(matches!(
      WebhookEvent::receive("stripe", PayloadFormat::Json, b"not json"),
      Err(WebhookError::InvalidPayload(_))
    ));
  }

  #[test]
  fn test_digest_is_stable() {
    assert_eq!(
      digest(b"abc"),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }
}
