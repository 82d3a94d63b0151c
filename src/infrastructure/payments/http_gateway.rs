use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::domain::payment::{PaymentError, PaymentGateway, PaymentIntent, PaymentIntentRequest};
use crate::domain::shared::extract_error_message;
use crate::infrastructure::config::PaymentsConfig;
use crate::infrastructure::retry::{RetryPolicy, retry};

/// Payment processor reached over HTTPS with a bearer API key
pub struct HttpPaymentGateway {
  client: Client,
  endpoint: String,
  api_key: String,
  retry_policy: RetryPolicy,
}

impl HttpPaymentGateway {
  pub fn new(config: &PaymentsConfig, retry_policy: RetryPolicy) -> Result<Self, PaymentError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_seconds))
      .build()
      .map_err(|e| PaymentError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

    Ok(Self {
      client,
      endpoint: intents_endpoint(&config.base_url),
      api_key: config.api_key.clone(),
      retry_policy,
    })
  }

  async fn send(&self, request: &PaymentIntentRequest) -> Result<PaymentIntent, PaymentError> {
    let response = self
      .client
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .json(request)
      .send()
      .await
      .map_err(|e| PaymentError::Unavailable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
      return Err(rejection(status, &body));
    }

    response
      .json::<PaymentIntent>()
      .await
      .map_err(|e| PaymentError::InvalidResponse(e.to_string()))
  }
}

fn intents_endpoint(base_url: &str) -> String {
  format!("{}/payment-intents", base_url.trim_end_matches('/'))
}

fn rejection(status: StatusCode, body: &serde_json::Value) -> PaymentError {
  let fallback = status.canonical_reason().unwrap_or("Request failed");
  PaymentError::Rejected {
    status: status.as_u16(),
    message: extract_error_message(body, fallback),
  }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
  async fn create_payment_intent(
    &self,
    request: &PaymentIntentRequest,
  ) -> Result<PaymentIntent, PaymentError> {
    retry(
      &self.retry_policy,
      "Payment intent request",
      PaymentError::is_transient,
      move || self.send(request),
    )
    .await
  }
}
