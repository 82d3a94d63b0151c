use async_trait::async_trait;

use super::entities::{PaymentIntent, PaymentIntentRequest};
use super::errors::PaymentError;

/// External payment processor that creates client-confirmable intents
#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn create_payment_intent(
    &self,
    request: &PaymentIntentRequest,
  ) -> Result<PaymentIntent, PaymentError>;
}
