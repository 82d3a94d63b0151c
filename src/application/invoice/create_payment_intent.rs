use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::invoice::{InvoiceError, InvoiceId, InvoiceService};
use crate::domain::payment::{PaymentError, PaymentGateway, PaymentIntentRequest};

#[derive(Debug, Error)]
pub enum PaymentIntentError {
  #[error(transparent)]
  Invoice(#[from] InvoiceError),

  #[error(transparent)]
  Payment(#[from] PaymentError),
}

#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
  pub invoice_id: String,
  pub client_secret: String,
}

/// Asks the payment processor for an intent covering an invoice's total.
/// `gateway` is `None` when payments are not configured.
pub struct CreatePaymentIntentUseCase {
  invoice_service: Arc<InvoiceService>,
  gateway: Option<Arc<dyn PaymentGateway>>,
}

impl CreatePaymentIntentUseCase {
  pub fn new(
    invoice_service: Arc<InvoiceService>,
    gateway: Option<Arc<dyn PaymentGateway>>,
  ) -> Self {
    Self {
      invoice_service,
      gateway,
    }
  }

  pub async fn execute(&self, invoice_id: String) -> Result<PaymentIntentResponse, PaymentIntentError> {
    let gateway = self.gateway.as_ref().ok_or(PaymentError::NotConfigured)?;

    let invoice_id = InvoiceId::parse(invoice_id).map_err(InvoiceError::from)?;
    let invoice = self.invoice_service.get_invoice(&invoice_id).await?;
    let request = PaymentIntentRequest::for_invoice(&invoice, invoice.company_id.to_string())?;

    let intent = gateway.create_payment_intent(&request).await?;
    tracing::info!(
      "Created payment intent for invoice {} ({} {})",
      invoice.id,
      request.amount,
      request.currency
    );

    Ok(PaymentIntentResponse {
      invoice_id: invoice.id.into(),
      client_secret: intent.client_secret,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::payment::PaymentIntent;
  use crate::infrastructure::persistence::memory::test_support::services;
  use async_trait::async_trait;

  struct FixedGateway;

  #[async_trait]
  impl PaymentGateway for FixedGateway {
    async fn create_payment_intent(
      &self,
      _request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
      Ok(PaymentIntent {
        client_secret: "pi_secret".to_string(),
      })
    }
  }

  #[tokio::test]
  async fn test_without_gateway_is_not_configured() {
    let (_, svc) = services();
    let use_case = CreatePaymentIntentUseCase::new(Arc::new(svc.invoices), None);

    let result = use_case.execute("invoice_abc".to_string()).await;
    assert!(matches!(
      result,
      Err(PaymentIntentError::Payment(PaymentError::NotConfigured))
    ));
  }

  #[tokio::test]
  async fn test_unknown_invoice_is_not_found() {
    let (_, svc) = services();
    let use_case =
      CreatePaymentIntentUseCase::new(Arc::new(svc.invoices), Some(Arc::new(FixedGateway)));

    let result = use_case.execute("invoice_abc".to_string()).await;
    assert!(matches!(
      result,
      Err(PaymentIntentError::Invoice(InvoiceError::NotFound(_)))
    ));
  }
}
