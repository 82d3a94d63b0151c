use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::invoice::{InvoiceError, InvoiceId, InvoiceService, InvoiceStatus};

#[derive(Debug, Clone)]
pub struct ChangeInvoiceStatusCommand {
  pub invoice_id: String,
  pub new_status: String,
}

#[derive(Debug, Serialize)]
pub struct ChangeInvoiceStatusResponse {
  pub invoice_id: String,
  pub status: String,
}

pub struct ChangeInvoiceStatusUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ChangeInvoiceStatusUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ChangeInvoiceStatusCommand,
  ) -> Result<ChangeInvoiceStatusResponse, InvoiceError> {
    let invoice_id = InvoiceId::parse(command.invoice_id)?;
    let new_status = InvoiceStatus::from_str(&command.new_status)?;

    let invoice = self
      .invoice_service
      .change_invoice_status(&invoice_id, new_status)
      .await?;

    Ok(ChangeInvoiceStatusResponse {
      invoice_id: invoice.id.into(),
      status: invoice.status.as_str().to_string(),
    })
  }
}
