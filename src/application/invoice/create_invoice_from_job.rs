use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

use crate::domain::invoice::{
  InvoiceError, InvoiceOptions, InvoiceService, PaymentTerms, TaxRate,
};
use crate::domain::job::JobId;

#[derive(Debug, Clone, Default)]
pub struct CreateInvoiceFromJobCommand {
  pub job_id: String,
  pub tax_rate_percent: Option<Decimal>,
  pub payment_term_days: Option<u32>,
  pub invoice_date: Option<NaiveDate>,
}

/// `{success, invoice_id?, error?}`; rule failures are reported here and
/// never as an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceOutcome {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub invoice_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl InvoiceOutcome {
  pub fn created(invoice_id: impl Into<String>) -> Self {
    Self {
      success: true,
      invoice_id: Some(invoice_id.into()),
      error: None,
    }
  }

  pub fn failed(error: impl Into<String>) -> Self {
    Self {
      success: false,
      invoice_id: None,
      error: Some(error.into()),
    }
  }

  /// Storage failures propagate; everything else becomes a failed outcome
  pub(crate) fn from_error(error: InvoiceError) -> Result<Self, InvoiceError> {
    if error.is_persistence() {
      return Err(error);
    }
    tracing::debug!("Invoice not created: {}", error);
    Ok(Self::failed(error.to_string()))
  }
}

pub struct CreateInvoiceFromJobUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl CreateInvoiceFromJobUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: CreateInvoiceFromJobCommand,
  ) -> Result<InvoiceOutcome, InvoiceError> {
    let options = match parse_options(&command) {
      Ok(options) => options,
      Err(e) => return InvoiceOutcome::from_error(e),
    };
    let job_id = match JobId::parse(command.job_id) {
      Ok(id) => id,
      Err(e) => return InvoiceOutcome::from_error(e.into()),
    };

    match self
      .invoice_service
      .create_invoice_from_job(&job_id, options)
      .await
    {
      Ok(invoice) => Ok(InvoiceOutcome::created(invoice.id)),
      Err(e) => InvoiceOutcome::from_error(e),
    }
  }
}

fn parse_options(command: &CreateInvoiceFromJobCommand) -> Result<InvoiceOptions, InvoiceError> {
  Ok(InvoiceOptions {
    tax_rate: command
      .tax_rate_percent
      .map(TaxRate::from_percentage)
      .transpose()?,
    payment_terms: command
      .payment_term_days
      .map(PaymentTerms::new)
      .transpose()?,
    invoice_date: command.invoice_date,
  })
}
