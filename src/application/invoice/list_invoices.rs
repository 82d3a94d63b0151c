use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use super::invoice_dto::{InvoiceDto, InvoiceSummaryDto};
use crate::domain::company::CompanyId;
use crate::domain::invoice::{
  InvoiceError, InvoiceFilter, InvoiceId, InvoiceKind, InvoiceService, InvoiceStatus,
};

#[derive(Debug, Clone, Default)]
pub struct ListInvoicesCommand {
  pub status: Option<String>,
  pub kind: Option<String>,
  pub company_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
  pub invoices: Vec<InvoiceDto>,
  pub total: usize,
}

pub struct ListInvoicesUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListInvoicesUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ListInvoicesCommand,
  ) -> Result<ListInvoicesResponse, InvoiceError> {
    // Parse filters
    let filter = InvoiceFilter {
      status: command
        .status
        .as_deref()
        .map(InvoiceStatus::from_str)
        .transpose()?,
      kind: command
        .kind
        .as_deref()
        .map(InvoiceKind::from_str)
        .transpose()?,
      company_id: command.company_id.map(CompanyId::parse).transpose()?,
    };

    let invoices: Vec<InvoiceDto> = self
      .invoice_service
      .list_invoices(&filter)
      .await?
      .into_iter()
      .map(InvoiceDto::from)
      .collect();

    Ok(ListInvoicesResponse {
      total: invoices.len(),
      invoices,
    })
  }
}

pub struct GetInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, invoice_id: String) -> Result<InvoiceDto, InvoiceError> {
    let invoice_id = InvoiceId::parse(invoice_id)?;
    Ok(self.invoice_service.get_invoice(&invoice_id).await?.into())
  }
}

#[derive(Debug, Serialize)]
pub struct InvoiceSummaryResponse {
  pub summary: Vec<InvoiceSummaryDto>,
}

/// Count and total per status and currency
pub struct GetInvoiceSummaryUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetInvoiceSummaryUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self) -> Result<InvoiceSummaryResponse, InvoiceError> {
    let summary = self
      .invoice_service
      .status_summary()
      .await?
      .into_iter()
      .map(InvoiceSummaryDto::from)
      .collect();
    Ok(InvoiceSummaryResponse { summary })
  }
}
