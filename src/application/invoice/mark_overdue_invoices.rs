use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::domain::invoice::{InvoiceError, InvoiceService};

#[derive(Debug, Serialize)]
pub struct MarkOverdueResponse {
  pub marked: usize,
  pub invoice_ids: Vec<String>,
}

pub struct MarkOverdueInvoicesUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl MarkOverdueInvoicesUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  /// `today` defaults to the current UTC date
  pub async fn execute(&self, today: Option<NaiveDate>) -> Result<MarkOverdueResponse, InvoiceError> {
    let today = today.unwrap_or_else(|| Utc::now().date_naive());
    let marked = self.invoice_service.mark_overdue_invoices(today).await?;

    let invoice_ids: Vec<String> = marked.into_iter().map(|i| i.id.into()).collect();
    Ok(MarkOverdueResponse {
      marked: invoice_ids.len(),
      invoice_ids,
    })
  }
}
