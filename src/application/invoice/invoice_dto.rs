use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::invoice::{Invoice, InvoiceLineItem, InvoiceStatusSummary};

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceLineItemDto {
  pub job_id: String,
  pub description: String,
  pub amount: Decimal,
}

impl From<InvoiceLineItem> for InvoiceLineItemDto {
  fn from(item: InvoiceLineItem) -> Self {
    Self {
      job_id: item.job_id.into(),
      description: item.description,
      amount: item.amount.amount,
    }
  }
}

/// Invoice as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDto {
  pub id: String,
  pub invoice_number: String,
  pub kind: String,
  pub company_id: String,
  pub job_ids: Vec<String>,
  pub line_items: Vec<InvoiceLineItemDto>,
  pub currency: String,
  pub subtotal: Decimal,
  pub tax_rate: Decimal,
  pub vat: Decimal,
  pub total: Decimal,
  pub invoice_date: NaiveDate,
  pub due_date: NaiveDate,
  pub payment_terms: String,
  pub period_start: Option<NaiveDate>,
  pub period_end: Option<NaiveDate>,
  pub status: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceDto {
  fn from(invoice: Invoice) -> Self {
    Self {
      id: invoice.id.into(),
      invoice_number: invoice.invoice_number.into_inner(),
      kind: invoice.kind.as_str().to_string(),
      company_id: invoice.company_id.into(),
      job_ids: invoice.job_ids.into_iter().map(Into::into).collect(),
      line_items: invoice
        .line_items
        .into_iter()
        .map(InvoiceLineItemDto::from)
        .collect(),
      currency: invoice.currency.as_str().to_string(),
      subtotal: invoice.subtotal.amount,
      tax_rate: invoice.tax_rate.value(),
      vat: invoice.vat.amount,
      total: invoice.total.amount,
      invoice_date: invoice.invoice_date,
      due_date: invoice.due_date,
      payment_terms: invoice.payment_terms.to_string(),
      period_start: invoice.period_start,
      period_end: invoice.period_end,
      status: invoice.status.as_str().to_string(),
      created_at: invoice.created_at,
      updated_at: invoice.updated_at,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceSummaryDto {
  pub status: String,
  pub currency: String,
  pub count: i64,
  pub total: Decimal,
}

impl From<InvoiceStatusSummary> for InvoiceSummaryDto {
  fn from(summary: InvoiceStatusSummary) -> Self {
    Self {
      status: summary.status.as_str().to_string(),
      currency: summary.currency.as_str().to_string(),
      count: summary.count,
      total: summary.total,
    }
  }
}
