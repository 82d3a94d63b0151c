use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::InvoiceError;
use super::value_objects::{
  InvoiceId, InvoiceKind, InvoiceNumber, InvoiceStatus, PaymentTerms, TaxRate,
};
use crate::domain::company::value_objects::CompanyId;
use crate::domain::job::entities::Job;
use crate::domain::job::value_objects::JobId;
use crate::domain::shared::{Currency, Money};

// Invoice Line Item - one per constituent job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
  pub job_id: JobId,
  pub description: String,
  pub amount: Money,
}

impl InvoiceLineItem {
  fn describe(job: &Job) -> String {
    format!(
      "{}: {} to {}",
      job.reference, job.pickup.city, job.delivery.city
    )
  }

  /// Bills the customer the job's value
  pub fn billing(job: &Job) -> Self {
    Self {
      job_id: job.id.clone(),
      description: Self::describe(job),
      amount: job.value,
    }
  }

  /// Pays the carrier the agreed cost
  pub fn carrier_payment(job: &Job) -> Result<Self, InvoiceError> {
    let cost = job
      .agreed_cost_gbp
      .ok_or_else(|| InvoiceError::MissingAgreedCost(job.id.clone()))?;
    Ok(Self {
      job_id: job.id.clone(),
      description: Self::describe(job),
      amount: Money::gbp(cost)?,
    })
  }
}

// Invoice Totals - Calculated from line items
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvoiceTotals {
  pub subtotal: Money,
  pub vat: Money,
  pub total: Money,
}

impl InvoiceTotals {
  pub fn calculate(
    line_items: &[InvoiceLineItem],
    currency: Currency,
    tax_rate: TaxRate,
  ) -> Result<Self, InvoiceError> {
    let subtotal = line_items
      .iter()
      .try_fold(Money::zero(currency), |acc, item| acc.add(&item.amount))?;
    let vat = subtotal.multiply(tax_rate.value());
    let total = subtotal.add(&vat)?;

    Ok(Self {
      subtotal,
      vat,
      total,
    })
  }
}

/// Terms applied when an invoice is raised
#[derive(Debug, Clone, Copy)]
pub struct InvoiceTerms {
  pub tax_rate: TaxRate,
  pub payment_terms: PaymentTerms,
  pub invoice_date: NaiveDate,
}

/// Billing period covered by a carrier self-invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoicePeriod {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl InvoicePeriod {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvoiceError> {
    if end < start {
      return Err(InvoiceError::InvalidPeriod { start, end });
    }
    Ok(Self { start, end })
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: InvoiceId,
  pub invoice_number: InvoiceNumber,
  pub kind: InvoiceKind,
  pub company_id: CompanyId,
  pub job_ids: Vec<JobId>,
  pub line_items: Vec<InvoiceLineItem>,
  pub currency: Currency,
  pub subtotal: Money,
  pub tax_rate: TaxRate,
  pub vat: Money,
  pub total: Money,
  pub invoice_date: NaiveDate,
  pub due_date: NaiveDate,
  pub payment_terms: PaymentTerms,
  pub period_start: Option<NaiveDate>,
  pub period_end: Option<NaiveDate>,
  pub status: InvoiceStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Invoice {
  /// Customer invoice for a single job. Readiness is checked by the caller.
  pub fn from_job(job: &Job, terms: InvoiceTerms) -> Result<Self, InvoiceError> {
    let customer_id = job
      .customer_id
      .clone()
      .ok_or_else(|| InvoiceError::MissingCustomer(job.id.clone()))?;

    let line_items = vec![InvoiceLineItem::billing(job)];
    Self::build(
      InvoiceNumber::for_job(&job.reference),
      InvoiceKind::Customer,
      customer_id,
      line_items,
      job.value.currency,
      terms,
      None,
    )
  }

  /// Carrier self-invoice over `jobs`: GBP agreed costs, no VAT
  pub fn self_invoice(
    carrier_id: CompanyId,
    jobs: &[Job],
    period: InvoicePeriod,
    invoice_date: NaiveDate,
    payment_terms: PaymentTerms,
  ) -> Result<Self, InvoiceError> {
    if jobs.is_empty() {
      return Err(InvoiceError::EmptyBatch);
    }
    let line_items = jobs
      .iter()
      .map(InvoiceLineItem::carrier_payment)
      .collect::<Result<Vec<_>, _>>()?;

    Self::build(
      InvoiceNumber::for_self_invoice(period.end),
      InvoiceKind::CarrierSelfInvoice,
      carrier_id,
      line_items,
      Currency::GBP,
      InvoiceTerms {
        tax_rate: TaxRate::zero(),
        payment_terms,
        invoice_date,
      },
      Some(period),
    )
  }

  fn build(
    invoice_number: InvoiceNumber,
    kind: InvoiceKind,
    company_id: CompanyId,
    line_items: Vec<InvoiceLineItem>,
    currency: Currency,
    terms: InvoiceTerms,
    period: Option<InvoicePeriod>,
  ) -> Result<Self, InvoiceError> {
    let totals = InvoiceTotals::calculate(&line_items, currency, terms.tax_rate)?;
    let due_date = terms
      .invoice_date
      .checked_add_days(Days::new(u64::from(terms.payment_terms.days())))
      .ok_or(InvoiceError::InvalidDueDate(terms.invoice_date))?;

    let now = Utc::now();
    Ok(Self {
      id: InvoiceId::generate(),
      invoice_number,
      kind,
      company_id,
      job_ids: line_items.iter().map(|item| item.job_id.clone()).collect(),
      line_items,
      currency,
      subtotal: totals.subtotal,
      tax_rate: terms.tax_rate,
      vat: totals.vat,
      total: totals.total,
      invoice_date: terms.invoice_date,
      due_date,
      payment_terms: terms.payment_terms,
      period_start: period.map(|p| p.start),
      period_end: period.map(|p| p.end),
      status: InvoiceStatus::Draft,
      created_at: now,
      updated_at: now,
    })
  }

  pub fn change_status(&mut self, new_status: InvoiceStatus) -> Result<(), InvoiceError> {
    if !self.status.can_transition_to(new_status) {
      return Err(InvoiceError::InvalidStatusTransition {
        from: self.status,
        to: new_status,
      });
    }
    self.status = new_status;
    self.updated_at = Utc::now();
    Ok(())
  }

  /// Sent and past its due date
  pub fn is_overdue(&self, current_date: NaiveDate) -> bool {
    self.status == InvoiceStatus::Sent && current_date > self.due_date
  }

  /// Customer invoice that is still owed
  pub fn can_accept_payment(&self) -> bool {
    self.kind == InvoiceKind::Customer && self.status.is_outstanding()
  }

  pub fn totals(&self) -> InvoiceTotals {
    InvoiceTotals {
      subtotal: self.subtotal,
      vat: self.vat,
      total: self.total,
    }
  }
}

/// Count and value of invoices sharing a status and currency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceStatusSummary {
  pub status: InvoiceStatus,
  pub currency: Currency,
  pub count: i64,
  pub total: Decimal,
}
