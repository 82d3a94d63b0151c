use async_trait::async_trait;
use chrono::NaiveDate;

use super::entities::{Invoice, InvoiceStatusSummary};
use super::value_objects::{InvoiceId, InvoiceKind, InvoiceStatus};
use crate::domain::company::value_objects::CompanyId;
use crate::domain::job::entities::Job;
use crate::domain::shared::RepositoryError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
  pub status: Option<InvoiceStatus>,
  pub kind: Option<InvoiceKind>,
  pub company_id: Option<CompanyId>,
}

impl InvoiceFilter {
  pub fn matches(&self, invoice: &Invoice) -> bool {
    self.status.is_none_or(|status| invoice.status == status)
      && self.kind.is_none_or(|kind| invoice.kind == kind)
      && self
        .company_id
        .as_ref()
        .is_none_or(|id| &invoice.company_id == id)
  }
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  /// Inserts the invoice and stores the already-transitioned job in one
  /// transaction. Fails with `Conflict` if the job gained an invoice
  /// meanwhile; nothing is written in that case.
  async fn create_for_job(&self, invoice: Invoice, job: Job)
  -> Result<(Invoice, Job), RepositoryError>;

  /// Inserts a self-invoice and stores every job (already flagged
  /// `self_invoiced`) in one transaction. Fails with `Conflict` if any job
  /// was self-invoiced concurrently; nothing is written in that case.
  async fn create_self_invoice(
    &self,
    invoice: Invoice,
    jobs: Vec<Job>,
  ) -> Result<(Invoice, Vec<Job>), RepositoryError>;

  async fn update(&self, invoice: Invoice) -> Result<Invoice, RepositoryError>;
  async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError>;
  async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, RepositoryError>;

  /// Sent invoices whose due date is before `today`
  async fn find_overdue(&self, today: NaiveDate) -> Result<Vec<Invoice>, RepositoryError>;

  async fn summarize_by_status(&self) -> Result<Vec<InvoiceStatusSummary>, RepositoryError>;
}
