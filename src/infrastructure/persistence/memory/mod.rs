//! In-memory adapters for every repository port.
//!
//! All repositories share one [`MemoryStore`] so that the multi-entity writes
//! (invoice plus job) happen under a single lock, the same way the Postgres
//! adapters use one transaction.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::company::{Company, CompanyId};
use crate::domain::invoice::{Invoice, InvoiceId};
use crate::domain::job::{Job, JobId};
use crate::domain::shared::RepositoryError;
use crate::domain::webhook::{WebhookEvent, WebhookEventId};

pub mod company_repository;
pub mod invoice_repository;
pub mod job_repository;
pub mod webhook_event_repository;

#[cfg(test)]
pub mod test_support;

pub use company_repository::InMemoryCompanyRepository;
pub use invoice_repository::InMemoryInvoiceRepository;
pub use job_repository::InMemoryJobRepository;
pub use webhook_event_repository::InMemoryWebhookEventRepository;

#[derive(Debug, Default)]
pub(crate) struct MemoryState {
  pub companies: HashMap<CompanyId, Company>,
  pub jobs: HashMap<JobId, Job>,
  pub invoices: HashMap<InvoiceId, Invoice>,
  pub webhook_events: HashMap<WebhookEventId, WebhookEvent>,
}

impl MemoryState {
  /// Mirrors the primary key and `invoices_number_key` constraints
  pub(crate) fn ensure_new_invoice(&self, invoice: &Invoice) -> Result<(), RepositoryError> {
    if self.invoices.contains_key(&invoice.id) {
      return Err(RepositoryError::DuplicateKey(invoice.id.to_string()));
    }
    if self
      .invoices
      .values()
      .any(|existing| existing.invoice_number == invoice.invoice_number)
    {
      return Err(RepositoryError::DuplicateKey("invoices_number_key".to_string()));
    }
    Ok(())
  }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  pub(crate) state: RwLock<MemoryState>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn company_count(&self) -> usize {
    self.state.read().await.companies.len()
  }

  pub async fn job_count(&self) -> usize {
    self.state.read().await.jobs.len()
  }

  pub async fn invoice_count(&self) -> usize {
    self.state.read().await.invoices.len()
  }
}
