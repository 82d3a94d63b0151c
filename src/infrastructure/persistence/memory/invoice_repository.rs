use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::MemoryStore;
use crate::domain::invoice::{
  Invoice, InvoiceFilter, InvoiceId, InvoiceRepository, InvoiceStatus, InvoiceStatusSummary,
};
use crate::domain::job::{Job, JobStatus};
use crate::domain::shared::{Currency, RepositoryError};

pub struct InMemoryInvoiceRepository {
  store: Arc<MemoryStore>,
}

impl InMemoryInvoiceRepository {
  pub fn new(store: Arc<MemoryStore>) -> Self {
    Self { store }
  }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
  async fn create_for_job(&self, invoice: Invoice, job: Job) -> Result<(Invoice, Job), RepositoryError> {
    let mut state = self.store.state.write().await;

    let stored = state.jobs.get(&job.id).ok_or(RepositoryError::NotFound)?;
    if stored.status != JobStatus::ReadyForInvoicing || stored.invoice_id.is_some() {
      return Err(RepositoryError::Conflict(format!(
        "job {} is already invoiced or no longer ready for invoicing",
        job.id
      )));
    }
    state.ensure_new_invoice(&invoice)?;

    // Only the invoicing fields change; self-invoice flags stay as stored
    let stored = state.jobs.get_mut(&job.id).ok_or(RepositoryError::NotFound)?;
    stored.status = job.status;
    stored.invoice_id = Some(invoice.id.clone());
    stored.updated_at = job.updated_at;
    let job = stored.clone();

    state.invoices.insert(invoice.id.clone(), invoice.clone());
    Ok((invoice, job))
  }

  async fn create_self_invoice(
    &self,
    invoice: Invoice,
    jobs: Vec<Job>,
  ) -> Result<(Invoice, Vec<Job>), RepositoryError> {
    let mut state = self.store.state.write().await;

    // Check every row before touching any of them
    for job in &jobs {
      let stored = state.jobs.get(&job.id).ok_or(RepositoryError::NotFound)?;
      if stored.is_self_invoiced() {
        return Err(RepositoryError::Conflict(format!(
          "job {} is already self-invoiced",
          job.id
        )));
      }
    }
    state.ensure_new_invoice(&invoice)?;

    // Only the self-invoice fields change; status and invoice link stay as stored
    let mut updated = Vec::with_capacity(jobs.len());
    for job in &jobs {
      if let Some(stored) = state.jobs.get_mut(&job.id) {
        stored.self_invoiced = Some(true);
        stored.self_invoice_id = Some(invoice.id.clone());
        stored.updated_at = invoice.updated_at;
        updated.push(stored.clone());
      }
    }
    state.invoices.insert(invoice.id.clone(), invoice.clone());
    Ok((invoice, updated))
  }

  async fn update(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
    let mut state = self.store.state.write().await;
    let stored = state
      .invoices
      .get_mut(&invoice.id)
      .ok_or(RepositoryError::NotFound)?;
    *stored = invoice.clone();
    Ok(invoice)
  }

  async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
    Ok(self.store.state.read().await.invoices.get(id).cloned())
  }

  async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, RepositoryError> {
    let state = self.store.state.read().await;
    let mut invoices: Vec<Invoice> = state
      .invoices
      .values()
      .filter(|invoice| filter.matches(invoice))
      .cloned()
      .collect();
    invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(invoices)
  }

  async fn find_overdue(&self, today: NaiveDate) -> Result<Vec<Invoice>, RepositoryError> {
    let state = self.store.state.read().await;
    let mut invoices: Vec<Invoice> = state
      .invoices
      .values()
      .filter(|invoice| invoice.status == InvoiceStatus::Sent && invoice.due_date < today)
      .cloned()
      .collect();
    invoices.sort_by_key(|invoice| invoice.due_date);
    Ok(invoices)
  }

  async fn summarize_by_status(&self) -> Result<Vec<InvoiceStatusSummary>, RepositoryError> {
    let state = self.store.state.read().await;
    let mut groups: BTreeMap<(InvoiceStatus, Currency), (i64, Decimal)> = BTreeMap::new();
    for invoice in state.invoices.values() {
      let entry = groups
        .entry((invoice.status, invoice.currency))
        .or_insert((0, Decimal::ZERO));
      entry.0 += 1;
      entry.1 += invoice.total.amount;
    }

    Ok(
      groups
        .into_iter()
        .map(|((status, currency), (count, total))| InvoiceStatusSummary {
          status,
          currency,
          count,
          total,
        })
        .collect(),
    )
  }
}
