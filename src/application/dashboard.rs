//! Read model behind `GET /dashboard`.
//!
//! The store is owned by `main`, shared with handlers through `web::Data` and
//! only changes through `refresh` and `clear`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::invoice::{InvoiceError, InvoiceService, InvoiceStatusSummary};
use crate::domain::job::{JobError, JobService, JobStatus};
use crate::domain::shared::{Currency, Money};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
  #[error(transparent)]
  Job(#[from] JobError),

  #[error(transparent)]
  Invoice(#[from] InvoiceError),
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
  pub job_counts: BTreeMap<JobStatus, i64>,
  pub ready_for_invoicing: Vec<String>,
  pub invoice_summary: Vec<InvoiceStatusSummary>,
  pub refreshed_at: DateTime<Utc>,
}

impl DashboardSnapshot {
  fn outstanding_totals(&self) -> Vec<Money> {
    let mut totals: BTreeMap<Currency, Money> = BTreeMap::new();
    for summary in self
      .invoice_summary
      .iter()
      .filter(|s| s.status.is_outstanding())
    {
      let entry = totals
        .entry(summary.currency)
        .or_insert_with(|| Money::zero(summary.currency));
      entry.amount += summary.total;
    }
    totals.into_values().collect()
  }
}

pub struct DashboardStore {
  job_service: Arc<JobService>,
  invoice_service: Arc<InvoiceService>,
  snapshot: RwLock<Option<DashboardSnapshot>>,
}

impl DashboardStore {
  pub fn new(job_service: Arc<JobService>, invoice_service: Arc<InvoiceService>) -> Self {
    Self {
      job_service,
      invoice_service,
      snapshot: RwLock::new(None),
    }
  }

  /// First refresh at startup
  pub async fn init(&self) -> Result<(), DashboardError> {
    self.refresh().await.map(|_| ())
  }

  /// Rebuilds the snapshot from the repositories and swaps it in
  pub async fn refresh(&self) -> Result<DashboardSnapshot, DashboardError> {
    let job_counts = self
      .job_service
      .count_by_status()
      .await?
      .into_iter()
      .collect::<BTreeMap<_, _>>();
    let ready_for_invoicing = self
      .job_service
      .get_jobs_ready_for_invoicing()
      .await?
      .into_iter()
      .map(|job| job.id.into())
      .collect();
    let invoice_summary = self.invoice_service.status_summary().await?;

    let snapshot = DashboardSnapshot {
      job_counts,
      ready_for_invoicing,
      invoice_summary,
      refreshed_at: Utc::now(),
    };

    *self.snapshot.write().await = Some(snapshot.clone());
    tracing::debug!("Dashboard refreshed at {}", snapshot.refreshed_at);
    Ok(snapshot)
  }

  /// Current snapshot, building one if the store is empty
  pub async fn snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
    if let Some(snapshot) = self.snapshot.read().await.as_ref() {
      return Ok(snapshot.clone());
    }
    self.refresh().await
  }

  /// Job count for one status in the cached snapshot; zero when empty
  pub async fn jobs_in_status(&self, status: JobStatus) -> i64 {
    self
      .snapshot
      .read()
      .await
      .as_ref()
      .and_then(|s| s.job_counts.get(&status).copied())
      .unwrap_or(0)
  }

  /// Sum of sent and overdue invoices, one entry per currency
  pub async fn outstanding_invoice_total(&self) -> Vec<Money> {
    self
      .snapshot
      .read()
      .await
      .as_ref()
      .map(DashboardSnapshot::outstanding_totals)
      .unwrap_or_default()
  }

  pub async fn clear(&self) {
    *self.snapshot.write().await = None;
    tracing::debug!("Dashboard cleared");
  }
}
