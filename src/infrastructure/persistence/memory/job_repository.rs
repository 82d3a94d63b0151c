use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::MemoryStore;
use crate::domain::company::CompanyId;
use crate::domain::job::{Job, JobFilter, JobId, JobRepository, JobStatus};
use crate::domain::shared::RepositoryError;

pub struct InMemoryJobRepository {
  store: Arc<MemoryStore>,
}

impl InMemoryJobRepository {
  pub fn new(store: Arc<MemoryStore>) -> Self {
    Self { store }
  }
}

fn newest_first(jobs: &mut [Job]) {
  jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
  async fn create(&self, job: Job) -> Result<Job, RepositoryError> {
    let mut state = self.store.state.write().await;
    if state.jobs.contains_key(&job.id) {
      return Err(RepositoryError::DuplicateKey(job.id.to_string()));
    }
    if state.jobs.values().any(|j| j.reference == job.reference) {
      return Err(RepositoryError::DuplicateKey("jobs_reference_key".to_string()));
    }
    state.jobs.insert(job.id.clone(), job.clone());
    Ok(job)
  }

  async fn update(&self, job: Job) -> Result<Job, RepositoryError> {
    let mut state = self.store.state.write().await;
    let stored = state.jobs.get_mut(&job.id).ok_or(RepositoryError::NotFound)?;
    *stored = job.clone();
    Ok(job)
  }

  async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
    Ok(self.store.state.read().await.jobs.get(id).cloned())
  }

  async fn find_by_ids(&self, ids: &[JobId]) -> Result<Vec<Job>, RepositoryError> {
    let state = self.store.state.read().await;
    Ok(ids.iter().filter_map(|id| state.jobs.get(id).cloned()).collect())
  }

  async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError> {
    let state = self.store.state.read().await;
    let mut jobs: Vec<Job> = state
      .jobs
      .values()
      .filter(|job| filter.matches(job))
      .cloned()
      .collect();
    newest_first(&mut jobs);
    Ok(jobs)
  }

  async fn find_ready_for_invoicing(&self) -> Result<Vec<Job>, RepositoryError> {
    let state = self.store.state.read().await;
    let mut jobs: Vec<Job> = state
      .jobs
      .values()
      .filter(|job| job.status == JobStatus::ReadyForInvoicing && !job.is_self_invoiced())
      .cloned()
      .collect();
    newest_first(&mut jobs);
    Ok(jobs)
  }

  async fn count_by_company(&self, company_id: &CompanyId) -> Result<i64, RepositoryError> {
    let state = self.store.state.read().await;
    let count = state
      .jobs
      .values()
      .filter(|job| {
        job.customer_id.as_ref() == Some(company_id) || job.carrier_id.as_ref() == Some(company_id)
      })
      .count();
    Ok(count as i64)
  }

  async fn count_by_status(&self) -> Result<Vec<(JobStatus, i64)>, RepositoryError> {
    let state = self.store.state.read().await;
    let mut counts: BTreeMap<JobStatus, i64> = BTreeMap::new();
    for job in state.jobs.values() {
      *counts.entry(job.status).or_default() += 1;
    }
    Ok(counts.into_iter().collect())
  }
}
