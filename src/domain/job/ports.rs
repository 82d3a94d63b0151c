use async_trait::async_trait;

use super::entities::Job;
use super::value_objects::{JobId, JobStatus};
use crate::domain::company::value_objects::CompanyId;
use crate::domain::shared::RepositoryError;

/// Optional filters for job listings; every set field must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
  pub status: Option<JobStatus>,
  pub customer_id: Option<CompanyId>,
  pub carrier_id: Option<CompanyId>,
}

impl JobFilter {
  pub fn matches(&self, job: &Job) -> bool {
    self.status.is_none_or(|status| job.status == status)
      && self
        .customer_id
        .as_ref()
        .is_none_or(|id| job.customer_id.as_ref() == Some(id))
      && self
        .carrier_id
        .as_ref()
        .is_none_or(|id| job.carrier_id.as_ref() == Some(id))
  }
}

#[async_trait]
pub trait JobRepository: Send + Sync {
  async fn create(&self, job: Job) -> Result<Job, RepositoryError>;
  async fn update(&self, job: Job) -> Result<Job, RepositoryError>;
  async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
  async fn find_by_ids(&self, ids: &[JobId]) -> Result<Vec<Job>, RepositoryError>;
  async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError>;

  /// Jobs in `ready_for_invoicing` whose `self_invoiced` is not true
  async fn find_ready_for_invoicing(&self) -> Result<Vec<Job>, RepositoryError>;

  /// Jobs referencing the company as customer or carrier
  async fn count_by_company(&self, company_id: &CompanyId) -> Result<i64, RepositoryError>;

  async fn count_by_status(&self) -> Result<Vec<(JobStatus, i64)>, RepositoryError>;
}
