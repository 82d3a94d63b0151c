use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use super::job_dto::{JobDto, TransitionDto};
use crate::domain::company::CompanyId;
use crate::domain::job::{JobError, JobFilter, JobId, JobService, JobStatus};

pub struct GetJobUseCase {
  job_service: Arc<JobService>,
}

impl GetJobUseCase {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self { job_service }
  }

  pub async fn execute(&self, job_id: String) -> Result<JobDto, JobError> {
    let job_id = JobId::parse(job_id)?;
    Ok(self.job_service.get_job(&job_id).await?.into())
  }
}

#[derive(Debug, Clone, Default)]
pub struct ListJobsCommand {
  pub status: Option<String>,
  pub customer_id: Option<String>,
  pub carrier_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
  pub jobs: Vec<JobDto>,
  pub total: usize,
}

impl From<Vec<JobDto>> for ListJobsResponse {
  fn from(jobs: Vec<JobDto>) -> Self {
    Self {
      total: jobs.len(),
      jobs,
    }
  }
}

pub struct ListJobsUseCase {
  job_service: Arc<JobService>,
}

impl ListJobsUseCase {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self { job_service }
  }

  pub async fn execute(&self, command: ListJobsCommand) -> Result<ListJobsResponse, JobError> {
    let filter = JobFilter {
      status: command
        .status
        .as_deref()
        .map(JobStatus::from_str)
        .transpose()?,
      customer_id: command.customer_id.map(CompanyId::parse).transpose()?,
      carrier_id: command.carrier_id.map(CompanyId::parse).transpose()?,
    };

    let jobs = self.job_service.list_jobs(&filter).await?;
    Ok(jobs.into_iter().map(JobDto::from).collect::<Vec<_>>().into())
  }
}

/// Jobs queued for invoicing that have not been self-invoiced
pub struct GetJobsReadyForInvoicingUseCase {
  job_service: Arc<JobService>,
}

impl GetJobsReadyForInvoicingUseCase {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self { job_service }
  }

  pub async fn execute(&self) -> Result<ListJobsResponse, JobError> {
    let jobs = self.job_service.get_jobs_ready_for_invoicing().await?;
    Ok(jobs.into_iter().map(JobDto::from).collect::<Vec<_>>().into())
  }
}

#[derive(Debug, Serialize)]
pub struct JobTransitionsResponse {
  pub job_id: String,
  pub status: String,
  pub transitions: Vec<TransitionDto>,
}

pub struct GetJobTransitionsUseCase {
  job_service: Arc<JobService>,
}

impl GetJobTransitionsUseCase {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self { job_service }
  }

  pub async fn execute(&self, job_id: String) -> Result<JobTransitionsResponse, JobError> {
    let job_id = JobId::parse(job_id)?;
    let (job, transitions) = self.job_service.available_transitions(&job_id).await?;

    Ok(JobTransitionsResponse {
      job_id: job.id.into(),
      status: job.status.as_str().to_string(),
      transitions: transitions.into_iter().map(TransitionDto::from).collect(),
    })
  }
}
