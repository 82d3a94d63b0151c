use std::sync::Arc;

use super::entities::{Job, JobUpdate, NewJob};
use super::errors::JobError;
use super::ports::{JobFilter, JobRepository};
use super::state_machine::{self, JobAction, Transition, TransitionError};
use super::value_objects::{JobId, JobStatus};
use crate::domain::company::ports::CompanyRepository;
use crate::domain::company::value_objects::{CompanyId, CompanyType};
use crate::domain::invoice::ports::InvoiceRepository;
use crate::domain::invoice::value_objects::InvoiceStatus;

/// Carrier assignment data
pub struct CarrierAssignment {
  pub carrier_id: CompanyId,
  pub vehicle_id: Option<String>,
  pub driver_id: Option<String>,
}

pub struct JobService {
  job_repo: Arc<dyn JobRepository>,
  company_repo: Arc<dyn CompanyRepository>,
  invoice_repo: Arc<dyn InvoiceRepository>,
}

impl JobService {
  pub fn new(
    job_repo: Arc<dyn JobRepository>,
    company_repo: Arc<dyn CompanyRepository>,
    invoice_repo: Arc<dyn InvoiceRepository>,
  ) -> Self {
    Self {
      job_repo,
      company_repo,
      invoice_repo,
    }
  }

  pub async fn create_job(&self, new_job: NewJob) -> Result<Job, JobError> {
    if let Some(customer_id) = &new_job.customer_id {
      self
        .ensure_company_type(customer_id, CompanyType::Customer)
        .await?;
    }

    let job = Job::new(new_job)?;
    let job = self.job_repo.create(job).await?;
    tracing::info!("Created job {} ({})", job.id, job.reference);
    Ok(job)
  }

  pub async fn update_job(&self, job_id: &JobId, update: JobUpdate) -> Result<Job, JobError> {
    let mut job = self.load(job_id).await?;
    job.apply_update(update)?;
    Ok(self.job_repo.update(job).await?)
  }

  pub async fn get_job(&self, job_id: &JobId) -> Result<Job, JobError> {
    self.load(job_id).await
  }

  pub async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, JobError> {
    Ok(self.job_repo.list(filter).await?)
  }

  /// Assigns a carrier and moves a booked job to `allocated`. An allocated
  /// job keeps its status and only swaps carrier, vehicle and driver.
  pub async fn assign_carrier(
    &self,
    job_id: &JobId,
    assignment: CarrierAssignment,
  ) -> Result<Job, JobError> {
    self
      .ensure_company_type(&assignment.carrier_id, CompanyType::Carrier)
      .await?;

    let mut job = self.load(job_id).await?;
    job.carrier_id = Some(assignment.carrier_id);
    job.vehicle_id = assignment.vehicle_id.or(job.vehicle_id);
    job.driver_id = assignment.driver_id.or(job.driver_id);

    if job.status == JobStatus::Allocated {
      job.updated_at = chrono::Utc::now();
    } else {
      let context = job.transition_context(false);
      job.transition_to(JobStatus::Allocated, &context)?;
    }

    let job = self.job_repo.update(job).await?;
    tracing::info!(
      "Assigned carrier {:?} to job {}",
      job.carrier_id.as_ref().map(CompanyId::as_str),
      job.id
    );
    Ok(job)
  }

  /// Records the proof-of-delivery document. A `delivered` job moves on to
  /// `pod_received`; any other status is left alone.
  pub async fn record_pod(&self, job_id: &JobId, document_id: String) -> Result<Job, JobError> {
    let mut job = self.load(job_id).await?;
    if job.status == JobStatus::Archived {
      return Err(JobError::Archived(job.id));
    }

    job.record_pod(document_id);
    if job.status == JobStatus::Delivered {
      let context = job.transition_context(false);
      job.transition_to(JobStatus::PodReceived, &context)?;
    }

    let job = self.job_repo.update(job).await?;
    tracing::info!("Recorded POD for job {}", job.id);
    Ok(job)
  }

  /// Moves a job through the state machine
  pub async fn transition_job(
    &self,
    job_id: &JobId,
    to: JobStatus,
    issue_details: Option<String>,
  ) -> Result<Job, JobError> {
    let mut job = self.load(job_id).await?;
    let from = job.status;

    let invoice_paid = if to == JobStatus::Cleared {
      self.linked_invoice_paid(&job).await?
    } else {
      false
    };

    let mut context = job.transition_context(invoice_paid);
    if to == JobStatus::Issues {
      context.issue_details = issue_details;
    }

    let transition = job.transition_to(to, &context)?;
    let job = self.job_repo.update(job).await?;
    tracing::info!(
      "Job {} moved {} -> {} ({})",
      job.id,
      from,
      to,
      transition.label
    );
    Ok(job)
  }

  pub async fn report_issue(&self, job_id: &JobId, details: String) -> Result<Job, JobError> {
    self
      .transition_job(job_id, JobStatus::Issues, Some(details))
      .await
  }

  /// Returns a job in `issues` to the status it was in before
  pub async fn resolve_issue(&self, job_id: &JobId) -> Result<Job, JobError> {
    let job = self.load(job_id).await?;
    let target = job.status_before_issue.ok_or_else(|| {
      JobError::Transition(TransitionError::PreconditionNotMet {
        action: JobAction::ResolveIssue,
        reason: "no status was recorded before the issue".to_string(),
      })
    })?;
    self.transition_job(job_id, target, None).await
  }

  pub async fn archive_job(&self, job_id: &JobId) -> Result<Job, JobError> {
    self.transition_job(job_id, JobStatus::Archived, None).await
  }

  /// Moves a finished, delivered or pod_received job with POD uploaded to
  /// `ready_for_invoicing`. On failure the stored job is unchanged.
  pub async fn mark_job_ready_for_invoicing(&self, job_id: &JobId) -> Result<Job, JobError> {
    let mut job = self.load(job_id).await?;

    if !job.status.is_delivery_complete() {
      return Err(JobError::NotEligibleForInvoicing(job.status));
    }
    if !job.pod_uploaded {
      return Err(JobError::PodMissing(job.id));
    }

    let context = job.transition_context(false);
    job.transition_to(JobStatus::ReadyForInvoicing, &context)?;
    let job = self.job_repo.update(job).await?;
    tracing::info!("Job {} is ready for invoicing", job.id);
    Ok(job)
  }

  pub async fn get_jobs_ready_for_invoicing(&self) -> Result<Vec<Job>, JobError> {
    let jobs = self.job_repo.find_ready_for_invoicing().await?;
    Ok(jobs.into_iter().filter(|job| !job.is_self_invoiced()).collect())
  }

  pub async fn count_by_status(&self) -> Result<Vec<(JobStatus, i64)>, JobError> {
    Ok(self.job_repo.count_by_status().await?)
  }

  /// Declared transitions out of the job's current status
  pub async fn available_transitions(
    &self,
    job_id: &JobId,
  ) -> Result<(Job, Vec<&'static Transition>), JobError> {
    let job = self.load(job_id).await?;
    let transitions = state_machine::available_transitions(job.status);
    Ok((job, transitions))
  }

  async fn load(&self, job_id: &JobId) -> Result<Job, JobError> {
    self
      .job_repo
      .find_by_id(job_id)
      .await?
      .ok_or_else(|| JobError::NotFound(job_id.clone()))
  }

  async fn ensure_company_type(
    &self,
    company_id: &CompanyId,
    expected: CompanyType,
  ) -> Result<(), JobError> {
    let company = self
      .company_repo
      .find_by_id(company_id)
      .await?
      .ok_or_else(|| JobError::CompanyNotFound(company_id.clone()))?;

    match (expected, company.company_type) {
      (CompanyType::Customer, CompanyType::Carrier) => Err(JobError::NotACustomer(company.id)),
      (CompanyType::Carrier, CompanyType::Customer) => Err(JobError::NotACarrier(company.id)),
      _ => Ok(()),
    }
  }

  async fn linked_invoice_paid(&self, job: &Job) -> Result<bool, JobError> {
    let Some(invoice_id) = &job.invoice_id else {
      return Ok(false);
    };
    let invoice = self.invoice_repo.find_by_id(invoice_id).await?;
    Ok(invoice.is_some_and(|invoice| invoice.status == InvoiceStatus::Paid))
  }
}
