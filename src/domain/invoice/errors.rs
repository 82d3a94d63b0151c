use chrono::NaiveDate;
use thiserror::Error;

use super::value_objects::{InvoiceId, InvoiceStatus};
use crate::domain::company::value_objects::CompanyId;
use crate::domain::job::errors::JobError;
use crate::domain::job::value_objects::{JobId, JobStatus};
use crate::domain::shared::{RepositoryError, ValueObjectError};

#[derive(Debug, Error)]
pub enum InvoiceError {
  #[error("Invoice not found: {0}")]
  NotFound(InvoiceId),

  #[error("Job not found: {0}")]
  JobNotFound(JobId),

  #[error("Job {job_id} is not ready for invoicing (status '{status}')")]
  JobNotReady { job_id: JobId, status: JobStatus },

  #[error("Job {0} already has an invoice")]
  JobAlreadyInvoiced(JobId),

  #[error("Job {0} has no customer to invoice")]
  MissingCustomer(JobId),

  #[error("Carrier not found: {0}")]
  CarrierNotFound(CompanyId),

  #[error("Company {0} is not a carrier")]
  NotACarrier(CompanyId),

  #[error("At least one job is required")]
  EmptyBatch,

  #[error("Job {0} is listed more than once")]
  DuplicateJob(JobId),

  #[error("Period end {end} is before period start {start}")]
  InvalidPeriod { start: NaiveDate, end: NaiveDate },

  #[error("Job {job_id} does not belong to carrier {carrier_id}")]
  JobNotOwnedByCarrier { job_id: JobId, carrier_id: CompanyId },

  #[error("Job {job_id} dated {job_date} falls outside the invoice period")]
  JobOutsidePeriod { job_id: JobId, job_date: NaiveDate },

  #[error("Job {0} has already been self-invoiced")]
  JobAlreadySelfInvoiced(JobId),

  #[error("Job {0} has no agreed carrier cost")]
  MissingAgreedCost(JobId),

  #[error("Cannot compute a due date from {0}")]
  InvalidDueDate(NaiveDate),

  #[error("Invalid invoice status transition from {from} to {to}")]
  InvalidStatusTransition {
    from: InvoiceStatus,
    to: InvoiceStatus,
  },

  #[error("Invoice {0} cannot accept payment")]
  NotPayable(InvoiceId),

  #[error("{0}")]
  Job(#[from] JobError),

  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),
}

impl InvoiceError {
  /// True when the failure came from storage rather than a business rule
  pub fn is_persistence(&self) -> bool {
    match self {
      InvoiceError::Repository(_) => true,
      InvoiceError::Job(inner) => inner.is_persistence(),
      _ => false,
    }
  }
}
