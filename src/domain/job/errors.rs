use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use super::state_machine::TransitionError;
use super::value_objects::{JobId, JobStatus};
use crate::domain::company::value_objects::CompanyId;
use crate::domain::shared::{RepositoryError, ValueObjectError};

#[derive(Debug, Error)]
pub enum JobError {
  #[error("Job not found: {0}")]
  NotFound(JobId),

  #[error("Company not found: {0}")]
  CompanyNotFound(CompanyId),

  #[error("Company {0} is not a customer")]
  NotACustomer(CompanyId),

  #[error("Company {0} is not a carrier")]
  NotACarrier(CompanyId),

  #[error("Job {0} is archived and cannot be changed")]
  Archived(JobId),

  #[error("Job {0} has already been invoiced")]
  AlreadyInvoiced(JobId),

  #[error("Job cannot be marked ready for invoicing from status '{0}'")]
  NotEligibleForInvoicing(JobStatus),

  #[error("Proof of delivery has not been uploaded for job {0}")]
  PodMissing(JobId),

  #[error("Agreed cost cannot be negative: {0}")]
  InvalidAgreedCost(Decimal),

  #[error("Delivery date {delivery} is before pickup date {pickup}")]
  InvalidDates { pickup: NaiveDate, delivery: NaiveDate },

  #[error("{0}")]
  Transition(#[from] TransitionError),

  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),
}

impl JobError {
  /// True when the failure came from storage rather than a business rule
  pub fn is_persistence(&self) -> bool {
    matches!(self, JobError::Repository(_))
  }
}
