use rust_decimal::Decimal;
use thiserror::Error;

use super::value_objects::CompanyId;
use crate::domain::shared::{RepositoryError, ValueObjectError};

#[derive(Debug, Error)]
pub enum CompanyError {
  #[error("Company not found: {0}")]
  NotFound(CompanyId),

  #[error("Company {company_id} is referenced by {job_count} job(s) and cannot be deleted")]
  ReferentialIntegrity { company_id: CompanyId, job_count: i64 },

  #[error("Credit limit cannot be negative: {0}")]
  InvalidCreditLimit(Decimal),

  #[error("Metadata must be a JSON object")]
  InvalidMetadata,

  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),
}
