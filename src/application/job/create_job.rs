use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use super::job_dto::JobDto;
use crate::application::common::LocationInput;
use crate::domain::company::CompanyId;
use crate::domain::job::{JobError, JobPriority, JobReference, JobService, NewJob};
use crate::domain::shared::{Currency, Money};

#[derive(Debug, Clone)]
pub struct CreateJobCommand {
  pub reference: Option<String>,
  pub priority: Option<String>,
  pub customer_id: Option<String>,
  pub pickup: LocationInput,
  pub delivery: LocationInput,
  pub pickup_date: Option<NaiveDate>,
  pub delivery_date: Option<NaiveDate>,
  pub value: Decimal,
  pub currency: Option<String>,
  pub agreed_cost_gbp: Option<Decimal>,
  pub notes: Option<String>,
}

pub struct CreateJobUseCase {
  job_service: Arc<JobService>,
}

impl CreateJobUseCase {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self { job_service }
  }

  pub async fn execute(&self, command: CreateJobCommand) -> Result<JobDto, JobError> {
    let currency = match command.currency.as_deref() {
      Some(code) => Currency::from_str(code)?,
      None => Currency::default(),
    };

    let new_job = NewJob {
      reference: command.reference.map(JobReference::new).transpose()?,
      priority: command
        .priority
        .as_deref()
        .map(JobPriority::from_str)
        .transpose()?
        .unwrap_or_default(),
      customer_id: command.customer_id.map(CompanyId::parse).transpose()?,
      pickup: command.pickup.into_location()?,
      delivery: command.delivery.into_location()?,
      pickup_date: command.pickup_date,
      delivery_date: command.delivery_date,
      value: Money::new(command.value, currency)?,
      agreed_cost_gbp: command.agreed_cost_gbp,
      notes: command.notes.filter(|n| !n.trim().is_empty()),
    };

    let job = self.job_service.create_job(new_job).await?;
    Ok(job.into())
  }
}
