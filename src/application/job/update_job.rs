use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use super::job_dto::JobDto;
use crate::application::common::LocationInput;
use crate::domain::job::{JobError, JobId, JobPriority, JobService, JobUpdate};
use crate::domain::shared::{Currency, Money};

#[derive(Debug, Clone, Default)]
pub struct UpdateJobCommand {
  pub job_id: String,
  pub priority: Option<String>,
  pub pickup: Option<LocationInput>,
  pub delivery: Option<LocationInput>,
  pub pickup_date: Option<NaiveDate>,
  pub delivery_date: Option<NaiveDate>,
  pub value: Option<Decimal>,
  pub currency: Option<String>,
  pub agreed_cost_gbp: Option<Decimal>,
  pub vehicle_id: Option<String>,
  pub driver_id: Option<String>,
  pub notes: Option<String>,
}

pub struct UpdateJobUseCase {
  job_service: Arc<JobService>,
}

impl UpdateJobUseCase {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self { job_service }
  }

  pub async fn execute(&self, command: UpdateJobCommand) -> Result<JobDto, JobError> {
    let job_id = JobId::parse(command.job_id)?;

    let value = match command.value {
      Some(amount) => {
        let currency = match command.currency.as_deref() {
          Some(code) => Currency::from_str(code)?,
          None => self.job_service.get_job(&job_id).await?.value.currency,
        };
        Some(Money::new(amount, currency)?)
      }
      None => None,
    };

    let update = JobUpdate {
      priority: command
        .priority
        .as_deref()
        .map(JobPriority::from_str)
        .transpose()?,
      pickup: command.pickup.map(LocationInput::into_location).transpose()?,
      delivery: command
        .delivery
        .map(LocationInput::into_location)
        .transpose()?,
      pickup_date: command.pickup_date,
      delivery_date: command.delivery_date,
      value,
      agreed_cost_gbp: command.agreed_cost_gbp,
      vehicle_id: command.vehicle_id,
      driver_id: command.driver_id,
      notes: command.notes,
    };

    let job = self.job_service.update_job(&job_id, update).await?;
    Ok(job.into())
  }
}
