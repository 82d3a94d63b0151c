use std::sync::Arc;

use super::job_dto::JobDto;
use crate::domain::company::CompanyId;
use crate::domain::job::{CarrierAssignment, JobError, JobId, JobService};

#[derive(Debug, Clone)]
pub struct AssignCarrierCommand {
  pub job_id: String,
  pub carrier_id: String,
  pub vehicle_id: Option<String>,
  pub driver_id: Option<String>,
}

pub struct AssignCarrierUseCase {
  job_service: Arc<JobService>,
}

impl AssignCarrierUseCase {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self { job_service }
  }

  pub async fn execute(&self, command: AssignCarrierCommand) -> Result<JobDto, JobError> {
    let job_id = JobId::parse(command.job_id)?;
    let assignment = CarrierAssignment {
      carrier_id: CompanyId::parse(command.carrier_id)?,
      vehicle_id: command.vehicle_id,
      driver_id: command.driver_id,
    };

    let job = self.job_service.assign_carrier(&job_id, assignment).await?;
    Ok(job.into())
  }
}
