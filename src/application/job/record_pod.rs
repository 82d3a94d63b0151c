use std::sync::Arc;

use super::job_dto::JobDto;
use crate::domain::job::{JobError, JobId, JobService};

#[derive(Debug, Clone)]
pub struct RecordPodCommand {
  pub job_id: String,
  pub document_id: String,
}

/// Records an uploaded proof-of-delivery document against a job
pub struct RecordPodUseCase {
  job_service: Arc<JobService>,
}

impl RecordPodUseCase {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self { job_service }
  }

  pub async fn execute(&self, command: RecordPodCommand) -> Result<JobDto, JobError> {
    let job_id = JobId::parse(command.job_id)?;
    let job = self
      .job_service
      .record_pod(&job_id, command.document_id.trim().to_string())
      .await?;
    Ok(job.into())
  }
}
