use std::sync::Arc;

use crate::application::common::OperationOutcome;
use crate::domain::job::{JobError, JobId, JobService};

/// Queues a finished job for invoicing. Business-rule failures come back as
/// an unsuccessful outcome; only storage failures are errors.
pub struct MarkReadyForInvoicingUseCase {
  job_service: Arc<JobService>,
}

impl MarkReadyForInvoicingUseCase {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self { job_service }
  }

  pub async fn execute(&self, job_id: String) -> Result<OperationOutcome, JobError> {
    let job_id = match JobId::parse(job_id) {
      Ok(id) => id,
      Err(e) => return Ok(OperationOutcome::failed(e.to_string())),
    };

    match self.job_service.mark_job_ready_for_invoicing(&job_id).await {
      Ok(_) => Ok(OperationOutcome::ok()),
      Err(e) if e.is_persistence() => Err(e),
      Err(e) => {
        tracing::debug!("Job {} not marked ready for invoicing: {}", job_id, e);
        Ok(OperationOutcome::failed(e.to_string()))
      }
    }
  }
}
