use std::str::FromStr;
use std::sync::Arc;

use super::job_dto::JobDto;
use crate::domain::job::{JobError, JobId, JobService, JobStatus};

#[derive(Debug, Clone)]
pub struct TransitionJobCommand {
  pub job_id: String,
  pub to: String,
  pub issue_details: Option<String>,
}

/// Moves a job to a new status. Reporting an issue and archiving go through
/// their dedicated service operations so their bookkeeping is applied.
pub struct TransitionJobUseCase {
  job_service: Arc<JobService>,
}

impl TransitionJobUseCase {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self { job_service }
  }

  pub async fn execute(&self, command: TransitionJobCommand) -> Result<JobDto, JobError> {
    let job_id = JobId::parse(command.job_id)?;
    let to = JobStatus::from_str(&command.to)?;

    let job = match to {
      JobStatus::Issues => {
        let details = command.issue_details.unwrap_or_default();
        self.job_service.report_issue(&job_id, details).await?
      }
      JobStatus::Archived => self.job_service.archive_job(&job_id).await?,
      _ => self.job_service.transition_job(&job_id, to, None).await?,
    };

    Ok(job.into())
  }
}

pub struct ResolveIssueUseCase {
  job_service: Arc<JobService>,
}

impl ResolveIssueUseCase {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self { job_service }
  }

  pub async fn execute(&self, job_id: String) -> Result<JobDto, JobError> {
    let job_id = JobId::parse(job_id)?;
    Ok(self.job_service.resolve_issue(&job_id).await?.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::job::entities::tests::new_job;
  use crate::infrastructure::persistence::memory::test_support::services;

  #[tokio::test]
  async fn test_issue_round_trip_restores_previous_status() {
    let (_, svc) = services();
    let job = svc.jobs.create_job(new_job()).await.unwrap();
    let jobs = Arc::new(svc.jobs);
    let transition = TransitionJobUseCase::new(jobs.clone());
    let resolve = ResolveIssueUseCase::new(jobs);

    let missing_details = transition
      .execute(TransitionJobCommand {
        job_id: job.id.to_string(),
        to: "issues".to_string(),
        issue_details: None,
      })
      .await;
    assert!(matches!(missing_details, Err(JobError::Transition(_))));

    let reported = transition
      .execute(TransitionJobCommand {
        job_id: job.id.to_string(),
        to: "issues".to_string(),
        issue_details: Some("Tail lift broken".to_string()),
      })
      .await
      .unwrap();
    assert_eq!(reported.status, "issues");
    assert_eq!(reported.status_before_issue.as_deref(), Some("booked"));
    assert_eq!(reported.issue_details.as_deref(), Some("Tail lift broken"));

    let resolved = resolve.execute(job.id.to_string()).await.unwrap();
    assert_eq!(resolved.status, "booked");
    assert_eq!(resolved.issue_details, None);
  }

  #[tokio::test]
  async fn test_unknown_status_is_a_validation_error() {
    let (_, svc) = services();
    let job = svc.jobs.create_job(new_job()).await.unwrap();
    let use_case = TransitionJobUseCase::new(Arc::new(svc.jobs));

    let result = use_case
      .execute(TransitionJobCommand {
        job_id: job.id.to_string(),
        to: "teleported".to_string(),
        issue_details: None,
      })
      .await;
    assert!(matches!(result, Err(JobError::Validation(_))));
  }
}
