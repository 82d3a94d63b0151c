use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use super::require;
use crate::{
  adapters::http::{
    dtos::{
      AssignCarrierRequest, CreateJobRequest, ListJobsQuery, RecordPodRequest,
      TransitionJobRequest, UpdateJobRequest,
    },
    errors::ApiError,
  },
  application::job::*,
  domain::access::capabilities::{JOB_CREATE, JOB_INVOICE, JOB_READ, JOB_TRANSITION, JOB_UPDATE},
};

/// Create a booked job
/// POST /api/v1/jobs
pub async fn create_job_handler(
  request: web::Json<CreateJobRequest>,
  use_case: web::Data<Arc<CreateJobUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = require(&http_req, JOB_CREATE)?;
  request.validate()?;

  let job = use_case.execute(request.into_inner().into()).await?;
  tracing::info!("Job {} ({}) created by {}", job.id, job.reference, actor.id);

  Ok(HttpResponse::Created().json(job))
}

/// GET /api/v1/jobs?status=&customer_id=&carrier_id=
pub async fn list_jobs_handler(
  query: web::Query<ListJobsQuery>,
  use_case: web::Data<Arc<ListJobsUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, JOB_READ)?;
  let response = use_case.execute(query.into_inner().into()).await?;
  Ok(HttpResponse::Ok().json(response))
}

/// GET /api/v1/jobs/ready-for-invoicing
pub async fn list_ready_for_invoicing_handler(
  use_case: web::Data<Arc<GetJobsReadyForInvoicingUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, JOB_READ)?;
  let response = use_case.execute().await?;
  Ok(HttpResponse::Ok().json(response))
}

/// GET /api/v1/jobs/{id}
pub async fn get_job_handler(
  job_id: web::Path<String>,
  use_case: web::Data<Arc<GetJobUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, JOB_READ)?;
  let job = use_case.execute(job_id.into_inner()).await?;
  Ok(HttpResponse::Ok().json(job))
}

/// Partial update of booking details
/// PATCH /api/v1/jobs/{id}
pub async fn update_job_handler(
  job_id: web::Path<String>,
  request: web::Json<UpdateJobRequest>,
  use_case: web::Data<Arc<UpdateJobUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, JOB_UPDATE)?;
  request.validate()?;

  let job = use_case
    .execute(request.into_inner().into_command(job_id.into_inner()))
    .await?;
  Ok(HttpResponse::Ok().json(job))
}

/// POST /api/v1/jobs/{id}/assign-carrier
pub async fn assign_carrier_handler(
  job_id: web::Path<String>,
  request: web::Json<AssignCarrierRequest>,
  use_case: web::Data<Arc<AssignCarrierUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = require(&http_req, JOB_TRANSITION)?;
  request.validate()?;

  let job = use_case
    .execute(request.into_inner().into_command(job_id.into_inner()))
    .await?;
  tracing::info!("Job {} now {} (assigned by {})", job.id, job.status, actor.id);

  Ok(HttpResponse::Ok().json(job))
}

/// Record the proof-of-delivery document
/// POST /api/v1/jobs/{id}/pod
pub async fn record_pod_handler(
  job_id: web::Path<String>,
  request: web::Json<RecordPodRequest>,
  use_case: web::Data<Arc<RecordPodUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, JOB_TRANSITION)?;
  request.validate()?;

  let job = use_case
    .execute(request.into_inner().into_command(job_id.into_inner()))
    .await?;
  Ok(HttpResponse::Ok().json(job))
}

/// POST /api/v1/jobs/{id}/transition
pub async fn transition_job_handler(
  job_id: web::Path<String>,
  request: web::Json<TransitionJobRequest>,
  use_case: web::Data<Arc<TransitionJobUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = require(&http_req, JOB_TRANSITION)?;
  request.validate()?;

  let job = use_case
    .execute(request.into_inner().into_command(job_id.into_inner()))
    .await?;
  tracing::info!("Job {} moved to {} by {}", job.id, job.status, actor.id);

  Ok(HttpResponse::Ok().json(job))
}

/// Clear an issue and return the job to where it was
/// POST /api/v1/jobs/{id}/resolve-issue
pub async fn resolve_issue_handler(
  job_id: web::Path<String>,
  use_case: web::Data<Arc<ResolveIssueUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, JOB_TRANSITION)?;
  let job = use_case.execute(job_id.into_inner()).await?;
  Ok(HttpResponse::Ok().json(job))
}

/// Rule failures come back as `{"success": false, "error": ...}` with 200
/// POST /api/v1/jobs/{id}/ready-for-invoicing
pub async fn mark_ready_for_invoicing_handler(
  job_id: web::Path<String>,
  use_case: web::Data<Arc<MarkReadyForInvoicingUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, JOB_INVOICE)?;
  let outcome = use_case.execute(job_id.into_inner()).await?;
  Ok(HttpResponse::Ok().json(outcome))
}

/// GET /api/v1/jobs/{id}/transitions
pub async fn get_job_transitions_handler(
  job_id: web::Path<String>,
  use_case: web::Data<Arc<GetJobTransitionsUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, JOB_READ)?;
  let response = use_case.execute(job_id.into_inner()).await?;
  Ok(HttpResponse::Ok().json(response))
}
