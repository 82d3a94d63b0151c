use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use super::{optional_json, require};
use crate::{
  adapters::http::{
    dtos::{
      ChangeInvoiceStatusRequest, CreateInvoiceFromJobRequest, CreateSelfInvoiceRequest,
      ListInvoicesQuery, MarkOverdueRequest,
    },
    errors::ApiError,
  },
  application::invoice::*,
  domain::access::capabilities::{INVOICE_CREATE, INVOICE_READ, INVOICE_UPDATE, JOB_INVOICE},
};

/// Raise a customer invoice for a job that is ready for invoicing.
/// The body is optional; rule failures come back as a 200 outcome.
/// POST /api/v1/invoices/from-job/{job_id}
pub async fn create_invoice_from_job_handler(
  job_id: web::Path<String>,
  body: web::Bytes,
  use_case: web::Data<Arc<CreateInvoiceFromJobUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = require(&http_req, JOB_INVOICE)?;
  let request: CreateInvoiceFromJobRequest = optional_json(&body)?;
  request.validate()?;

  let outcome = use_case
    .execute(request.into_command(job_id.into_inner()))
    .await?;
  if let Some(invoice_id) = &outcome.invoice_id {
    tracing::info!("Invoice {} raised by {}", invoice_id, actor.id);
  }

  Ok(HttpResponse::Ok().json(outcome))
}

/// POST /api/v1/invoices/self-invoice
pub async fn create_self_invoice_handler(
  request: web::Json<CreateSelfInvoiceRequest>,
  use_case: web::Data<Arc<CreateSelfInvoiceUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = require(&http_req, INVOICE_CREATE)?;
  request.validate()?;

  let outcome = use_case.execute(request.into_inner().into()).await?;
  if let Some(invoice_id) = &outcome.invoice_id {
    tracing::info!("Self-invoice {} raised by {}", invoice_id, actor.id);
  }

  Ok(HttpResponse::Ok().json(outcome))
}

/// GET /api/v1/invoices?status=&kind=&company_id=
pub async fn list_invoices_handler(
  query: web::Query<ListInvoicesQuery>,
  use_case: web::Data<Arc<ListInvoicesUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, INVOICE_READ)?;
  let response = use_case.execute(query.into_inner().into()).await?;
  Ok(HttpResponse::Ok().json(response))
}

/// GET /api/v1/invoices/summary
pub async fn invoice_summary_handler(
  use_case: web::Data<Arc<GetInvoiceSummaryUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, INVOICE_READ)?;
  let response = use_case.execute().await?;
  Ok(HttpResponse::Ok().json(response))
}

/// GET /api/v1/invoices/{id}
pub async fn get_invoice_handler(
  invoice_id: web::Path<String>,
  use_case: web::Data<Arc<GetInvoiceUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, INVOICE_READ)?;
  let invoice = use_case.execute(invoice_id.into_inner()).await?;
  Ok(HttpResponse::Ok().json(invoice))
}

/// POST /api/v1/invoices/{id}/status
pub async fn change_invoice_status_handler(
  invoice_id: web::Path<String>,
  request: web::Json<ChangeInvoiceStatusRequest>,
  use_case: web::Data<Arc<ChangeInvoiceStatusUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = require(&http_req, INVOICE_UPDATE)?;
  request.validate()?;

  let response = use_case
    .execute(request.into_inner().into_command(invoice_id.into_inner()))
    .await?;
  tracing::info!(
    "Invoice {} set to {} by {}",
    response.invoice_id,
    response.status,
    actor.id
  );

  Ok(HttpResponse::Ok().json(response))
}

/// Flag sent invoices past their due date
/// POST /api/v1/invoices/mark-overdue
pub async fn mark_overdue_handler(
  body: web::Bytes,
  use_case: web::Data<Arc<MarkOverdueInvoicesUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, INVOICE_UPDATE)?;
  let request: MarkOverdueRequest = optional_json(&body)?;

  let response = use_case.execute(request.as_of).await?;
  Ok(HttpResponse::Ok().json(response))
}

/// POST /api/v1/invoices/{id}/payment-intent
pub async fn create_payment_intent_handler(
  invoice_id: web::Path<String>,
  use_case: web::Data<Arc<CreatePaymentIntentUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, INVOICE_READ)?;
  let response = use_case.execute(invoice_id.into_inner()).await?;
  Ok(HttpResponse::Ok().json(response))
}
