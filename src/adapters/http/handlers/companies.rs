use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use validator::Validate;

use super::require;
use crate::{
  adapters::http::{
    dtos::{CompanyProfileRequest, CreateCompanyRequest, ListCompaniesQuery},
    errors::ApiError,
  },
  application::company::*,
  domain::access::capabilities::{COMPANY_CREATE, COMPANY_DELETE, COMPANY_READ, COMPANY_UPDATE},
};

/// Create a customer or carrier
/// POST /api/v1/companies
pub async fn create_company_handler(
  request: web::Json<CreateCompanyRequest>,
  use_case: web::Data<Arc<CreateCompanyUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = require(&http_req, COMPANY_CREATE)?;
  request.validate()?;

  let company = use_case.execute(request.into_inner().into()).await?;
  tracing::info!("Company {} created by {}", company.id, actor.id);

  Ok(HttpResponse::Created().json(company))
}

/// GET /api/v1/companies?type=customer|carrier
pub async fn list_companies_handler(
  query: web::Query<ListCompaniesQuery>,
  use_case: web::Data<Arc<ListCompaniesUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, COMPANY_READ)?;
  let response = use_case.execute(query.into_inner().company_type).await?;
  Ok(HttpResponse::Ok().json(response))
}

/// GET /api/v1/companies/{id}
pub async fn get_company_handler(
  company_id: web::Path<String>,
  use_case: web::Data<Arc<GetCompanyUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, COMPANY_READ)?;
  let company = use_case.execute(company_id.into_inner()).await?;
  Ok(HttpResponse::Ok().json(company))
}

/// Replace the company profile; the type cannot change
/// PUT /api/v1/companies/{id}
pub async fn update_company_handler(
  company_id: web::Path<String>,
  request: web::Json<CompanyProfileRequest>,
  use_case: web::Data<Arc<UpdateCompanyUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, COMPANY_UPDATE)?;
  request.validate()?;

  let company = use_case
    .execute(request.into_inner().into_update(company_id.into_inner()))
    .await?;
  Ok(HttpResponse::Ok().json(company))
}

/// Refused with 409 while any job references the company
/// DELETE /api/v1/companies/{id}
pub async fn delete_company_handler(
  company_id: web::Path<String>,
  use_case: web::Data<Arc<DeleteCompanyUseCase>>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  let actor = require(&http_req, COMPANY_DELETE)?;
  let company_id = company_id.into_inner();

  use_case.execute(company_id.clone()).await?;
  tracing::info!("Company {} deleted by {}", company_id, actor.id);

  Ok(HttpResponse::NoContent().finish())
}
