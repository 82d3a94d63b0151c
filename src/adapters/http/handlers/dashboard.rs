use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;

use super::require;
use crate::{
  adapters::http::errors::ApiError,
  application::dashboard::{DashboardSnapshot, DashboardStore},
  domain::access::capabilities::{DASHBOARD_READ, DASHBOARD_REFRESH},
  domain::shared::Money,
};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
  #[serde(flatten)]
  pub snapshot: DashboardSnapshot,
  pub outstanding_invoice_total: Vec<Money>,
}

async fn respond(store: &DashboardStore, snapshot: DashboardSnapshot) -> HttpResponse {
  HttpResponse::Ok().json(DashboardResponse {
    snapshot,
    outstanding_invoice_total: store.outstanding_invoice_total().await,
  })
}

/// GET /api/v1/dashboard
pub async fn get_dashboard_handler(
  store: web::Data<DashboardStore>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, DASHBOARD_READ)?;
  let snapshot = store.snapshot().await?;
  Ok(respond(&store, snapshot).await)
}

/// POST /api/v1/dashboard/refresh
pub async fn refresh_dashboard_handler(
  store: web::Data<DashboardStore>,
  http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
  require(&http_req, DASHBOARD_REFRESH)?;
  let snapshot = store.refresh().await?;
  Ok(respond(&store, snapshot).await)
}
