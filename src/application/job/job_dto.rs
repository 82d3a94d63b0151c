use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::job::{Job, Transition};
use crate::domain::shared::Location;

/// Job as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct JobDto {
  pub id: String,
  pub reference: String,
  pub status: String,
  pub priority: String,
  pub customer_id: Option<String>,
  pub carrier_id: Option<String>,
  pub vehicle_id: Option<String>,
  pub driver_id: Option<String>,
  pub pickup: Location,
  pub delivery: Location,
  pub pickup_date: Option<NaiveDate>,
  pub delivery_date: Option<NaiveDate>,
  pub value: Decimal,
  pub currency: String,
  pub agreed_cost_gbp: Option<Decimal>,
  pub pod_uploaded: bool,
  pub pod_document_id: Option<String>,
  pub issue_details: Option<String>,
  pub status_before_issue: Option<String>,
  pub self_invoiced: Option<bool>,
  pub invoice_id: Option<String>,
  pub self_invoice_id: Option<String>,
  pub ready_for_invoicing: bool,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobDto {
  fn from(job: Job) -> Self {
    let ready_for_invoicing = job.is_ready_for_invoicing();
    Self {
      id: job.id.into(),
      reference: job.reference.into_inner(),
      status: job.status.as_str().to_string(),
      priority: job.priority.as_str().to_string(),
      customer_id: job.customer_id.map(Into::into),
      carrier_id: job.carrier_id.map(Into::into),
      vehicle_id: job.vehicle_id,
      driver_id: job.driver_id,
      pickup: job.pickup,
      delivery: job.delivery,
      pickup_date: job.pickup_date,
      delivery_date: job.delivery_date,
      value: job.value.amount,
      currency: job.value.currency.as_str().to_string(),
      agreed_cost_gbp: job.agreed_cost_gbp,
      pod_uploaded: job.pod_uploaded,
      pod_document_id: job.pod_document_id,
      issue_details: job.issue_details,
      status_before_issue: job.status_before_issue.map(|s| s.as_str().to_string()),
      self_invoiced: job.self_invoiced,
      invoice_id: job.invoice_id.map(Into::into),
      self_invoice_id: job.self_invoice_id.map(Into::into),
      ready_for_invoicing,
      notes: job.notes,
      created_at: job.created_at,
      updated_at: job.updated_at,
    }
  }
}

/// A declared next step out of a job's current status
#[derive(Debug, Clone, Serialize)]
pub struct TransitionDto {
  pub to: String,
  pub label: String,
  pub action: Option<String>,
}

impl From<&Transition> for TransitionDto {
  fn from(transition: &Transition) -> Self {
    Self {
      to: transition.to.as_str().to_string(),
      label: transition.label.to_string(),
      action: transition.action.map(|a| a.as_str().to_string()),
    }
  }
}
