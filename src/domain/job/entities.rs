use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::JobError;
use super::state_machine::{self, Transition, TransitionContext};
use super::value_objects::{JobId, JobPriority, JobReference, JobStatus};
use crate::domain::company::value_objects::CompanyId;
use crate::domain::invoice::value_objects::InvoiceId;
use crate::domain::shared::{Location, Money};

/// A single transport movement from pickup to delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
  pub id: JobId,
  pub reference: JobReference,
  pub status: JobStatus,
  pub priority: JobPriority,
  pub customer_id: Option<CompanyId>,
  pub carrier_id: Option<CompanyId>,
  pub vehicle_id: Option<String>,
  pub driver_id: Option<String>,
  pub pickup: Location,
  pub delivery: Location,
  pub pickup_date: Option<NaiveDate>,
  pub delivery_date: Option<NaiveDate>,
  pub value: Money,
  pub agreed_cost_gbp: Option<Decimal>,
  pub pod_uploaded: bool,
  pub pod_document_id: Option<String>,
  pub issue_details: Option<String>,
  pub status_before_issue: Option<JobStatus>,
  pub self_invoiced: Option<bool>,
  pub invoice_id: Option<InvoiceId>,
  pub self_invoice_id: Option<InvoiceId>,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Validated input for a new job
#[derive(Debug, Clone)]
pub struct NewJob {
  pub reference: Option<JobReference>,
  pub priority: JobPriority,
  pub customer_id: Option<CompanyId>,
  pub pickup: Location,
  pub delivery: Location,
  pub pickup_date: Option<NaiveDate>,
  pub delivery_date: Option<NaiveDate>,
  pub value: Money,
  pub agreed_cost_gbp: Option<Decimal>,
  pub notes: Option<String>,
}

/// Partial edit; `None` leaves the field as it is
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
  pub priority: Option<JobPriority>,
  pub pickup: Option<Location>,
  pub delivery: Option<Location>,
  pub pickup_date: Option<NaiveDate>,
  pub delivery_date: Option<NaiveDate>,
  pub value: Option<Money>,
  pub agreed_cost_gbp: Option<Decimal>,
  pub vehicle_id: Option<String>,
  pub driver_id: Option<String>,
  pub notes: Option<String>,
}

impl JobUpdate {
  fn touches_money(&self) -> bool {
    self.value.is_some() || self.agreed_cost_gbp.is_some()
  }
}

impl Job {
  pub fn new(new_job: NewJob) -> Result<Self, JobError> {
    validate_agreed_cost(new_job.agreed_cost_gbp)?;
    validate_dates(new_job.pickup_date, new_job.delivery_date)?;

    let now = Utc::now();
    let reference = new_job
      .reference
      .unwrap_or_else(|| JobReference::generate(now.date_naive()));

    Ok(Self {
      id: JobId::generate(),
      reference,
      status: JobStatus::Booked,
      priority: new_job.priority,
      customer_id: new_job.customer_id,
      carrier_id: None,
      vehicle_id: None,
      driver_id: None,
      pickup: new_job.pickup,
      delivery: new_job.delivery,
      pickup_date: new_job.pickup_date,
      delivery_date: new_job.delivery_date,
      value: new_job.value,
      agreed_cost_gbp: new_job.agreed_cost_gbp,
      pod_uploaded: false,
      pod_document_id: None,
      issue_details: None,
      status_before_issue: None,
      self_invoiced: None,
      invoice_id: None,
      self_invoice_id: None,
      notes: new_job.notes,
      created_at: now,
      updated_at: now,
    })
  }

  /// Status `ready_for_invoicing`, or delivery complete with POD uploaded
  pub fn is_ready_for_invoicing(&self) -> bool {
    self.status == JobStatus::ReadyForInvoicing
      || (self.status.is_delivery_complete() && self.pod_uploaded)
  }

  pub fn is_self_invoiced(&self) -> bool {
    self.self_invoiced == Some(true)
  }

  /// Date used to place the job inside a self-invoice period
  pub fn job_date(&self) -> NaiveDate {
    self
      .delivery_date
      .unwrap_or_else(|| self.created_at.date_naive())
  }

  /// Facts the state machine needs; `invoice_paid` comes from the invoice
  /// side and has to be supplied by the caller.
  pub fn transition_context(&self, invoice_paid: bool) -> TransitionContext {
    TransitionContext {
      carrier_assigned: self.carrier_id.is_some(),
      pod_uploaded: self.pod_uploaded,
      ready_for_invoicing: self.is_ready_for_invoicing(),
      invoice_linked: self.invoice_id.is_some(),
      invoice_paid,
      issue_details: self.issue_details.clone(),
      status_before_issue: self.status_before_issue,
    }
  }

  /// Validates `status → to` against `context` and applies it, including
  /// issue bookkeeping on the way into and out of `issues`.
  pub fn transition_to(
    &mut self,
    to: JobStatus,
    context: &TransitionContext,
  ) -> Result<&'static Transition, JobError> {
    let transition = state_machine::validate_transition(self.status, to, context)?;

    if to == JobStatus::Issues {
      self.status_before_issue = Some(self.status);
      self.issue_details = context.issue_details.clone();
    } else if self.status == JobStatus::Issues {
      self.status_before_issue = None;
      self.issue_details = None;
    }

    // Releasing the carrier drops the whole assignment
    if self.status == JobStatus::Allocated && to == JobStatus::Booked {
      self.carrier_id = None;
      self.vehicle_id = None;
      self.driver_id = None;
    }

    self.status = to;
    self.updated_at = Utc::now();
    Ok(transition)
  }

  pub fn apply_update(&mut self, update: JobUpdate) -> Result<(), JobError> {
    if self.status == JobStatus::Archived {
      return Err(JobError::Archived(self.id.clone()));
    }
    if update.touches_money() && (self.invoice_id.is_some() || self.is_self_invoiced()) {
      return Err(JobError::AlreadyInvoiced(self.id.clone()));
    }
    validate_agreed_cost(update.agreed_cost_gbp)?;
    validate_dates(
      update.pickup_date.or(self.pickup_date),
      update.delivery_date.or(self.delivery_date),
    )?;

    if let Some(priority) = update.priority {
      self.priority = priority;
    }
    if let Some(pickup) = update.pickup {
      self.pickup = pickup;
    }
    if let Some(delivery) = update.delivery {
      self.delivery = delivery;
    }
    if update.pickup_date.is_some() {
      self.pickup_date = update.pickup_date;
    }
    if update.delivery_date.is_some() {
      self.delivery_date = update.delivery_date;
    }
    if let Some(value) = update.value {
      self.value = value;
    }
    if update.agreed_cost_gbp.is_some() {
      self.agreed_cost_gbp = update.agreed_cost_gbp;
    }
    if update.vehicle_id.is_some() {
      self.vehicle_id = update.vehicle_id;
    }
    if update.driver_id.is_some() {
      self.driver_id = update.driver_id;
    }
    if update.notes.is_some() {
      self.notes = update.notes;
    }
    self.updated_at = Utc::now();
    Ok(())
  }

  pub fn record_pod(&mut self, document_id: String) {
    self.pod_uploaded = true;
    self.pod_document_id = Some(document_id);
    self.updated_at = Utc::now();
  }

  pub fn mark_self_invoiced(&mut self, self_invoice_id: InvoiceId) {
    self.self_invoiced = Some(true);
    self.self_invoice_id = Some(self_invoice_id);
    self.updated_at = Utc::now();
  }
}

fn validate_agreed_cost(cost: Option<Decimal>) -> Result<(), JobError> {
  match cost {
    Some(cost) if cost.is_sign_negative() => Err(JobError::InvalidAgreedCost(cost)),
    _ => Ok(()),
  }
}

fn validate_dates(pickup: Option<NaiveDate>, delivery: Option<NaiveDate>) -> Result<(), JobError> {
  match (pickup, delivery) {
    (Some(pickup), Some(delivery)) if delivery < pickup => {
      Err(JobError::InvalidDates { pickup, delivery })
    }
    _ => Ok(()),
  }
}
