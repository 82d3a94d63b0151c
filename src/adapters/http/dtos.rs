use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::common::LocationInput;
use crate::application::company::{CompanyProfileInput, CreateCompanyCommand, UpdateCompanyCommand};
use crate::application::invoice::{
  ChangeInvoiceStatusCommand, CreateInvoiceFromJobCommand, CreateSelfInvoiceCommand,
  ListInvoicesCommand,
};
use crate::application::job::{
  AssignCarrierCommand, CreateJobCommand, ListJobsCommand, RecordPodCommand,
  TransitionJobCommand, UpdateJobCommand,
};

lazy_static! {
  /// UK-style postcode: outward code, optional space, inward code
  static ref POSTCODE_RE: Regex =
    Regex::new(r"(?i)^[A-Z]{1,2}[0-9][A-Z0-9]?\s*[0-9][A-Z]{2}$").expect("valid postcode regex");
  static ref COUNTRY_RE: Regex = Regex::new(r"^[A-Za-z]{2}$").expect("valid country regex");
}

/// Address block used for pickup, delivery and company addresses
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LocationDto {
  #[validate(length(min = 1, max = 255, message = "Address is required"))]
  pub address: String,

  #[validate(length(min = 1, max = 100, message = "City is required"))]
  pub city: String,

  #[validate(regex(path = *POSTCODE_RE, message = "Postcode is not valid"))]
  pub postcode: String,

  #[validate(regex(path = *COUNTRY_RE, message = "Country must be a two-letter code"))]
  pub country: Option<String>,
}

impl From<LocationDto> for LocationInput {
  fn from(dto: LocationDto) -> Self {
    LocationInput {
      address: dto.address,
      city: dto.city,
      postcode: dto.postcode,
      country: dto.country,
    }
  }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateJobRequest {
  #[validate(length(min = 1, max = 64, message = "Reference must be 1-64 characters"))]
  pub reference: Option<String>,

  pub priority: Option<String>,

  pub customer_id: Option<String>,

  #[validate(nested)]
  pub pickup: LocationDto,

  #[validate(nested)]
  pub delivery: LocationDto,

  pub pickup_date: Option<NaiveDate>,
  pub delivery_date: Option<NaiveDate>,

  pub value: Decimal,

  #[validate(length(equal = 3, message = "Currency must be a three-letter code"))]
  pub currency: Option<String>,

  pub agreed_cost_gbp: Option<Decimal>,

  #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
  pub notes: Option<String>,
}

impl From<CreateJobRequest> for CreateJobCommand {
  fn from(request: CreateJobRequest) -> Self {
    CreateJobCommand {
      reference: request.reference,
      priority: request.priority,
      customer_id: request.customer_id,
      pickup: request.pickup.into(),
      delivery: request.delivery.into(),
      pickup_date: request.pickup_date,
      delivery_date: request.delivery_date,
      value: request.value,
      currency: request.currency,
      agreed_cost_gbp: request.agreed_cost_gbp,
      notes: request.notes,
    }
  }
}

/// Partial update; absent fields are left alone. The reference and status
/// are not accepted here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateJobRequest {
  pub priority: Option<String>,

  #[validate(nested)]
  pub pickup: Option<LocationDto>,

  #[validate(nested)]
  pub delivery: Option<LocationDto>,

  pub pickup_date: Option<NaiveDate>,
  pub delivery_date: Option<NaiveDate>,
  pub value: Option<Decimal>,

  #[validate(length(equal = 3, message = "Currency must be a three-letter code"))]
  pub currency: Option<String>,

  pub agreed_cost_gbp: Option<Decimal>,

  #[validate(length(min = 1, max = 64))]
  pub vehicle_id: Option<String>,

  #[validate(length(min = 1, max = 64))]
  pub driver_id: Option<String>,

  #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
  pub notes: Option<String>,
}

impl UpdateJobRequest {
  pub fn into_command(self, job_id: String) -> UpdateJobCommand {
    UpdateJobCommand {
      job_id,
      priority: self.priority,
      pickup: self.pickup.map(Into::into),
      delivery: self.delivery.map(Into::into),
      pickup_date: self.pickup_date,
      delivery_date: self.delivery_date,
      value: self.value,
      currency: self.currency,
      agreed_cost_gbp: self.agreed_cost_gbp,
      vehicle_id: self.vehicle_id,
      driver_id: self.driver_id,
      notes: self.notes,
    }
  }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AssignCarrierRequest {
  #[validate(length(min = 1, message = "Carrier is required"))]
  pub carrier_id: String,

  #[validate(length(min = 1, max = 64))]
  pub vehicle_id: Option<String>,

  #[validate(length(min = 1, max = 64))]
  pub driver_id: Option<String>,
}

impl AssignCarrierRequest {
  pub fn into_command(self, job_id: String) -> AssignCarrierCommand {
    AssignCarrierCommand {
      job_id,
      carrier_id: self.carrier_id,
      vehicle_id: self.vehicle_id,
      driver_id: self.driver_id,
    }
  }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RecordPodRequest {
  #[validate(length(min = 1, max = 255, message = "Document id is required"))]
  pub document_id: String,
}

impl RecordPodRequest {
  pub fn into_command(self, job_id: String) -> RecordPodCommand {
    RecordPodCommand {
      job_id,
      document_id: self.document_id,
    }
  }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TransitionJobRequest {
  #[validate(length(min = 1, message = "Target status is required"))]
  pub to: String,

  #[validate(length(max = 2000))]
  pub issue_details: Option<String>,
}

impl TransitionJobRequest {
  pub fn into_command(self, job_id: String) -> TransitionJobCommand {
    TransitionJobCommand {
      job_id,
      to: self.to,
      issue_details: self.issue_details,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListJobsQuery {
  pub status: Option<String>,
  pub customer_id: Option<String>,
  pub carrier_id: Option<String>,
}

impl From<ListJobsQuery> for ListJobsCommand {
  fn from(query: ListJobsQuery) -> Self {
    ListJobsCommand {
      status: query.status,
      customer_id: query.customer_id,
      carrier_id: query.carrier_id,
    }
  }
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateInvoiceFromJobRequest {
  pub tax_rate_percent: Option<Decimal>,

  #[validate(range(max = 365, message = "Payment terms cannot exceed 365 days"))]
  pub payment_term_days: Option<u32>,

  pub invoice_date: Option<NaiveDate>,
}

impl CreateInvoiceFromJobRequest {
  pub fn into_command(self, job_id: String) -> CreateInvoiceFromJobCommand {
    CreateInvoiceFromJobCommand {
      job_id,
      tax_rate_percent: self.tax_rate_percent,
      payment_term_days: self.payment_term_days,
      invoice_date: self.invoice_date,
    }
  }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateSelfInvoiceRequest {
  #[validate(length(min = 1, message = "Carrier is required"))]
  pub carrier_id: String,

  #[validate(length(min = 1, message = "At least one job is required"))]
  pub job_ids: Vec<String>,

  pub period_start: NaiveDate,
  pub period_end: NaiveDate,
}

impl From<CreateSelfInvoiceRequest> for CreateSelfInvoiceCommand {
  fn from(request: CreateSelfInvoiceRequest) -> Self {
    CreateSelfInvoiceCommand {
      carrier_id: request.carrier_id,
      job_ids: request.job_ids,
      period_start: request.period_start,
      period_end: request.period_end,
    }
  }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ChangeInvoiceStatusRequest {
  #[validate(length(min = 1, message = "Status is required"))]
  pub status: String,
}

impl ChangeInvoiceStatusRequest {
  pub fn into_command(self, invoice_id: String) -> ChangeInvoiceStatusCommand {
    ChangeInvoiceStatusCommand {
      invoice_id,
      new_status: self.status,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkOverdueRequest {
  /// Sweep as of this date instead of today
  pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListInvoicesQuery {
  pub status: Option<String>,
  pub kind: Option<String>,
  pub company_id: Option<String>,
}

impl From<ListInvoicesQuery> for ListInvoicesCommand {
  fn from(query: ListInvoicesQuery) -> Self {
    ListInvoicesCommand {
      status: query.status,
      kind: query.kind,
      company_id: query.company_id,
    }
  }
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CompanyProfileRequest {
  #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
  pub name: String,

  pub credit_limit: Option<Decimal>,

  #[validate(length(max = 255))]
  pub contact_name: Option<String>,

  #[validate(email(message = "Invalid email format"))]
  pub contact_email: Option<String>,

  #[validate(length(max = 50))]
  pub contact_phone: Option<String>,

  #[validate(nested)]
  pub address: Option<LocationDto>,

  pub metadata: Option<serde_json::Value>,
}

impl From<CompanyProfileRequest> for CompanyProfileInput {
  fn from(request: CompanyProfileRequest) -> Self {
    CompanyProfileInput {
      name: request.name,
      credit_limit: request.credit_limit,
      contact_name: request.contact_name,
      contact_email: request.contact_email,
      contact_phone: request.contact_phone,
      address: request.address.map(Into::into),
      metadata: request.metadata,
    }
  }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateCompanyRequest {
  #[validate(length(min = 1, message = "Company type is required"))]
  pub company_type: String,

  #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
  pub name: String,

  pub credit_limit: Option<Decimal>,

  #[validate(length(max = 255))]
  pub contact_name: Option<String>,

  #[validate(email(message = "Invalid email format"))]
  pub contact_email: Option<String>,

  #[validate(length(max = 50))]
  pub contact_phone: Option<String>,

  #[validate(nested)]
  pub address: Option<LocationDto>,

  pub metadata: Option<serde_json::Value>,
}

impl From<CreateCompanyRequest> for CreateCompanyCommand {
  fn from(request: CreateCompanyRequest) -> Self {
    CreateCompanyCommand {
      company_type: request.company_type,
      profile: CompanyProfileInput {
        name: request.name,
        credit_limit: request.credit_limit,
        contact_name: request.contact_name,
        contact_email: request.contact_email,
        contact_phone: request.contact_phone,
        address: request.address.map(Into::into),
        metadata: request.metadata,
      },
    }
  }
}

impl CompanyProfileRequest {
  pub fn into_update(self, company_id: String) -> UpdateCompanyCommand {
    UpdateCompanyCommand {
      company_id,
      profile: self.into(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCompaniesQuery {
  #[serde(rename = "type")]
  pub company_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Webhooks & misc
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookQuery {
  pub integration_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
  pub status: &'static str,
  pub version: &'static str,
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
  /// Error type/code
  pub error: String,

  /// Human-readable error message
  pub message: String,

  /// Optional detailed error information
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::application::validation::FieldErrors;
  use rust_decimal_macros::dec;
  use serde_json::json;

  fn location() -> serde_json::Value {
    json!({"address": "1 Quay St", "city": "Leeds", "postcode": "LS1 4AP"})
  }

  #[test]
  fn test_create_job_request_valid() {
    let request: CreateJobRequest = serde_json::from_value(json!({
      "pickup": location(),
      "delivery": {"address": "2 Dock Rd", "city": "Bristol", "postcode": "bs16qa", "country": "gb"},
      "value": "1000.00",
      "agreed_cost_gbp": 650
    }))
    .unwrap();

    assert!(request.validate().is_ok());
    let command = CreateJobCommand::from(request);
    assert_eq!(command.value, dec!(1000.00));
    assert_eq!(command.delivery.country.as_deref(), Some("gb"));
  }

  #[test]
  fn test_nested_location_errors_are_keyed_by_path() {
    let request: CreateJobRequest = serde_json::from_value(json!({
      "pickup": {"address": "1 Quay St", "city": "", "postcode": "NOT A POSTCODE"},
      "delivery": location(),
      "value": 10
    }))
    .unwrap();

    let errors = FieldErrors::from(&request.validate().unwrap_err());
    assert_eq!(errors.get("pickup.city").unwrap(), ["City is required"]);
    assert_eq!(
      errors.get("pickup.postcode").unwrap(),
      ["Postcode is not valid"]
    );
    assert!(errors.get("delivery.city").is_none());
  }

  #[test]
  fn test_unknown_fields_are_rejected() {
    let result: Result<UpdateJobRequest, _> =
      serde_json::from_value(json!({"job_reference": "JOB-1"}));
    assert!(result.is_err());

    let result: Result<UpdateJobRequest, _> = serde_json::from_value(json!({"status": "finished"}));
    assert!(result.is_err());
  }

  #[test]
  fn test_self_invoice_request_requires_jobs() {
    let request: CreateSelfInvoiceRequest = serde_json::from_value(json!({
      "carrier_id": "carrier_1",
      "job_ids": [],
      "period_start": "2026-10-01",
      "period_end": "2026-10-31"
    }))
    .unwrap();

    let errors = FieldErrors::from(&request.validate().unwrap_err());
    assert_eq!(
      errors.first_message(),
      Some("At least one job is required")
    );
  }

  #[test]
  fn test_create_company_request_validates_contact() {
    let request: CreateCompanyRequest = serde_json::from_value(json!({
      "company_type": "carrier",
      "name": "Pennine Haulage",
      "contact_email": "not-an-email"
    }))
    .unwrap();

    let errors = FieldErrors::from(&request.validate().unwrap_err());
    assert_eq!(
      errors.get("contact_email").unwrap(),
      ["Invalid email format"]
    );

    let command = CreateCompanyCommand::from(request);
    assert_eq!(command.profile.name, "Pennine Haulage");
  }
}
