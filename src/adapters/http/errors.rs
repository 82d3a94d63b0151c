use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use serde_json::json;

use crate::application::dashboard::DashboardError;
use crate::application::invoice::PaymentIntentError;
use crate::application::validation::FieldErrors;
use crate::domain::access::AccessError;
use crate::domain::company::CompanyError;
use crate::domain::invoice::InvoiceError;
use crate::domain::job::{JobError, TransitionError};
use crate::domain::payment::PaymentError;
use crate::domain::shared::{RepositoryError, ValueObjectError};
use crate::domain::webhook::WebhookError;

use super::dtos::ErrorResponse;

/// API error type that maps domain errors to HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  /// 400; `details` carries the field-path map when validation came from a DTO
  #[error("Validation error: {message}")]
  Validation {
    message: String,
    details: Option<FieldErrors>,
  },

  #[error("Unauthorized: {0}")]
  Unauthorized(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Not found: {0}")]
  NotFound(String),

  /// 409 for illegal transitions, unmet preconditions and write conflicts
  #[error("{message}")]
  Conflict {
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
  },

  #[error("Unsupported media type: {0}")]
  UnsupportedMediaType(String),

  /// 503 when no payment processor is configured
  #[error("Service unavailable: {0}")]
  ServiceUnavailable(String),

  /// 502 when the payment processor failed or refused
  #[error("Bad gateway: {0}")]
  BadGateway(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn validation(message: impl Into<String>) -> Self {
    ApiError::Validation {
      message: message.into(),
      details: None,
    }
  }

  fn conflict(code: &'static str, message: impl ToString) -> Self {
    ApiError::Conflict {
      code,
      message: message.to_string(),
      details: None,
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict { .. } => StatusCode::CONFLICT,
      ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
      ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let (error_type, message, details) = match self {
      ApiError::Validation { message, details } => (
        "validation_error",
        message.clone(),
        details
          .as_ref()
          .and_then(|fields| serde_json::to_value(fields).ok()),
      ),
      ApiError::Unauthorized(msg) => ("unauthorized", msg.clone(), None),
      ApiError::Forbidden(msg) => ("forbidden", msg.clone(), None),
      ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
      ApiError::Conflict {
        code,
        message,
        details,
      } => (*code, message.clone(), details.clone()),
      ApiError::UnsupportedMediaType(msg) => ("unsupported_media_type", msg.clone(), None),
      ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone(), None),
      ApiError::BadGateway(msg) => {
        tracing::warn!("Payment processor error: {}", msg);
        ("bad_gateway", msg.clone(), None)
      }
      ApiError::Internal(msg) => {
        // Don't expose internal error details
        tracing::error!("Internal error: {}", msg);
        (
          "internal_error",
          "An internal server error occurred".to_string(),
          None,
        )
      }
    };

    let error_response = ErrorResponse {
      error: error_type.to_string(),
      message,
      details,
    };

    HttpResponse::build(status)
      .content_type(ContentType::json())
      .json(error_response)
  }
}

/// Convert validation errors from validator crate
impl From<validator::ValidationErrors> for ApiError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let fields = FieldErrors::from(&errors);
    let message = fields
      .first_message()
      .unwrap_or("Request validation failed")
      .to_string();

    ApiError::Validation {
      message,
      details: Some(fields),
    }
  }
}

impl From<ValueObjectError> for ApiError {
  fn from(error: ValueObjectError) -> Self {
    ApiError::validation(error.to_string())
  }
}

impl From<RepositoryError> for ApiError {
  fn from(error: RepositoryError) -> Self {
    match error {
      RepositoryError::NotFound => ApiError::NotFound("Record not found".to_string()),
      RepositoryError::DuplicateKey(_) => ApiError::conflict("duplicate", error),
      RepositoryError::Conflict(_) => ApiError::conflict("conflict", error),
      RepositoryError::CorruptRecord(_) | RepositoryError::Database(_) => {
        ApiError::Internal(error.to_string())
      }
    }
  }
}

impl From<TransitionError> for ApiError {
  fn from(error: TransitionError) -> Self {
    let code = match error {
      TransitionError::IllegalTransition { .. } => "illegal_transition",
      TransitionError::PreconditionNotMet { .. } => "precondition_not_met",
    };
    ApiError::conflict(code, error)
  }
}

impl From<JobError> for ApiError {
  fn from(error: JobError) -> Self {
    match error {
      JobError::NotFound(_) | JobError::CompanyNotFound(_) => ApiError::NotFound(error.to_string()),
      JobError::NotACustomer(_)
      | JobError::NotACarrier(_)
      | JobError::InvalidAgreedCost(_)
      | JobError::InvalidDates { .. } => ApiError::validation(error.to_string()),
      JobError::Archived(_) | JobError::AlreadyInvoiced(_) => {
        ApiError::conflict("conflict", error)
      }
      JobError::NotEligibleForInvoicing(_) | JobError::PodMissing(_) => {
        ApiError::conflict("precondition_not_met", error)
      }
      JobError::Transition(e) => e.into(),
      JobError::Validation(e) => e.into(),
      JobError::Repository(e) => e.into(),
    }
  }
}

impl From<InvoiceError> for ApiError {
  fn from(error: InvoiceError) -> Self {
    match error {
      InvoiceError::NotFound(_) | InvoiceError::JobNotFound(_) | InvoiceError::CarrierNotFound(_) => {
        ApiError::NotFound(error.to_string())
      }
      InvoiceError::JobNotReady { .. } => ApiError::conflict("precondition_not_met", error),
      InvoiceError::JobAlreadyInvoiced(_)
      | InvoiceError::JobAlreadySelfInvoiced(_)
      | InvoiceError::NotPayable(_) => ApiError::conflict("conflict", error),
      InvoiceError::InvalidStatusTransition { .. } => {
        ApiError::conflict("illegal_transition", error)
      }
      InvoiceError::MissingCustomer(_)
      | InvoiceError::NotACarrier(_)
      | InvoiceError::EmptyBatch
      | InvoiceError::DuplicateJob(_)
      | InvoiceError::InvalidPeriod { .. }
      | InvoiceError::JobNotOwnedByCarrier { .. }
      | InvoiceError::JobOutsidePeriod { .. }
      | InvoiceError::MissingAgreedCost(_)
      | InvoiceError::InvalidDueDate(_) => ApiError::validation(error.to_string()),
      InvoiceError::Job(e) => e.into(),
      InvoiceError::Validation(e) => e.into(),
      InvoiceError::Repository(e) => e.into(),
    }
  }
}

/// Convert CompanyError to ApiError
impl From<CompanyError> for ApiError {
  fn from(error: CompanyError) -> Self {
    match error {
      CompanyError::NotFound(_) => ApiError::NotFound(error.to_string()),
      CompanyError::ReferentialIntegrity {
        ref company_id,
        job_count,
      } => ApiError::Conflict {
        code: "referential_integrity",
        details: Some(json!({
          "company_id": company_id.as_str(),
          "job_count": job_count,
        })),
        message: error.to_string(),
      },
      CompanyError::InvalidCreditLimit(_) | CompanyError::InvalidMetadata => {
        ApiError::validation(error.to_string())
      }
      CompanyError::Validation(e) => e.into(),
      CompanyError::Repository(e) => e.into(),
    }
  }
}

impl From<AccessError> for ApiError {
  fn from(error: AccessError) -> Self {
    match error {
      AccessError::MissingActor | AccessError::UnknownRole(_) => {
        ApiError::Unauthorized(error.to_string())
      }
      AccessError::Forbidden { .. } => ApiError::Forbidden(error.to_string()),
    }
  }
}

impl From<WebhookError> for ApiError {
  fn from(error: WebhookError) -> Self {
    match error {
      WebhookError::MissingIntegrationId
      | WebhookError::InvalidIntegrationId(_)
      | WebhookError::InvalidPayload(_) => ApiError::validation(error.to_string()),
      WebhookError::UnsupportedContentType(_) => ApiError::UnsupportedMediaType(error.to_string()),
      WebhookError::Repository(e) => e.into(),
    }
  }
}

impl From<PaymentError> for ApiError {
  fn from(error: PaymentError) -> Self {
    match error {
      PaymentError::NotConfigured => ApiError::ServiceUnavailable(error.to_string()),
      _ => ApiError::BadGateway(error.to_string()),
    }
  }
}

impl From<PaymentIntentError> for ApiError {
  fn from(error: PaymentIntentError) -> Self {
    match error {
      PaymentIntentError::Invoice(e) => e.into(),
      PaymentIntentError::Payment(e) => e.into(),
    }
  }
}

impl From<DashboardError> for ApiError {
  fn from(error: DashboardError) -> Self {
    match error {
      DashboardError::Job(e) => e.into(),
      DashboardError::Invoice(e) => e.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::access::{Role, capabilities::JOB_CREATE};
  use crate::domain::company::{CompanyId, CompanyType};
  use crate::domain::job::{JobAction, JobId, JobStatus};
  use actix_web::body::to_bytes;

  async fn body_json(error: ApiError) -> serde_json::Value {
    let response = error.error_response();
    let bytes = to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[test]
  fn test_api_error_status_codes() {
    assert_eq!(
      ApiError::validation("test").status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      ApiError::from(AccessError::MissingActor).status_code(),
      StatusCode::UNAUTHORIZED
    );
    assert_eq!(
      ApiError::from(AccessError::Forbidden {
        role: Role::Viewer,
        capability: JOB_CREATE
      })
      .status_code(),
      StatusCode::FORBIDDEN
    );
    assert_eq!(
      ApiError::from(PaymentError::NotConfigured).status_code(),
      StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
      ApiError::from(PaymentError::Unavailable("timeout".into())).status_code(),
      StatusCode::BAD_GATEWAY
    );
    assert_eq!(
      ApiError::Internal("test".to_string()).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn test_job_error_conversion() {
    let illegal: ApiError = JobError::Transition(TransitionError::IllegalTransition {
      from: JobStatus::Booked,
      to: JobStatus::Invoiced,
    })
    .into();
    assert_eq!(illegal.status_code(), StatusCode::CONFLICT);

    let precondition: ApiError = JobError::Transition(TransitionError::PreconditionNotMet {
      action: JobAction::UploadPod,
      reason: "no POD".to_string(),
    })
    .into();
    assert!(matches!(
      precondition,
      ApiError::Conflict {
        code: "precondition_not_met",
        ..
      }
    ));

    let missing: ApiError = JobError::NotFound(JobId::generate()).into();
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

    let storage: ApiError = JobError::Repository(RepositoryError::Database("boom".into())).into();
    assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[actix_web::test]
  async fn test_referential_integrity_body() {
    let company_id = CompanyId::generate(CompanyType::Carrier);
    let body = body_json(
      CompanyError::ReferentialIntegrity {
        company_id: company_id.clone(),
        job_count: 3,
      }
      .into(),
    )
    .await;

    assert_eq!(body["error"], "referential_integrity");
    assert_eq!(body["details"]["job_count"], 3);
    assert_eq!(body["details"]["company_id"], company_id.as_str());
  }

  #[actix_web::test]
  async fn test_internal_error_hides_message() {
    let body = body_json(RepositoryError::Database("password=secret".into()).into()).await;
    assert_eq!(body["error"], "internal_error");
    assert_eq!(body["message"], "An internal server error occurred");
    assert!(body.get("details").is_none());
  }
}
