use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::company::{Company, ContactInfo};
use crate::domain::shared::Location;

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDto {
  pub id: String,
  pub company_type: String,
  pub name: String,
  pub credit_limit: Option<Decimal>,
  pub contact: ContactInfo,
  pub address: Option<Location>,
  pub metadata: serde_json::Value,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<Company> for CompanyDto {
  fn from(company: Company) -> Self {
    Self {
      id: company.id.into(),
      company_type: company.company_type.as_str().to_string(),
      name: company.name.into_inner(),
      credit_limit: company.credit_limit,
      contact: company.contact,
      address: company.address,
      metadata: company.metadata,
      created_at: company.created_at,
      updated_at: company.updated_at,
    }
  }
}
