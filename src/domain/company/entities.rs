use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::CompanyError;
use super::value_objects::{CompanyId, CompanyName, CompanyType, ContactInfo};
use crate::domain::shared::Location;

/// Customer or carrier organisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
  pub id: CompanyId,
  pub company_type: CompanyType,
  pub name: CompanyName,
  pub credit_limit: Option<Decimal>,
  pub contact: ContactInfo,
  pub address: Option<Location>,
  pub metadata: serde_json::Value,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or updating a company
#[derive(Debug, Clone)]
pub struct CompanyProfile {
  pub name: CompanyName,
  pub credit_limit: Option<Decimal>,
  pub contact: ContactInfo,
  pub address: Option<Location>,
  pub metadata: serde_json::Value,
}

impl Company {
  pub fn new(company_type: CompanyType, profile: CompanyProfile) -> Result<Self, CompanyError> {
    validate_profile(&profile)?;

    let now = Utc::now();
    Ok(Self {
      id: CompanyId::generate(company_type),
      company_type,
      name: profile.name,
      credit_limit: profile.credit_limit,
      contact: profile.contact,
      address: profile.address,
      metadata: profile.metadata,
      created_at: now,
      updated_at: now,
    })
  }

  pub fn update_profile(&mut self, profile: CompanyProfile) -> Result<(), CompanyError> {
    validate_profile(&profile)?;

    self.name = profile.name;
    self.credit_limit = profile.credit_limit;
    self.contact = profile.contact;
    self.address = profile.address;
    self.metadata = profile.metadata;
    self.updated_at = Utc::now();
    Ok(())
  }

  pub fn is_customer(&self) -> bool {
    self.company_type == CompanyType::Customer
  }

  pub fn is_carrier(&self) -> bool {
    self.company_type == CompanyType::Carrier
  }
}

fn validate_profile(profile: &CompanyProfile) -> Result<(), CompanyError> {
  if let Some(limit) = profile.credit_limit {
    if limit.is_sign_negative() {
      return Err(CompanyError::InvalidCreditLimit(limit));
    }
  }
  // Null is stored as an empty object; anything else must be an object
  if !profile.metadata.is_object() {
    return Err(CompanyError::InvalidMetadata);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;
  use serde_json::json;

  fn profile() -> CompanyProfile {
    CompanyProfile {
      name: CompanyName::new("Northern Freight Ltd").unwrap(),
      credit_limit: Some(dec!(25000)),
      contact: ContactInfo::default(),
      address: None,
      metadata: json!({"account_manager": "jo"}),
    }
  }

  #[test]
  fn test_company_creation() {
    let company = Company::new(CompanyType::Carrier, profile()).unwrap();
    assert!(company.is_carrier());
    assert!(company.id.as_str().starts_with("carrier_"));
  }

  #[test]
  fn test_company_rejects_negative_credit_limit() {
    let mut p = profile();
    p.credit_limit = Some(dec!(-1));
    assert!(matches!(
      Company::new(CompanyType::Customer, p),
      Err(CompanyError::InvalidCreditLimit(_))
    ));
  }

  #[test]
  fn test_company_rejects_non_object_metadata() {
    let mut p = profile();
    p.metadata = json!(["not", "an", "object"]);
    assert!(matches!(
      Company::new(CompanyType::Customer, p),
      Err(CompanyError::InvalidMetadata)
    ));
  }

  #[test]
  fn test_update_profile() {
    let mut company = Company::new(CompanyType::Customer, profile()).unwrap();
    let mut p = profile();
    p.name = CompanyName::new("Northern Freight Group").unwrap();
    company.update_profile(p).unwrap();
    assert_eq!(company.name.as_str(), "Northern Freight Group");
    assert_eq!(company.company_type, CompanyType::Customer);
  }
}
