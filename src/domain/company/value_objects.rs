use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::ValidateEmail;

use crate::domain::shared::ValueObjectError;
use crate::domain::shared::ids::{generate_with_prefix, validate_prefixed};

/// Whether a company is billed (customer) or paid (carrier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyType {
  Customer,
  Carrier,
}

impl CompanyType {
  pub fn as_str(&self) -> &'static str {
    match self {
      CompanyType::Customer => "customer",
      CompanyType::Carrier => "carrier",
    }
  }

  /// Identifier prefix for companies of this type
  pub fn id_prefix(&self) -> &'static str {
    match self {
      CompanyType::Customer => "customer_",
      CompanyType::Carrier => "carrier_",
    }
  }
}

impl FromStr for CompanyType {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "customer" => Ok(CompanyType::Customer),
      "carrier" | "hauler" => Ok(CompanyType::Carrier),
      _ => Err(ValueObjectError::InvalidCompanyType(format!(
        "Unknown company type: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for CompanyType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Company identifier; the prefix encodes the company type
/// (`customer_…` or `carrier_…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompanyId(String);

impl CompanyId {
  pub fn generate(company_type: CompanyType) -> Self {
    Self(generate_with_prefix(company_type.id_prefix()))
  }

  pub fn parse(value: impl Into<String>) -> Result<Self, ValueObjectError> {
    let value = value.into();
    let prefix = if value.starts_with(CompanyType::Carrier.id_prefix()) {
      CompanyType::Carrier.id_prefix()
    } else {
      CompanyType::Customer.id_prefix()
    };
    validate_prefixed(&value, prefix)?;
    Ok(Self(value))
  }

  pub fn company_type(&self) -> CompanyType {
    if self.0.starts_with(CompanyType::Carrier.id_prefix()) {
      CompanyType::Carrier
    } else {
      CompanyType::Customer
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl TryFrom<String> for CompanyId {
  type Error = ValueObjectError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::parse(value)
  }
}

impl From<CompanyId> for String {
  fn from(id: CompanyId) -> Self {
    id.0
  }
}

impl fmt::Display for CompanyId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Company name value object with validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyName(String);

impl CompanyName {
  pub fn new(name: impl Into<String>) -> Result<Self, ValueObjectError> {
    let name = name.into().trim().to_string();

    if name.is_empty() {
      return Err(ValueObjectError::InvalidCompanyName(
        "Company name cannot be empty".to_string(),
      ));
    }

    if name.len() > 255 {
      return Err(ValueObjectError::InvalidCompanyName(
        "Company name cannot exceed 255 characters".to_string(),
      ));
    }

    Ok(Self(name))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_inner(self) -> String {
    self.0
  }
}

/// Contact person for a company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
  pub name: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
}

impl ContactInfo {
  const MAX_PHONE_LENGTH: usize = 20;

  pub fn new(
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
  ) -> Result<Self, ValueObjectError> {
    let name = non_blank(name);
    let email = non_blank(email).map(|e| e.to_lowercase());
    let phone = non_blank(phone);

    if let Some(email) = &email {
      if !email.validate_email() {
        return Err(ValueObjectError::InvalidContact(format!(
          "Invalid email format: {}",
          email
        )));
      }
    }

    if let Some(phone) = &phone {
      let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')');
      if phone.len() > Self::MAX_PHONE_LENGTH || !phone.chars().all(allowed) {
        return Err(ValueObjectError::InvalidContact(format!(
          "Invalid phone number: {}",
          phone
        )));
      }
    }

    Ok(Self { name, email, phone })
  }

  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.email.is_none() && self.phone.is_none()
  }
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_company_id_prefix_follows_type() {
    let customer = CompanyId::generate(CompanyType::Customer);
    let carrier = CompanyId::generate(CompanyType::Carrier);

    assert!(customer.as_str().starts_with("customer_"));
    assert!(carrier.as_str().starts_with("carrier_"));
    assert_eq!(customer.company_type(), CompanyType::Customer);
    assert_eq!(carrier.company_type(), CompanyType::Carrier);
  }

  #[test]
  fn test_company_id_parse() {
    assert!(CompanyId::parse("carrier_abc").is_ok());
    assert!(CompanyId::parse("customer_abc").is_ok());
    assert!(CompanyId::parse("job_abc").is_err());
    assert!(CompanyId::parse("6f1c2d40-0000-0000-0000-000000000000").is_err());
  }

  #[test]
  fn test_company_type_from_str() {
    assert_eq!(
      CompanyType::from_str("Carrier").unwrap(),
      CompanyType::Carrier
    );
    assert_eq!(
      CompanyType::from_str("hauler").unwrap(),
      CompanyType::Carrier
    );
    assert!(CompanyType::from_str("supplier").is_err());
  }

  #[test]
  fn test_company_name() {
    assert!(CompanyName::new("  ").is_err());
    assert_eq!(CompanyName::new(" Acme Haulage ").unwrap().as_str(), "Acme Haulage");
  }

  #[test]
  fn test_contact_info() {
    let contact = ContactInfo::new(
      Some("Dana Reyes".to_string()),
      Some("Ops@Example.com".to_string()),
      Some("+44 (0)20 7946 0000".to_string()),
    )
    .unwrap();
    assert_eq!(contact.email.as_deref(), Some("ops@example.com"));

    assert!(ContactInfo::new(None, Some("not-an-email".to_string()), None).is_err());
    assert!(ContactInfo::new(None, None, Some("call me".to_string())).is_err());
    assert!(ContactInfo::new(Some(" ".to_string()), None, None).unwrap().is_empty());
  }
}
