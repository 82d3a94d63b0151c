use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use super::company_dto::CompanyDto;
use crate::application::common::LocationInput;
use crate::domain::company::{
  CompanyError, CompanyName, CompanyProfile, CompanyService, CompanyType, ContactInfo,
};

/// Profile fields shared by create and update
#[derive(Debug, Clone, Default)]
pub struct CompanyProfileInput {
  pub name: String,
  pub credit_limit: Option<Decimal>,
  pub contact_name: Option<String>,
  pub contact_email: Option<String>,
  pub contact_phone: Option<String>,
  pub address: Option<LocationInput>,
  pub metadata: Option<serde_json::Value>,
}

impl CompanyProfileInput {
  pub(crate) fn into_profile(self) -> Result<CompanyProfile, CompanyError> {
    let metadata = match self.metadata {
      None | Some(serde_json::Value::Null) => serde_json::Value::Object(Default::default()),
      Some(value) => value,
    };

    Ok(CompanyProfile {
      name: CompanyName::new(self.name)?,
      credit_limit: self.credit_limit,
      contact: ContactInfo::new(self.contact_name, self.contact_email, self.contact_phone)?,
      address: self.address.map(LocationInput::into_location).transpose()?,
      metadata,
    })
  }
}

#[derive(Debug, Clone)]
pub struct CreateCompanyCommand {
  pub company_type: String,
  pub profile: CompanyProfileInput,
}

pub struct CreateCompanyUseCase {
  company_service: Arc<CompanyService>,
}

impl CreateCompanyUseCase {
  pub fn new(company_service: Arc<CompanyService>) -> Self {
    Self { company_service }
  }

  pub async fn execute(&self, command: CreateCompanyCommand) -> Result<CompanyDto, CompanyError> {
    let company_type = CompanyType::from_str(&command.company_type)?;
    let profile = command.profile.into_profile()?;

    let company = self
      .company_service
      .create_company(company_type, profile)
      .await?;
    Ok(company.into())
  }
}
