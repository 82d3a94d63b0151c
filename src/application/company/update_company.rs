use std::sync::Arc;

use super::company_dto::CompanyDto;
use super::create_company::CompanyProfileInput;
use crate::domain::company::{CompanyError, CompanyId, CompanyService};

#[derive(Debug, Clone)]
pub struct UpdateCompanyCommand {
  pub company_id: String,
  pub profile: CompanyProfileInput,
}

/// Replaces a company's profile; the type never changes
pub struct UpdateCompanyUseCase {
  company_service: Arc<CompanyService>,
}

impl UpdateCompanyUseCase {
  pub fn new(company_service: Arc<CompanyService>) -> Self {
    Self { company_service }
  }

  pub async fn execute(&self, command: UpdateCompanyCommand) -> Result<CompanyDto, CompanyError> {
    let company_id = CompanyId::parse(command.company_id)?;
    let profile = command.profile.into_profile()?;

    let company = self
      .company_service
      .update_company(&company_id, profile)
      .await?;
    Ok(company.into())
  }
}
