use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use super::company_dto::CompanyDto;
use crate::domain::company::{CompanyError, CompanyId, CompanyService, CompanyType};

#[derive(Debug, Serialize)]
pub struct ListCompaniesResponse {
  pub companies: Vec<CompanyDto>,
  pub total: usize,
}

pub struct ListCompaniesUseCase {
  company_service: Arc<CompanyService>,
}

impl ListCompaniesUseCase {
  pub fn new(company_service: Arc<CompanyService>) -> Self {
    Self { company_service }
  }

  pub async fn execute(
    &self,
    company_type: Option<String>,
  ) -> Result<ListCompaniesResponse, CompanyError> {
    let company_type = company_type
      .as_deref()
      .map(CompanyType::from_str)
      .transpose()?;

    let companies: Vec<CompanyDto> = self
      .company_service
      .list_companies(company_type)
      .await?
      .into_iter()
      .map(CompanyDto::from)
      .collect();

    Ok(ListCompaniesResponse {
      total: companies.len(),
      companies,
    })
  }
}

pub struct GetCompanyUseCase {
  company_service: Arc<CompanyService>,
}

impl GetCompanyUseCase {
  pub fn new(company_service: Arc<CompanyService>) -> Self {
    Self { company_service }
  }

  pub async fn execute(&self, company_id: String) -> Result<CompanyDto, CompanyError> {
    let company_id = CompanyId::parse(company_id)?;
    Ok(self.company_service.get_company(&company_id).await?.into())
  }
}
