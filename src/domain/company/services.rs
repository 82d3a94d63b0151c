use std::sync::Arc;

use super::{
  entities::{Company, CompanyProfile},
  errors::CompanyError,
  ports::CompanyRepository,
  value_objects::{CompanyId, CompanyType},
};
use crate::domain::job::ports::JobRepository;

/// Customer and carrier management
pub struct CompanyService {
  company_repo: Arc<dyn CompanyRepository>,
  job_repo: Arc<dyn JobRepository>,
}

impl CompanyService {
  pub fn new(company_repo: Arc<dyn CompanyRepository>, job_repo: Arc<dyn JobRepository>) -> Self {
    Self {
      company_repo,
      job_repo,
    }
  }

  pub async fn create_company(
    &self,
    company_type: CompanyType,
    profile: CompanyProfile,
  ) -> Result<Company, CompanyError> {
    let company = Company::new(company_type, profile)?;
    let created = self.company_repo.create(company).await?;
    tracing::info!("Created {} {}", created.company_type, created.id);
    Ok(created)
  }

  pub async fn update_company(
    &self,
    company_id: &CompanyId,
    profile: CompanyProfile,
  ) -> Result<Company, CompanyError> {
    let mut company = self.get_company(company_id).await?;
    company.update_profile(profile)?;
    Ok(self.company_repo.update(company).await?)
  }

  pub async fn get_company(&self, company_id: &CompanyId) -> Result<Company, CompanyError> {
    self
      .company_repo
      .find_by_id(company_id)
      .await?
      .ok_or_else(|| CompanyError::NotFound(company_id.clone()))
  }

  pub async fn list_companies(
    &self,
    company_type: Option<CompanyType>,
  ) -> Result<Vec<Company>, CompanyError> {
    Ok(self.company_repo.list(company_type).await?)
  }

  /// Deletes a company that no job references as customer or carrier
  pub async fn delete_company(&self, company_id: &CompanyId) -> Result<(), CompanyError> {
    let company = self.get_company(company_id).await?;

    let job_count = self.job_repo.count_by_company(&company.id).await?;
    if job_count > 0 {
      tracing::warn!(
        "Refusing to delete company {} referenced by {} job(s)",
        company.id,
        job_count
      );
      return Err(CompanyError::ReferentialIntegrity {
        company_id: company.id,
        job_count,
      });
    }

    self.company_repo.delete(&company.id).await?;
    tracing::info!("Deleted company {}", company.id);
    Ok(())
  }
}
