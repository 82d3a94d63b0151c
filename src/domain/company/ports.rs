use async_trait::async_trait;

use super::entities::Company;
use super::value_objects::{CompanyId, CompanyType};
use crate::domain::shared::RepositoryError;

#[async_trait]
pub trait CompanyRepository: Send + Sync {
  async fn create(&self, company: Company) -> Result<Company, RepositoryError>;
  async fn update(&self, company: Company) -> Result<Company, RepositoryError>;
  async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError>;
  async fn list(&self, company_type: Option<CompanyType>) -> Result<Vec<Company>, RepositoryError>;
  async fn delete(&self, id: &CompanyId) -> Result<(), RepositoryError>;
}
