use async_trait::async_trait;
use std::sync::Arc;

use super::MemoryStore;
use crate::domain::company::{Company, CompanyId, CompanyRepository, CompanyType};
use crate::domain::shared::RepositoryError;

pub struct InMemoryCompanyRepository {
  store: Arc<MemoryStore>,
}

impl InMemoryCompanyRepository {
  pub fn new(store: Arc<MemoryStore>) -> Self {
    Self { store }
  }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
  async fn create(&self, company: Company) -> Result<Company, RepositoryError> {
    let mut state = self.store.state.write().await;
    if state.companies.contains_key(&company.id) {
      return Err(RepositoryError::DuplicateKey(company.id.to_string()));
    }
    state.companies.insert(company.id.clone(), company.clone());
    Ok(company)
  }

  async fn update(&self, company: Company) -> Result<Company, RepositoryError> {
    let mut state = self.store.state.write().await;
    let stored = state
      .companies
      .get_mut(&company.id)
      .ok_or(RepositoryError::NotFound)?;
    *stored = company.clone();
    Ok(company)
  }

  async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
    Ok(self.store.state.read().await.companies.get(id).cloned())
  }

  async fn list(&self, company_type: Option<CompanyType>) -> Result<Vec<Company>, RepositoryError> {
    let state = self.store.state.read().await;
    let mut companies: Vec<Company> = state
      .companies
      .values()
      .filter(|c| company_type.is_none_or(|t| c.company_type == t))
      .cloned()
      .collect();
    companies.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
    Ok(companies)
  }

  async fn delete(&self, id: &CompanyId) -> Result<(), RepositoryError> {
    self
      .store
      .state
      .write()
      .await
      .companies
      .remove(id)
      .map(|_| ())
      .ok_or(RepositoryError::NotFound)
  }
}
