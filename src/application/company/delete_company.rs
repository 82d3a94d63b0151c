use std::sync::Arc;

use crate::domain::company::{CompanyError, CompanyId, CompanyService};

pub struct DeleteCompanyUseCase {
  company_service: Arc<CompanyService>,
}

impl DeleteCompanyUseCase {
  pub fn new(company_service: Arc<CompanyService>) -> Self {
    Self { company_service }
  }

  pub async fn execute(&self, company_id: String) -> Result<(), CompanyError> {
    let company_id = CompanyId::parse(company_id)?;
    self.company_service.delete_company(&company_id).await
  }
}
