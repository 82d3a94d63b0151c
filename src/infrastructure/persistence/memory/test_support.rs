//! Service wiring over a fresh [`MemoryStore`] for unit tests

use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;

use super::{
  InMemoryCompanyRepository, InMemoryInvoiceRepository, InMemoryJobRepository, MemoryStore,
};
use crate::domain::company::{
  Company, CompanyName, CompanyProfile, CompanyRepository, CompanyService, CompanyType,
  ContactInfo,
};
use crate::domain::invoice::{
  InvoiceRepository, InvoiceService, InvoicingDefaults, PaymentTerms, TaxRate,
};
use crate::domain::job::{JobRepository, JobService};

pub struct TestServices {
  pub jobs: JobService,
  pub invoices: InvoiceService,
  pub companies: CompanyService,
  pub job_repo: Arc<dyn JobRepository>,
  pub invoice_repo: Arc<dyn InvoiceRepository>,
  pub company_repo: Arc<dyn CompanyRepository>,
}

pub fn defaults() -> InvoicingDefaults {
  InvoicingDefaults {
    tax_rate: TaxRate::new(dec!(0.20)).unwrap(),
    payment_terms: PaymentTerms::new(30).unwrap(),
  }
}

pub fn services() -> (Arc<MemoryStore>, TestServices) {
  let store = Arc::new(MemoryStore::new());
  let job_repo: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new(store.clone()));
  let company_repo: Arc<dyn CompanyRepository> =
    Arc::new(InMemoryCompanyRepository::new(store.clone()));
  let invoice_repo: Arc<dyn InvoiceRepository> =
    Arc::new(InMemoryInvoiceRepository::new(store.clone()));

  let services = TestServices {
    jobs: JobService::new(job_repo.clone(), company_repo.clone(), invoice_repo.clone()),
    invoices: InvoiceService::new(
      invoice_repo.clone(),
      job_repo.clone(),
      company_repo.clone(),
      defaults(),
    ),
    companies: CompanyService::new(company_repo.clone(), job_repo.clone()),
    job_repo,
    invoice_repo,
    company_repo,
  };
  (store, services)
}

/// Stores a company of the given type directly, bypassing the service
pub async fn company(store: &Arc<MemoryStore>, company_type: CompanyType) -> Company {
  let name = match company_type {
    CompanyType::Customer => "Northgate Retail Ltd",
    CompanyType::Carrier => "Pennine Haulage Ltd",
  };
  let company = Company::new(
    company_type,
    CompanyProfile {
      name: CompanyName::new(name).unwrap(),
      credit_limit: None,
      contact: ContactInfo::default(),
      address: None,
      metadata: json!({}),
    },
  )
  .unwrap();

  InMemoryCompanyRepository::new(store.clone())
    .create(company)
    .await
    .unwrap()
}
