use chrono::NaiveDate;
use std::sync::Arc;

use super::create_invoice_from_job::InvoiceOutcome;
use crate::domain::company::CompanyId;
use crate::domain::invoice::{InvoiceError, InvoiceService, SelfInvoiceRequest};
use crate::domain::job::JobId;

#[derive(Debug, Clone)]
pub struct CreateSelfInvoiceCommand {
  pub carrier_id: String,
  pub job_ids: Vec<String>,
  pub period_start: NaiveDate,
  pub period_end: NaiveDate,
}

/// Consolidates a carrier's jobs for a period into one self-invoice
pub struct CreateSelfInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl CreateSelfInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: CreateSelfInvoiceCommand,
  ) -> Result<InvoiceOutcome, InvoiceError> {
    let request = match parse_request(command) {
      Ok(request) => request,
      Err(e) => return InvoiceOutcome::from_error(e),
    };

    match self
      .invoice_service
      .create_carrier_self_invoice(request)
      .await
    {
      Ok(invoice) => Ok(InvoiceOutcome::created(invoice.id)),
      Err(e) => InvoiceOutcome::from_error(e),
    }
  }
}

fn parse_request(command: CreateSelfInvoiceCommand) -> Result<SelfInvoiceRequest, InvoiceError> {
  let job_ids = command
    .job_ids
    .into_iter()
    .map(JobId::parse)
    .collect::<Result<Vec<_>, _>>()?;

  Ok(SelfInvoiceRequest {
    carrier_id: CompanyId::parse(command.carrier_id)?,
    job_ids,
    period_start: command.period_start,
    period_end: command.period_end,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::company::CompanyType;
  use crate::domain::job::entities::tests::new_job;
  use crate::infrastructure::persistence::memory::test_support::{company, services};
  use rust_decimal_macros::dec;

  #[tokio::test]
  async fn test_reversed_period_is_a_failed_outcome() {
    let (store, svc) = services();
    let carrier = company(&store, CompanyType::Carrier).await;
    let use_case = CreateSelfInvoiceUseCase::new(Arc::new(svc.invoices));

    let outcome = use_case
      .execute(CreateSelfInvoiceCommand {
        carrier_id: carrier.id.to_string(),
        job_ids: vec!["job_abc".to_string()],
        period_start: NaiveDate::from_ymd_opt(2026, 10, 31).unwrap(),
        period_end: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
      })
      .await
      .unwrap();
    assert!(!outcome.success);
    assert_eq!(store.invoice_count().await, 0);
  }

  #[tokio::test]
  async fn test_self_invoice_for_carrier_jobs() {
    let (store, svc) = services();
    let carrier = company(&store, CompanyType::Carrier).await;

    let mut ids = Vec::new();
    for cost in [dec!(500), dec!(300)] {
      let mut job = svc.jobs.create_job(new_job()).await.unwrap();
      job.carrier_id = Some(carrier.id.clone());
      job.agreed_cost_gbp = Some(cost);
      svc.job_repo.update(job.clone()).await.unwrap();
      ids.push(job.id.to_string());
    }

    let use_case = CreateSelfInvoiceUseCase::new(Arc::new(svc.invoices));
    let outcome = use_case
      .execute(CreateSelfInvoiceCommand {
        carrier_id: carrier.id.to_string(),
        job_ids: ids,
        period_start: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        period_end: NaiveDate::from_ymd_opt(2026, 10, 31).unwrap(),
      })
      .await
      .unwrap();
    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(store.invoice_count().await, 1);
  }
}
