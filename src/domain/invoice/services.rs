use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use super::entities::{Invoice, InvoicePeriod, InvoiceStatusSummary, InvoiceTerms};
use super::errors::InvoiceError;
use super::ports::{InvoiceFilter, InvoiceRepository};
use super::value_objects::{InvoiceId, InvoiceStatus, PaymentTerms, TaxRate};
use crate::domain::company::ports::CompanyRepository;
use crate::domain::company::value_objects::{CompanyId, CompanyType};
use crate::domain::job::entities::Job;
use crate::domain::job::ports::JobRepository;
use crate::domain::job::value_objects::{JobId, JobStatus};

/// Defaults applied when a request leaves tax or terms unset
#[derive(Debug, Clone, Copy)]
pub struct InvoicingDefaults {
  pub tax_rate: TaxRate,
  pub payment_terms: PaymentTerms,
}

/// Per-invoice overrides for a customer invoice
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceOptions {
  pub tax_rate: Option<TaxRate>,
  pub payment_terms: Option<PaymentTerms>,
  pub invoice_date: Option<NaiveDate>,
}

/// Carrier self-invoice request
#[derive(Debug, Clone)]
pub struct SelfInvoiceRequest {
  pub carrier_id: CompanyId,
  pub job_ids: Vec<JobId>,
  pub period_start: NaiveDate,
  pub period_end: NaiveDate,
}

pub struct InvoiceService {
  invoice_repo: Arc<dyn InvoiceRepository>,
  job_repo: Arc<dyn JobRepository>,
  company_repo: Arc<dyn CompanyRepository>,
  defaults: InvoicingDefaults,
}

impl InvoiceService {
  pub fn new(
    invoice_repo: Arc<dyn InvoiceRepository>,
    job_repo: Arc<dyn JobRepository>,
    company_repo: Arc<dyn CompanyRepository>,
    defaults: InvoicingDefaults,
  ) -> Self {
    Self {
      invoice_repo,
      job_repo,
      company_repo,
      defaults,
    }
  }

  /// Raises a customer invoice for one job in `ready_for_invoicing` and
  /// moves the job to `invoiced`. Both writes commit together.
  pub async fn create_invoice_from_job(
    &self,
    job_id: &JobId,
    options: InvoiceOptions,
  ) -> Result<Invoice, InvoiceError> {
    let mut job = self.load_job(job_id).await?;

    if job.invoice_id.is_some() {
      return Err(InvoiceError::JobAlreadyInvoiced(job.id));
    }
    if job.status != JobStatus::ReadyForInvoicing {
      return Err(InvoiceError::JobNotReady {
        job_id: job.id,
        status: job.status,
      });
    }

    let terms = InvoiceTerms {
      tax_rate: options.tax_rate.unwrap_or(self.defaults.tax_rate),
      payment_terms: options.payment_terms.unwrap_or(self.defaults.payment_terms),
      invoice_date: options
        .invoice_date
        .unwrap_or_else(|| Utc::now().date_naive()),
    };
    let invoice = Invoice::from_job(&job, terms)?;

    job.invoice_id = Some(invoice.id.clone());
    let context = job.transition_context(false);
    job.transition_to(JobStatus::Invoiced, &context)?;

    let (invoice, job) = self.invoice_repo.create_for_job(invoice, job).await?;
    tracing::info!(
      "Created invoice {} ({}) for job {}: total {}",
      invoice.id,
      invoice.invoice_number,
      job.id,
      invoice.total
    );
    Ok(invoice)
  }

  /// Consolidates a carrier's jobs over a period into one self-invoice.
  /// Every job is checked before anything is written; the first offending
  /// job aborts the batch. The invoice insert and the job flags commit
  /// together.
  pub async fn create_carrier_self_invoice(
    &self,
    request: SelfInvoiceRequest,
  ) -> Result<Invoice, InvoiceError> {
    if request.job_ids.is_empty() {
      return Err(InvoiceError::EmptyBatch);
    }
    let period = InvoicePeriod::new(request.period_start, request.period_end)?;
    self.ensure_carrier(&request.carrier_id).await?;

    let mut jobs = self
      .load_batch(&request.job_ids, &request.carrier_id, period)
      .await?;

    let invoice = Invoice::self_invoice(
      request.carrier_id,
      &jobs,
      period,
      Utc::now().date_naive(),
      self.defaults.payment_terms,
    )?;
    for job in &mut jobs {
      job.mark_self_invoiced(invoice.id.clone());
    }

    let (invoice, jobs) = self.invoice_repo.create_self_invoice(invoice, jobs).await?;
    tracing::info!(
      "Created self-invoice {} for carrier {} covering {} job(s): total {}",
      invoice.id,
      invoice.company_id,
      jobs.len(),
      invoice.total
    );
    Ok(invoice)
  }

  pub async fn change_invoice_status(
    &self,
    invoice_id: &InvoiceId,
    new_status: InvoiceStatus,
  ) -> Result<Invoice, InvoiceError> {
    let mut invoice = self.get_invoice(invoice_id).await?;
    let from = invoice.status;
    invoice.change_status(new_status)?;
    let invoice = self.invoice_repo.update(invoice).await?;
    tracing::info!("Invoice {} moved {} -> {}", invoice.id, from, new_status);
    Ok(invoice)
  }

  pub async fn get_invoice(&self, invoice_id: &InvoiceId) -> Result<Invoice, InvoiceError> {
    self
      .invoice_repo
      .find_by_id(invoice_id)
      .await?
      .ok_or_else(|| InvoiceError::NotFound(invoice_id.clone()))
  }

  pub async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, InvoiceError> {
    Ok(self.invoice_repo.list(filter).await?)
  }

  /// Moves every sent invoice past its due date to `overdue`
  pub async fn mark_overdue_invoices(&self, today: NaiveDate) -> Result<Vec<Invoice>, InvoiceError> {
    let candidates = self.invoice_repo.find_overdue(today).await?;
    let mut marked = Vec::with_capacity(candidates.len());

    for mut invoice in candidates {
      if !invoice.is_overdue(today) {
        continue;
      }
      invoice.change_status(InvoiceStatus::Overdue)?;
      marked.push(self.invoice_repo.update(invoice).await?);
    }

    if !marked.is_empty() {
      tracing::info!("Marked {} invoice(s) overdue", marked.len());
    }
    Ok(marked)
  }

  pub async fn status_summary(&self) -> Result<Vec<InvoiceStatusSummary>, InvoiceError> {
    Ok(self.invoice_repo.summarize_by_status().await?)
  }

  async fn load_job(&self, job_id: &JobId) -> Result<Job, InvoiceError> {
    self
      .job_repo
      .find_by_id(job_id)
      .await?
      .ok_or_else(|| InvoiceError::JobNotFound(job_id.clone()))
  }

  /// Loads and checks the batch one job at a time in request order, so the
  /// error names the first offending id whatever the reason
  async fn load_batch(
    &self,
    job_ids: &[JobId],
    carrier_id: &CompanyId,
    period: InvoicePeriod,
  ) -> Result<Vec<Job>, InvoiceError> {
    let mut found = self.job_repo.find_by_ids(job_ids).await?;
    let mut seen = HashSet::with_capacity(job_ids.len());
    let mut jobs = Vec::with_capacity(job_ids.len());

    for id in job_ids {
      if !seen.insert(id) {
        return Err(InvoiceError::DuplicateJob(id.clone()));
      }
      let job = found
        .iter()
        .position(|job| &job.id == id)
        .map(|index| found.swap_remove(index))
        .ok_or_else(|| InvoiceError::JobNotFound(id.clone()))?;
      check_self_invoice_eligibility(&job, carrier_id, period)?;
      jobs.push(job);
    }
    Ok(jobs)
  }

  async fn ensure_carrier(&self, carrier_id: &CompanyId) -> Result<(), InvoiceError> {
    let carrier = self
      .company_repo
      .find_by_id(carrier_id)
      .await?
      .ok_or_else(|| InvoiceError::CarrierNotFound(carrier_id.clone()))?;
    if carrier.company_type != CompanyType::Carrier {
      return Err(InvoiceError::NotACarrier(carrier.id));
    }
    Ok(())
  }
}

fn check_self_invoice_eligibility(
  job: &Job,
  carrier_id: &CompanyId,
  period: InvoicePeriod,
) -> Result<(), InvoiceError> {
  if job.carrier_id.as_ref() != Some(carrier_id) {
    return Err(InvoiceError::JobNotOwnedByCarrier {
      job_id: job.id.clone(),
      carrier_id: carrier_id.clone(),
    });
  }
  let job_date = job.job_date();
  if !period.contains(job_date) {
    return Err(InvoiceError::JobOutsidePeriod {
      job_id: job.id.clone(),
      job_date,
    });
  }
  if job.is_self_invoiced() {
    return Err(InvoiceError::JobAlreadySelfInvoiced(job.id.clone()));
  }
  if job.agreed_cost_gbp.is_none() {
    return Err(InvoiceError::MissingAgreedCost(job.id.clone()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::invoice::value_objects::InvoiceKind;
  use crate::domain::job::entities::tests::new_job;
  use crate::domain::job::errors::JobError;
  use crate::infrastructure::persistence::memory::test_support::{TestServices, company, services};
  use rust_decimal::Decimal;
  use rust_decimal_macros::dec;

  fn october(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
  }

  async fn ready_job(svc: &TestServices, customer: &CompanyId) -> Job {
    let mut input = new_job();
    input.customer_id = Some(customer.clone());
    let mut job = svc.jobs.create_job(input).await.unwrap();
    job.status = JobStatus::ReadyForInvoicing;
    job.pod_uploaded = true;
    svc.job_repo.update(job).await.unwrap()
  }

  async fn carrier_job(
    svc: &TestServices,
    carrier: &CompanyId,
    cost: Decimal,
  ) -> Job {
    let mut job = svc.jobs.create_job(new_job()).await.unwrap();
    job.carrier_id = Some(carrier.clone());
    job.status = JobStatus::Finished;
    job.agreed_cost_gbp = Some(cost);
    job.delivery_date = Some(october(2));
    svc.job_repo.update(job).await.unwrap()
  }

  fn request(carrier: &CompanyId, jobs: &[&Job]) -> SelfInvoiceRequest {
    SelfInvoiceRequest {
      carrier_id: carrier.clone(),
      job_ids: jobs.iter().map(|job| job.id.clone()).collect(),
      period_start: october(1),
      period_end: october(31),
    }
  }

  #[tokio::test]
  async fn test_invoice_from_job_computes_totals_and_links_job() {
    let (store, svc) = services();
    let customer = company(&store, CompanyType::Customer).await;
    let job = ready_job(&svc, &customer.id).await;

    let invoice = svc
      .invoices
      .create_invoice_from_job(
        &job.id,
        InvoiceOptions {
          tax_rate: Some(TaxRate::new(dec!(0.20)).unwrap()),
          payment_terms: Some(PaymentTerms::new(30).unwrap()),
          invoice_date: Some(october(18)),
        },
      )
      .await
      .unwrap();

    assert_eq!(invoice.subtotal.amount, dec!(1000));
    assert_eq!(invoice.vat.amount, dec!(200));
    assert_eq!(invoice.total.amount, dec!(1200));
    assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2026, 11, 17).unwrap());
    assert_eq!(invoice.company_id, customer.id);

    let job = svc.jobs.get_job(&job.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Invoiced);
    assert_eq!(job.invoice_id, Some(invoice.id.clone()));

    let again = svc
      .invoices
      .create_invoice_from_job(&job.id, InvoiceOptions::default())
      .await;
    assert!(matches!(again, Err(InvoiceError::JobAlreadyInvoiced(_))));
  }

  #[tokio::test]
  async fn test_invoice_from_job_uses_defaults() {
    let (store, svc) = services();
    let customer = company(&store, CompanyType::Customer).await;
    let job = ready_job(&svc, &customer.id).await;

    let invoice = svc
      .invoices
      .create_invoice_from_job(&job.id, InvoiceOptions::default())
      .await
      .unwrap();
    assert_eq!(invoice.tax_rate.value(), dec!(0.20));
    assert_eq!(invoice.payment_terms.days(), 30);
    assert_eq!(invoice.invoice_date, Utc::now().date_naive());
  }

  #[tokio::test]
  async fn test_invoice_from_job_rejects_unready_job() {
    let (store, svc) = services();
    let customer = company(&store, CompanyType::Customer).await;
    let mut input = new_job();
    input.customer_id = Some(customer.id.clone());
    let job = svc.jobs.create_job(input).await.unwrap();

    let result = svc
      .invoices
      .create_invoice_from_job(&job.id, InvoiceOptions::default())
      .await;
    assert!(matches!(result, Err(InvoiceError::JobNotReady { .. })));
    assert_eq!(store.invoice_count().await, 0);
  }

  #[tokio::test]
  async fn test_invoice_from_job_requires_ready_status_even_with_pod() {
    let (store, svc) = services();
    let customer = company(&store, CompanyType::Customer).await;

    for status in [JobStatus::Delivered, JobStatus::PodReceived, JobStatus::Finished] {
      let mut input = new_job();
      input.customer_id = Some(customer.id.clone());
      let mut job = svc.jobs.create_job(input).await.unwrap();
      job.status = status;
      job.pod_uploaded = true;
      let job = svc.job_repo.update(job).await.unwrap();

      match svc
        .invoices
        .create_invoice_from_job(&job.id, InvoiceOptions::default())
        .await
      {
        Err(InvoiceError::JobNotReady { status: reported, .. }) => assert_eq!(reported, status),
        other => panic!("unexpected result for {status}: {other:?}"),
      }
      assert_eq!(svc.jobs.get_job(&job.id).await.unwrap().status, status);
    }
    assert_eq!(store.invoice_count().await, 0);
  }

  #[tokio::test]
  async fn test_self_invoice_consolidates_jobs() {
    let (store, svc) = services();
    let carrier = company(&store, CompanyType::Carrier).await;
    let a = carrier_job(&svc, &carrier.id, dec!(500)).await;
    let b = carrier_job(&svc, &carrier.id, dec!(300)).await;

    let invoice = svc
      .invoices
      .create_carrier_self_invoice(request(&carrier.id, &[&a, &b]))
      .await
      .unwrap();

    assert_eq!(invoice.kind, InvoiceKind::CarrierSelfInvoice);
    assert_eq!(invoice.total.amount, dec!(800));
    assert_eq!(invoice.job_ids, vec![a.id.clone(), b.id.clone()]);

    for id in [&a.id, &b.id] {
      let job = svc.jobs.get_job(id).await.unwrap();
      assert_eq!(job.self_invoiced, Some(true));
      assert_eq!(job.self_invoice_id, Some(invoice.id.clone()));
      assert_eq!(job.status, JobStatus::Finished);
    }
  }

  #[tokio::test]
  async fn test_self_invoice_with_foreign_job_writes_nothing() {
    let (store, svc) = services();
    let carrier = company(&store, CompanyType::Carrier).await;
    let other = company(&store, CompanyType::Carrier).await;
    let a = carrier_job(&svc, &carrier.id, dec!(500)).await;
    let foreign = carrier_job(&svc, &other.id, dec!(300)).await;

    let err = svc
      .invoices
      .create_carrier_self_invoice(request(&carrier.id, &[&a, &foreign]))
      .await
      .unwrap_err();

    match &err {
      InvoiceError::JobNotOwnedByCarrier { job_id, .. } => assert_eq!(job_id, &foreign.id),
      unexpected => panic!("unexpected error: {unexpected:?}"),
    }
    assert!(err.to_string().contains(foreign.id.as_str()));
    assert_eq!(store.invoice_count().await, 0);
    for id in [&a.id, &foreign.id] {
      assert_ne!(svc.jobs.get_job(id).await.unwrap().self_invoiced, Some(true));
    }
  }

  #[tokio::test]
  async fn test_self_invoice_rejects_already_invoiced_and_out_of_period() {
    let (store, svc) = services();
    let carrier = company(&store, CompanyType::Carrier).await;
    let a = carrier_job(&svc, &carrier.id, dec!(500)).await;

    svc
      .invoices
      .create_carrier_self_invoice(request(&carrier.id, &[&a]))
      .await
      .unwrap();
    let again = svc
      .invoices
      .create_carrier_self_invoice(request(&carrier.id, &[&a]))
      .await;
    assert!(matches!(again, Err(InvoiceError::JobAlreadySelfInvoiced(_))));

    let mut late = carrier_job(&svc, &carrier.id, dec!(120)).await;
    late.delivery_date = Some(NaiveDate::from_ymd_opt(2026, 11, 3).unwrap());
    let late = svc.job_repo.update(late).await.unwrap();
    let result = svc
      .invoices
      .create_carrier_self_invoice(request(&carrier.id, &[&late]))
      .await;
    assert!(matches!(result, Err(InvoiceError::JobOutsidePeriod { .. })));
    assert_eq!(store.invoice_count().await, 1);
  }

  #[tokio::test]
  async fn test_self_invoice_rejects_missing_and_duplicate_ids() {
    let (store, svc) = services();
    let carrier = company(&store, CompanyType::Carrier).await;
    let a = carrier_job(&svc, &carrier.id, dec!(500)).await;

    let mut req = request(&carrier.id, &[&a]);
    req.job_ids.push(a.id.clone());
    assert!(matches!(
      svc.invoices.create_carrier_self_invoice(req).await,
      Err(InvoiceError::DuplicateJob(_))
    ));

    let mut req = request(&carrier.id, &[&a]);
    let ghost = JobId::generate();
    req.job_ids.push(ghost.clone());
    match svc.invoices.create_carrier_self_invoice(req).await {
      Err(InvoiceError::JobNotFound(id)) => assert_eq!(id, ghost),
      other => panic!("unexpected result: {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_self_invoice_names_first_offending_job_in_request_order() {
    let (store, svc) = services();
    let carrier = company(&store, CompanyType::Carrier).await;
    let other = company(&store, CompanyType::Carrier).await;
    let foreign = carrier_job(&svc, &other.id, dec!(300)).await;
    let ghost = JobId::generate();

    let mut req = request(&carrier.id, &[&foreign]);
    req.job_ids.push(ghost.clone());
    match svc.invoices.create_carrier_self_invoice(req).await {
      Err(InvoiceError::JobNotOwnedByCarrier { job_id, .. }) => assert_eq!(job_id, foreign.id),
      other => panic!("unexpected result: {other:?}"),
    }

    let mut req = request(&carrier.id, &[]);
    req.job_ids = vec![ghost.clone(), foreign.id.clone()];
    match svc.invoices.create_carrier_self_invoice(req).await {
      Err(InvoiceError::JobNotFound(id)) => assert_eq!(id, ghost),
      other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(store.invoice_count().await, 0);
  }

  #[tokio::test]
  async fn test_invoice_status_flow_and_overdue_sweep() {
    let (store, svc) = services();
    let customer = company(&store, CompanyType::Customer).await;
    let job = ready_job(&svc, &customer.id).await;
    let invoice = svc
      .invoices
      .create_invoice_from_job(
        &job.id,
        InvoiceOptions {
          invoice_date: Some(october(1)),
          ..Default::default()
        },
      )
      .await
      .unwrap();

    assert!(matches!(
      svc
        .invoices
        .change_invoice_status(&invoice.id, InvoiceStatus::Paid)
        .await,
      Err(InvoiceError::InvalidStatusTransition { .. })
    ));
    svc
      .invoices
      .change_invoice_status(&invoice.id, InvoiceStatus::Sent)
      .await
      .unwrap();

    let none = svc.invoices.mark_overdue_invoices(october(31)).await.unwrap();
    assert!(none.is_empty());

    let marked = svc
      .invoices
      .mark_overdue_invoices(NaiveDate::from_ymd_opt(2026, 11, 2).unwrap())
      .await
      .unwrap();
    assert_eq!(marked.len(), 1);
    assert_eq!(marked[0].status, InvoiceStatus::Overdue);

    let summary = svc.invoices.status_summary().await.unwrap();
    let overdue = summary
      .iter()
      .find(|s| s.status == InvoiceStatus::Overdue)
      .unwrap();
    assert_eq!(overdue.count, 1);
    assert_eq!(overdue.total, dec!(1200));
  }

  #[tokio::test]
  async fn test_paid_invoice_allows_clearing_job() {
    let (store, svc) = services();
    let customer = company(&store, CompanyType::Customer).await;
    let job = ready_job(&svc, &customer.id).await;
    let invoice = svc
      .invoices
      .create_invoice_from_job(&job.id, InvoiceOptions::default())
      .await
      .unwrap();

    let blocked = svc
      .jobs
      .transition_job(&job.id, JobStatus::Cleared, None)
      .await;
    assert!(matches!(blocked, Err(JobError::Transition(_))));

    for status in [InvoiceStatus::Sent, InvoiceStatus::Paid] {
      svc
        .invoices
        .change_invoice_status(&invoice.id, status)
        .await
        .unwrap();
    }
    let job = svc
      .jobs
      .transition_job(&job.id, JobStatus::Cleared, None)
      .await
      .unwrap();
    assert_eq!(job.status, JobStatus::Cleared);
  }
}
