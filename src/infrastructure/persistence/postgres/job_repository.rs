use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

use super::corrupt;
use crate::domain::company::CompanyId;
use crate::domain::invoice::InvoiceId;
use crate::domain::job::{
  Job, JobFilter, JobId, JobPriority, JobReference, JobRepository, JobStatus,
};
use crate::domain::shared::{Currency, Location, Money, RepositoryError};

#[derive(Debug, FromRow)]
pub(super) struct JobRow {
  id: String,
  reference: String,
  status: String,
  priority: String,
  customer_id: Option<String>,
  carrier_id: Option<String>,
  vehicle_id: Option<String>,
  driver_id: Option<String>,
  pickup: Json<Location>,
  delivery: Json<Location>,
  pickup_date: Option<NaiveDate>,
  delivery_date: Option<NaiveDate>,
  value: Decimal,
  currency: String,
  agreed_cost_gbp: Option<Decimal>,
  pod_uploaded: bool,
  pod_document_id: Option<String>,
  issue_details: Option<String>,
  status_before_issue: Option<String>,
  self_invoiced: Option<bool>,
  invoice_id: Option<String>,
  self_invoice_id: Option<String>,
  notes: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
  type Error = RepositoryError;

  fn try_from(row: JobRow) -> Result<Self, Self::Error> {
    let currency = Currency::from_str(&row.currency).map_err(corrupt)?;

    Ok(Job {
      id: JobId::parse(row.id).map_err(corrupt)?,
      reference: JobReference::new(row.reference).map_err(corrupt)?,
      status: JobStatus::from_str(&row.status).map_err(corrupt)?,
      priority: JobPriority::from_str(&row.priority).map_err(corrupt)?,
      customer_id: row.customer_id.map(CompanyId::parse).transpose().map_err(corrupt)?,
      carrier_id: row.carrier_id.map(CompanyId::parse).transpose().map_err(corrupt)?,
      vehicle_id: row.vehicle_id,
      driver_id: row.driver_id,
      pickup: row.pickup.0,
      delivery: row.delivery.0,
      pickup_date: row.pickup_date,
      delivery_date: row.delivery_date,
      value: Money::new(row.value, currency).map_err(corrupt)?,
      agreed_cost_gbp: row.agreed_cost_gbp,
      pod_uploaded: row.pod_uploaded,
      pod_document_id: row.pod_document_id,
      issue_details: row.issue_details,
      status_before_issue: row
        .status_before_issue
        .as_deref()
        .map(JobStatus::from_str)
        .transpose()
        .map_err(corrupt)?,
      self_invoiced: row.self_invoiced,
      invoice_id: row.invoice_id.map(InvoiceId::parse).transpose().map_err(corrupt)?,
      self_invoice_id: row
        .self_invoice_id
        .map(InvoiceId::parse)
        .transpose()
        .map_err(corrupt)?,
      notes: row.notes,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

pub(super) const JOB_COLUMNS: &str = "id, reference, status, priority, customer_id, carrier_id, \
   vehicle_id, driver_id, pickup, delivery, pickup_date, delivery_date, value, currency, \
   agreed_cost_gbp, pod_uploaded, pod_document_id, issue_details, status_before_issue, \
   self_invoiced, invoice_id, self_invoice_id, notes, created_at, updated_at";

/// Writes every mutable column of `job`. Invoicing writes go through the
/// narrower statements in the invoice repository instead.
async fn update_row(pool: &PgPool, job: &Job) -> Result<Job, RepositoryError> {
  let row = sqlx::query_as::<_, JobRow>(&format!(
    r#"
        UPDATE jobs
        SET status = $2, priority = $3, customer_id = $4, carrier_id = $5,
            vehicle_id = $6, driver_id = $7, pickup = $8, delivery = $9,
            pickup_date = $10, delivery_date = $11, value = $12, currency = $13,
            agreed_cost_gbp = $14, pod_uploaded = $15, pod_document_id = $16,
            issue_details = $17, status_before_issue = $18, self_invoiced = $19,
            invoice_id = $20, self_invoice_id = $21, notes = $22, updated_at = $23
        WHERE id = $1
        RETURNING {JOB_COLUMNS}
        "#
  ))
  .bind(job.id.as_str())
  .bind(job.status.as_str())
  .bind(job.priority.as_str())
  .bind(job.customer_id.as_ref().map(CompanyId::as_str))
  .bind(job.carrier_id.as_ref().map(CompanyId::as_str))
  .bind(job.vehicle_id.as_deref())
  .bind(job.driver_id.as_deref())
  .bind(Json(&job.pickup))
  .bind(Json(&job.delivery))
  .bind(job.pickup_date)
  .bind(job.delivery_date)
  .bind(job.value.amount)
  .bind(job.value.currency.as_str())
  .bind(job.agreed_cost_gbp)
  .bind(job.pod_uploaded)
  .bind(job.pod_document_id.as_deref())
  .bind(job.issue_details.as_deref())
  .bind(job.status_before_issue.map(|s| s.as_str()))
  .bind(job.self_invoiced)
  .bind(job.invoice_id.as_ref().map(InvoiceId::as_str))
  .bind(job.self_invoice_id.as_ref().map(InvoiceId::as_str))
  .bind(job.notes.as_deref())
  .bind(job.updated_at)
  .fetch_optional(pool)
  .await?;

  row.ok_or(RepositoryError::NotFound)?.try_into()
}

pub struct PostgresJobRepository {
  pool: PgPool,
}

impl PostgresJobRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl JobRepository for PostgresJobRepository {
  async fn create(&self, job: Job) -> Result<Job, RepositoryError> {
    let row = sqlx::query_as::<_, JobRow>(&format!(
      r#"
            INSERT INTO jobs (
                id, reference, status, priority, customer_id, carrier_id, vehicle_id,
                driver_id, pickup, delivery, pickup_date, delivery_date, value, currency,
                agreed_cost_gbp, pod_uploaded, pod_document_id, issue_details,
                status_before_issue, self_invoiced, invoice_id, self_invoice_id, notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
            RETURNING {JOB_COLUMNS}
            "#
    ))
    .bind(job.id.as_str())
    .bind(job.reference.value())
    .bind(job.status.as_str())
    .bind(job.priority.as_str())
    .bind(job.customer_id.as_ref().map(CompanyId::as_str))
    .bind(job.carrier_id.as_ref().map(CompanyId::as_str))
    .bind(job.vehicle_id.as_deref())
    .bind(job.driver_id.as_deref())
    .bind(Json(&job.pickup))
    .bind(Json(&job.delivery))
    .bind(job.pickup_date)
    .bind(job.delivery_date)
    .bind(job.value.amount)
    .bind(job.value.currency.as_str())
    .bind(job.agreed_cost_gbp)
    .bind(job.pod_uploaded)
    .bind(job.pod_document_id.as_deref())
    .bind(job.issue_details.as_deref())
    .bind(job.status_before_issue.map(|s| s.as_str()))
    .bind(job.self_invoiced)
    .bind(job.invoice_id.as_ref().map(InvoiceId::as_str))
    .bind(job.self_invoice_id.as_ref().map(InvoiceId::as_str))
    .bind(job.notes.as_deref())
    .bind(job.created_at)
    .bind(job.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn update(&self, job: Job) -> Result<Job, RepositoryError> {
    update_row(&self.pool, &job).await
  }

  async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
    let row = sqlx::query_as::<_, JobRow>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
      .bind(id.as_str())
      .fetch_optional(&self.pool)
      .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn find_by_ids(&self, ids: &[JobId]) -> Result<Vec<Job>, RepositoryError> {
    let ids: Vec<&str> = ids.iter().map(JobId::as_str).collect();
    let rows = sqlx::query_as::<_, JobRow>(&format!(
      "SELECT {JOB_COLUMNS} FROM jobs WHERE id = ANY($1)"
    ))
    .bind(&ids)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, RepositoryError> {
    let rows = sqlx::query_as::<_, JobRow>(&format!(
      r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR customer_id = $2)
              AND ($3::TEXT IS NULL OR carrier_id = $3)
            ORDER BY created_at DESC
            "#
    ))
    .bind(filter.status.map(|s| s.as_str()))
    .bind(filter.customer_id.as_ref().map(CompanyId::as_str))
    .bind(filter.carrier_id.as_ref().map(CompanyId::as_str))
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn find_ready_for_invoicing(&self) -> Result<Vec<Job>, RepositoryError> {
    let rows = sqlx::query_as::<_, JobRow>(&format!(
      r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE status = 'ready_for_invoicing' AND self_invoiced IS DISTINCT FROM TRUE
            ORDER BY created_at DESC
            "#
    ))
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn count_by_company(&self, company_id: &CompanyId) -> Result<i64, RepositoryError> {
    let count: i64 =
      sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE customer_id = $1 OR carrier_id = $1")
        .bind(company_id.as_str())
        .fetch_one(&self.pool)
        .await?;
    Ok(count)
  }

  async fn count_by_status(&self) -> Result<Vec<(JobStatus, i64)>, RepositoryError> {
    let rows: Vec<(String, i64)> =
      sqlx::query_as("SELECT status, COUNT(*) FROM jobs GROUP BY status ORDER BY status")
        .fetch_all(&self.pool)
        .await?;

    rows
      .into_iter()
      .map(|(status, count)| Ok((JobStatus::from_str(&status).map_err(corrupt)?, count)))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::job::entities::tests::new_job;
  use crate::infrastructure::persistence::postgres::test_db::setup_test_db;

  #[tokio::test]
  #[ignore = "requires Docker"]
  async fn test_round_trip_and_filters() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresJobRepository::new(pool);

    let job = repo.create(Job::new(new_job()).unwrap()).await.unwrap();
    let found = repo.find_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(found.reference, job.reference);
    assert_eq!(found.pickup, job.pickup);
    assert_eq!(found.value, job.value);

    let mut ready = found.clone();
    ready.status = JobStatus::ReadyForInvoicing;
    ready.pod_uploaded = true;
    repo.update(ready).await.unwrap();

    assert_eq!(repo.find_ready_for_invoicing().await.unwrap().len(), 1);
    let filter = JobFilter {
      status: Some(JobStatus::Booked),
      ..Default::default()
    };
    assert!(repo.list(&filter).await.unwrap().is_empty());
    assert_eq!(
      repo.count_by_status().await.unwrap(),
      vec![(JobStatus::ReadyForInvoicing, 1)]
    );
  }

  #[tokio::test]
  #[ignore = "requires Docker"]
  async fn test_duplicate_reference_is_rejected() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresJobRepository::new(pool);

    let mut input = new_job();
    input.reference = Some(JobReference::new("JOB-FIXED-1").unwrap());
    repo.create(Job::new(input.clone()).unwrap()).await.unwrap();
    let result = repo.create(Job::new(input).unwrap()).await;
    assert!(matches!(result, Err(RepositoryError::DuplicateKey(_))));
  }
}
