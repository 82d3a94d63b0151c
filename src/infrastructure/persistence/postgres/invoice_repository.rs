use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::str::FromStr;

use super::corrupt;
use super::job_repository::{JOB_COLUMNS, JobRow};
use crate::domain::company::CompanyId;
use crate::domain::invoice::{
  Invoice, InvoiceFilter, InvoiceId, InvoiceKind, InvoiceLineItem, InvoiceNumber,
  InvoiceRepository, InvoiceStatus, InvoiceStatusSummary, PaymentTerms, TaxRate,
};
use crate::domain::job::{Job, JobId};
use crate::domain::shared::{Currency, Money, RepositoryError};

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: String,
  invoice_number: String,
  kind: String,
  company_id: String,
  currency: String,
  subtotal: Decimal,
  tax_rate: Decimal,
  vat: Decimal,
  total: Decimal,
  invoice_date: NaiveDate,
  due_date: NaiveDate,
  payment_term_days: i32,
  period_start: Option<NaiveDate>,
  period_end: Option<NaiveDate>,
  status: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LineItemRow {
  invoice_id: String,
  job_id: String,
  description: String,
  amount: Decimal,
}

/// Invoice header plus its line items and job links
struct InvoiceParts {
  row: InvoiceRow,
  line_items: Vec<LineItemRow>,
  job_ids: Vec<String>,
}

impl TryFrom<InvoiceParts> for Invoice {
  type Error = RepositoryError;

  fn try_from(parts: InvoiceParts) -> Result<Self, Self::Error> {
    let row = parts.row;
    let currency = Currency::from_str(&row.currency).map_err(corrupt)?;
    let money = |amount: Decimal| Money::new(amount, currency).map_err(corrupt);
    let payment_terms = u32::try_from(row.payment_term_days)
      .map_err(|_| RepositoryError::CorruptRecord(format!("payment terms {}", row.payment_term_days)))
      .and_then(|days| PaymentTerms::new(days).map_err(corrupt))?;

    let line_items = parts
      .line_items
      .into_iter()
      .map(|item| {
        Ok(InvoiceLineItem {
          job_id: JobId::parse(item.job_id).map_err(corrupt)?,
          description: item.description,
          amount: money(item.amount)?,
        })
      })
      .collect::<Result<Vec<_>, RepositoryError>>()?;

    Ok(Invoice {
      id: InvoiceId::parse(row.id).map_err(corrupt)?,
      invoice_number: InvoiceNumber::new(row.invoice_number).map_err(corrupt)?,
      kind: InvoiceKind::from_str(&row.kind).map_err(corrupt)?,
      company_id: CompanyId::parse(row.company_id).map_err(corrupt)?,
      job_ids: parts
        .job_ids
        .into_iter()
        .map(JobId::parse)
        .collect::<Result<Vec<_>, _>>()
        .map_err(corrupt)?,
      line_items,
      currency,
      subtotal: money(row.subtotal)?,
      tax_rate: TaxRate::new(row.tax_rate).map_err(corrupt)?,
      vat: money(row.vat)?,
      total: money(row.total)?,
      invoice_date: row.invoice_date,
      due_date: row.due_date,
      payment_terms,
      period_start: row.period_start,
      period_end: row.period_end,
      status: InvoiceStatus::from_str(&row.status).map_err(corrupt)?,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

const INVOICE_COLUMNS: &str = "id, invoice_number, kind, company_id, currency, subtotal, \
   tax_rate, vat, total, invoice_date, due_date, payment_term_days, period_start, period_end, \
   status, created_at, updated_at";

pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Loads line items and job links for `rows` with two queries
  async fn hydrate(&self, rows: Vec<InvoiceRow>) -> Result<Vec<Invoice>, RepositoryError> {
    if rows.is_empty() {
      return Ok(Vec::new());
    }
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();

    let items = sqlx::query_as::<_, LineItemRow>(
      r#"
            SELECT invoice_id, job_id, description, amount
            FROM invoice_line_items
            WHERE invoice_id = ANY($1)
            ORDER BY invoice_id, position
            "#,
    )
    .bind(&ids)
    .fetch_all(&self.pool)
    .await?;

    let links: Vec<(String, String)> = sqlx::query_as(
      r#"
            SELECT invoice_id, job_id
            FROM invoice_jobs
            WHERE invoice_id = ANY($1)
            ORDER BY invoice_id, position
            "#,
    )
    .bind(&ids)
    .fetch_all(&self.pool)
    .await?;

    let mut items_by_invoice: HashMap<String, Vec<LineItemRow>> = HashMap::new();
    for item in items {
      items_by_invoice
        .entry(item.invoice_id.clone())
        .or_default()
        .push(item);
    }
    let mut jobs_by_invoice: HashMap<String, Vec<String>> = HashMap::new();
    for (invoice_id, job_id) in links {
      jobs_by_invoice.entry(invoice_id).or_default().push(job_id);
    }

    rows
      .into_iter()
      .map(|row| {
        let line_items = items_by_invoice.remove(&row.id).unwrap_or_default();
        let job_ids = jobs_by_invoice.remove(&row.id).unwrap_or_default();
        Invoice::try_from(InvoiceParts {
          row,
          line_items,
          job_ids,
        })
      })
      .collect()
  }
}

async fn insert_in_tx(
  tx: &mut Transaction<'_, Postgres>,
  invoice: &Invoice,
) -> Result<(), RepositoryError> {
  sqlx::query(
    r#"
        INSERT INTO invoices (
            id, invoice_number, kind, company_id, currency, subtotal, tax_rate, vat, total,
            invoice_date, due_date, payment_term_days, period_start, period_end, status,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        "#,
  )
  .bind(invoice.id.as_str())
  .bind(invoice.invoice_number.value())
  .bind(invoice.kind.as_str())
  .bind(invoice.company_id.as_str())
  .bind(invoice.currency.as_str())
  .bind(invoice.subtotal.amount)
  .bind(invoice.tax_rate.value())
  .bind(invoice.vat.amount)
  .bind(invoice.total.amount)
  .bind(invoice.invoice_date)
  .bind(invoice.due_date)
  .bind(invoice.payment_terms.days() as i32)
  .bind(invoice.period_start)
  .bind(invoice.period_end)
  .bind(invoice.status.as_str())
  .bind(invoice.created_at)
  .bind(invoice.updated_at)
  .execute(&mut **tx)
  .await?;

  for (position, item) in invoice.line_items.iter().enumerate() {
    sqlx::query(
      r#"
          INSERT INTO invoice_line_items (invoice_id, position, job_id, description, amount)
          VALUES ($1, $2, $3, $4, $5)
          "#,
    )
    .bind(invoice.id.as_str())
    .bind(position as i32)
    .bind(item.job_id.as_str())
    .bind(&item.description)
    .bind(item.amount.amount)
    .execute(&mut **tx)
    .await?;
  }

  for (position, job_id) in invoice.job_ids.iter().enumerate() {
    sqlx::query("INSERT INTO invoice_jobs (invoice_id, job_id, position) VALUES ($1, $2, $3)")
      .bind(invoice.id.as_str())
      .bind(job_id.as_str())
      .bind(position as i32)
      .execute(&mut **tx)
      .await?;
  }

  Ok(())
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn create_for_job(&self, invoice: Invoice, job: Job) -> Result<(Invoice, Job), RepositoryError> {
    let mut tx = self.pool.begin().await?;

    let locked: Option<String> = sqlx::query_scalar(
      r#"
          SELECT id FROM jobs
          WHERE id = $1 AND status = 'ready_for_invoicing' AND invoice_id IS NULL
          FOR UPDATE
          "#,
    )
    .bind(job.id.as_str())
    .fetch_optional(&mut *tx)
    .await?;
    if locked.is_none() {
      return Err(RepositoryError::Conflict(format!(
        "job {} is missing, already invoiced or no longer ready for invoicing",
        job.id
      )));
    }

    insert_in_tx(&mut tx, &invoice).await?;

    // Only the invoicing columns are written so a concurrent self-invoice
    // flag on the same row survives
    let row = sqlx::query_as::<_, JobRow>(&format!(
      r#"
          UPDATE jobs
          SET status = $2, invoice_id = $3, updated_at = $4
          WHERE id = $1 AND status = 'ready_for_invoicing' AND invoice_id IS NULL
          RETURNING {JOB_COLUMNS}
          "#
    ))
    .bind(job.id.as_str())
    .bind(job.status.as_str())
    .bind(invoice.id.as_str())
    .bind(job.updated_at)
    .fetch_optional(&mut *tx)
    .await?;

    let job = Job::try_from(row.ok_or(RepositoryError::NotFound)?)?;
    tx.commit().await?;

    Ok((invoice, job))
  }

  async fn create_self_invoice(
    &self,
    invoice: Invoice,
    jobs: Vec<Job>,
  ) -> Result<(Invoice, Vec<Job>), RepositoryError> {
    let mut tx = self.pool.begin().await?;

    // Lock in id order so concurrent batches cannot deadlock
    let mut ids: Vec<&str> = jobs.iter().map(|job| job.id.as_str()).collect();
    ids.sort_unstable();
    let locked: Vec<String> = sqlx::query_scalar(
      r#"
          SELECT id FROM jobs
          WHERE id = ANY($1) AND self_invoiced IS DISTINCT FROM TRUE
          ORDER BY id
          FOR UPDATE
          "#,
    )
    .bind(&ids)
    .fetch_all(&mut *tx)
    .await?;
    if locked.len() != ids.len() {
      return Err(RepositoryError::Conflict(
        "one or more jobs were self-invoiced concurrently".to_string(),
      ));
    }

    insert_in_tx(&mut tx, &invoice).await?;

    // Only the self-invoice columns are written so a concurrent customer
    // invoice on the same rows survives
    let rows = sqlx::query_as::<_, JobRow>(&format!(
      r#"
          UPDATE jobs
          SET self_invoiced = TRUE, self_invoice_id = $2, updated_at = $3
          WHERE id = ANY($1)
          RETURNING {JOB_COLUMNS}
          "#
    ))
    .bind(&ids)
    .bind(invoice.id.as_str())
    .bind(invoice.updated_at)
    .fetch_all(&mut *tx)
    .await?;
    let mut stored = rows
      .into_iter()
      .map(Job::try_from)
      .collect::<Result<Vec<_>, _>>()?;
    tx.commit().await?;

    let mut ordered = Vec::with_capacity(jobs.len());
    for job in &jobs {
      if let Some(index) = stored.iter().position(|s| s.id == job.id) {
        ordered.push(stored.swap_remove(index));
      }
    }

    Ok((invoice, ordered))
  }

  async fn update(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
    let result = sqlx::query(
      r#"
            UPDATE invoices
            SET status = $2, due_date = $3, updated_at = $4
            WHERE id = $1
            "#,
    )
    .bind(invoice.id.as_str())
    .bind(invoice.status.as_str())
    .bind(invoice.due_date)
    .bind(invoice.updated_at)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(RepositoryError::NotFound);
    }
    Ok(invoice)
  }

  async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
      "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
    ))
    .bind(id.as_str())
    .fetch_optional(&self.pool)
    .await?;

    match row {
      Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
      None => Ok(None),
    }
  }

  async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, RepositoryError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR kind = $2)
              AND ($3::TEXT IS NULL OR company_id = $3)
            ORDER BY created_at DESC
            "#
    ))
    .bind(filter.status.map(|s| s.as_str()))
    .bind(filter.kind.map(|k| k.as_str()))
    .bind(filter.company_id.as_ref().map(CompanyId::as_str))
    .fetch_all(&self.pool)
    .await?;

    self.hydrate(rows).await
  }

  async fn find_overdue(&self, today: NaiveDate) -> Result<Vec<Invoice>, RepositoryError> {
    let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
      r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE status = 'sent' AND due_date < $1
            ORDER BY due_date ASC
            "#
    ))
    .bind(today)
    .fetch_all(&self.pool)
    .await?;

    self.hydrate(rows).await
  }

  async fn summarize_by_status(&self) -> Result<Vec<InvoiceStatusSummary>, RepositoryError> {
    let rows: Vec<(String, String, i64, Decimal)> = sqlx::query_as(
      r#"
            SELECT status, currency, COUNT(*), COALESCE(SUM(total), 0)
            FROM invoices
            GROUP BY status, currency
            ORDER BY status, currency
            "#,
    )
    .fetch_all(&self.pool)
    .await?;

    rows
      .into_iter()
      .map(|(status, currency, count, total)| {
        Ok(InvoiceStatusSummary {
          status: InvoiceStatus::from_str(&status).map_err(corrupt)?,
          currency: Currency::from_str(&currency).map_err(corrupt)?,
          count,
          total,
        })
      })
      .collect()
  }
}
