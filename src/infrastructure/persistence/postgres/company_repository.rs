use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

use super::corrupt;
use crate::domain::company::{
  Company, CompanyId, CompanyName, CompanyRepository, CompanyType, ContactInfo,
};
use crate::domain::shared::{Location, RepositoryError};

#[derive(Debug, FromRow)]
struct CompanyRow {
  id: String,
  company_type: String,
  name: String,
  credit_limit: Option<Decimal>,
  contact: Json<ContactInfo>,
  address: Option<Json<Location>>,
  metadata: serde_json::Value,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<CompanyRow> for Company {
  type Error = RepositoryError;

  fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
    Ok(Company {
      id: CompanyId::parse(row.id).map_err(corrupt)?,
      company_type: CompanyType::from_str(&row.company_type).map_err(corrupt)?,
      name: CompanyName::new(row.name).map_err(corrupt)?,
      credit_limit: row.credit_limit,
      contact: row.contact.0,
      address: row.address.map(|a| a.0),
      metadata: row.metadata,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

const COMPANY_COLUMNS: &str =
  "id, company_type, name, credit_limit, contact, address, metadata, created_at, updated_at";

pub struct PostgresCompanyRepository {
  pool: PgPool,
}

impl PostgresCompanyRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
  async fn create(&self, company: Company) -> Result<Company, RepositoryError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
      r#"
            INSERT INTO companies (
                id, company_type, name, credit_limit, contact, address, metadata,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COMPANY_COLUMNS}
            "#
    ))
    .bind(company.id.as_str())
    .bind(company.company_type.as_str())
    .bind(company.name.as_str())
    .bind(company.credit_limit)
    .bind(Json(&company.contact))
    .bind(company.address.as_ref().map(Json))
    .bind(&company.metadata)
    .bind(company.created_at)
    .bind(company.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn update(&self, company: Company) -> Result<Company, RepositoryError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
      r#"
            UPDATE companies
            SET name = $2, credit_limit = $3, contact = $4, address = $5,
                metadata = $6, updated_at = $7
            WHERE id = $1
            RETURNING {COMPANY_COLUMNS}
            "#
    ))
    .bind(company.id.as_str())
    .bind(company.name.as_str())
    .bind(company.credit_limit)
    .bind(Json(&company.contact))
    .bind(company.address.as_ref().map(Json))
    .bind(&company.metadata)
    .bind(company.updated_at)
    .fetch_optional(&self.pool)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    row.try_into()
  }

  async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
      "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"
    ))
    .bind(id.as_str())
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn list(&self, company_type: Option<CompanyType>) -> Result<Vec<Company>, RepositoryError> {
    let rows = sqlx::query_as::<_, CompanyRow>(&format!(
      r#"
            SELECT {COMPANY_COLUMNS}
            FROM companies
            WHERE $1::TEXT IS NULL OR company_type = $1
            ORDER BY name ASC
            "#
    ))
    .bind(company_type.map(|t| t.as_str()))
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn delete(&self, id: &CompanyId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM companies WHERE id = $1")
      .bind(id.as_str())
      .execute(&self.pool)
      .await?;

    if result.rows_affected() == 0 {
      Err(RepositoryError::NotFound)
    } else {
      Ok(())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::company::CompanyProfile;
  use crate::infrastructure::persistence::postgres::test_db::setup_test_db;
  use serde_json::json;

  fn carrier() -> Company {
    Company::new(
      CompanyType::Carrier,
      CompanyProfile {
        name: CompanyName::new("Pennine Haulage Ltd").unwrap(),
        credit_limit: Some(Decimal::new(500000, 2)),
        contact: ContactInfo::new(None, Some("ops@pennine.example".to_string()), None).unwrap(),
        address: None,
        metadata: json!({"fleet_size": 12}),
      },
    )
    .unwrap()
  }

  #[tokio::test]
  #[ignore = "requires Docker"]
  async fn test_create_find_and_delete() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostgresCompanyRepository::new(pool);

    let created = repo.create(carrier()).await.unwrap();
    let found = repo.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(found.name.as_str(), "Pennine Haulage Ltd");
    assert_eq!(found.metadata, json!({"fleet_size": 12}));
    assert_eq!(
      repo.list(Some(CompanyType::Customer)).await.unwrap().len(),
      0
    );

    repo.delete(&created.id).await.unwrap();
    assert!(repo.find_by_id(&created.id).await.unwrap().is_none());
    assert!(matches!(
      repo.delete(&created.id).await,
      Err(RepositoryError::NotFound)
    ));
  }
}
