use std::fmt::Display;

use crate::domain::shared::RepositoryError;

pub mod company_repository;
pub mod invoice_repository;
pub mod job_repository;
pub mod webhook_event_repository;

pub use company_repository::PostgresCompanyRepository;
pub use invoice_repository::PostgresInvoiceRepository;
pub use job_repository::PostgresJobRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;

/// Wraps a row that no longer parses into its domain type
pub(crate) fn corrupt(err: impl Display) -> RepositoryError {
  RepositoryError::CorruptRecord(err.to_string())
}

#[cfg(test)]
pub mod test_db {
  use sqlx::PgPool;
  use sqlx::postgres::PgPoolOptions;
  use testcontainers::ImageExt;
  use testcontainers_modules::postgres::Postgres;
  use testcontainers_modules::testcontainers::{ContainerAsync, runners::AsyncRunner};

  pub async fn setup_test_db() -> (PgPool, ContainerAsync<Postgres>) {
    let container = Postgres::default()
      .with_tag("16-alpine")
      .start()
      .await
      .expect("Failed to start postgres container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
      .get_host_port_ipv4(5432)
      .await
      .expect("Failed to get port");
    let database_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPoolOptions::new()
      .max_connections(5)
      .connect(&database_url)
      .await
      .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
      .run(&pool)
      .await
      .expect("Failed to run migrations");

    (pool, container)
  }
}
