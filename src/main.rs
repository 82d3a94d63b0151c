use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{App, HttpServer, middleware::Logger, web};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use haulflow::{
  adapters::http::{
    ActorMiddleware, ApiDependencies, CompanyRouteDependencies, InvoiceRouteDependencies,
    JobRouteDependencies, configure_api_routes, configure_webhook_routes, health_handler,
    json_config, query_config,
  },
  application::{dashboard::DashboardStore, webhook::ReceiveWebhookUseCase},
  domain::{
    company::{CompanyRepository, CompanyService},
    invoice::{InvoiceRepository, InvoiceService},
    job::{JobRepository, JobService},
    payment::PaymentGateway,
    webhook::WebhookEventRepository,
  },
  infrastructure::{
    config::{Config, DatabaseConfig},
    payments::HttpPaymentGateway,
    persistence::{
      memory::{
        InMemoryCompanyRepository, InMemoryInvoiceRepository, InMemoryJobRepository,
        InMemoryWebhookEventRepository, MemoryStore,
      },
      postgres::{
        PostgresCompanyRepository, PostgresInvoiceRepository, PostgresJobRepository,
        PostgresWebhookEventRepository,
      },
    },
    retry::{RetryPolicy, retry},
  },
};

struct Repositories {
  jobs: Arc<dyn JobRepository>,
  companies: Arc<dyn CompanyRepository>,
  invoices: Arc<dyn InvoiceRepository>,
  webhook_events: Arc<dyn WebhookEventRepository>,
}

impl Repositories {
  fn postgres(pool: PgPool) -> Self {
    Self {
      jobs: Arc::new(PostgresJobRepository::new(pool.clone())),
      companies: Arc::new(PostgresCompanyRepository::new(pool.clone())),
      invoices: Arc::new(PostgresInvoiceRepository::new(pool.clone())),
      webhook_events: Arc::new(PostgresWebhookEventRepository::new(pool)),
    }
  }

  fn in_memory() -> Self {
    let store = Arc::new(MemoryStore::new());
    Self {
      jobs: Arc::new(InMemoryJobRepository::new(store.clone())),
      companies: Arc::new(InMemoryCompanyRepository::new(store.clone())),
      invoices: Arc::new(InMemoryInvoiceRepository::new(store.clone())),
      webhook_events: Arc::new(InMemoryWebhookEventRepository::new(store)),
    }
  }
}

/// Connects with a per-attempt timeout, retrying transient failures
async fn connect_database(
  database: &DatabaseConfig,
  policy: &RetryPolicy,
) -> std::io::Result<PgPool> {
  tracing::info!("Connecting to database: {}", database.url);

  let pool = retry(
    policy,
    "Database connection",
    |e: &sqlx::Error| matches!(e, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut),
    move || async move {
      tokio::time::timeout(
        Duration::from_secs(database.connect_timeout_seconds),
        PgPoolOptions::new()
          .max_connections(database.max_connections)
          .acquire_timeout(Duration::from_secs(database.acquire_timeout_seconds))
          .connect(&database.url),
      )
      .await
      .unwrap_or(Err(sqlx::Error::PoolTimedOut))
    },
  )
  .await
  .map_err(|e| {
    tracing::error!("Failed to connect to database: {}", e);
    match e {
      sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        format!(
          "Could not connect to database. Is PostgreSQL running at {}?",
          database.url
        ),
      ),
      _ => std::io::Error::other(format!("Database error: {}", e)),
    }
  })?;

  tracing::info!("Database connection pool created");

  tracing::info!("Running database migrations");
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .map_err(|e| std::io::Error::other(format!("Failed to run database migrations: {}", e)))?;
  tracing::info!("Database migrations completed");

  Ok(pool)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Initialize tracing subscriber for logging
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "haulflow=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting Haulflow");

  let config = Config::load().map_err(|e| {
    tracing::error!("Failed to load configuration: {}", e);
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
  })?;
  tracing::info!("Configuration loaded successfully");

  let retry_policy = config.retry.policy();

  let repos = match &config.database {
    Some(database) => Repositories::postgres(connect_database(database, &retry_policy).await?),
    None => {
      tracing::warn!("No [database] configured; data is kept in memory and lost on exit");
      Repositories::in_memory()
    }
  };

  let invoicing_defaults = config.invoicing.defaults().map_err(|e| {
    std::io::Error::new(
      std::io::ErrorKind::InvalidInput,
      format!("Invalid invoicing configuration: {}", e),
    )
  })?;

  // Domain services
  let job_service = Arc::new(JobService::new(
    repos.jobs.clone(),
    repos.companies.clone(),
    repos.invoices.clone(),
  ));
  let invoice_service = Arc::new(InvoiceService::new(
    repos.invoices.clone(),
    repos.jobs.clone(),
    repos.companies.clone(),
    invoicing_defaults,
  ));
  let company_service = Arc::new(CompanyService::new(
    repos.companies.clone(),
    repos.jobs.clone(),
  ));

  let payment_gateway: Option<Arc<dyn PaymentGateway>> = match &config.payments {
    Some(payments) => {
      let gateway = HttpPaymentGateway::new(payments, retry_policy).map_err(|e| {
        std::io::Error::new(
          std::io::ErrorKind::InvalidInput,
          format!("Invalid payments configuration: {}", e),
        )
      })?;
      tracing::info!("Payment gateway configured at {}", payments.base_url);
      Some(Arc::new(gateway))
    }
    None => {
      tracing::warn!("Payments not configured; payment intents will be unavailable");
      None
    }
  };

  let dashboard = web::Data::new(DashboardStore::new(
    job_service.clone(),
    invoice_service.clone(),
  ));
  if let Err(e) = dashboard.init().await {
    tracing::warn!("Initial dashboard refresh failed: {}", e);
  }

  let deps = ApiDependencies {
    jobs: JobRouteDependencies::new(job_service),
    invoices: InvoiceRouteDependencies::new(invoice_service, payment_gateway),
    companies: CompanyRouteDependencies::new(company_service),
    dashboard: dashboard.clone(),
  };
  let receive_webhook_use_case = Arc::new(ReceiveWebhookUseCase::new(repos.webhook_events));

  let governor_config = GovernorConfigBuilder::default()
    .period(Duration::from_millis(
      (1000 / config.webhooks.per_second.max(1)).max(1),
    ))
    .burst_size(config.webhooks.burst_size.max(1))
    .finish()
    .ok_or_else(|| {
      std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        "Invalid webhook rate limit configuration",
      )
    })?;

  let server_host = config.server.host.clone();
  let server_port = config.server.port;

  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  HttpServer::new(move || {
    App::new()
      // Add logging middleware
      .wrap(Logger::default())
      .app_data(json_config())
      .app_data(query_config())
      .route("/api/v1/health", web::get().to(health_handler))
      // Public webhook receiver, rate limited per peer
      .service(
        web::scope("/api/v1/webhooks")
          .wrap(Governor::new(&governor_config))
          .configure(|cfg| configure_webhook_routes(cfg, receive_webhook_use_case.clone())),
      )
      // Everything else requires an actor
      .service(
        web::scope("/api/v1")
          .wrap(ActorMiddleware::new())
          .configure(|cfg| configure_api_routes(cfg, deps.clone())),
      )
  })
  .bind((server_host.as_str(), server_port))?
  .run()
  .await?;

  dashboard.clear().await;
  tracing::info!("Server stopped");

  Ok(())
}
