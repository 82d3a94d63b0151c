use actix_web::web;
use std::sync::Arc;

use crate::application::company::{
  CreateCompanyUseCase, DeleteCompanyUseCase, GetCompanyUseCase, ListCompaniesUseCase,
  UpdateCompanyUseCase,
};
use crate::application::dashboard::DashboardStore;
use crate::application::invoice::{
  ChangeInvoiceStatusUseCase, CreateInvoiceFromJobUseCase, CreatePaymentIntentUseCase,
  CreateSelfInvoiceUseCase, GetInvoiceSummaryUseCase, GetInvoiceUseCase, ListInvoicesUseCase,
  MarkOverdueInvoicesUseCase,
};
use crate::application::job::{
  AssignCarrierUseCase, CreateJobUseCase, GetJobTransitionsUseCase, GetJobUseCase,
  GetJobsReadyForInvoicingUseCase, ListJobsUseCase, MarkReadyForInvoicingUseCase,
  RecordPodUseCase, ResolveIssueUseCase, TransitionJobUseCase, UpdateJobUseCase,
};
use crate::application::webhook::ReceiveWebhookUseCase;
use crate::domain::company::CompanyService;
use crate::domain::invoice::InvoiceService;
use crate::domain::job::JobService;
use crate::domain::payment::PaymentGateway;

use super::errors::ApiError;
use super::handlers::{companies, dashboard, invoices, jobs, webhooks};

/// JSON extractor settings: malformed or unknown-field bodies become a 400
/// in the standard error shape
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default()
    .limit(256 * 1024)
    .error_handler(|err, _req| ApiError::validation(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
  web::QueryConfig::default().error_handler(|err, _req| ApiError::validation(err.to_string()).into())
}

/// Use cases behind `/jobs`
#[derive(Clone)]
pub struct JobRouteDependencies {
  pub create: Arc<CreateJobUseCase>,
  pub list: Arc<ListJobsUseCase>,
  pub ready_for_invoicing: Arc<GetJobsReadyForInvoicingUseCase>,
  pub get: Arc<GetJobUseCase>,
  pub update: Arc<UpdateJobUseCase>,
  pub assign_carrier: Arc<AssignCarrierUseCase>,
  pub record_pod: Arc<RecordPodUseCase>,
  pub transition: Arc<TransitionJobUseCase>,
  pub resolve_issue: Arc<ResolveIssueUseCase>,
  pub mark_ready: Arc<MarkReadyForInvoicingUseCase>,
  pub transitions: Arc<GetJobTransitionsUseCase>,
}

impl JobRouteDependencies {
  pub fn new(job_service: Arc<JobService>) -> Self {
    Self {
      create: Arc::new(CreateJobUseCase::new(job_service.clone())),
      list: Arc::new(ListJobsUseCase::new(job_service.clone())),
      ready_for_invoicing: Arc::new(GetJobsReadyForInvoicingUseCase::new(job_service.clone())),
      get: Arc::new(GetJobUseCase::new(job_service.clone())),
      update: Arc::new(UpdateJobUseCase::new(job_service.clone())),
      assign_carrier: Arc::new(AssignCarrierUseCase::new(job_service.clone())),
      record_pod: Arc::new(RecordPodUseCase::new(job_service.clone())),
      transition: Arc::new(TransitionJobUseCase::new(job_service.clone())),
      resolve_issue: Arc::new(ResolveIssueUseCase::new(job_service.clone())),
      mark_ready: Arc::new(MarkReadyForInvoicingUseCase::new(job_service.clone())),
      transitions: Arc::new(GetJobTransitionsUseCase::new(job_service)),
    }
  }
}

/// Use cases behind `/invoices`
#[derive(Clone)]
pub struct InvoiceRouteDependencies {
  pub create_from_job: Arc<CreateInvoiceFromJobUseCase>,
  pub create_self_invoice: Arc<CreateSelfInvoiceUseCase>,
  pub list: Arc<ListInvoicesUseCase>,
  pub summary: Arc<GetInvoiceSummaryUseCase>,
  pub get: Arc<GetInvoiceUseCase>,
  pub change_status: Arc<ChangeInvoiceStatusUseCase>,
  pub mark_overdue: Arc<MarkOverdueInvoicesUseCase>,
  pub payment_intent: Arc<CreatePaymentIntentUseCase>,
}

impl InvoiceRouteDependencies {
  pub fn new(
    invoice_service: Arc<InvoiceService>,
    payment_gateway: Option<Arc<dyn PaymentGateway>>,
  ) -> Self {
    Self {
      create_from_job: Arc::new(CreateInvoiceFromJobUseCase::new(invoice_service.clone())),
      create_self_invoice: Arc::new(CreateSelfInvoiceUseCase::new(invoice_service.clone())),
      list: Arc::new(ListInvoicesUseCase::new(invoice_service.clone())),
      summary: Arc::new(GetInvoiceSummaryUseCase::new(invoice_service.clone())),
      get: Arc::new(GetInvoiceUseCase::new(invoice_service.clone())),
      change_status: Arc::new(ChangeInvoiceStatusUseCase::new(invoice_service.clone())),
      mark_overdue: Arc::new(MarkOverdueInvoicesUseCase::new(invoice_service.clone())),
      payment_intent: Arc::new(CreatePaymentIntentUseCase::new(
        invoice_service,
        payment_gateway,
      )),
    }
  }
}

/// Use cases behind `/companies`
#[derive(Clone)]
pub struct CompanyRouteDependencies {
  pub create: Arc<CreateCompanyUseCase>,
  pub list: Arc<ListCompaniesUseCase>,
  pub get: Arc<GetCompanyUseCase>,
  pub update: Arc<UpdateCompanyUseCase>,
  pub delete: Arc<DeleteCompanyUseCase>,
}

impl CompanyRouteDependencies {
  pub fn new(company_service: Arc<CompanyService>) -> Self {
    Self {
      create: Arc::new(CreateCompanyUseCase::new(company_service.clone())),
      list: Arc::new(ListCompaniesUseCase::new(company_service.clone())),
      get: Arc::new(GetCompanyUseCase::new(company_service.clone())),
      update: Arc::new(UpdateCompanyUseCase::new(company_service.clone())),
      delete: Arc::new(DeleteCompanyUseCase::new(company_service)),
    }
  }
}

/// Everything mounted behind the actor middleware
#[derive(Clone)]
pub struct ApiDependencies {
  pub jobs: JobRouteDependencies,
  pub invoices: InvoiceRouteDependencies,
  pub companies: CompanyRouteDependencies,
  pub dashboard: web::Data<DashboardStore>,
}

/// Configure job routes
///
/// - POST / - Create a job
/// - GET / - List jobs, filtered by status, customer or carrier
/// - GET /ready-for-invoicing - Jobs queued for invoicing
/// - GET /{id} - Job details
/// - PATCH /{id} - Update booking details
/// - POST /{id}/assign-carrier, /{id}/pod, /{id}/transition, /{id}/resolve-issue
/// - POST /{id}/ready-for-invoicing - Queue for invoicing
/// - GET /{id}/transitions - Transitions available from the current status
pub fn configure_job_routes(cfg: &mut web::ServiceConfig, deps: JobRouteDependencies) {
  cfg
    .app_data(web::Data::new(deps.create))
    .app_data(web::Data::new(deps.list))
    .app_data(web::Data::new(deps.ready_for_invoicing))
    .app_data(web::Data::new(deps.get))
    .app_data(web::Data::new(deps.update))
    .app_data(web::Data::new(deps.assign_carrier))
    .app_data(web::Data::new(deps.record_pod))
    .app_data(web::Data::new(deps.transition))
    .app_data(web::Data::new(deps.resolve_issue))
    .app_data(web::Data::new(deps.mark_ready))
    .app_data(web::Data::new(deps.transitions))
    .route("", web::post().to(jobs::create_job_handler))
    .route("", web::get().to(jobs::list_jobs_handler))
    .route(
      "/ready-for-invoicing",
      web::get().to(jobs::list_ready_for_invoicing_handler),
    )
    .route("/{id}", web::get().to(jobs::get_job_handler))
    .route("/{id}", web::patch().to(jobs::update_job_handler))
    .route(
      "/{id}/assign-carrier",
      web::post().to(jobs::assign_carrier_handler),
    )
    .route("/{id}/pod", web::post().to(jobs::record_pod_handler))
    .route(
      "/{id}/transition",
      web::post().to(jobs::transition_job_handler),
    )
    .route(
      "/{id}/resolve-issue",
      web::post().to(jobs::resolve_issue_handler),
    )
    .route(
      "/{id}/ready-for-invoicing",
      web::post().to(jobs::mark_ready_for_invoicing_handler),
    )
    .route(
      "/{id}/transitions",
      web::get().to(jobs::get_job_transitions_handler),
    );
}

/// Configure invoice routes
///
/// Fixed paths (`/summary`, `/self-invoice`, `/mark-overdue`) are registered
/// ahead of `/{id}`.
pub fn configure_invoice_routes(cfg: &mut web::ServiceConfig, deps: InvoiceRouteDependencies) {
  cfg
    .app_data(web::Data::new(deps.create_from_job))
    .app_data(web::Data::new(deps.create_self_invoice))
    .app_data(web::Data::new(deps.list))
    .app_data(web::Data::new(deps.summary))
    .app_data(web::Data::new(deps.get))
    .app_data(web::Data::new(deps.change_status))
    .app_data(web::Data::new(deps.mark_overdue))
    .app_data(web::Data::new(deps.payment_intent))
    .route("", web::get().to(invoices::list_invoices_handler))
    .route("/summary", web::get().to(invoices::invoice_summary_handler))
    .route(
      "/from-job/{job_id}",
      web::post().to(invoices::create_invoice_from_job_handler),
    )
    .route(
      "/self-invoice",
      web::post().to(invoices::create_self_invoice_handler),
    )
    .route(
      "/mark-overdue",
      web::post().to(invoices::mark_overdue_handler),
    )
    .route("/{id}", web::get().to(invoices::get_invoice_handler))
    .route(
      "/{id}/status",
      web::post().to(invoices::change_invoice_status_handler),
    )
    .route(
      "/{id}/payment-intent",
      web::post().to(invoices::create_payment_intent_handler),
    );
}

pub fn configure_company_routes(cfg: &mut web::ServiceConfig, deps: CompanyRouteDependencies) {
  cfg
    .app_data(web::Data::new(deps.create))
    .app_data(web::Data::new(deps.list))
    .app_data(web::Data::new(deps.get))
    .app_data(web::Data::new(deps.update))
    .app_data(web::Data::new(deps.delete))
    .route("", web::post().to(companies::create_company_handler))
    .route("", web::get().to(companies::list_companies_handler))
    .route("/{id}", web::get().to(companies::get_company_handler))
    .route("/{id}", web::put().to(companies::update_company_handler))
    .route("/{id}", web::delete().to(companies::delete_company_handler));
}

pub fn configure_dashboard_routes(cfg: &mut web::ServiceConfig, store: web::Data<DashboardStore>) {
  cfg
    .app_data(store)
    .route("", web::get().to(dashboard::get_dashboard_handler))
    .route(
      "/refresh",
      web::post().to(dashboard::refresh_dashboard_handler),
    );
}

/// Mounts every authenticated area; wrap the enclosing scope with
/// `ActorMiddleware`
pub fn configure_api_routes(cfg: &mut web::ServiceConfig, deps: ApiDependencies) {
  let ApiDependencies {
    jobs,
    invoices,
    companies,
    dashboard,
  } = deps;

  cfg
    .service(web::scope("/jobs").configure(|cfg| configure_job_routes(cfg, jobs)))
    .service(web::scope("/invoices").configure(|cfg| configure_invoice_routes(cfg, invoices)))
    .service(web::scope("/companies").configure(|cfg| configure_company_routes(cfg, companies)))
    .service(web::scope("/dashboard").configure(|cfg| configure_dashboard_routes(cfg, dashboard)));
}

/// Public webhook receiver; rate limiting is applied by the caller
pub fn configure_webhook_routes(
  cfg: &mut web::ServiceConfig,
  use_case: Arc<ReceiveWebhookUseCase>,
) {
  cfg
    .app_data(web::Data::new(use_case))
    .route("", web::post().to(webhooks::receive_webhook_handler));
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::http::handlers::health::health_handler;
  use crate::adapters::http::middleware::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, ActorMiddleware};
  use crate::domain::company::CompanyType;
  use crate::domain::job::JobStatus;
  use crate::domain::webhook::WebhookEventRepository;
  use crate::infrastructure::persistence::memory::test_support::{company, services};
  use crate::infrastructure::persistence::memory::{InMemoryWebhookEventRepository, MemoryStore};
  use actix_web::{
    App,
    http::StatusCode,
    test::{self, TestRequest},
  };
  use serde_json::{Value, json};

  struct Harness {
    store: Arc<MemoryStore>,
    deps: ApiDependencies,
    webhook: Arc<ReceiveWebhookUseCase>,
  }

  fn harness() -> Harness {
    let (store, svc) = services();
    let jobs = Arc::new(svc.jobs);
    let invoices = Arc::new(svc.invoices);
    let webhook_repo: Arc<dyn WebhookEventRepository> =
      Arc::new(InMemoryWebhookEventRepository::new(store.clone()));

    Harness {
      deps: ApiDependencies {
        jobs: JobRouteDependencies::new(jobs.clone()),
        invoices: InvoiceRouteDependencies::new(invoices.clone(), None),
        companies: CompanyRouteDependencies::new(Arc::new(svc.companies)),
        dashboard: web::Data::new(DashboardStore::new(jobs, invoices)),
      },
      webhook: Arc::new(ReceiveWebhookUseCase::new(webhook_repo)),
      store,
    }
  }

  macro_rules! init_app {
    ($harness:expr) => {{
      let deps = $harness.deps.clone();
      let webhook = $harness.webhook.clone();
      test::init_service(
        App::new()
          .app_data(json_config())
          .app_data(query_config())
          .service(
            web::scope("/api/v1/webhooks").configure(|cfg| configure_webhook_routes(cfg, webhook)),
          )
          .route("/api/v1/health", web::get().to(health_handler))
          .service(
            web::scope("/api/v1")
              .wrap(ActorMiddleware::new())
              .configure(|cfg| configure_api_routes(cfg, deps)),
          ),
      )
      .await
    }};
  }

  fn as_role(request: TestRequest, role: &str) -> TestRequest {
    request
      .insert_header((ACTOR_ID_HEADER, "user-1"))
      .insert_header((ACTOR_ROLE_HEADER, role))
  }

  fn job_body() -> Value {
    json!({
      "pickup": {"address": "1 Quay St", "city": "Leeds", "postcode": "LS1 4AP"},
      "delivery": {"address": "2 Dock Rd", "city": "Bristol", "postcode": "BS1 6QA"},
      "pickup_date": "2026-10-01",
      "delivery_date": "2026-10-02",
      "value": 1000,
      "agreed_cost_gbp": 650
    })
  }

  #[actix_web::test]
  async fn test_health_needs_no_actor() {
    let harness = harness();
    let app = init_app!(harness);

    let resp = test::call_service(&app, TestRequest::get().uri("/api/v1/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[actix_web::test]
  async fn test_actor_and_capabilities_are_enforced() {
    let harness = harness();
    let app = init_app!(harness);

    let req = TestRequest::get().uri("/api/v1/jobs").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = as_role(TestRequest::post().uri("/api/v1/jobs"), "viewer")
      .set_json(job_body())
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "forbidden");

    let req = as_role(TestRequest::get().uri("/api/v1/jobs"), "viewer").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[actix_web::test]
  async fn test_job_lifecycle_over_http() {
    let harness = harness();
    let app = init_app!(harness);

    let req = as_role(TestRequest::post().uri("/api/v1/jobs"), "dispatcher")
      .set_json(job_body())
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let job: Value = test::read_body_json(resp).await;
    assert_eq!(job["status"], "booked");
    let id = job["id"].as_str().unwrap().to_string();

    let req = as_role(
      TestRequest::get().uri(&format!("/api/v1/jobs/{}/transitions", id)),
      "viewer",
    )
    .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "booked");

    // Skipping ahead is an illegal transition
    let req = as_role(
      TestRequest::post().uri(&format!("/api/v1/jobs/{}/transition", id)),
      "dispatcher",
    )
    .set_json(json!({"to": "invoiced"}))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "illegal_transition");

    // Rule failures on mark-ready come back as data
    let req = as_role(
      TestRequest::post().uri(&format!("/api/v1/jobs/{}/ready-for-invoicing", id)),
      "accounts",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().is_empty());
  }

  #[actix_web::test]
  async fn test_validation_errors_carry_field_paths() {
    let harness = harness();
    let app = init_app!(harness);

    let mut body = job_body();
    body["pickup"]["postcode"] = json!("12345");
    let req = as_role(TestRequest::post().uri("/api/v1/jobs"), "dispatcher")
      .set_json(body)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"]["pickup.postcode"][0], "Postcode is not valid");

    let mut body = job_body();
    body["job_reference"] = json!("JOB-1");
    let req = as_role(TestRequest::post().uri("/api/v1/jobs"), "dispatcher")
      .set_json(body)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[actix_web::test]
  async fn test_company_with_jobs_cannot_be_deleted() {
    let harness = harness();
    let customer = company(&harness.store, CompanyType::Customer).await;
    let app = init_app!(harness);

    let mut body = job_body();
    body["customer_id"] = json!(customer.id.as_str());
    let req = as_role(TestRequest::post().uri("/api/v1/jobs"), "admin")
      .set_json(body)
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = as_role(
      TestRequest::delete().uri(&format!("/api/v1/companies/{}", customer.id)),
      "admin",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "referential_integrity");
    assert_eq!(body["details"]["job_count"], 1);
    assert_eq!(harness.store.company_count().await, 1);
  }

  #[actix_web::test]
  async fn test_payment_intent_without_gateway_is_unavailable() {
    let harness = harness();
    let app = init_app!(harness);

    let req = as_role(
      TestRequest::post().uri("/api/v1/invoices/invoice_abc/payment-intent"),
      "accounts",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  }

  #[actix_web::test]
  async fn test_dashboard_counts_jobs() {
    let harness = harness();
    let app = init_app!(harness);

    let req = as_role(TestRequest::post().uri("/api/v1/jobs"), "admin")
      .set_json(job_body())
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = as_role(TestRequest::post().uri("/api/v1/dashboard/refresh"), "dispatcher").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["job_counts"][JobStatus::Booked.as_str()], 1);
    assert_eq!(body["outstanding_invoice_total"], json!([]));
  }

  #[actix_web::test]
  async fn test_webhooks_accept_json_and_form() {
    let harness = harness();
    let app = init_app!(harness);

    let req = TestRequest::post()
      .uri("/api/v1/webhooks?integration_id=telematics")
      .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
      .set_payload("status=delivered&job=JOB-1")
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["event_id"].as_str().unwrap().starts_with("webhook_"));

    let req = TestRequest::post()
      .uri("/api/v1/webhooks")
      .set_json(json!({"type": "ping"}))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::post()
      .uri("/api/v1/webhooks?integration_id=stripe")
      .insert_header(("Content-Type", "text/plain"))
      .set_payload("hello")
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
  }
}
