pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;

// Re-export commonly used types
pub use dtos::{ErrorResponse, HealthResponse};
pub use errors::ApiError;
pub use handlers::health::health_handler;
pub use middleware::{ActorExt, ActorMiddleware};
pub use routes::{
  ApiDependencies, CompanyRouteDependencies, InvoiceRouteDependencies, JobRouteDependencies,
  configure_api_routes, configure_webhook_routes, json_config, query_config,
};
