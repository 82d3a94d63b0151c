pub mod companies;
pub mod dashboard;
pub mod health;
pub mod invoices;
pub mod jobs;
pub mod webhooks;

use actix_web::HttpRequest;
use serde::de::DeserializeOwned;

use crate::{
  adapters::http::{errors::ApiError, middleware::ActorExt},
  domain::access::{Actor, Capability, authorize},
};

/// Actor attached by the middleware, checked against `capability`
pub fn require(req: &HttpRequest, capability: Capability) -> Result<Actor, ApiError> {
  let actor = req.actor()?;
  authorize(&actor, capability)?;
  Ok(actor)
}

/// Parses an optional JSON body; an empty body yields the default
pub fn optional_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(T::default());
  }
  serde_json::from_slice(body).map_err(|e| ApiError::validation(format!("Invalid JSON body: {}", e)))
}
