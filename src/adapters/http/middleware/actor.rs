use actix_web::{
  Error, HttpMessage, HttpRequest, ResponseError,
  body::EitherBody,
  dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
  future::{Ready, ready},
  rc::Rc,
  str::FromStr,
};

use crate::{
  adapters::http::errors::ApiError,
  domain::access::{AccessError, Actor, Role},
};

pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";
pub const ACTOR_ROLE_HEADER: &str = "X-Actor-Role";

/// Builds an [`Actor`] from the identity headers set by the gateway and
/// attaches it to the request. Requests without a usable identity get 401.
///
/// ```no_run
/// use actix_web::{App, web};
/// # use haulflow::adapters::http::middleware::ActorMiddleware;
///
/// let app = App::new().service(
///   web::scope("/api/v1")
///     .wrap(ActorMiddleware::new())
///     .route("/jobs", web::get().to(|| async { "jobs" })),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActorMiddleware;

impl ActorMiddleware {
  pub fn new() -> Self {
    Self
  }
}

impl<S, B> Transform<S, ServiceRequest> for ActorMiddleware
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Transform = ActorMiddlewareService<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(ActorMiddlewareService {
      service: Rc::new(service),
    }))
  }
}

pub struct ActorMiddlewareService<S> {
  service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ActorMiddlewareService<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  S::Future: 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let service = Rc::clone(&self.service);

    Box::pin(async move {
      let actor = match extract_actor(&req) {
        Ok(actor) => actor,
        Err(e) => {
          tracing::debug!("Rejected {} {}: {}", req.method(), req.path(), e);
          let (request, _) = req.into_parts();
          let response = ApiError::from(e).error_response().map_into_right_body();
          return Ok(ServiceResponse::new(request, response));
        }
      };

      req.extensions_mut().insert(actor);

      let res = service.call(req).await?;
      Ok(res.map_into_left_body())
    })
  }
}

fn header<'a>(req: &'a ServiceRequest, name: &str) -> Option<&'a str> {
  req
    .headers()
    .get(name)
    .and_then(|h| h.to_str().ok())
    .map(str::trim)
    .filter(|value| !value.is_empty())
}

fn extract_actor(req: &ServiceRequest) -> Result<Actor, AccessError> {
  let id = header(req, ACTOR_ID_HEADER).ok_or(AccessError::MissingActor)?;
  let role = header(req, ACTOR_ROLE_HEADER).ok_or(AccessError::MissingActor)?;
  Actor::new(id, Role::from_str(role)?)
}

/// Access to the actor attached by [`ActorMiddleware`]
pub trait ActorExt {
  fn actor(&self) -> Result<Actor, ApiError>;
}

impl ActorExt for HttpRequest {
  fn actor(&self) -> Result<Actor, ApiError> {
    self
      .extensions()
      .get::<Actor>()
      .cloned()
      .ok_or_else(|| ApiError::from(AccessError::MissingActor))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::{
    App, HttpResponse,
    http::StatusCode,
    test::{self, TestRequest},
    web,
  };

  #[test]
  fn test_extract_actor() {
    let req = TestRequest::default()
      .insert_header((ACTOR_ID_HEADER, "user-7"))
      .insert_header((ACTOR_ROLE_HEADER, "Dispatcher"))
      .to_srv_request();
    let actor = extract_actor(&req).unwrap();
    assert_eq!(actor.id, "user-7");
    assert_eq!(actor.role, Role::Dispatcher);
  }

  #[test]
  fn test_extract_actor_rejects_missing_or_unknown() {
    let req = TestRequest::default()
      .insert_header((ACTOR_ROLE_HEADER, "admin"))
      .to_srv_request();
    assert_eq!(extract_actor(&req), Err(AccessError::MissingActor));

    let req = TestRequest::default()
      .insert_header((ACTOR_ID_HEADER, "user-7"))
      .insert_header((ACTOR_ROLE_HEADER, "superuser"))
      .to_srv_request();
    assert_eq!(
      extract_actor(&req),
      Err(AccessError::UnknownRole("superuser".to_string()))
    );
  }

  #[actix_web::test]
  async fn test_middleware_attaches_actor() {
    async fn whoami(req: HttpRequest) -> Result<HttpResponse, ApiError> {
      let actor = req.actor()?;
      Ok(HttpResponse::Ok().body(actor.id))
    }

    let app = test::init_service(
      App::new()
        .wrap(ActorMiddleware::new())
        .route("/", web::get().to(whoami)),
    )
    .await;

    let req = TestRequest::get()
      .uri("/")
      .insert_header((ACTOR_ID_HEADER, "user-9"))
      .insert_header((ACTOR_ROLE_HEADER, "viewer"))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "user-9");

    let req = TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }
}
