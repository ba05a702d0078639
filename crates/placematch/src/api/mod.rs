use axum::{
  Router,
  http::StatusCode,
  middleware,
  routing::{get, post},
};
use libplacematch::prelude::*;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{api::config::Config, trace::build_prometheus};

pub mod config;
pub mod dto;
pub mod errors;

pub mod handlers;
mod middlewares;

/// Classifier used by the service, only configured when a model URL is given.
pub type ServiceClassifier = Option<OllamaClassifier>;

#[derive(Clone)]
pub struct AppState<P: PlacesProvider> {
  pub config: Config,
  pub prometheus: Option<PrometheusHandle>,
  pub placematch: PlaceMatch<P, ServiceClassifier>,
}

pub fn routes<P: PlacesProvider>(config: &Config, provider: P, classifier: ServiceClassifier) -> anyhow::Result<Router> {
  let prometheus = match config.enable_prometheus {
    true => Some(build_prometheus()?),
    false => None,
  };

  let state = AppState {
    config: config.clone(),
    prometheus,
    placematch: PlaceMatch::with_classifier(provider).classifier(classifier).build(),
  };

  Ok(router(state))
}

pub fn router<P: PlacesProvider>(state: AppState<P>) -> Router {
  Router::new()
    .route("/lookup", post(handlers::lookup).route_layer(middleware::from_fn_with_state(state.clone(), middlewares::auth::require_api_key)))
    .fallback(handlers::not_found)
    .layer(TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, state.config.request_timeout))
    .layer(middleware::from_fn(middlewares::metrics))
    .layer(TraceLayer::new_for_http().make_span_with(middlewares::create_request_span))
    // The routes below will not go through the observability middlewares above
    .route("/healthz", get(handlers::healthz))
    .route("/readyz", get(handlers::readyz))
    .route("/metrics", get(handlers::prometheus))
    .route("/docs", get(handlers::docs))
    .route("/openapi.json", get(handlers::openapi))
    .layer(middleware::from_fn_with_state(state.clone(), middlewares::logging::api_logger))
    .layer(middleware::from_fn(middlewares::request_id))
    .with_state(state)
}
