mod docs;
mod lookup;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use libplacematch::prelude::*;

use crate::api::AppState;
use crate::api::errors::AppError;

pub(super) use self::docs::{docs, openapi};
pub use self::lookup::lookup;

pub async fn not_found() -> impl IntoResponse {
  AppError::ResourceNotFound
}

pub async fn healthz() -> StatusCode {
  StatusCode::OK
}

pub async fn readyz<P: PlacesProvider>(State(state): State<AppState<P>>) -> StatusCode {
  match state.placematch.health().await {
    Ok(true) => StatusCode::OK,
    Ok(false) => StatusCode::SERVICE_UNAVAILABLE,

    Err(err) => {
      tracing::warn!(error = err.to_string(), "could not get places provider health");

      StatusCode::SERVICE_UNAVAILABLE
    }
  }
}

pub async fn prometheus<P: PlacesProvider>(State(state): State<AppState<P>>) -> Result<impl IntoResponse, AppError> {
  match state.prometheus {
    Some(handle) => Ok(handle.render()),
    None => Err(AppError::ResourceNotFound),
  }
}
