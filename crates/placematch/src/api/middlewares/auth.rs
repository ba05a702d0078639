use axum::{
  body::Body,
  extract::State,
  http::Request,
  middleware::Next,
  response::Response,
};
use axum_extra::{
  TypedHeader,
  headers::{Authorization, authorization::Bearer},
};
use libplacematch::prelude::*;

use crate::api::{AppState, errors::AppError};

/// Lets a lookup through when the service has no API key, or when the
/// request carries it as a bearer token.
///
/// Every lookup is billed by the places service, so it runs before the body
/// is read.
pub(crate) async fn require_api_key<P: PlacesProvider>(
  State(state): State<AppState<P>>,
  bearer: Option<TypedHeader<Authorization<Bearer>>>,
  request: Request<Body>,
  next: Next,
) -> Result<Response, AppError> {
  let Some(api_key) = state.config.api_key.as_deref() else {
    return Ok(next.run(request).await);
  };

  match bearer {
    Some(TypedHeader(header)) if header.token() == api_key => Ok(next.run(request).await),

    Some(_) => {
      tracing::debug!("rejected lookup with a wrong api key");
      Err(AppError::InvalidCredentials)
    }

    None => {
      tracing::debug!("rejected lookup without bearer token");
      Err(AppError::InvalidCredentials)
    }
  }
}
