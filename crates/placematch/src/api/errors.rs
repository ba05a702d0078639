use std::error::Error;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use libplacematch::prelude::*;
use serde_json::json;
use tracing::*;

pub(super) struct ApiError(pub StatusCode, pub String, pub Option<Vec<String>>);

#[derive(Debug, thiserror::Error)]
#[allow(dead_code)]
pub enum AppError {
  #[error("bad request")]
  BadRequest(Option<String>),
  #[error("invalid credentials")]
  InvalidCredentials,
  #[error("missing resource")]
  ResourceNotFound,
  #[error("no matching place was found")]
  NoMatch(Option<f64>),
  #[error("server error, please check your logs for more information")]
  ServerError,
  #[error(transparent)]
  OtherError(#[from] anyhow::Error),

  #[error("invalid configuration: {0}")]
  ConfigError(String),
  #[error("error from places service: {0}")]
  UpstreamError(String),
  #[error("places service quota exceeded")]
  QuotaExceeded,

  #[error("invalid query parameter")]
  InvalidQuery(#[from] axum_extra::extract::QueryRejection),
}

impl From<PlaceMatchError> for AppError {
  fn from(value: PlaceMatchError) -> Self {
    match value {
      PlaceMatchError::ConfigError(err) => AppError::ConfigError(err),
      PlaceMatchError::NotFound => AppError::ResourceNotFound,
      PlaceMatchError::QuotaExceeded => AppError::QuotaExceeded,
      err @ (PlaceMatchError::InvalidQuery(_) | PlaceMatchError::Denied(_) | PlaceMatchError::Upstream { .. } | PlaceMatchError::HttpError(_)) => AppError::UpstreamError(err.to_string()),
      PlaceMatchError::OtherError(err) => AppError::OtherError(err),
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    match self {
      AppError::NoMatch(_) | AppError::ResourceNotFound => debug!("{}", self.to_string()),
      _ => error!(error = self.source(), "{}", self.to_string()),
    }

    ApiError::from(&self).into_response()
  }
}

impl From<&AppError> for ApiError {
  fn from(value: &AppError) -> Self {
    match value {
      AppError::BadRequest(details) => ApiError(StatusCode::BAD_REQUEST, value.to_string(), details.clone().map(|details| vec![details])),
      AppError::InvalidCredentials => ApiError(StatusCode::UNAUTHORIZED, value.to_string(), None),
      AppError::ResourceNotFound => ApiError(StatusCode::NOT_FOUND, value.to_string(), None),
      AppError::NoMatch(best_score) => ApiError(StatusCode::NOT_FOUND, value.to_string(), best_score.map(|score| vec![format!("best score: {score:.3}")])),
      AppError::UpstreamError(_) => ApiError(StatusCode::BAD_GATEWAY, value.to_string(), None),
      AppError::QuotaExceeded => ApiError(StatusCode::SERVICE_UNAVAILABLE, value.to_string(), None),
      AppError::InvalidQuery(err) => ApiError(StatusCode::BAD_REQUEST, value.to_string(), Some(vec![err.to_string()])),
      AppError::OtherError(inner) if inner.is::<AppError>() => match inner.downcast_ref::<AppError>() {
        Some(inner) => inner.into(),
        _ => ApiError(StatusCode::INTERNAL_SERVER_ERROR, value.to_string(), None),
      },
      _ => ApiError(StatusCode::INTERNAL_SERVER_ERROR, value.to_string(), None),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let payload = match self.2 {
      Some(details) => json!({
          "message": self.1.to_string(),
          "details": details,
      }),
      None => json!({
          "message": self.1.to_string(),
      }),
    };

    (self.0, Json(payload)).into_response()
  }
}
