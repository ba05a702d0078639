#[derive(Debug, thiserror::Error)]
pub enum PlaceMatchError {
  #[error("invalid configuration: {0}")]
  ConfigError(String),
  #[error("resource not found")]
  NotFound,
  #[error("invalid query: {0}")]
  InvalidQuery(String),
  #[error("places quota exceeded")]
  QuotaExceeded,
  #[error("places request denied: {0}")]
  Denied(String),
  #[error("places service returned status {status}: {message}")]
  Upstream { status: String, message: String },
  #[error(transparent)]
  HttpError(#[from] reqwest::Error),
  #[error(transparent)]
  OtherError(#[from] anyhow::Error),
}
