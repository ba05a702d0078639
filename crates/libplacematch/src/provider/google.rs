use std::{sync::Arc, time::Duration};

use anyhow::Context;
use metrics::histogram;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, de::DeserializeOwned};
use tokio::time::Instant;
use tracing::instrument;

use crate::{
  error::PlaceMatchError,
  model::{Candidate, Place},
  provider::PlacesProvider,
};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

const MAX_BACKOFF: Duration = Duration::from_secs(30);
const MAX_RETRY_AFTER: u64 = 60;

#[derive(Clone, Debug)]
pub struct GooglePlacesConfig {
  pub api_key: String,
  pub base_url: String,
  /// Language the place details should be returned in.
  pub language: Option<String>,
  /// Region code (ccTLD) used to bias results.
  pub region: Option<String>,
  pub timeout: Duration,
  /// Number of additional attempts on transient failures.
  pub max_retries: u32,
  /// Delay before the first retry, doubled on every subsequent one.
  pub backoff: Duration,
}

impl Default for GooglePlacesConfig {
  fn default() -> Self {
    GooglePlacesConfig {
      api_key: String::new(),
      base_url: DEFAULT_BASE_URL.to_string(),
      language: Some("fr".to_string()),
      region: Some("fr".to_string()),
      timeout: Duration::from_secs(10),
      max_retries: 2,
      backoff: Duration::from_millis(500),
    }
  }
}

/// Places provider backed by the Google Places web service.
#[derive(Clone)]
pub struct GooglePlacesProvider {
  client: Client,
  config: Arc<GooglePlacesConfig>,
}

#[derive(Deserialize)]
struct FindPlaceResponse {
  status: String,
  #[serde(default)]
  candidates: Vec<Candidate>,
  error_message: Option<String>,
}

#[derive(Deserialize)]
struct DetailsResponse {
  status: String,
  result: Option<Place>,
  error_message: Option<String>,
}

/// Maps the `status` field of a response, returning whether it carries results.
fn check_status(status: &str, message: Option<String>) -> Result<bool, PlaceMatchError> {
  match status {
    "OK" => Ok(true),
    "ZERO_RESULTS" | "NOT_FOUND" => Ok(false),
    "OVER_QUERY_LIMIT" => Err(PlaceMatchError::QuotaExceeded),
    "REQUEST_DENIED" => Err(PlaceMatchError::Denied(message.unwrap_or_default())),
    "INVALID_REQUEST" => Err(PlaceMatchError::InvalidQuery(message.unwrap_or_default())),
    other => Err(PlaceMatchError::Upstream {
      status: other.to_string(),
      message: message.unwrap_or_default(),
    }),
  }
}

impl GooglePlacesProvider {
  pub fn new(config: GooglePlacesConfig) -> Result<GooglePlacesProvider, PlaceMatchError> {
    if config.api_key.is_empty() {
      return Err(PlaceMatchError::ConfigError("places API key is required".into()));
    }

    let client = Client::builder().timeout(config.timeout).build()?;

    Ok(GooglePlacesProvider { client, config: Arc::new(config) })
  }

  fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, PlaceMatchError> {
    let base = format!("{}/{path}", self.config.base_url.trim_end_matches('/'));

    Ok(Url::parse_with_params(&base, params).context("invalid places base URL")?)
  }

  fn backoff(&self, attempt: u32) -> Duration {
    self.config.backoff.saturating_mul(1 << (attempt - 1).min(16)).min(MAX_BACKOFF)
  }

  async fn get<T: DeserializeOwned>(&self, name: &'static str, url: Url) -> Result<T, PlaceMatchError> {
    let then = Instant::now();
    let result = self.get_with_retry(url).await;

    histogram!("placematch_provider_latency_seconds", "endpoint" => name).record(then.elapsed().as_secs_f64());

    result
  }

  async fn get_with_retry<T: DeserializeOwned>(&self, url: Url) -> Result<T, PlaceMatchError> {
    let max_retries = self.config.max_retries;

    for attempt in 0..=max_retries {
      let last = attempt == max_retries;

      if attempt > 0 {
        let backoff = self.backoff(attempt);

        tracing::warn!(attempt, backoff_ms = backoff.as_millis() as u64, "retrying places request after backoff");
        tokio::time::sleep(backoff).await;
      }

      let response = match self.client.get(url.clone()).send().await {
        Ok(response) => response,

        // The request URL carries the API key.
        Err(err) => {
          let err = err.without_url();

          if !last && (err.is_timeout() || err.is_connect()) {
            tracing::warn!(error = err.to_string(), "transient error reaching places service");
            continue;
          }

          return Err(err.into());
        }
      };

      let status = response.status();

      if status.is_success() {
        return response.json::<T>().await.map_err(|err| err.without_url().into());
      }

      if status == StatusCode::TOO_MANY_REQUESTS && !last {
        if let Some(wait) = response.headers().get("retry-after").and_then(|value| value.to_str().ok()).and_then(|value| value.parse::<u64>().ok()) {
          let wait = wait.min(MAX_RETRY_AFTER);

          tracing::warn!(wait, "rate-limited by places service, waiting for Retry-After");
          tokio::time::sleep(Duration::from_secs(wait)).await;
        }

        continue;
      }

      if status.is_server_error() && !last {
        tracing::warn!(status = status.as_u16(), "places service returned a server error");
        continue;
      }

      let body = response.text().await.unwrap_or_default();

      return Err(PlaceMatchError::Upstream {
        status: status.as_u16().to_string(),
        message: body,
      });
    }

    unreachable!("the last attempt always returns");
  }
}

impl PlacesProvider for GooglePlacesProvider {
  // Every request is billed, readiness does not issue one.
  async fn health(&self) -> Result<bool, PlaceMatchError> {
    Ok(!self.config.api_key.is_empty())
  }

  #[instrument(skip_all)]
  async fn find_candidates(&self, query: &str, fields: &[&str]) -> Result<Vec<Candidate>, PlaceMatchError> {
    let fields = fields.join(",");
    let mut params: Vec<(&str, &str)> = vec![("input", query), ("inputtype", "textquery"), ("fields", fields.as_str()), ("key", self.config.api_key.as_str())];

    if let Some(language) = &self.config.language {
      params.push(("language", language.as_str()));
    }

    let response: FindPlaceResponse = self.get("findplacefromtext", self.endpoint("findplacefromtext/json", &params)?).await?;

    match check_status(&response.status, response.error_message)? {
      true => Ok(response.candidates),
      false => Ok(Vec::new()),
    }
  }

  #[instrument(skip(self, fields))]
  async fn place_details(&self, place_id: &str, fields: &[&str]) -> Result<Option<Place>, PlaceMatchError> {
    let fields = fields.join(",");
    let mut params: Vec<(&str, &str)> = vec![("place_id", place_id), ("fields", fields.as_str()), ("key", self.config.api_key.as_str())];

    if let Some(language) = &self.config.language {
      params.push(("language", language.as_str()));
    }
    if let Some(region) = &self.config.region {
      params.push(("region", region.as_str()));
    }

    let response: DetailsResponse = self.get("details", self.endpoint("details/json", &params)?).await?;

    match check_status(&response.status, response.error_message)? {
      true => Ok(response.result),
      false => Ok(None),
    }
  }
}
