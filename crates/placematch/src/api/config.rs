use std::{
  env::{self, VarError},
  fmt::Display,
  str::FromStr,
  time::Duration,
};

use libplacematch::prelude::*;

use crate::api::errors::AppError;

#[derive(Clone, Debug)]
pub struct Config {
  pub env: Env,
  pub listen_addr: String,
  pub api_key: Option<String>,
  pub request_timeout: Duration,

  // Places service
  pub places_api_key: String,
  pub places_base_url: String,
  pub places_language: Option<String>,
  pub places_region: Option<String>,
  pub places_timeout: Duration,
  pub places_max_retries: u32,

  // Match settings
  pub match_candidates: usize,
  pub classifier_url: Option<String>,
  pub classifier_model: String,
  pub classifier_timeout: Duration,

  // Debugging
  pub enable_tracing: bool,
  pub enable_prometheus: bool,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      env: Env::Dev,
      listen_addr: "0.0.0.0:8000".into(),
      api_key: None,
      request_timeout: Duration::from_secs(30),
      places_api_key: String::new(),
      places_base_url: google::DEFAULT_BASE_URL.into(),
      places_language: Some("fr".into()),
      places_region: Some("fr".into()),
      places_timeout: Duration::from_secs(10),
      places_max_retries: 2,
      match_candidates: 5,
      classifier_url: None,
      classifier_model: "mistral".into(),
      classifier_timeout: Duration::from_secs(20),
      enable_tracing: false,
      enable_prometheus: false,
    }
  }
}

impl Config {
  pub fn from_env() -> Result<Config, AppError> {
    let config = Config {
      env: Env::from(env::var("ENV").unwrap_or("dev".into())),
      listen_addr: env::var("LISTEN_ADDR").unwrap_or("0.0.0.0:8000".into()),
      api_key: optional_env("API_KEY"),
      request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT", 30)?),
      places_api_key: env::var("PLACES_API_KEY").unwrap_or_default(),
      places_base_url: env::var("PLACES_BASE_URL").unwrap_or(google::DEFAULT_BASE_URL.into()),
      places_language: env::var("PLACES_LANGUAGE").map(|value| value.trim().to_string()).unwrap_or("fr".into()).into_non_empty(),
      places_region: env::var("PLACES_REGION").map(|value| value.trim().to_string()).unwrap_or("fr".into()).into_non_empty(),
      places_timeout: Duration::from_secs(parse_env("PLACES_TIMEOUT", 10)?),
      places_max_retries: parse_env("PLACES_MAX_RETRIES", 2)?,
      match_candidates: parse_env("MATCH_CANDIDATES", 5)?,
      classifier_url: optional_env("CLASSIFIER_URL"),
      classifier_model: env::var("CLASSIFIER_MODEL").unwrap_or("mistral".into()),
      classifier_timeout: Duration::from_secs(parse_env("CLASSIFIER_TIMEOUT", 20)?),
      enable_tracing: env::var("ENABLE_TRACING").unwrap_or_default() == "1",
      enable_prometheus: env::var("ENABLE_PROMETHEUS").unwrap_or_default() == "1",
    };

    if config.places_api_key.is_empty() {
      return Err(AppError::ConfigError("PLACES_API_KEY is required".into()));
    }

    if config.match_candidates == 0 {
      return Err(AppError::ConfigError("MATCH_CANDIDATES must be at least 1".into()));
    }

    Ok(config)
  }

  pub fn places(&self) -> GooglePlacesConfig {
    GooglePlacesConfig {
      api_key: self.places_api_key.clone(),
      base_url: self.places_base_url.clone(),
      language: self.places_language.clone(),
      region: self.places_region.clone(),
      timeout: self.places_timeout,
      max_retries: self.places_max_retries,
      ..Default::default()
    }
  }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Env {
  Dev,
  Production,
}

impl From<String> for Env {
  fn from(value: String) -> Self {
    match value.as_ref() {
      "dev" => Env::Dev,
      "production" => Env::Production,
      _ => Env::Dev,
    }
  }
}

trait IntoNonEmpty {
  fn into_non_empty(self) -> Option<String>;
}

impl IntoNonEmpty for String {
  fn into_non_empty(self) -> Option<String> {
    match self.is_empty() {
      true => None,
      false => Some(self),
    }
  }
}

fn optional_env(name: &str) -> Option<String> {
  env::var(name).ok().and_then(IntoNonEmpty::into_non_empty)
}

pub fn parse_env<T>(name: &str, default: T) -> anyhow::Result<T>
where
  T: FromStr,
  T::Err: Display,
{
  match env::var(name) {
    Ok(value) if value.is_empty() => Ok(default),
    Ok(value) => Ok(value.parse::<T>().map_err(|err| AppError::ConfigError(format!("could not read {name}: {err}")))?),
    Err(err) => match err {
      VarError::NotPresent => Ok(default),
      _ => Err(AppError::ConfigError(format!("could not read {name}: {err}")).into()),
    },
  }
}
