use anyhow::Context;
use axum::{
  Json,
  response::{Html, IntoResponse},
};
use rust_embed::Embed;
use serde_json::Value;

use crate::api::errors::AppError;

#[derive(Embed)]
#[folder = "./assets"]
struct Assets;

fn asset(name: &str) -> Result<Vec<u8>, AppError> {
  Ok(Assets::get(name).map(|file| file.data.into_owned()).with_context(|| format!("missing embedded asset {name}"))?)
}

pub async fn docs() -> Result<impl IntoResponse, AppError> {
  let page = String::from_utf8(asset("docs.html")?).context("invalid documentation page")?;

  Ok(Html(page))
}

pub async fn openapi() -> Result<impl IntoResponse, AppError> {
  let mut document = serde_yaml::from_slice::<Value>(&asset("openapi.yml")?).context("invalid OpenAPI document")?;

  if let Some(info) = document.get_mut("info").and_then(Value::as_object_mut) {
    info.insert("version".into(), Value::String(env!("CARGO_PKG_VERSION").into()));
  }

  Ok(Json(document))
}
