use axum::{
  Json, RequestExt,
  body::Body,
  extract::{FromRequest, rejection::JsonRejection},
  http::{Request, StatusCode},
  response::IntoResponse,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::api::errors::ApiError;

/// JSON body extractor for lookup requests, running their validation rules.
pub struct TypedJson<T>(pub T);

pub enum TypedJsonRejection {
  JsonRejection(JsonRejection),
  ValidationFailed(ValidationErrors),
}

impl IntoResponse for TypedJsonRejection {
  fn into_response(self) -> axum::response::Response {
    let (status, message, details) = match self {
      TypedJsonRejection::JsonRejection(JsonRejection::JsonSyntaxError(_)) => (StatusCode::BAD_REQUEST, "lookup request is not valid JSON", None),
      TypedJsonRejection::JsonRejection(JsonRejection::JsonDataError(err)) => (StatusCode::BAD_REQUEST, "lookup request does not describe a business", Some(vec![err.body_text()])),
      TypedJsonRejection::JsonRejection(JsonRejection::MissingJsonContentType(_)) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "lookup request must be sent as application/json", None),
      TypedJsonRejection::JsonRejection(err) => (StatusCode::BAD_REQUEST, "could not read lookup request", Some(vec![err.body_text()])),
      TypedJsonRejection::ValidationFailed(errs) => (StatusCode::UNPROCESSABLE_ENTITY, "lookup request failed validation", Some(validation_messages(&errs))),
    };

    ApiError(status, message.to_string(), details).into_response()
  }
}

/// One message per failed rule, in a stable order.
fn validation_messages(errs: &ValidationErrors) -> Vec<String> {
  let mut messages: Vec<String> = errs
    .field_errors()
    .into_iter()
    .flat_map(|(field, errors)| {
      errors.iter().map(move |err| match &err.message {
        Some(message) => message.to_string(),
        None => format!("{field} is invalid ({})", err.code),
      })
    })
    .collect();

  messages.sort();
  messages.dedup();
  messages
}

impl<T, S> FromRequest<S> for TypedJson<T>
where
  T: DeserializeOwned + Validate + 'static,
  S: Send + Sync,
{
  type Rejection = TypedJsonRejection;

  async fn from_request(request: Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
    match request.extract::<Json<T>, _>().await {
      Ok(Json(dto)) => match dto.validate() {
        Ok(()) => Ok(TypedJson(dto)),
        Err(errs) => Err(TypedJsonRejection::ValidationFailed(errs)),
      },

      Err(err) => Err(TypedJsonRejection::JsonRejection(err)),
    }
  }
}
