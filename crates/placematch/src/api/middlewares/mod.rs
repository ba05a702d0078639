use axum::{
  body::Body,
  http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
  middleware::Next,
  response::Response,
};
use metrics::counter;
use opentelemetry::global;
use opentelemetry_http::HeaderExtractor;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use uuid::Uuid;

pub(crate) mod auth;
pub(crate) mod json_rejection;
pub(crate) mod logging;

pub(crate) static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone, Debug)]
pub(crate) struct RequestId(pub Uuid);

/// Identifier given by the caller, when it is a UUID.
fn caller_request_id(headers: &HeaderMap) -> Option<Uuid> {
  headers.get(&REQUEST_ID_HEADER).and_then(|value| value.to_str().ok()).and_then(|value| Uuid::parse_str(value).ok())
}

/// Tags the request with the caller's `x-request-id`, or a new one, and
/// echoes it on the response so lookups can be correlated with access logs.
pub(crate) async fn request_id(request: Request<Body>, next: Next) -> Result<Response, StatusCode> {
  let (mut parts, body) = request.into_parts();
  let request_id = RequestId(caller_request_id(&parts.headers).unwrap_or_else(Uuid::new_v4));

  parts.extensions.insert(request_id.clone());

  let mut response = next.run(Request::from_parts(parts, body)).await;

  if let Ok(value) = HeaderValue::from_str(&request_id.0.to_string()) {
    response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
  }

  response.extensions_mut().insert::<RequestId>(request_id);

  Ok(response)
}

pub(super) async fn metrics(request: Request<Body>, next: Next) -> Result<Response, StatusCode> {
  let mut response = next.run(request).await;

  counter!("http_requests_total", "status" => response.status().as_u16().to_string()).increment(1);

  response.extensions_mut().insert(logging::current_trace_id());

  Ok(response)
}

pub(crate) fn create_request_span(req: &axum::extract::Request) -> Span {
  let parent = global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(req.headers())));
  let request_id = req.extensions().get::<RequestId>().map(|id| id.0.to_string()).unwrap_or_default();
  let span = tracing::info_span!("lookup_request", request_id = request_id);

  let _ = span.set_parent(parent);
  span
}
