use std::net::SocketAddr;

use axum::{
  RequestPartsExt,
  body::{Body, HttpBody},
  extract::{ConnectInfo, State},
  http::{HeaderMap, Request, StatusCode},
  middleware::Next,
  response::Response,
};
use jiff::Timestamp;
use libplacematch::prelude::*;
use opentelemetry::{TraceId, global, trace::TraceContextExt};
use opentelemetry_http::HeaderExtractor;
use tokio::time::Instant;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::api::{AppState, middlewares::RequestId};

/// Trace identifier of the request span, attached to the response.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RequestTraceId(pub TraceId);

pub async fn api_logger<P>(State(_): State<AppState<P>>, request: Request<Body>, next: Next) -> Result<Response, StatusCode>
where
  P: PlacesProvider,
{
  let time = Timestamp::now().strftime("%Y-%m-%dT%H:%M:%S%z").to_string();
  let method = request.method().clone();
  let uri = request.uri().clone();
  let propagated = propagated_trace_id(request.headers());

  let (mut parts, body) = request.into_parts();
  let ip = if let Ok(ConnectInfo(addr)) = parts.extract::<ConnectInfo<SocketAddr>>().await {
    addr.ip().to_string()
  } else {
    "-".to_string()
  };

  let request_id = parts.extensions.get::<RequestId>().map(|id| id.0.to_string()).unwrap_or_default();

  let then = Instant::now();
  let response = next.run(Request::from_parts(parts, body)).await;

  global::meter("placematch").f64_histogram("request_latency").build().record(then.elapsed().as_secs_f64() * 1000.0, &[]);

  let trace_id = propagated
    .or_else(|| response.extensions().get::<RequestTraceId>().map(|id| id.0).filter(|id| *id != TraceId::INVALID))
    .map(|id| id.to_string())
    .unwrap_or_else(|| "-".to_string());

  let span = tracing::info_span!("request", request_id = request_id, trace = %trace_id);
  let _guard = span.enter();

  tracing::info!(
    time = time,
    remote = ip,
    method = %method,
    path = uri.path(),
    status = response.status().as_u16(),
    latency = then.elapsed().as_millis(),
    size = response.size_hint().exact().unwrap_or(0),
    "{} {}",
    method,
    uri,
  );

  Ok(response)
}

/// Trace identifier given by the caller in a `traceparent` header.
fn propagated_trace_id(headers: &HeaderMap) -> Option<TraceId> {
  let context = global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(headers)));
  let span = context.span();
  let span_context = span.span_context();

  span_context.is_valid().then(|| span_context.trace_id())
}

pub(crate) fn current_trace_id() -> RequestTraceId {
  RequestTraceId(Span::current().context().span().span_context().trace_id())
}
