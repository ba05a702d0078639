use axum::http::header::AUTHORIZATION;
use axum_test::TestServer;
use libplacematch::prelude::*;

use crate::{
  api::{self, config::Config},
  tests::{log_collector::LineCollector, state},
  trace::{build_prometheus, init_tracing},
};

#[tokio::test]
async fn api_invalid_credentials() {
  let config = Config {
    api_key: Some("myapikey".into()),
    ..Default::default()
  };

  let server = TestServer::new(api::router(state(config, MockedPlaces::builder().build()))).unwrap();
  let response = server.post("/lookup").await;

  assert_eq!(response.status_code(), 401);

  response.assert_text_contains("invalid credentials");

  let response = server.post("/lookup").add_header(AUTHORIZATION, "Bearer invalidkey").await;

  assert_eq!(response.status_code(), 401);

  response.assert_text_contains("invalid credentials");
}

#[tokio::test]
async fn api_valid_credentials() {
  let config = Config {
    api_key: Some("myapikey".into()),
    ..Default::default()
  };

  let server = TestServer::new(api::router(state(config, MockedPlaces::builder().build()))).unwrap();
  let response = server.post("/lookup").add_header(AUTHORIZATION, "Bearer myapikey").await;

  assert_eq!(response.status_code(), 415);

  // Probes are not authenticated
  server.get("/healthz").await.assert_status_ok();
}

#[tokio::test]
async fn request_id_is_echoed() {
  let server = TestServer::new(api::router(state(Config::default(), MockedPlaces::builder().build()))).unwrap();

  let response = server.get("/healthz").add_header("x-request-id", "67e55044-10b1-426f-9247-bb680e5fe0c8").await;

  assert_eq!(response.header("x-request-id"), "67e55044-10b1-426f-9247-bb680e5fe0c8");

  let response = server.get("/healthz").add_header("x-request-id", "not-a-uuid").await;
  let generated = response.header("x-request-id");

  assert_ne!(generated, "not-a-uuid");
  assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn logging() {
  let collector = LineCollector::default();
  let config = Config::default();

  let guards = init_tracing(&config, collector.clone());

  let server = TestServer::new(api::router(state(config, MockedPlaces::builder().build()))).unwrap();
  let _ = server.post("/lookup").add_header("traceparent", "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01").await;

  drop(guards);

  // Other tests may log through the global subscriber concurrently.
  let line = collector.find("trace=0af7651916cd43dd8448eb211c80319c").expect("no access log line");

  assert!(line.contains("POST http://localhost/lookup") || line.contains("POST /lookup"));
  assert!(line.contains("request_id="));
  assert!(line.contains(r#"remote="-" method=POST path="/lookup" status=415"#));
}

#[tokio::test]
async fn metrics() {
  let mut state = state(
    Config {
      enable_prometheus: true,
      ..Default::default()
    },
    MockedPlaces::builder().build(),
  );

  state.prometheus = Some(build_prometheus().unwrap());

  let server = TestServer::new(api::router(state)).unwrap();
  let _ = server.post("/lookup").await;
  let resp = server.get("/metrics").await;

  assert!(resp.text().contains(r#"http_requests_total{service="placematch",status="415"}"#));
}
