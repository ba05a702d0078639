use std::time::Duration;

use axum_test::TestServer;
use libplacematch::prelude::*;
use serde_json::{Value, json};

use crate::{
  api::{self, config::Config},
  tests::{places, state},
};

fn test_server<P: PlacesProvider>(config: Config, provider: P) -> TestServer {
  TestServer::new(api::router(state(config, provider))).unwrap()
}

#[tokio::test]
async fn lookup_found() {
  let server = test_server(Config::default(), MockedPlaces::with_places(places()));

  let response = server
    .post("/lookup")
    .json(&json!({
        "name": "Boulangerie Dupont",
        "address": "12 bd Saint-Michel",
        "postal_code": "75005"
    }))
    .await;

  response.assert_status_ok();
  response.assert_json_contains(&json!({
      "place": {
          "place_id": "p1",
          "name": "Boulangerie Dupont",
          "address": "12 Bd Saint-Michel, 75005 Paris, France",
          "phone": "01 43 54 00 00",
          "website": "https://boulangerie-dupont.fr",
          "opening_hours": ["lundi: 07:00–20:00", "mardi: 07:00–20:00"],
          "rating": 4.5,
          "review_count": 212,
          "maps_url": "https://maps.google.com/?cid=1",
          "business_status": "OPERATIONAL",
          "latitude": 48.8511,
          "longitude": 2.3435
      },
      "match": {
          "strategy": "full",
          "decided_by": "heuristics"
      }
  }));

  let body = response.json::<Value>();

  assert!(body["match"]["score"].as_f64().unwrap() >= 0.7);
  assert!(body["match"]["features"].as_object().unwrap().contains_key("postal_code_match"));
}

#[tokio::test]
async fn lookup_not_found() {
  let server = test_server(Config::default(), MockedPlaces::with_places(places()));

  let response = server.post("/lookup").json(&json!({ "name": "Crêperie Le Goff", "postal_code": "35000" })).await;

  response.assert_status_not_found();
  response.assert_json(&json!({ "message": "no matching place was found" }));
}

#[tokio::test]
async fn lookup_caps_candidates() {
  let provider = MockedPlaces::with_places(vec![
    Place::builder("p0", "Dupont Frères").address("80 Rue Monge, 75005 Paris, France").postal_code("75005").build(),
    places().remove(0),
  ]);

  let config = Config {
    match_candidates: 1,
    ..Default::default()
  };

  let server = test_server(config, provider.clone());

  let _ = server
    .post("/lookup")
    .add_query_param("candidates", 5)
    .json(&json!({ "name": "Boulangerie Dupont", "address": "12 bd Saint-Michel", "postal_code": "75005" }))
    .await;

  assert_eq!(provider.details_calls(), 1);
}

#[tokio::test]
async fn lookup_invalid_payload() {
  let server = test_server(Config::default(), MockedPlaces::with_places(places()));

  let response = server.post("/lookup").json(&json!({ "name": "" })).await;

  assert_eq!(response.status_code(), 422);
  response.assert_json_contains(&json!({ "message": "lookup request failed validation", "details": ["a business name must be given"] }));

  let response = server.post("/lookup").json(&json!({ "name": "   " })).await;

  assert_eq!(response.status_code(), 422);

  let response = server.post("/lookup").json(&json!({ "name": "...", "address": "4 rue de la Gare", "postal_code": "35000" })).await;

  assert_eq!(response.status_code(), 422);
  response.assert_json_contains(&json!({ "details": ["a business name must contain at least one word"] }));

  let response = server.post("/lookup").json(&json!({ "name": "Boulangerie Dupont", "postal_code": "12" })).await;

  assert_eq!(response.status_code(), 422);
  response.assert_json_contains(&json!({ "details": ["a postal code must have five digits"] }));

  let response = server.post("/lookup").json(&json!({ "address": "12 bd Saint-Michel" })).await;

  assert_eq!(response.status_code(), 400);
  response.assert_json_contains(&json!({ "message": "lookup request does not describe a business" }));

  let response = server.post("/lookup").await;

  assert_eq!(response.status_code(), 415);
}

#[tokio::test]
async fn lookup_invalid_params() {
  let server = test_server(Config::default(), MockedPlaces::with_places(places()));
  let body = json!({ "name": "Boulangerie Dupont" });

  let response = server.post("/lookup").add_query_param("threshold", "high").json(&body).await;

  assert_eq!(response.status_code(), 400);
  response.assert_json_contains(&json!({ "message": "invalid query parameter" }));

  let response = server.post("/lookup").add_query_param("algorithm", "phonetic").json(&body).await;

  assert_eq!(response.status_code(), 400);

  let response = server.post("/lookup").add_query_param("threshold", 0.3).add_query_param("cutoff", 0.5).json(&body).await;

  assert_eq!(response.status_code(), 400);
  response.assert_json(&json!({ "message": "bad request", "details": ["cutoff cannot be greater than threshold"] }));
}

#[tokio::test]
async fn lookup_upstream_failure() {
  let server = test_server(Config::default(), MockedPlaces::builder().failing(true).build());

  let response = server.post("/lookup").json(&json!({ "name": "Boulangerie Dupont" })).await;

  assert_eq!(response.status_code(), 502);
  response.assert_json_contains(&json!({ "message": "error from places service: places service returned status UNKNOWN_ERROR: mocked failure" }));
}

#[tokio::test]
async fn lookup_upstream_failure_hides_api_key() {
  let provider = GooglePlacesProvider::new(GooglePlacesConfig {
    api_key: "SUPERSECRETKEY".to_string(),
    base_url: "http://127.0.0.1:1".to_string(),
    timeout: Duration::from_secs(5),
    max_retries: 0,
    ..Default::default()
  })
  .unwrap();

  let server = test_server(Config::default(), provider);
  let response = server.post("/lookup").json(&json!({ "name": "Boulangerie Dupont", "postal_code": "75005" })).await;

  assert_eq!(response.status_code(), 502);
  assert!(!response.text().contains("SUPERSECRETKEY"), "{}", response.text());
}

#[tokio::test]
async fn probes() {
  let server = test_server(Config::default(), MockedPlaces::builder().build());

  server.get("/healthz").await.assert_status_ok();
  server.get("/readyz").await.assert_status_ok();

  let server = test_server(Config::default(), MockedPlaces::builder().healthy(false).build());

  assert_eq!(server.get("/readyz").await.status_code(), 503);
  assert_eq!(server.get("/metrics").await.status_code(), 404);

  let response = server.get("/nothing/here").await;

  response.assert_status_not_found();
  response.assert_json(&json!({ "message": "missing resource" }));
}

#[tokio::test]
async fn docs() {
  let server = test_server(Config::default(), MockedPlaces::builder().build());

  let response = server.get("/docs").await;

  response.assert_status_ok();
  response.assert_text_contains("SwaggerUIBundle");
  response.assert_text_contains("/openapi.json");

  let response = server.get("/openapi.json").await;

  response.assert_status_ok();

  let document = response.json::<Value>();

  assert_eq!(document["info"]["version"], env!("CARGO_PKG_VERSION"));
  assert!(document["paths"]["/lookup"]["post"].is_object());
}
