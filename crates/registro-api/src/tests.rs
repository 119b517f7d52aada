//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Method, Request, StatusCode},
};
use registro_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{Settings, api_router};

const ADDRESS: &str = "0x42D429eaB483e88aBa5A80aF056dEC3610886101";

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  api_router(Arc::new(store), Settings { balance_limit: 1_000 })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let request = Request::builder().method(method).uri(uri);
  let request = match body {
    Some(body) => request
      .header("content-type", "application/json")
      .body(Body::from(body.to_string())),
    None => request.body(Body::empty()),
  }
  .unwrap();

  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn create_company(app: &Router) -> String {
  let (status, body) = send(
    app,
    Method::POST,
    "/participants",
    Some(json!({ "type": "COMPANY", "full_name": "Acme S.A.", "cuit": "30-71234567-1" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  body["id"].as_str().unwrap().to_owned()
}

async fn create_account(app: &Router, participant_id: &str) {
  let (status, _) = send(
    app,
    Method::POST,
    "/accounts",
    Some(json!({ "address": ADDRESS, "participant_id": participant_id, "balance": 5 })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
}

// ─── Participants ────────────────────────────────────────────────────────────

#[tokio::test]
async fn participant_create_get_and_patch() {
  let app = app().await;
  let (status, body) = send(
    &app,
    Method::POST,
    "/participants",
    Some(json!({
      "type": "NATURAL_PERSON",
      "first_name": "Juana",
      "last_name": "Azurduy",
      "identification": { "type": "DNI", "value": "12345678" }
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let id = body["id"].as_str().unwrap().to_owned();

  let (status, body) = send(&app, Method::GET, &format!("/participants/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["type"], "NATURAL_PERSON");
  assert_eq!(body["is_verified"], false);
  assert_eq!(body["identification"]["value"], "12345678");

  let (status, body) = send(
    &app,
    Method::PATCH,
    &format!("/participants/{id}"),
    Some(json!({ "type": "NATURAL_PERSON", "last_name": "Padilla" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["first_name"], "Juana");
  assert_eq!(body["last_name"], "Padilla");
}

#[tokio::test]
async fn unknown_participant_is_404_with_error_body() {
  let app = app().await;
  let id = uuid::Uuid::new_v4();

  let (status, body) = send(&app, Method::GET, &format!("/participants/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], format!("Participant not found. ID: {id}"));
}

#[tokio::test]
async fn participant_listing_filters_and_paginates() {
  let app = app().await;
  let first = create_company(&app).await;
  create_company(&app).await;

  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/participants/{first}/verification"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) = send(&app, Method::GET, "/participants?verified=true", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["results"].as_array().unwrap().len(), 1);
  assert_eq!(body["results"][0]["id"], first.as_str());

  let (_, body) = send(&app, Method::GET, "/participants?limit=1&sort=asc", None).await;
  assert_eq!(body["results"][0]["id"], first.as_str());
  assert_eq!(body["next"]["sort"], "asc");
  assert!(body["next"]["timestamp_gt"].is_string());
}

#[tokio::test]
async fn bad_listing_parameters_are_400() {
  let app = app().await;
  for uri in [
    "/participants?limit=0",
    "/participants?sort=sideways",
    "/participants?timestamp_gt=2024-01-01T00:00:00",
    "/recharges?status=DONE",
  ] {
    let (status, body) = send(&app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    assert!(body["error"].is_string(), "{uri}");
  }
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn account_creation_uses_configured_limit() {
  let app = app().await;
  let participant = create_company(&app).await;
  create_account(&app, &participant).await;

  let (status, body) = send(&app, Method::GET, &format!("/accounts/{ADDRESS}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["balance"], 5);
  assert_eq!(body["balance_limit"], 1_000);
  assert_eq!(body["controllers"][0]["status"], "UNVERIFIED");

  let (status, _) = send(
    &app,
    Method::POST,
    "/accounts",
    Some(json!({ "address": ADDRESS, "participant_id": participant })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_address_is_400() {
  let app = app().await;
  let (status, body) = send(&app, Method::GET, "/accounts/0x1234", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("0x1234"));
}

#[tokio::test]
async fn controller_verification_flow() {
  let app = app().await;
  let participant = create_company(&app).await;
  create_account(&app, &participant).await;
  let uri = format!("/controllers/{participant}/verifications/{ADDRESS}");

  let (status, _) = send(&app, Method::POST, &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, body) = send(&app, Method::GET, &format!("/accounts/{ADDRESS}"), None).await;
  assert_eq!(body["controllers"][0]["status"], "VERIFIED");

  let (status, _) = send(&app, Method::POST, &uri, None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let stranger = uuid::Uuid::new_v4();
  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/controllers/{stranger}/verifications/{ADDRESS}"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_balances_report_updated_count() {
  let app = app().await;
  let participant = create_company(&app).await;
  create_account(&app, &participant).await;

  let (status, body) = send(
    &app,
    Method::PATCH,
    "/accounts/balances",
    Some(json!([
      { "address": ADDRESS, "balance": 77 },
      { "address": "0x0000000000000000000000000000000000000001", "balance": 1 }
    ])),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["updated"], 1);

  let (_, body) = send(&app, Method::GET, &format!("/accounts/{ADDRESS}"), None).await;
  assert_eq!(body["balance"], 77);
}

// ─── Recharges ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn recharge_lifecycle() {
  let app = app().await;
  let participant = create_company(&app).await;
  create_account(&app, &participant).await;

  let (status, body) = send(
    &app,
    Method::POST,
    &format!("/accounts/{ADDRESS}/recharges"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let id = body["id"].as_str().unwrap().to_owned();

  let (_, body) = send(&app, Method::GET, &format!("/recharges/{id}"), None).await;
  assert_eq!(body["status"], "WAITING");
  assert_eq!(body["address"], ADDRESS);

  let (status, body) = send(&app, Method::POST, &format!("/recharges/{id}/satisfy"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "SATISFIED");

  let (status, _) = send(&app, Method::POST, &format!("/recharges/{id}/reject"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (_, body) = send(&app, Method::GET, "/recharges?status=SATISFIED", None).await;
  assert_eq!(body["results"][0]["id"], id.as_str());
  assert_eq!(body["next"]["status"], "SATISFIED");

  let (_, body) = send(
    &app,
    Method::GET,
    &format!("/recharges?participant_ids={}", uuid::Uuid::new_v4()),
    None,
  )
  .await;
  assert!(body["results"].as_array().unwrap().is_empty());
  assert!(body["next"].is_null());
}

#[tokio::test]
async fn recharge_on_unknown_address_is_404() {
  let app = app().await;
  let (status, body) = send(
    &app,
    Method::POST,
    &format!("/accounts/{ADDRESS}/recharges"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], format!("Address not found: {ADDRESS}"));
}

// ─── Customers ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn customer_crud() {
  let app = app().await;
  let (status, body) =
    send(&app, Method::POST, "/customers", Some(json!({ "name": "Fondo Sur" }))).await;
  assert_eq!(status, StatusCode::CREATED);
  let id = body["id"].as_str().unwrap().to_owned();

  let (status, body) = send(
    &app,
    Method::PATCH,
    &format!("/customers/{id}"),
    Some(json!({ "name": "Fondo Norte" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "Fondo Norte");

  let (_, body) = send(&app, Method::GET, "/customers", None).await;
  assert_eq!(body["results"][0]["id"], id.as_str());

  let (status, _) = send(
    &app,
    Method::GET,
    &format!("/customers/{}", uuid::Uuid::new_v4()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
