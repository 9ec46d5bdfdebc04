//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use leitner_core::{
  clock::FixedClock, service::ReviewService, store::memory::MemoryStore,
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{api_router, owner::OWNER_HEADER};

fn new_year() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn app() -> (Router, Arc<FixedClock>) {
  let clock = Arc::new(FixedClock::new(new_year()));
  let svc = ReviewService::new(MemoryStore::new()).with_clock(clock.clone());
  (api_router(Arc::new(svc)), clock)
}

async fn send(
  app: &Router,
  method: Method,
  uri: &str,
  owner: Option<Uuid>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  if let Some(owner) = owner {
    req = req.header(OWNER_HEADER, owner.to_string());
  }
  let req = match body {
    Some(json) => req
      .header("content-type", "application/json")
      .body(Body::from(json.to_string())),
    None => req.body(Body::empty()),
  }
  .unwrap();

  let res = app.clone().oneshot(req).await.unwrap();
  let status = res.status();
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn create(app: &Router, owner: Uuid, word: &str) -> Value {
  let (status, body) = send(
    app,
    Method::POST,
    "/cards",
    Some(owner),
    Some(json!({ "word": word })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  body["card"].clone()
}

// ─── Create / merge ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_merge() {
  let (app, _) = app();
  let owner = Uuid::new_v4();

  let (status, body) = send(
    &app,
    Method::POST,
    "/cards",
    Some(owner),
    Some(json!({ "word": " river ", "meaning": "flowing water" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["created"], true);
  assert_eq!(body["card"]["word"], "RIVER");
  assert_eq!(body["card"]["stage"], 1);
  assert_eq!(body["card"]["last_result"], "none");

  let (status, merged) = send(
    &app,
    Method::POST,
    "/cards",
    Some(owner),
    Some(json!({ "word": "River", "notes": "see also: stream" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(merged["created"], false);
  assert_eq!(merged["card"]["card_id"], body["card"]["card_id"]);
  assert_eq!(merged["card"]["meaning"], "flowing water");
}

#[tokio::test]
async fn invalid_word_is_unprocessable() {
  let (app, _) = app();
  let (status, body) = send(
    &app,
    Method::POST,
    "/cards",
    Some(Uuid::new_v4()),
    Some(json!({ "word": "7" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["field"], "word");
}

#[tokio::test]
async fn missing_owner_is_unauthorized() {
  let (app, _) = app();
  let (status, _) = send(&app, Method::GET, "/cards", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_json_gets_a_json_error() {
  let (app, _) = app();
  let req = Request::builder()
    .method(Method::POST)
    .uri("/cards")
    .header(OWNER_HEADER, Uuid::new_v4().to_string())
    .header("content-type", "application/json")
    .body(Body::from("{\"word\": "))
    .unwrap();

  let res = app.oneshot(req).await.unwrap();
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
    .await
    .unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert!(body["error"].is_string());
}

// ─── Review ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn review_success_schedules_three_days_out() {
  let (app, _) = app();
  let owner = Uuid::new_v4();
  let card = create(&app, owner, "bridge").await;
  let id = card["card_id"].as_str().unwrap();

  let (status, body) = send(
    &app,
    Method::POST,
    &format!("/cards/{id}/review"),
    Some(owner),
    Some(json!({ "outcome": "success" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["stage"], 2);
  assert_eq!(body["last_result"], "success");
  assert_eq!(body["stats"]["repetitions"], 1);

  let next: DateTime<Utc> =
    serde_json::from_value(body["next_review_at"].clone()).unwrap();
  assert_eq!(next, new_year() + Duration::days(3));
}

#[tokio::test]
async fn unknown_outcome_is_rejected_with_field() {
  let (app, _) = app();
  let owner = Uuid::new_v4();
  let card = create(&app, owner, "tunnel").await;
  let id = card["card_id"].as_str().unwrap();

  let (status, body) = send(
    &app,
    Method::POST,
    &format!("/cards/{id}/review"),
    Some(owner),
    Some(json!({ "outcome": "maybe" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["field"], "outcome");
}

#[tokio::test]
async fn missing_outcome_gets_a_json_error() {
  let (app, _) = app();
  let owner = Uuid::new_v4();
  let card = create(&app, owner, "ferry").await;
  let id = card["card_id"].as_str().unwrap();

  let (status, body) = send(
    &app,
    Method::POST,
    &format!("/cards/{id}/review"),
    Some(owner),
    Some(json!({ "result": "success" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].as_str().unwrap().contains("outcome"));
}

#[tokio::test]
async fn malformed_card_id_gets_a_json_error() {
  let (app, _) = app();
  let (status, body) = send(
    &app,
    Method::POST,
    "/cards/not-a-uuid/review",
    Some(Uuid::new_v4()),
    Some(json!({ "outcome": "success" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, body) = send(
    &app,
    Method::GET,
    "/cards/queue?limit=lots",
    Some(Uuid::new_v4()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn reviewing_another_owners_card_is_not_found() {
  let (app, _) = app();
  let card = create(&app, Uuid::new_v4(), "castle").await;
  let id = card["card_id"].as_str().unwrap();

  let (status, body) = send(
    &app,
    Method::POST,
    &format!("/cards/{id}/review"),
    Some(Uuid::new_v4()),
    Some(json!({ "outcome": "fail" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains(id));
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_queue_and_summary() {
  let (app, clock) = app();
  let owner = Uuid::new_v4();
  let done = create(&app, owner, "forest").await;
  clock.advance(Duration::minutes(1));
  create(&app, owner, "desert").await;
  create(&app, owner, "tundra").await;

  let id = done["card_id"].as_str().unwrap();
  send(
    &app,
    Method::POST,
    &format!("/cards/{id}/review"),
    Some(owner),
    Some(json!({ "outcome": "success" })),
  )
  .await;

  let (status, listing) =
    send(&app, Method::GET, "/cards", Some(owner), None).await;
  assert_eq!(status, StatusCode::OK);
  let cards = listing["cards"].as_array().unwrap();
  assert_eq!(cards.len(), 3);
  assert_eq!(cards[2]["word"], "FOREST");
  assert_eq!(cards[2]["due"], false);
  assert_eq!(listing["summary"]["total"], 3);
  assert_eq!(listing["summary"]["due_count"], 2);
  assert_eq!(listing["summary"]["ready_percentage"], 67);
  assert_eq!(listing["summary"]["stage_counts"]["2"], 1);

  let (_, queue) =
    send(&app, Method::GET, "/cards/queue?limit=1", Some(owner), None).await;
  assert_eq!(queue.as_array().unwrap().len(), 1);

  let (_, summary) =
    send(&app, Method::GET, "/cards/summary", Some(owner), None).await;
  assert_eq!(summary["upcoming_count"], 1);
  assert_eq!(summary["reviewed_today"], 1);
}

// ─── Administrative ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_archive_and_delete() {
  let (app, _) = app();
  let owner = Uuid::new_v4();
  let card = create(&app, owner, "canyon").await;
  let id = card["card_id"].as_str().unwrap();

  send(
    &app,
    Method::POST,
    &format!("/cards/{id}/review"),
    Some(owner),
    Some(json!({ "outcome": "success" })),
  )
  .await;
  let (status, reset) = send(
    &app,
    Method::POST,
    &format!("/cards/{id}/reset"),
    Some(owner),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(reset["stage"], 1);

  let (status, archived) = send(
    &app,
    Method::POST,
    &format!("/cards/{id}/archive"),
    Some(owner),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(archived["archived_at"].is_string());
  let (_, summary) =
    send(&app, Method::GET, "/cards/summary", Some(owner), None).await;
  assert_eq!(summary["total"], 0);

  let (status, _) = send(
    &app,
    Method::DELETE,
    &format!("/cards/{id}"),
    Some(owner),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) =
    send(&app, Method::GET, &format!("/cards/{id}"), Some(owner), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
