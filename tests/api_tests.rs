//! HTTP control surface tests

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt;

use countdown_keeper::{
    api::create_router,
    clock::{Clock, ManualClock},
    engine::CountdownEngine,
    state::{AppState, MemoryStore, StateStore},
};

fn setup() -> (Router, Arc<CountdownEngine>, ManualClock) {
    let clock = ManualClock::at_date("2026-10-16", 9 * 3_600_000).unwrap();
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());
    let store = Arc::new(StateStore::new(Box::new(MemoryStore::new()), Arc::clone(&shared)));
    let engine = Arc::new(CountdownEngine::new(store, shared));
    let state = Arc::new(AppState::new(Arc::clone(&engine), 20554, "127.0.0.1".into()));
    (create_router(state), engine, clock)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Json>) -> (StatusCode, Json) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, value)
}

#[tokio::test(start_paused = true)]
async fn health_reports_ok() {
    let (app, _, _) = setup();
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test(start_paused = true)]
async fn toggle_then_status_shows_progress() {
    let (app, _, clock) = setup();

    let (status, body) = call(&app, "POST", "/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["view"]["show_time_picker"], false);

    settle().await;
    clock.advance(15_000);
    settle().await;

    let (_, body) = call(&app, "GET", "/status", None).await;
    assert_eq!(body["state"]["current_millis"], 45_000);
    assert_eq!(body["view"]["formatted_time"], "00:45");
    assert_eq!(body["view"]["today_total_seconds"], 15);
    assert_eq!(body["ticking"], true);
    assert_eq!(body["last_action"], "toggle");
}

#[tokio::test(start_paused = true)]
async fn set_total_and_reset() {
    let (app, engine, _) = setup();

    let (status, body) = call(
        &app,
        "POST",
        "/total",
        Some(json!({ "minutes": 2, "seconds": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"]["total_seconds"], 125);
    assert_eq!(body["view"]["formatted_time"], "02:05");
    assert_eq!(body["status"], "idle");

    let (status, _) = call(&app, "POST", "/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(engine.state().current_millis, 125_000);
}

#[tokio::test(start_paused = true)]
async fn lifecycle_round_trip() {
    let (app, _, clock) = setup();

    call(&app, "POST", "/toggle", None).await;
    settle().await;
    clock.advance(4_000);

    let (_, body) = call(&app, "POST", "/lifecycle/background", None).await;
    assert_eq!(body["status"], "paused");
    assert_eq!(body["view"]["was_auto_paused"], true);
    assert_eq!(body["view"]["current_millis"], 56_000);

    let (_, body) = call(&app, "POST", "/lifecycle/foreground", None).await;
    assert_eq!(body["was_auto_paused"], true);
}

#[tokio::test(start_paused = true)]
async fn clear_today_zeroes_display() {
    let (app, engine, _) = setup();
    engine.add_completed_time(90).unwrap();

    let (_, body) = call(&app, "POST", "/clear-today", None).await;
    assert_eq!(body["view"]["today_total_seconds"], 0);
    assert_eq!(engine.state().today_completed_seconds, 90);
}

#[tokio::test(start_paused = true)]
async fn set_max_on_idle_countdown_is_noop() {
    let (app, engine, _) = setup();
    let before = engine.state();

    let (status, _) = call(&app, "POST", "/set-max", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(engine.state(), before);
}

#[tokio::test(start_paused = true)]
async fn malformed_total_is_rejected() {
    let (app, _, _) = setup();
    let (status, _) = call(&app, "POST", "/total", Some(json!({ "minutes": "two" }))).await;
    assert!(status.is_client_error());
}

#[tokio::test(start_paused = true)]
async fn oversized_total_leaves_every_endpoint_working() {
    let (app, engine, _) = setup();
    let before = engine.state();

    let (status, body) = call(
        &app,
        "POST",
        "/total",
        Some(json!({ "hours": 3_000_000_000_000_i64 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"]["total_seconds"], 60);
    assert_eq!(engine.state(), before);

    let (status, body) = call(&app, "POST", "/toggle", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");

    let (status, _) = call(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
}
