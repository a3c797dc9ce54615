//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use ledgerlane_api::build_router;
use ledgerlane_api::state::{AppState, StateParts};
use ledgerlane_core::rng::DeterministicRng;
use ledgerlane_test_support::{ManualClock, ManualScheduler, MockRng};
use ledgerlane_turns::domain::config::TurnConfig;
use serde_json::{Value, json};
use tower::ServiceExt;

/// A router over fresh services plus handles on its deterministic seams.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub scheduler: Arc<ManualScheduler>,
}

impl TestApp {
    /// Moves the clock past the action cooldown.
    pub fn step_past_cooldown(&self) {
        self.clock.advance_millis(1_000);
    }

    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        post_json(self.router.clone(), uri, body).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        get_json(self.router.clone(), uri).await
    }
}

/// Build the full app router with a manual clock, a manual scheduler and a
/// `MockRng` (every roll is 1, every audit draw is 0.0). Uses the same route
/// structure as `main.rs`.
pub fn build_test_app() -> TestApp {
    build_test_app_with_rng(MockRng)
}

/// Build the full app router with a custom RNG for tests that need specific
/// dice rolls or audit draws.
pub fn build_test_app_with_rng(rng: impl DeterministicRng + 'static) -> TestApp {
    let clock = Arc::new(ManualClock::starting_now());
    let scheduler = Arc::new(ManualScheduler::new());
    let state = AppState::new(StateParts {
        clock: clock.clone(),
        scheduler: scheduler.clone(),
        rng: Box::new(rng),
        turn_config: TurnConfig {
            turn_timeout: Duration::from_secs(300),
            action_cooldown: Duration::from_millis(500),
        },
        room_capacity: 4,
    });

    TestApp {
        router: build_router(state),
        clock,
        scheduler,
    }
}

/// Creates a room hosted by `host` and seats `guests`, returning the room id.
pub async fn seeded_room(app: &TestApp, host: &str, guests: &[&str]) -> String {
    let (status, room) = app
        .post(
            "/api/v1/rooms",
            &json!({ "host_id": host, "host_name": host, "room_name": "Ledger Night" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let room_id = room["room_id"].as_str().unwrap().to_owned();

    for guest in guests {
        let (status, _) = app
            .post(
                &format!("/api/v1/rooms/{room_id}/join"),
                &json!({ "player_id": guest, "player_name": guest }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    room_id
}

/// Creates, fills and starts a room.
pub async fn started_room(app: &TestApp, host: &str, guests: &[&str]) -> String {
    let room_id = seeded_room(app, host, guests).await;
    let (status, _) = app
        .post(
            &format!("/api/v1/rooms/{room_id}/start"),
            &json!({ "host_id": host }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    room_id
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
