//! Integration tests for the state synchronization endpoints.

mod common;

use axum::http::StatusCode;
use ledgerlane_test_support::SequenceRng;
use serde_json::json;

#[tokio::test]
async fn test_player_view_marks_turn_holder() {
    let app = common::build_test_app();
    let room_id = common::started_room(&app, "alice", &["bob"]).await;

    let (_, alice) = app.get(&format!("/api/v1/sync/{room_id}/players/alice")).await;
    let (_, bob) = app.get(&format!("/api/v1/sync/{room_id}/players/bob")).await;

    assert_eq!(alice["is_my_turn"], true);
    assert_eq!(bob["is_my_turn"], false);
    assert_eq!(bob["player_name"], "bob");
    assert_eq!(bob["current_turn"], "alice");
    assert_eq!(bob["players"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_player_view_for_stranger_returns_404() {
    let app = common::build_test_app();
    let room_id = common::started_room(&app, "alice", &["bob"]).await;

    let (status, json) = app
        .get(&format!("/api/v1/sync/{room_id}/players/mallory"))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "player_not_found");
}

#[tokio::test]
async fn test_player_decisions_are_filtered_by_player() {
    // Arrange
    let app = common::build_test_app_with_rng(SequenceRng::new(vec![1]));
    let room_id = common::started_room(&app, "alice", &["bob"]).await;
    app.post(
        &format!("/api/v1/turns/{room_id}/roll"),
        &json!({ "player_id": "alice" }),
    )
    .await;
    app.step_past_cooldown();
    app.post(
        &format!("/api/v1/flow/{room_id}/decision"),
        &json!({
            "player_id": "alice",
            "year": 1,
            "grid_position": 1,
            "grid_type": "procurement",
            "choice": "E"
        }),
    )
    .await;

    // Act
    let (_, alice) = app
        .get(&format!("/api/v1/sync/{room_id}/players/alice/decisions"))
        .await;
    let (_, bob) = app
        .get(&format!("/api/v1/sync/{room_id}/players/bob/decisions"))
        .await;

    // Assert
    assert_eq!(alice.as_array().unwrap().len(), 1);
    assert_eq!(alice[0]["grid_type"], "procurement");
    assert_eq!(alice[0]["player_name"], "alice");
    assert!(bob.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_started_room_is_consistent() {
    let app = common::build_test_app();
    let room_id = common::started_room(&app, "alice", &["bob"]).await;

    let (status, report) = app
        .get(&format!("/api/v1/sync/{room_id}/consistency"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], true);
    assert!(report["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_consistency_of_unknown_room_returns_404() {
    let app = common::build_test_app();

    let (status, _) = app
        .get("/api/v1/sync/00000000-0000-0000-0000-000000000000/consistency")
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_returns_newest_snapshots() {
    let app = common::build_test_app();
    let room_id = common::started_room(&app, "alice", &["bob", "carol"]).await;

    let (_, all) = app.get(&format!("/api/v1/sync/{room_id}/history")).await;
    let (_, one) = app
        .get(&format!("/api/v1/sync/{room_id}/history?limit=1"))
        .await;

    assert_eq!(all["snapshots"].as_array().unwrap().len(), 3);
    assert_eq!(one["snapshots"].as_array().unwrap().len(), 1);
    assert!(all["last_sync_time"].is_string());
}

#[tokio::test]
async fn test_resolve_returns_server_state() {
    let app = common::build_test_app();
    let room_id = common::started_room(&app, "alice", &["bob"]).await;

    let (status, json) = app
        .post(
            &format!("/api/v1/sync/{room_id}/resolve"),
            &json!({ "client_state": { "current_year": 9 } }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["resolved_state"]["current_year"], 1);
}
