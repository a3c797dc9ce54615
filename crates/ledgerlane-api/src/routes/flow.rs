//! Routes for the Flow Orchestrator.

use axum::extract::{Path, Query, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use ledgerlane_core::ids::{PlayerId, RoomId};
use ledgerlane_core::outcomes::{AuditOutcome, SettlementFigures};
use ledgerlane_flow::application::orchestrator::DEFAULT_EVENT_LIMIT;
use ledgerlane_flow::domain::events::GameFlowEvent;
use ledgerlane_flow::domain::stats::{DecisionResult, GameEndCheck, GameStats};
use ledgerlane_rooms::domain::game_state::Decision;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{LimitQuery, PlayerRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{room_id}/decision.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub player_id: String,
    #[serde(flatten)]
    pub decision: Decision,
}

/// Request body for POST /{room_id}/audit.
///
/// Without an `outcome` the server draws and grades the audit itself.
#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub player_id: String,
    #[serde(default)]
    pub outcome: Option<AuditOutcome>,
}

/// Response body for POST /{room_id}/audit.
#[derive(Debug, Serialize)]
pub struct AuditResponse {
    /// The recorded audit, absent when the draw did not trigger one.
    pub audit: Option<AuditOutcome>,
}

/// Response body for POST /{room_id}/advance-year.
#[derive(Debug, Serialize)]
pub struct AdvanceYearResponse {
    pub new_year: u32,
}

/// POST /{room_id}/decision
#[instrument(skip(state, request), fields(player_id = %request.player_id, grid_type = %request.decision.grid_type))]
async fn make_decision(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<DecisionResult>, ApiError> {
    let result = state.flow.process_decision(
        room_id,
        &PlayerId::new(request.player_id),
        request.decision,
    )?;
    Ok(Json(result))
}

/// POST /{room_id}/settle
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn settle(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<SettlementFigures>, ApiError> {
    let figures = state
        .flow
        .process_annual_settlement(room_id, &PlayerId::new(request.player_id))?;
    Ok(Json(figures))
}

/// POST /{room_id}/audit
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn audit(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Json(request): Json<AuditRequest>,
) -> Result<Json<AuditResponse>, ApiError> {
    let player_id = PlayerId::new(request.player_id);
    let audit = match request.outcome {
        Some(outcome) => Some(state.flow.process_audit(room_id, &player_id, outcome)?),
        None => state.flow.run_audit_check(room_id, &player_id)?,
    };
    Ok(Json(AuditResponse { audit }))
}

/// POST /{room_id}/advance-year
#[instrument(skip(state))]
async fn advance_year(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<AdvanceYearResponse>, ApiError> {
    let new_year = state.flow.advance_year(room_id)?;
    info!(new_year, "year advanced by request");
    Ok(Json(AdvanceYearResponse { new_year }))
}

/// GET /{room_id}/end-check
async fn end_check(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<GameEndCheck>, ApiError> {
    Ok(Json(state.flow.check_game_end(room_id)?))
}

/// POST /{room_id}/end
#[instrument(skip(state))]
async fn end_game(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<GameStats>, ApiError> {
    Ok(Json(state.flow.end_game(room_id)?))
}

/// GET /{room_id}/events?limit=
async fn game_events(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<GameFlowEvent>> {
    let limit = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT);
    Json(state.flow.game_events(room_id, limit))
}

/// Returns the router for game flow.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{room_id}/decision", post(make_decision))
        .route("/{room_id}/settle", post(settle))
        .route("/{room_id}/audit", post(audit))
        .route("/{room_id}/advance-year", post(advance_year))
        .route("/{room_id}/end-check", get(end_check))
        .route("/{room_id}/end", post(end_game))
        .route("/{room_id}/events", get(game_events))
}
