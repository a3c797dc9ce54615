//! Routes for the State Synchronizer.

use axum::extract::{Path, Query, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use ledgerlane_core::error::GameError;
use ledgerlane_core::ids::{PlayerId, RoomId};
use ledgerlane_rooms::domain::game_state::DecisionRecord;
use ledgerlane_sync::application::synchronizer::DEFAULT_HISTORY_LIMIT;
use ledgerlane_sync::domain::snapshot::{ConsistencyReport, StateSnapshot, SyncView};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::LimitQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{room_id}/resolve.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// The state the client believes is current.
    pub client_state: Value,
}

/// Response body for POST /{room_id}/resolve.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    /// The authoritative state the client must adopt.
    pub resolved_state: Value,
}

/// Response body for GET /{room_id}/history.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub snapshots: Vec<StateSnapshot>,
    pub last_sync_time: Option<DateTime<Utc>>,
}

/// GET /{room_id}/players/{player_id}
async fn player_view(
    State(state): State<AppState>,
    Path((room_id, player_id)): Path<(RoomId, String)>,
) -> Result<Json<SyncView>, ApiError> {
    Ok(Json(state.sync.sync_view(room_id, &PlayerId::new(player_id))?))
}

/// GET /{room_id}/players/{player_id}/decisions
async fn player_decisions(
    State(state): State<AppState>,
    Path((room_id, player_id)): Path<(RoomId, String)>,
) -> Json<Vec<DecisionRecord>> {
    Json(
        state
            .sync
            .player_decisions(room_id, &PlayerId::new(player_id)),
    )
}

/// GET /{room_id}/consistency
async fn consistency(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<ConsistencyReport>, ApiError> {
    Ok(Json(state.sync.validate_state_consistency(room_id)?))
}

/// GET /{room_id}/history?limit=
async fn history(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Query(query): Query<LimitQuery>,
) -> Json<HistoryResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Json(HistoryResponse {
        snapshots: state.sync.state_history(room_id, limit),
        last_sync_time: state.sync.last_sync_time(room_id),
    })
}

/// POST /{room_id}/resolve
#[instrument(skip(state, request))]
async fn resolve(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let server_state = state
        .registry
        .with_room(room_id, |room| serde_json::to_value(&room.game_state))?
        .map_err(|e| GameError::Conflict(format!("server state is not representable: {e}")))?;
    let resolved_state = state
        .sync
        .resolve_conflict(room_id, request.client_state, server_state);
    Ok(Json(ResolveResponse { resolved_state }))
}

/// Returns the router for state synchronization.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{room_id}/players/{player_id}", get(player_view))
        .route("/{room_id}/players/{player_id}/decisions", get(player_decisions))
        .route("/{room_id}/consistency", get(consistency))
        .route("/{room_id}/history", get(history))
        .route("/{room_id}/resolve", post(resolve))
}
