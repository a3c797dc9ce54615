//! Routes for the Turn Coordinator.

use axum::extract::{Path, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use ledgerlane_core::error::GameError;
use ledgerlane_core::ids::{PlayerId, RoomId};
use ledgerlane_turns::domain::turn_state::{TurnPhase, TurnState};
use serde::Serialize;
use tracing::{info, instrument};

use super::PlayerRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// Response body for GET /{room_id}.
#[derive(Debug, Serialize)]
pub struct TurnView {
    pub state: TurnState,
    pub phase: TurnPhase,
    /// Milliseconds before the turn is forfeited.
    pub remaining_ms: Option<u64>,
}

/// Response body for POST /{room_id}/roll.
#[derive(Debug, Serialize)]
pub struct RollResponse {
    pub dice: u32,
}

/// Response body for turn transitions.
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub next_player: PlayerId,
}

/// GET /{room_id}
async fn current_turn(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<TurnView>, ApiError> {
    let Some(turn) = state.coordinator.turn_state(room_id) else {
        if state.registry.get_room(room_id).is_none() {
            return Err(GameError::RoomNotFound(room_id).into());
        }
        return Err(GameError::TurnNotInitialized(room_id).into());
    };
    Ok(Json(TurnView {
        phase: turn.phase(),
        remaining_ms: state.coordinator.turn_remaining(room_id),
        state: turn,
    }))
}

/// POST /{room_id}/roll
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn roll_dice(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<RollResponse>, ApiError> {
    let dice = state
        .flow
        .roll_dice(room_id, &PlayerId::new(request.player_id))?;
    Ok(Json(RollResponse { dice }))
}

/// POST /{room_id}/next
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn next_turn(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let next_player = state
        .flow
        .end_turn(room_id, &PlayerId::new(request.player_id))?;
    Ok(Json(TransitionResponse { next_player }))
}

/// POST /{room_id}/skip
#[instrument(skip(state))]
async fn skip_turn(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let next_player = state.flow.skip_turn(room_id)?;
    info!(%next_player, "turn skipped by request");
    Ok(Json(TransitionResponse { next_player }))
}

/// Returns the router for turn coordination.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{room_id}", get(current_turn))
        .route("/{room_id}/roll", post(roll_dice))
        .route("/{room_id}/next", post(next_turn))
        .route("/{room_id}/skip", post(skip_turn))
}
