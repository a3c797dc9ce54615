//! Routes for player lookups.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use ledgerlane_core::error::GameError;
use ledgerlane_core::ids::PlayerId;
use ledgerlane_rooms::domain::room::Room;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /{player_id}/room
async fn player_room(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<Room>, ApiError> {
    let player_id = PlayerId::new(player_id);
    match state.registry.get_player_room(&player_id) {
        Some(room) => Ok(Json(room)),
        None => Err(GameError::PlayerNotFound(player_id).into()),
    }
}

/// Returns the router for player lookups.
pub fn router() -> Router<AppState> {
    Router::new().route("/{player_id}/room", get(player_room))
}
