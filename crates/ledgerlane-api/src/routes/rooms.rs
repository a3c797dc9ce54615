//! Routes for the Room Registry.

use axum::extract::{Path, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use ledgerlane_core::error::GameError;
use ledgerlane_core::ids::{PlayerId, RoomId};
use ledgerlane_rooms::domain::commands::{CreateRoom, JoinRoom};
use ledgerlane_rooms::domain::events::RoomEvent;
use ledgerlane_rooms::domain::room::Room;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::PlayerRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub host_id: String,
    #[serde(default)]
    pub host_name: Option<String>,
    pub room_name: String,
    /// Seats in the room. Falls back to the server's configured capacity.
    #[serde(default)]
    pub capacity: Option<usize>,
}

/// Request body for POST /{room_id}/join.
#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub player_id: String,
    pub player_name: String,
}

/// Request body for POST /{room_id}/start.
#[derive(Debug, Deserialize)]
pub struct StartGameRequest {
    pub host_id: String,
}

/// Response body for POST /leave.
#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    /// False when the player was not seated anywhere.
    pub left: bool,
    pub room_id: Option<RoomId>,
    pub room_closed: bool,
    pub new_host: Option<PlayerId>,
    pub turn_passed_to: Option<PlayerId>,
}

/// POST /
#[instrument(skip(state, request), fields(host_id = %request.host_id))]
async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<Room>, ApiError> {
    let command = CreateRoom {
        host_id: PlayerId::new(request.host_id),
        host_name: request.host_name,
        room_name: request.room_name,
        capacity: request.capacity.unwrap_or(state.room_capacity),
    };
    let room = state.registry.create_room(&command)?;
    info!(room_id = %room.room_id, "room created");
    Ok(Json(room))
}

/// GET /
async fn list_waiting_rooms(State(state): State<AppState>) -> Json<Vec<Room>> {
    Json(state.registry.list_waiting_rooms())
}

/// GET /{room_id}
async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<Room>, ApiError> {
    state
        .registry
        .get_room(room_id)
        .map(Json)
        .ok_or_else(|| GameError::RoomNotFound(room_id).into())
}

/// POST /{room_id}/join
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<Json<Room>, ApiError> {
    let command = JoinRoom {
        room_id,
        player_id: PlayerId::new(request.player_id),
        player_name: request.player_name,
    };
    Ok(Json(state.registry.join_room(&command)?))
}

/// POST /leave
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn leave_room(
    State(state): State<AppState>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<LeaveResponse>, ApiError> {
    let departure = state.flow.leave_room(&PlayerId::new(request.player_id))?;
    let response = match departure {
        None => LeaveResponse {
            left: false,
            room_id: None,
            room_closed: false,
            new_host: None,
            turn_passed_to: None,
        },
        Some(departure) => LeaveResponse {
            left: true,
            room_id: Some(departure.room_id),
            room_closed: departure.room_closed(),
            new_host: departure.new_host,
            turn_passed_to: departure.turn_passed_to,
        },
    };
    Ok(Json(response))
}

/// POST /{room_id}/start
#[instrument(skip(state, request), fields(host_id = %request.host_id))]
async fn start_game(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    Json(request): Json<StartGameRequest>,
) -> Result<Json<Room>, ApiError> {
    Ok(Json(
        state
            .flow
            .start_game(room_id, &PlayerId::new(request.host_id))?,
    ))
}

/// GET /{room_id}/events
async fn room_events(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Json<Vec<RoomEvent>> {
    Json(state.registry.room_events(room_id))
}

/// Returns the router for the room registry.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_room).get(list_waiting_rooms))
        .route("/leave", post(leave_room))
        .route("/{room_id}", get(get_room))
        .route("/{room_id}/join", post(join_room))
        .route("/{room_id}/start", post(start_game))
        .route("/{room_id}/events", get(room_events))
}
