//! Ledgerlane — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ledgerlane_core::error::{ErrorKind, GameError};
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Milliseconds to wait before retrying, for rate-limited requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

/// HTTP-layer wrapper around `GameError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub GameError);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::SequenceViolation | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
    }
}

fn code_for(err: &GameError) -> &'static str {
    match err {
        GameError::RoomNotFound(_) => "room_not_found",
        GameError::PlayerNotFound(_) => "player_not_found",
        GameError::TurnNotInitialized(_) => "turn_not_initialized",
        GameError::RoomFull(_) => "room_full",
        GameError::AlreadyMember { .. } => "already_member",
        GameError::AlreadyInRoom { .. } => "already_in_room",
        GameError::PermissionDenied(_) => "permission_denied",
        GameError::SequenceViolation(_) => "sequence_violation",
        GameError::RateLimited { .. } => "rate_limited",
        GameError::Conflict(_) => "conflict",
        GameError::Validation(_) => "validation_error",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        let retry_after_ms = match &self.0 {
            GameError::RateLimited { remaining_ms } => Some(*remaining_ms),
            _ => None,
        };

        let body = ErrorBody {
            error: code_for(&self.0),
            message: self.0.to_string(),
            retry_after_ms,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlane_core::ids::PlayerId;
    use uuid::Uuid;

    fn status_of(err: GameError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_room_not_found_maps_to_404() {
        assert_eq!(
            status_of(GameError::RoomNotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_permission_denied_maps_to_403() {
        assert_eq!(
            status_of(GameError::PermissionDenied("not your turn".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_sequence_violation_and_turn_not_initialized_map_to_409() {
        assert_eq!(
            status_of(GameError::SequenceViolation("roll first".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(GameError::TurnNotInitialized(Uuid::new_v4())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_rate_limited_maps_to_429() {
        assert_eq!(
            status_of(GameError::RateLimited { remaining_ms: 120 }),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_membership_conflicts_map_to_409() {
        assert_eq!(
            status_of(GameError::AlreadyInRoom {
                room_id: Uuid::new_v4(),
                player_id: PlayerId::from("p"),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(GameError::RoomFull(Uuid::new_v4())), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(GameError::Validation("bad input".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
