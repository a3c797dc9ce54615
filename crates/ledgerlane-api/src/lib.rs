//! Ledgerlane — HTTP transport.
//!
//! Translates JSON requests into calls on the coordination services held in
//! [`state::AppState`]. Handlers are thin: every rule lives in the service
//! crates.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

/// Builds the application router with every route mounted.
pub fn build_router(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/rooms", routes::rooms::router())
        .nest("/api/v1/players", routes::players::router())
        .nest("/api/v1/turns", routes::turns::router())
        .nest("/api/v1/flow", routes::flow::router())
        .nest("/api/v1/sync", routes::sync::router())
        .with_state(state)
}
