//! Ledgerlane API server entry point.

use std::error::Error;
use std::sync::Arc;

use ledgerlane_api::config::Config;
use ledgerlane_api::state::{AppState, StateParts};
use ledgerlane_core::clock::SystemClock;
use ledgerlane_core::rng::StdDeterministicRng;
use ledgerlane_core::timer::TokioScheduler;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Ledgerlane API server");

    let config = Config::from_env()?;

    let app_state = AppState::new(StateParts {
        clock: Arc::new(SystemClock),
        scheduler: Arc::new(TokioScheduler::new(tokio::runtime::Handle::current())),
        rng: Box::new(StdDeterministicRng::from_os_rng()),
        turn_config: config.turn_config(),
        room_capacity: config.room_capacity,
    });

    // TODO: Replace CorsLayer::permissive() with restricted origins once the web client has a fixed host.
    let app = ledgerlane_api::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!(
        %addr,
        turn_timeout_secs = config.turn_timeout_secs,
        action_cooldown_ms = config.action_cooldown_ms,
        "Listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
