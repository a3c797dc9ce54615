//! Shared application state.

use std::sync::Arc;

use ledgerlane_core::clock::Clock;
use ledgerlane_core::rng::DeterministicRng;
use ledgerlane_core::timer::TimeoutScheduler;
use ledgerlane_flow::FlowOrchestrator;
use ledgerlane_flow::application::orchestrator::FlowServices;
use ledgerlane_rooms::RoomRegistry;
use ledgerlane_rules::StandardRules;
use ledgerlane_sync::StateSynchronizer;
use ledgerlane_turns::TurnCoordinator;
use ledgerlane_turns::domain::config::TurnConfig;

/// The determinism seams and settings the services are built from.
pub struct StateParts {
    pub clock: Arc<dyn Clock>,
    pub scheduler: Arc<dyn TimeoutScheduler>,
    pub rng: Box<dyn DeterministicRng>,
    pub turn_config: TurnConfig,
    pub room_capacity: usize,
}

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub coordinator: Arc<TurnCoordinator>,
    pub sync: Arc<StateSynchronizer>,
    pub flow: Arc<FlowOrchestrator>,
    /// Capacity for rooms created without an explicit one.
    pub room_capacity: usize,
}

impl AppState {
    /// Wires the coordination services together.
    #[must_use]
    pub fn new(parts: StateParts) -> Self {
        let registry = Arc::new(RoomRegistry::new(Arc::clone(&parts.clock)));
        let coordinator = TurnCoordinator::new(
            Arc::clone(&registry),
            Arc::clone(&parts.clock),
            parts.scheduler,
            parts.turn_config,
        );
        let sync = Arc::new(StateSynchronizer::new(
            Arc::clone(&registry),
            Arc::clone(&parts.clock),
        ));
        let flow = Arc::new(FlowOrchestrator::new(FlowServices {
            registry: Arc::clone(&registry),
            coordinator: Arc::clone(&coordinator),
            sync: Arc::clone(&sync),
            rules: Arc::new(StandardRules),
            rng: parts.rng,
            clock: parts.clock,
        }));
        Self {
            registry,
            coordinator,
            sync,
            flow,
            room_capacity: parts.room_capacity,
        }
    }
}
