//! Shared test doubles and utilities for the Ledgerlane game server.

mod clock;
mod rng;
mod scheduler;

pub use clock::{FixedClock, ManualClock, fixed_instant};
pub use rng::{MockRng, SequenceRng};
pub use scheduler::ManualScheduler;
