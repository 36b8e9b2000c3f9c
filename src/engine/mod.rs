//! Deterministic sequence engine
//!
//! All round logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - No real clocks: delays are requested, the host decides when they elapse
//! - No rendering or storage dependencies

pub mod events;
pub mod scheduler;
pub mod state;
pub mod timing;

/// One memorizable unit (grid cell, block index, digit)
pub type Symbol = u8;

pub use events::{GameEvent, SessionObserver};
pub use scheduler::{Scheduler, TimerHandle};
pub use state::{EngineTimer, RoundPhase, SequenceEngine, SubmitOutcome, TimerRequest};
pub use timing::Timing;
