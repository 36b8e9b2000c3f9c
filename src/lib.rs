//! Memory Games - three sequence-recall games sharing one game loop
//!
//! Core modules:
//! - `engine`: Deterministic sequence engine (state machine, virtual-clock scheduler)
//! - `session`: One play-through of a variant, driving the engine and updating records
//! - `arcade`: Menu-level controller owning the record store and the active session
//! - `layout`: Corsi block generator and per-variant symbol layouts
//! - `records`: Best-level table with pluggable storage
//! - `settings`: Data-driven timing and layout parameters
//! - `platform`: Logging setup and storage backends (file, LocalStorage, memory)

pub mod arcade;
pub mod engine;
pub mod layout;
pub mod platform;
pub mod records;
pub mod session;
pub mod settings;

pub use arcade::Arcade;
pub use engine::{GameEvent, RoundPhase, SequenceEngine, SessionObserver, SubmitOutcome, Symbol};
pub use records::{GameId, RecordStore, RecordTable};
pub use session::{GameSession, Variant};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Countdown steps shown before the first round
    pub const COUNTDOWN_STEPS: u32 = 3;
    /// Interval between countdown steps (ms)
    pub const COUNTDOWN_INTERVAL_MS: u64 = 1000;

    /// Symbol on-duration at level 0 (ms), shrinks by `REVEAL_STEP_MS` per level
    pub const REVEAL_BASE_MS: u64 = 800;
    pub const REVEAL_STEP_MS: u64 = 30;
    /// Lower bound on the symbol on-duration (ms)
    pub const REVEAL_FLOOR_MS: u64 = 400;
    /// Blank gap between two revealed symbols (ms)
    pub const REVEAL_GAP_MS: u64 = 200;

    /// Pause between a completed round and the next reveal (ms)
    pub const ROUND_PAUSE_MS: u64 = 1500;

    /// Corsi canvas and block defaults (px)
    pub const CANVAS_WIDTH: i32 = 650;
    pub const CANVAS_HEIGHT: i32 = 420;
    pub const BLOCK_SIZE: i32 = 70;
    pub const BLOCK_MARGIN: i32 = 10;
    pub const BLOCK_PADDING: i32 = 12;
    pub const BLOCK_COUNT: u8 = 12;
    pub const BLOCK_MAX_ATTEMPTS: u32 = 1000;
}
