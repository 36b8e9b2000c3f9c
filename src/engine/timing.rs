//! Round timing parameters
//!
//! Every delay the engine asks for comes from here, so a host can slow the game
//! down (or a test can speed it up) without touching the state machine.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Number of countdown steps before the first round
    pub countdown_steps: u32,
    /// Delay between countdown steps (ms)
    pub countdown_interval_ms: u64,
    /// On-duration at level 0 (ms)
    pub reveal_base_ms: u64,
    /// On-duration reduction per level (ms)
    pub reveal_step_ms: u64,
    /// Minimum on-duration (ms)
    pub reveal_floor_ms: u64,
    /// Blank gap after each revealed symbol (ms)
    pub reveal_gap_ms: u64,
    /// Pause after a completed round (ms)
    pub round_pause_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            countdown_steps: COUNTDOWN_STEPS,
            countdown_interval_ms: COUNTDOWN_INTERVAL_MS,
            reveal_base_ms: REVEAL_BASE_MS,
            reveal_step_ms: REVEAL_STEP_MS,
            reveal_floor_ms: REVEAL_FLOOR_MS,
            reveal_gap_ms: REVEAL_GAP_MS,
            round_pause_ms: ROUND_PAUSE_MS,
        }
    }
}

impl Timing {
    /// How long each symbol stays visible at `level`
    ///
    /// `max(floor, base - level * step)`, never below the floor.
    pub fn reveal_duration_ms(&self, level: u32) -> u64 {
        self.reveal_base_ms
            .saturating_sub(self.reveal_step_ms.saturating_mul(level as u64))
            .max(self.reveal_floor_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reveal_duration_defaults() {
        let t = Timing::default();
        assert_eq!(t.reveal_duration_ms(1), 770);
        assert_eq!(t.reveal_duration_ms(2), 740);
        assert_eq!(t.reveal_duration_ms(13), 410);
        assert_eq!(t.reveal_duration_ms(14), 400);
        assert_eq!(t.reveal_duration_ms(50), 400);
    }

    #[test]
    fn test_reveal_duration_huge_level() {
        let t = Timing::default();
        assert_eq!(t.reveal_duration_ms(u32::MAX), 400);
    }

    proptest! {
        #[test]
        fn prop_reveal_duration_formula(level in 0u32..10_000) {
            let t = Timing::default();
            let expected = (800i64 - 30 * level as i64).max(400) as u64;
            prop_assert_eq!(t.reveal_duration_ms(level), expected);
            prop_assert!(t.reveal_duration_ms(level) >= t.reveal_floor_ms);
        }
    }
}
