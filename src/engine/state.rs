//! Round state machine
//!
//! Idle → Countdown → Displaying → AwaitingInput → RoundResolving → Displaying → …
//! until a wrong symbol sends it to Terminated. The engine never waits: each
//! transition that needs time to pass pushes a [`TimerRequest`], and the owner
//! feeds the timer back through [`SequenceEngine::on_timer`] once it elapses.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::timing::Timing;
use super::Symbol;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for `begin`
    Idle,
    /// Counting down before the first round
    Countdown,
    /// Revealing the sequence, input is ignored
    Displaying,
    /// Player is reproducing the sequence
    AwaitingInput,
    /// Round won, pausing before the next one
    RoundResolving,
    /// Wrong symbol, session over
    Terminated,
}

/// Timers the engine can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTimer {
    CountdownTick,
    /// Show the symbol at this sequence index
    Reveal(usize),
    /// Hide the symbol at this sequence index
    Hide(usize),
    /// Reveal finished, open input
    OpenInput,
    /// Pause after a won round is over
    NextRound,
}

/// Request to fire `timer` after `delay_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub delay_ms: u64,
    pub timer: EngineTimer,
}

/// What a submitted symbol did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Not accepting input right now
    Ignored,
    /// Correct, more symbols to go
    Accepted,
    /// Correct and the sequence is complete
    RoundComplete,
    /// Wrong symbol, session terminated
    Mismatch,
}

/// Growing-sequence game loop shared by every variant
#[derive(Debug, Clone)]
pub struct SequenceEngine {
    symbol_space: Symbol,
    timing: Timing,
    rng: Pcg32,
    sequence: Vec<Symbol>,
    input: Vec<Symbol>,
    /// Current level (1-based), equals the sequence length once the round's symbol is in
    level: u32,
    phase: RoundPhase,
    countdown_remaining: u32,
    final_score: Option<u32>,
    events: Vec<GameEvent>,
    timer_requests: Vec<TimerRequest>,
}

impl SequenceEngine {
    /// Create an idle engine drawing symbols from `0..symbol_space`
    pub fn new(symbol_space: Symbol, timing: Timing, seed: u64) -> Self {
        Self {
            symbol_space: symbol_space.max(1),
            timing,
            rng: Pcg32::seed_from_u64(seed),
            sequence: Vec::new(),
            input: Vec::new(),
            level: 1,
            phase: RoundPhase::Idle,
            countdown_remaining: 0,
            final_score: None,
            events: Vec::new(),
            timer_requests: Vec::new(),
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn sequence(&self) -> &[Symbol] {
        &self.sequence
    }

    pub fn input(&self) -> &[Symbol] {
        &self.input
    }

    pub fn symbol_space(&self) -> Symbol {
        self.symbol_space
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Rounds completed so far
    pub fn completed_rounds(&self) -> u32 {
        self.level.saturating_sub(1)
    }

    /// Score of a terminated session
    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    /// Take the timer requests produced since the last call
    pub fn drain_timer_requests(&mut self) -> std::vec::Drain<'_, TimerRequest> {
        self.timer_requests.drain(..)
    }

    /// Start play from Idle. Returns false if not idle.
    pub fn begin(&mut self) -> bool {
        if self.phase != RoundPhase::Idle {
            log::debug!("begin ignored in {:?}", self.phase);
            return false;
        }

        if self.level == 1 && self.timing.countdown_steps > 0 {
            self.phase = RoundPhase::Countdown;
            self.countdown_remaining = self.timing.countdown_steps;
            self.events
                .push(GameEvent::CountdownTick(self.countdown_remaining));
            self.request(self.timing.countdown_interval_ms, EngineTimer::CountdownTick);
        } else {
            self.enter_displaying();
        }
        true
    }

    /// Handle an elapsed timer. Timers that don't belong to the current phase are
    /// dropped; returns whether the timer was applied.
    pub fn on_timer(&mut self, timer: EngineTimer) -> bool {
        match (self.phase, timer) {
            (RoundPhase::Countdown, EngineTimer::CountdownTick) => {
                self.countdown_remaining = self.countdown_remaining.saturating_sub(1);
                if self.countdown_remaining > 0 {
                    self.events
                        .push(GameEvent::CountdownTick(self.countdown_remaining));
                    self.request(self.timing.countdown_interval_ms, EngineTimer::CountdownTick);
                } else {
                    self.enter_displaying();
                }
            }
            (RoundPhase::Displaying, EngineTimer::Reveal(i)) if i < self.sequence.len() => {
                self.reveal(i);
            }
            (RoundPhase::Displaying, EngineTimer::Hide(i)) if i < self.sequence.len() => {
                self.events.push(GameEvent::SymbolHide(self.sequence[i]));
                let next = if i + 1 < self.sequence.len() {
                    EngineTimer::Reveal(i + 1)
                } else {
                    EngineTimer::OpenInput
                };
                self.request(self.timing.reveal_gap_ms, next);
            }
            (RoundPhase::Displaying, EngineTimer::OpenInput) => {
                self.phase = RoundPhase::AwaitingInput;
                self.input.clear();
                self.events.push(GameEvent::AwaitingInput);
            }
            (RoundPhase::RoundResolving, EngineTimer::NextRound) => {
                self.enter_displaying();
            }
            (phase, timer) => {
                log::debug!("Dropping stale timer {:?} in {:?}", timer, phase);
                return false;
            }
        }
        true
    }

    /// Feed one player symbol
    pub fn submit_symbol(&mut self, symbol: Symbol) -> SubmitOutcome {
        if self.phase != RoundPhase::AwaitingInput {
            log::trace!("Input {} ignored in {:?}", symbol, self.phase);
            return SubmitOutcome::Ignored;
        }

        self.input.push(symbol);
        let index = self.input.len() - 1;

        if self.sequence.get(index) != Some(&symbol) {
            self.terminate();
            SubmitOutcome::Mismatch
        } else if self.input.len() == self.sequence.len() {
            self.level += 1;
            self.phase = RoundPhase::RoundResolving;
            self.events.push(GameEvent::RoundSuccess(self.level));
            self.request(self.timing.round_pause_ms, EngineTimer::NextRound);
            log::debug!("Round complete, now level {}", self.level);
            SubmitOutcome::RoundComplete
        } else {
            SubmitOutcome::Accepted
        }
    }

    /// Leave Terminated for a fresh Idle engine. Returns false if not terminated.
    pub fn restart(&mut self) -> bool {
        if self.phase != RoundPhase::Terminated {
            return false;
        }
        self.reset();
        true
    }

    /// Back to Idle from any phase, dropping the sequence and anything queued
    pub fn reset(&mut self) {
        self.sequence.clear();
        self.input.clear();
        self.level = 1;
        self.phase = RoundPhase::Idle;
        self.countdown_remaining = 0;
        self.final_score = None;
        self.events.clear();
        self.timer_requests.clear();
    }

    fn enter_displaying(&mut self) {
        self.phase = RoundPhase::Displaying;
        self.input.clear();
        let symbol = self.rng.random_range(0..self.symbol_space);
        self.sequence.push(symbol);
        log::debug!(
            "Level {}: showing {} symbols",
            self.level,
            self.sequence.len()
        );
        self.reveal(0);
    }

    fn reveal(&mut self, index: usize) {
        self.events.push(GameEvent::SymbolReveal(self.sequence[index]));
        let on_ms = self.timing.reveal_duration_ms(self.level);
        self.request(on_ms, EngineTimer::Hide(index));
    }

    fn terminate(&mut self) {
        let score = self.completed_rounds();
        self.phase = RoundPhase::Terminated;
        self.final_score = Some(score);
        self.events.push(GameEvent::GameOver(score));
        log::info!("Game over at level {} (score {})", self.level, score);
    }

    fn request(&mut self, delay_ms: u64, timer: EngineTimer) {
        self.timer_requests.push(TimerRequest { delay_ms, timer });
    }
}
