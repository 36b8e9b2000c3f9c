//! One play-through of a variant
//!
//! A [`GameSession`] owns the engine, the timer queue and the symbol layout for a
//! single variant. The host drives it with two calls: `advance(elapsed_ms)` from
//! its frame/timer loop and `submit_symbol` from its input handler. Records are
//! raised after every completed round, not only at game over, so quitting mid-run
//! keeps the progress.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::{
    EngineTimer, GameEvent, RoundPhase, Scheduler, SequenceEngine, SessionObserver, SubmitOutcome,
    Symbol,
};
use crate::layout::{BlockLayout, GridLayout, KeypadLayout, SymbolLayout};
use crate::platform::DocumentStorage;
use crate::records::{GameId, RecordStore};
use crate::settings::Settings;

/// The three game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Highlighted squares on a 3×3 grid
    Spatial,
    /// Randomly placed blocks
    Corsi,
    /// Digits shown one at a time
    MemorySpan,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Spatial, Variant::Corsi, Variant::MemorySpan];

    pub fn game_id(&self) -> GameId {
        match self {
            Variant::Spatial => GameId::Spatial,
            Variant::Corsi => GameId::Corsi,
            Variant::MemorySpan => GameId::MemorySpan,
        }
    }

    pub fn name(&self) -> &'static str {
        self.game_id().as_str()
    }

    /// Number of distinct symbols a session of this variant draws from
    pub fn symbol_space(&self, settings: &Settings) -> Symbol {
        match self {
            Variant::Spatial => 9,
            Variant::Corsi => settings.blocks.count,
            Variant::MemorySpan => 10,
        }
    }

    /// Short help text
    pub fn description(&self) -> &'static str {
        match self {
            Variant::Spatial => {
                "Remember the sequence of highlighted squares. \
                 Develops visual-spatial memory, pattern recognition and sequential memory."
            }
            Variant::Corsi => {
                "Remember the order in which scattered blocks light up. \
                 A classic test of visuo-spatial working memory."
            }
            Variant::MemorySpan => {
                "Remember the digits shown one by one, then type them back in order. \
                 Measures short-term verbal memory span."
            }
        }
    }

    /// Turn a typed answer into symbols
    ///
    /// Symbols are separated by whitespace. Memory Span also accepts a run of
    /// digits such as `472`, one symbol per digit. Tokens that aren't symbols
    /// become `Symbol::MAX`, which never matches.
    pub fn parse_answer(&self, line: &str) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        for token in line.split_whitespace() {
            match self {
                Variant::MemorySpan if token.bytes().all(|b| b.is_ascii_digit()) => {
                    symbols.extend(token.bytes().map(|b| b - b'0'));
                }
                _ => symbols.push(token.parse().unwrap_or(Symbol::MAX)),
            }
        }
        symbols
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "spatial" | "grid" | "1" => Some(Variant::Spatial),
            "corsi" | "blocks" | "2" => Some(Variant::Corsi),
            "span" | "digits" | "memory span" | "3" => Some(Variant::MemorySpan),
            _ => GameId::from_name(s).map(Variant::from),
        }
    }
}

impl From<GameId> for Variant {
    fn from(game: GameId) -> Self {
        match game {
            GameId::Spatial => Variant::Spatial,
            GameId::Corsi => Variant::Corsi,
            GameId::MemorySpan => Variant::MemorySpan,
        }
    }
}

/// Layout chosen by the variant
#[derive(Debug, Clone)]
pub enum VariantLayout {
    Grid(GridLayout),
    Blocks(BlockLayout),
    Keypad(KeypadLayout),
}

impl VariantLayout {
    fn for_variant(variant: Variant, settings: &Settings, rng: &mut Pcg32) -> Self {
        match variant {
            Variant::Spatial => VariantLayout::Grid(GridLayout),
            Variant::Corsi => VariantLayout::Blocks(BlockLayout::generate(&settings.blocks, rng)),
            Variant::MemorySpan => VariantLayout::Keypad(KeypadLayout),
        }
    }

    pub fn as_dyn(&self) -> &dyn SymbolLayout {
        match self {
            VariantLayout::Grid(l) => l,
            VariantLayout::Blocks(l) => l,
            VariantLayout::Keypad(l) => l,
        }
    }

    /// Corsi blocks, if this is a block layout
    pub fn blocks(&self) -> Option<&BlockLayout> {
        match self {
            VariantLayout::Blocks(l) => Some(l),
            _ => None,
        }
    }
}

/// A running game of one variant
#[derive(Debug, Clone)]
pub struct GameSession {
    variant: Variant,
    settings: Settings,
    engine: SequenceEngine,
    scheduler: Scheduler<EngineTimer>,
    layout: VariantLayout,
    layout_rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Create an idle session. Nothing happens until [`GameSession::start`].
    pub fn new(variant: Variant, settings: &Settings, seed: u64) -> Self {
        let mut layout_rng = Pcg32::seed_from_u64(seed);
        let layout = VariantLayout::for_variant(variant, settings, &mut layout_rng);
        // Separate stream for the sequence so layout retries don't shift it
        let engine_seed = seed.wrapping_mul(2654435761).wrapping_add(1);
        log::info!("{} session created with seed {}", variant.name(), seed);

        Self {
            variant,
            settings: settings.clone(),
            engine: SequenceEngine::new(
                variant.symbol_space(settings),
                settings.timing.clone(),
                engine_seed,
            ),
            scheduler: Scheduler::new(),
            layout,
            layout_rng,
            events: Vec::new(),
        }
    }

    /// Begin play. A session already under way is torn down and started over.
    pub fn start(&mut self) {
        if self.engine.phase() != RoundPhase::Idle {
            log::info!("Restarting {} session in progress", self.variant.name());
            self.cancel();
            self.regenerate_layout();
        }
        self.engine.begin();
        self.pump();
    }

    /// Play again after game over. Returns false unless terminated.
    pub fn restart(&mut self) -> bool {
        if self.engine.phase() != RoundPhase::Terminated {
            return false;
        }
        self.scheduler.cancel_all();
        self.engine.restart();
        self.regenerate_layout();
        self.engine.begin();
        self.pump();
        true
    }

    /// Tear down: cancel every pending timer and return the engine to Idle
    pub fn cancel(&mut self) {
        let dropped = self.scheduler.cancel_all();
        self.engine.reset();
        self.events.clear();
        log::debug!(
            "{} session cancelled ({} timers dropped)",
            self.variant.name(),
            dropped
        );
    }

    /// Let `elapsed_ms` of real time pass, firing every timer that falls due
    ///
    /// Fired timers queue their events on the session. Hosts must take them with
    /// [`GameSession::drain_events`] or [`GameSession::dispatch_events`], otherwise
    /// the queue keeps growing.
    pub fn advance(&mut self, elapsed_ms: u64) {
        let target = self.scheduler.now_ms().saturating_add(elapsed_ms);
        while let Some(timer) = self.scheduler.pop_due(target) {
            self.engine.on_timer(timer);
            self.pump();
        }
        self.scheduler.set_now(target);
    }

    /// Forward one player symbol, raising the record on round success and game over
    pub fn submit_symbol<S: DocumentStorage>(
        &mut self,
        symbol: Symbol,
        records: &mut RecordStore<S>,
    ) -> SubmitOutcome {
        let outcome = self.engine.submit_symbol(symbol);
        self.pump();
        match outcome {
            SubmitOutcome::RoundComplete => {
                self.record(records, self.engine.completed_rounds());
            }
            SubmitOutcome::Mismatch => {
                if let Some(score) = self.engine.final_score() {
                    self.record(records, score);
                }
            }
            SubmitOutcome::Accepted | SubmitOutcome::Ignored => {}
        }
        outcome
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deliver pending events to an observer
    pub fn dispatch_events(&mut self, observer: &mut (impl SessionObserver + ?Sized)) {
        for event in self.drain_events() {
            event.dispatch(observer);
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn phase(&self) -> RoundPhase {
        self.engine.phase()
    }

    pub fn level(&self) -> u32 {
        self.engine.level()
    }

    pub fn sequence(&self) -> &[Symbol] {
        self.engine.sequence()
    }

    pub fn input(&self) -> &[Symbol] {
        self.engine.input()
    }

    /// Symbols are drawn from `0..symbol_space()`
    pub fn symbol_space(&self) -> Symbol {
        self.engine.symbol_space()
    }

    pub fn final_score(&self) -> Option<u32> {
        self.engine.final_score()
    }

    pub fn layout(&self) -> &VariantLayout {
        &self.layout
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Virtual time since the session was created (ms)
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Time until the next timer fires, None when nothing is pending
    pub fn next_timer_in_ms(&self) -> Option<u64> {
        self.scheduler
            .next_due_ms()
            .map(|due| due.saturating_sub(self.scheduler.now_ms()))
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Move engine output into the session: events to the queue, timer requests
    /// to the scheduler
    fn pump(&mut self) {
        self.events.extend(self.engine.drain_events());
        for request in self.engine.drain_timer_requests() {
            self.scheduler.schedule(request.delay_ms, request.timer);
        }
    }

    fn record<S: DocumentStorage>(&mut self, records: &mut RecordStore<S>, score: u32) {
        let game = self.variant.game_id();
        if records.update_if_higher(game, score) {
            self.events.push(GameEvent::RecordBroken { game, score });
        }
    }

    fn regenerate_layout(&mut self) {
        if self.variant == Variant::Corsi {
            self.layout =
                VariantLayout::for_variant(self.variant, &self.settings, &mut self.layout_rng);
        }
    }
}
