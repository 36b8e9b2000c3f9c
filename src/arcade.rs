//! Menu-level controller
//!
//! Owns the record store and at most one running session. This is the surface a
//! presentation layer talks to: start a game, feed it input and elapsed time,
//! go back to the menu, show or reset the records.

use crate::engine::{GameEvent, RoundPhase, SessionObserver, SubmitOutcome, Symbol};
use crate::platform::DocumentStorage;
use crate::records::{RecordStore, RecordTable};
use crate::session::{GameSession, Variant};
use crate::settings::Settings;

#[derive(Debug)]
pub struct Arcade<S> {
    records: RecordStore<S>,
    settings: Settings,
    session: Option<GameSession>,
    next_seed: u64,
}

impl<S: DocumentStorage> Arcade<S> {
    /// Open the records in `storage`. `seed` feeds every session started from here.
    pub fn new(storage: S, settings: Settings, seed: u64) -> Self {
        Self {
            records: RecordStore::open(storage),
            settings,
            session: None,
            next_seed: seed,
        }
    }

    /// Start `variant`, tearing down whatever session was running
    pub fn start_session(&mut self, variant: Variant) -> &GameSession {
        self.cancel_session();
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(0x9E37_79B9_7F4A_7C15);

        let session = self
            .session
            .insert(GameSession::new(variant, &self.settings, seed));
        session.start();
        session
    }

    /// Forward a player symbol to the running session
    pub fn submit_symbol(&mut self, symbol: Symbol) -> SubmitOutcome {
        match self.session.as_mut() {
            Some(session) => session.submit_symbol(symbol, &mut self.records),
            None => SubmitOutcome::Ignored,
        }
    }

    /// Let time pass in the running session
    pub fn advance(&mut self, elapsed_ms: u64) {
        if let Some(session) = self.session.as_mut() {
            session.advance(elapsed_ms);
        }
    }

    /// Play the same variant again after game over
    pub fn restart_session(&mut self) -> bool {
        self.session.as_mut().is_some_and(|s| s.restart())
    }

    /// Back to the menu: cancel all timers and drop the session
    pub fn cancel_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            if session.phase() != RoundPhase::Terminated {
                log::info!(
                    "Leaving {} at level {}",
                    session.variant().name(),
                    session.level()
                );
            }
            session.cancel();
        }
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Events produced by the running session since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session
            .as_mut()
            .map(|s| s.drain_events())
            .unwrap_or_default()
    }

    pub fn dispatch_events(&mut self, observer: &mut (impl SessionObserver + ?Sized)) {
        if let Some(session) = self.session.as_mut() {
            session.dispatch_events(observer);
        }
    }

    pub fn records(&self) -> &RecordTable {
        self.records.table()
    }

    pub fn record_store(&self) -> &RecordStore<S> {
        &self.records
    }

    /// Zero every record and persist
    pub fn reset_records(&mut self) -> RecordTable {
        self.records.reset()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;
    use crate::records::GameId;

    fn arcade() -> Arcade<MemoryStorage> {
        Arcade::new(MemoryStorage::new(), Settings::default(), 77)
    }

    fn to_input(arcade: &mut Arcade<MemoryStorage>) {
        while arcade.session().map(|s| s.phase()) != Some(RoundPhase::AwaitingInput) {
            let wait = arcade
                .session()
                .and_then(|s| s.next_timer_in_ms())
                .expect("timer pending");
            arcade.advance(wait);
        }
    }

    #[test]
    fn test_no_session_ignores_input() {
        let mut a = arcade();
        assert_eq!(a.submit_symbol(3), SubmitOutcome::Ignored);
        a.advance(1000);
        assert!(a.drain_events().is_empty());
    }

    #[test]
    fn test_first_round_updates_persisted_record() {
        let mut a = arcade();
        a.start_session(Variant::Spatial);
        to_input(&mut a);

        let s = a.session().unwrap().sequence()[0];
        assert_eq!(a.submit_symbol(s), SubmitOutcome::RoundComplete);
        assert_eq!(a.session().unwrap().level(), 2);
        assert_eq!(a.records().get(GameId::Spatial), 1);

        let stored = a.record_store().storage().contents().unwrap();
        let reloaded = RecordTable::from_json(stored).unwrap();
        assert_eq!(reloaded.get(GameId::Spatial), 1);
    }

    #[test]
    fn test_wrong_third_symbol_ends_with_score_two() {
        let mut a = arcade();
        a.start_session(Variant::MemorySpan);
        for _ in 0..2 {
            to_input(&mut a);
            for s in a.session().unwrap().sequence().to_vec() {
                a.submit_symbol(s);
            }
        }
        to_input(&mut a);
        let seq = a.session().unwrap().sequence().to_vec();
        assert_eq!(seq.len(), 3);

        a.submit_symbol(seq[0]);
        a.submit_symbol(seq[1]);
        assert_eq!(a.submit_symbol((seq[2] + 1) % 10), SubmitOutcome::Mismatch);

        let session = a.session().unwrap();
        assert_eq!(session.phase(), RoundPhase::Terminated);
        assert_eq!(session.final_score(), Some(2));
        assert_eq!(a.records().get(GameId::MemorySpan), 2);
    }

    #[test]
    fn test_cancel_session_returns_to_menu() {
        let mut a = arcade();
        a.start_session(Variant::Corsi);
        a.advance(3500);
        a.cancel_session();
        assert!(a.session().is_none());
        a.advance(10_000);
        assert_eq!(a.submit_symbol(0), SubmitOutcome::Ignored);
    }

    #[test]
    fn test_starting_again_replaces_session() {
        let mut a = arcade();
        a.start_session(Variant::Spatial);
        a.advance(5000);
        let phase = a.start_session(Variant::Spatial).phase();
        assert_eq!(phase, RoundPhase::Countdown);
        assert_eq!(a.session().unwrap().pending_timers(), 1);
    }

    #[test]
    fn test_sessions_get_fresh_seeds() {
        let mut a = arcade();
        a.start_session(Variant::Spatial);
        a.advance(3000);
        let first: Vec<_> = a.session().unwrap().sequence().to_vec();

        let mut firsts = vec![first];
        for _ in 0..5 {
            a.start_session(Variant::Spatial);
            a.advance(3000);
            firsts.push(a.session().unwrap().sequence().to_vec());
        }
        firsts.sort();
        firsts.dedup();
        assert!(firsts.len() > 1);
    }

    #[test]
    fn test_reset_records() {
        let mut a = Arcade::new(
            MemoryStorage::with_contents(
                r#"{"Spatial Memory Game": 3, "Corsi Block Test": 4, "Memory Span": 5}"#,
            ),
            Settings::default(),
            1,
        );
        assert_eq!(a.records().get(GameId::Corsi), 4);
        a.reset_records();
        for game in GameId::ALL {
            assert_eq!(a.records().get(game), 0);
        }
    }

    #[test]
    fn test_restart_session() {
        let mut a = arcade();
        assert!(!a.restart_session());
        a.start_session(Variant::Spatial);
        to_input(&mut a);
        a.submit_symbol(42);
        assert!(a.restart_session());
        assert_eq!(a.session().unwrap().phase(), RoundPhase::Countdown);
    }
}
