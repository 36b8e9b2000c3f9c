//! Notifications from the core to the presentation layer

use serde::{Deserialize, Serialize};

use super::Symbol;
use crate::records::GameId;

/// Something the presentation should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Countdown step, counting down to 1
    CountdownTick(u32),
    /// Light up a symbol
    SymbolReveal(Symbol),
    /// Turn a symbol back off
    SymbolHide(Symbol),
    /// The whole sequence was shown, input is open
    AwaitingInput,
    /// Round complete, now at `level`
    RoundSuccess(u32),
    /// Session over with `score` rounds completed
    GameOver(u32),
    /// A stored record was beaten
    RecordBroken { game: GameId, score: u32 },
}

/// Callback-style consumer of [`GameEvent`]s
///
/// Every method defaults to doing nothing, so a view only implements what it draws.
pub trait SessionObserver {
    fn on_countdown_tick(&mut self, _remaining: u32) {}
    fn on_symbol_reveal(&mut self, _symbol: Symbol) {}
    fn on_symbol_hide(&mut self, _symbol: Symbol) {}
    fn on_awaiting_input(&mut self) {}
    fn on_round_success(&mut self, _new_level: u32) {}
    fn on_game_over(&mut self, _final_score: u32) {}
    fn on_record_broken(&mut self, _game: GameId, _score: u32) {}
}

impl GameEvent {
    /// Route this event to the matching observer callback
    pub fn dispatch(&self, observer: &mut (impl SessionObserver + ?Sized)) {
        match *self {
            GameEvent::CountdownTick(n) => observer.on_countdown_tick(n),
            GameEvent::SymbolReveal(s) => observer.on_symbol_reveal(s),
            GameEvent::SymbolHide(s) => observer.on_symbol_hide(s),
            GameEvent::AwaitingInput => observer.on_awaiting_input(),
            GameEvent::RoundSuccess(level) => observer.on_round_success(level),
            GameEvent::GameOver(score) => observer.on_game_over(score),
            GameEvent::RecordBroken { game, score } => observer.on_record_broken(game, score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl SessionObserver for Log {
        fn on_symbol_reveal(&mut self, symbol: Symbol) {
            self.0.push(format!("show {}", symbol));
        }
        fn on_game_over(&mut self, final_score: u32) {
            self.0.push(format!("over {}", final_score));
        }
    }

    #[test]
    fn test_dispatch_routes_and_defaults_ignore() {
        let mut log = Log::default();
        for e in [
            GameEvent::CountdownTick(3),
            GameEvent::SymbolReveal(4),
            GameEvent::SymbolHide(4),
            GameEvent::GameOver(2),
        ] {
            e.dispatch(&mut log);
        }
        assert_eq!(log.0, vec!["show 4", "over 2"]);
    }
}
