//! Memory Games entry point
//!
//! Native builds get a line-oriented terminal front end over [`Arcade`]: timers
//! run in real time, the sequence is printed one symbol at a time and the answer
//! is typed back. Web builds embed the library directly.

#[cfg(not(target_arch = "wasm32"))]
mod terminal {
    use std::io::{self, BufRead, Write};
    use std::thread;
    use std::time::{Duration, Instant};

    use memory_games::engine::{RoundPhase, SessionObserver, SubmitOutcome, Symbol};
    use memory_games::platform::{self, DocumentStorage, FileStorage, MemoryStorage};
    use memory_games::{Arcade, GameId, Settings, Variant};

    /// Prints session events as they happen
    struct Console;

    impl Console {
        fn flush() {
            let _ = io::stdout().flush();
        }
    }

    impl SessionObserver for Console {
        fn on_countdown_tick(&mut self, remaining: u32) {
            println!("  {}...", remaining);
        }

        fn on_symbol_reveal(&mut self, symbol: Symbol) {
            print!("\r  >> {:>2} <<", symbol);
            Console::flush();
        }

        fn on_symbol_hide(&mut self, _symbol: Symbol) {
            print!("\r           \r");
            Console::flush();
        }

        fn on_awaiting_input(&mut self) {
            println!("  Repeat the sequence!");
        }

        fn on_round_success(&mut self, new_level: u32) {
            println!("  Great! Next level: {}", new_level);
        }

        fn on_game_over(&mut self, final_score: u32) {
            println!("  Game Over! Your score: Level {}", final_score);
        }

        fn on_record_broken(&mut self, game: GameId, score: u32) {
            println!("  New record for {}: {}", game, score);
        }
    }

    pub fn run() -> io::Result<()> {
        let settings = Settings::load();
        let seed = rand::random::<u64>();
        log::info!("Seed: {}", seed);

        match platform::records_path() {
            Some(path) => {
                log::info!("Records file: {}", path.display());
                play(Arcade::new(FileStorage::new(path), settings, seed))
            }
            None => {
                log::warn!("No home directory found, records will not be kept");
                play(Arcade::new(MemoryStorage::new(), settings, seed))
            }
        }
    }

    fn play<S: DocumentStorage>(mut arcade: Arcade<S>) -> io::Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print_menu(&arcade);
            let Some(line) = lines.next().transpose()? else {
                return Ok(());
            };
            match line.trim() {
                "q" | "quit" => return Ok(()),
                "r" | "reset" => {
                    arcade.reset_records();
                    println!("Records reset.");
                }
                choice => match Variant::from_str(choice) {
                    Some(variant) => {
                        println!("\n== {} ==\n{}\n", variant.name(), variant.description());
                        arcade.start_session(variant);
                        if !run_session(&mut arcade, &mut lines)? {
                            return Ok(());
                        }
                    }
                    None => println!("Unknown choice {:?}", choice),
                },
            }
        }
    }

    fn print_menu<S: DocumentStorage>(arcade: &Arcade<S>) {
        println!("\n=== Memory Games ===");
        for (i, variant) in Variant::ALL.iter().enumerate() {
            println!(
                "  {}. {:<22} best: {}",
                i + 1,
                variant.name(),
                arcade.records().get(variant.game_id())
            );
        }
        println!("  r. Reset records");
        println!("  q. Quit");
        print!("> ");
        Console::flush();
    }

    /// Play until the player goes back to the menu. Returns false if stdin closed.
    fn run_session<S, B>(arcade: &mut Arcade<S>, lines: &mut io::Lines<B>) -> io::Result<bool>
    where
        S: DocumentStorage,
        B: BufRead,
    {
        let mut console = Console;
        loop {
            run_timers(arcade, &mut console);
            let Some(phase) = arcade.session().map(|s| s.phase()) else {
                return Ok(true);
            };

            match phase {
                RoundPhase::AwaitingInput => {
                    print!("{}", answer_prompt(arcade));
                    Console::flush();
                    let Some(line) = lines.next().transpose()? else {
                        return Ok(false);
                    };
                    if line.trim() == "b" {
                        arcade.cancel_session();
                        return Ok(true);
                    }
                    let symbols = arcade
                        .session()
                        .map(|s| s.variant().parse_answer(&line))
                        .unwrap_or_default();
                    for symbol in symbols {
                        let outcome = arcade.submit_symbol(symbol);
                        arcade.dispatch_events(&mut console);
                        if matches!(
                            outcome,
                            SubmitOutcome::Mismatch | SubmitOutcome::RoundComplete
                        ) {
                            break;
                        }
                    }
                }
                RoundPhase::Terminated => {
                    print!("  Play again? [y/n]: ");
                    Console::flush();
                    let Some(line) = lines.next().transpose()? else {
                        return Ok(false);
                    };
                    if line.trim().eq_ignore_ascii_case("y") {
                        arcade.restart_session();
                    } else {
                        arcade.cancel_session();
                        return Ok(true);
                    }
                }
                other => {
                    log::warn!("Session stalled in {:?}, returning to menu", other);
                    arcade.cancel_session();
                    return Ok(true);
                }
            }
        }
    }

    fn answer_prompt<S: DocumentStorage>(arcade: &Arcade<S>) -> String {
        let Some(session) = arcade.session() else {
            return String::new();
        };
        let last = session.symbol_space().saturating_sub(1);
        match session.variant() {
            Variant::MemorySpan => "  Your answer, e.g. 472 ('b' for menu): ".to_string(),
            _ => format!(
                "  Your answer, 0-{} separated by spaces ('b' for menu): ",
                last
            ),
        }
    }

    /// Let timers fire in real time until the player has something to do
    fn run_timers<S: DocumentStorage>(arcade: &mut Arcade<S>, console: &mut Console) {
        let mut last = Instant::now();
        loop {
            arcade.dispatch_events(console);
            let Some(session) = arcade.session() else {
                return;
            };
            if matches!(
                session.phase(),
                RoundPhase::AwaitingInput | RoundPhase::Terminated
            ) {
                return;
            }
            let Some(wait) = session.next_timer_in_ms() else {
                return;
            };
            thread::sleep(Duration::from_millis(wait));
            let now = Instant::now();
            arcade.advance(now.duration_since(last).as_millis() as u64);
            last = now;
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    memory_games::platform::init_logging();
    log::info!("Memory Games starting...");

    if let Err(e) = terminal::run() {
        log::error!("Terminal I/O failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM hosts drive the library directly, this is just to satisfy the compiler
}
