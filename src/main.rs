//! Fletch headless match runner
//!
//! Plays scripted duels against the adaptive enemy and reports the result,
//! optionally writing a JSON replay for offline inspection.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::{Parser, Subcommand};
    use serde::Serialize;
    use thiserror::Error;

    use fletch::sim::tick::{is_miss, termination_of};
    use fletch::sim::{FixedClock, GameEvent, MatchState, Side, Snapshot, Termination, TickInput, tick};
    use fletch::{Tuning, TuningError};

    #[derive(Parser)]
    #[command(name = "fletch", about = "Archery duel simulation runner")]
    struct Cli {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Run a headless match against the adaptive enemy
        Run {
            /// Random seed for the match
            #[arg(long, default_value_t = 42)]
            seed: u64,

            /// Number of rounds to play
            #[arg(long, default_value_t = 5)]
            rounds: u32,

            /// Number of enemy archers
            #[arg(long, default_value_t = 1)]
            enemies: usize,

            /// Player elevation in degrees
            #[arg(long, default_value_t = 45.0)]
            angle: f32,

            /// Player power
            #[arg(long, default_value_t = 60.0)]
            power: f32,

            /// Sweep the player's angle and power between shots instead of
            /// repeating the same one
            #[arg(long)]
            sweep: bool,

            /// Simulated frame rate of the host driving the clock
            #[arg(long, default_value_t = 60.0)]
            fps: f32,

            /// Give up after this many simulated seconds
            #[arg(long, default_value_t = 600.0)]
            max_secs: f32,

            /// Tuning JSON file
            #[arg(long)]
            tuning: Option<PathBuf>,

            /// Output path for replay JSON
            #[arg(long)]
            output: Option<PathBuf>,
        },

        /// Print the reference tuning as JSON
        Tuning,
    }

    #[derive(Debug, Error)]
    pub enum RunError {
        #[error(transparent)]
        Tuning(#[from] TuningError),
        #[error("failed to write replay: {0}")]
        Io(#[from] std::io::Error),
        #[error("failed to encode replay: {0}")]
        Json(#[from] serde_json::Error),
    }

    /// Replay file contents
    #[derive(Serialize)]
    struct Replay {
        seed: u64,
        tuning: Tuning,
        frames: Vec<Snapshot>,
        events: Vec<(u64, GameEvent)>,
    }

    /// Frames between replay snapshots
    const FRAME_INTERVAL: u64 = 10;

    #[derive(Debug, Default)]
    struct Tally {
        player_shots: u32,
        enemy_shots: u32,
        hits: u32,
        landed: u32,
        misses: u32,
        learned: u32,
    }

    pub fn run() -> Result<(), RunError> {
        let cli = Cli::parse();

        match cli.command {
            Commands::Run {
                seed,
                rounds,
                enemies,
                angle,
                power,
                sweep,
                fps,
                max_secs,
                tuning,
                output,
            } => {
                let tuning = match tuning {
                    Some(path) => Tuning::load(&path)?,
                    None => Tuning::default(),
                };
                let mut state = MatchState::with_enemies(tuning, seed, enemies);
                let mut clock = FixedClock::default();
                let frame_secs = 1.0 / fps.max(1.0);
                let max_frames = (max_secs.max(0.0) / frame_secs) as u64;

                let mut input = TickInput {
                    angle,
                    power,
                    fire: true,
                    pause: false,
                };
                let mut shot = 0u32;
                let mut tally = Tally::default();
                let mut frames = Vec::new();
                let mut events_log = Vec::new();

                log::info!("Starting {} round match with seed {}", rounds, seed);

                'frames: for frame in 0..max_frames {
                    for _ in 0..clock.advance(frame_secs) {
                        let events = tick(&mut state, &input, 1.0);
                        for event in &events {
                            match event {
                                GameEvent::Fired { shooter, .. } if *shooter == state.player => {
                                    tally.player_shots += 1;
                                    if sweep {
                                        shot += 1;
                                        input.angle = 15.0 + (shot * 7 % 60) as f32;
                                        input.power = 40.0 + (shot * 13 % 60) as f32;
                                    }
                                }
                                GameEvent::Fired { .. } => tally.enemy_shots += 1,
                                GameEvent::Learned { .. } => tally.learned += 1,
                                _ => {}
                            }
                            match termination_of(event) {
                                Some(Termination::Hit(_)) => tally.hits += 1,
                                Some(Termination::OutOfBounds) => tally.landed += 1,
                                None => {}
                            }
                            if is_miss(event) {
                                tally.misses += 1;
                            }
                        }
                        if output.is_some() {
                            events_log.extend(events.into_iter().map(|e| (state.time_ticks, e)));
                        }

                        let finished = state.scores.player.wins + state.scores.enemy.wins;
                        if finished >= rounds {
                            break 'frames;
                        }
                    }

                    if output.is_some() && frame % FRAME_INTERVAL == 0 {
                        frames.push(state.snapshot());
                    }
                }

                let winner = match state.scores.player.wins.cmp(&state.scores.enemy.wins) {
                    std::cmp::Ordering::Greater => Some(Side::Player),
                    std::cmp::Ordering::Less => Some(Side::Enemy),
                    std::cmp::Ordering::Equal => None,
                };

                println!(
                    "Player {} - {} Enemy after {} ticks",
                    state.scores.player.wins, state.scores.enemy.wins, state.time_ticks
                );
                println!(
                    "Shots: player {} / enemy {}, misses {}, enemy adjustments {}",
                    tally.player_shots, tally.enemy_shots, tally.misses, tally.learned
                );
                println!("Arrows: {} hit a body, {} left the arena", tally.hits, tally.landed);
                match winner {
                    Some(side) => println!("Winner: {:?}", side),
                    None => println!("Draw"),
                }

                if let Some(path) = output {
                    frames.push(state.snapshot());
                    let replay = Replay {
                        seed,
                        tuning: state.tuning.clone(),
                        frames,
                        events: events_log,
                    };
                    let json = serde_json::to_string_pretty(&replay)?;
                    std::fs::write(&path, json)?;
                    log::info!("Wrote replay to {}", path.display());
                }
            }

            Commands::Tuning => {
                println!("{}", Tuning::default().to_json()?);
            }
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives the simulation through `fletch::wasm`
}
