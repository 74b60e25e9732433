// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for hot-seat games, replays and layouts
// ═══════════════════════════════════════════════════════════════════════

mod render;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use render::render;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use stratego_client::{LocalService, Session, SessionConfig};
use stratego_engine::board::{Owner, Square};
use stratego_engine::catalog::Rank;
use stratego_engine::events::ReplayPolicy;
use stratego_engine::state::{GameId, GameState, Phase};
use stratego_engine::visibility::player_view;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stratego", about = "Stratego game-state engine")]
struct Cli {
    /// JSON file with session settings (topic_prefix, replay_policy)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Hand the turn over even when an event line is malformed
    #[arg(long, global = true)]
    legacy_turn_flip: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hot-seat game between a host and a guest, commands on stdin
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
    },
    /// Replay event lines into a started game and print the board
    Replay {
        /// "host" or "guest"
        #[arg(short, long, default_value = "host")]
        player: Owner,
        /// Read lines from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print a starting layout as JSON
    Layout {
        #[arg(short, long, default_value = "host")]
        player: Owner,
        /// Shuffle with this seed; without it pieces go in rank order
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.legacy_turn_flip)?;

    match cli.command {
        Commands::Play { seed } => cmd_play(seed, config),
        Commands::Replay { player, file } => cmd_replay(player, file, &config),
        Commands::Layout { player, seed } => cmd_layout(player, seed),
    }
}

fn load_config(path: Option<&std::path::Path>, legacy_turn_flip: bool) -> Result<SessionConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SessionConfig::default(),
    };
    if legacy_turn_flip {
        config.replay_policy = ReplayPolicy::AdvanceTurn;
    }
    Ok(config)
}

// ── Replay / Layout ──────────────────────────────────────────────────────

fn cmd_replay(player: Owner, file: Option<PathBuf>, config: &SessionConfig) -> Result<()> {
    let mut text = String::new();
    match &file {
        Some(path) => {
            text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        }
        None => {
            io::stdin().read_to_string(&mut text).context("reading stdin")?;
        }
    }

    let mut state = match player {
        Owner::Host => GameState::new(None),
        Owner::Guest => GameState::new(Some(GameId::from("replay"))),
        Owner::None => bail!("replay needs --player host or --player guest"),
    };
    state.phase = Phase::InProgress;

    let mut applied = 0;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        if state.apply_message(line, config.replay_policy).is_ok() {
            applied += 1;
        }
    }
    info!(applied, "replay finished");
    print!("{}", render(&player_view(&state)));
    Ok(())
}

fn cmd_layout(player: Owner, seed: Option<u64>) -> Result<()> {
    let mut state = match player {
        Owner::Host => GameState::new(None),
        Owner::Guest => GameState::new(Some(GameId::from("layout"))),
        Owner::None => bail!("layout needs --player host or --player guest"),
    };
    match seed {
        Some(seed) => state.shuffled_placement(seed),
        None => state.random_placement(),
    };
    println!("{}", serde_json::to_string_pretty(&state.starting_positions())?);
    Ok(())
}

// ── Hot-seat play ────────────────────────────────────────────────────────

type Shared = Arc<Mutex<LocalService>>;

struct Table {
    service: Shared,
    config: SessionConfig,
    seed: u64,
    host: Session<Shared>,
    /// Exists once the host has a game id to hand out.
    guest: Option<Session<Shared>>,
}

impl Table {
    fn seat(&mut self, side: Owner) -> Option<&mut Session<Shared>> {
        match side {
            Owner::Host => Some(&mut self.host),
            Owner::Guest => self.guest.as_mut(),
            Owner::None => None,
        }
    }

    fn pump(&mut self) {
        self.host.pump();
        if let Some(guest) = self.guest.as_mut() {
            guest.pump();
        }
    }

    fn show(&self, side: Owner) {
        match side {
            Owner::Host => print!("{}", render(&self.host.view())),
            Owner::Guest => match &self.guest {
                Some(guest) => print!("{}", render(&guest.view())),
                None => println!("guest: waiting for the host to start"),
            },
            Owner::None => {}
        }
    }

    /// Run one command line. Returns false on `quit`.
    fn handle(&mut self, line: &str) -> bool {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => return false,
            ["show"] => {
                self.show(Owner::Host);
                self.show(Owner::Guest);
            }
            [side, rest @ ..] => match side.parse::<Owner>() {
                Ok(side) if side.is_player() => {
                    self.act(side, rest);
                    self.pump();
                    self.show(side);
                }
                _ => println!("unknown side '{}'", side),
            },
        }
        true
    }

    fn act(&mut self, side: Owner, words: &[&str]) {
        let seed = self.seed.wrapping_add(side as u64);
        if side == Owner::Host && words == ["start"] {
            self.start();
            return;
        }
        let Some(session) = self.seat(side) else {
            println!("{}: no seat yet", side);
            return;
        };
        let ok = match words {
            ["click", sq] => match sq.parse::<Square>() {
                Ok(sq) => match session.click_cell(sq) {
                    Ok(outcome) => {
                        println!("{}: {:?}", side, outcome);
                        true
                    }
                    Err(err) => {
                        warn!(error = %err, "move not sent");
                        println!("{}: {}", side, err);
                        true
                    }
                },
                Err(_) => {
                    println!("not a square: {}", sq);
                    true
                }
            },
            ["bench", rank] => match rank.parse::<Rank>() {
                Ok(rank) => session.click_bench(rank),
                Err(err) => {
                    println!("{}", err);
                    true
                }
            },
            ["random"] => session.random_placement(),
            ["shuffle"] => session.shuffled_placement(seed),
            ["join"] => match session.join_game() {
                Ok(joined) => joined,
                Err(err) => {
                    println!("{}: {}", side, err);
                    true
                }
            },
            _ => {
                println!("unknown command: {}", words.join(" "));
                true
            }
        };
        if !ok {
            println!("{}: not allowed now", side);
        }
    }

    fn start(&mut self) {
        match self.host.start_game() {
            Ok(true) => {
                if let Some(id) = self.host.state().game_id.clone() {
                    println!("host: created game {}", id);
                    self.guest = Some(Session::new(self.service.clone(), Some(id), self.config.clone()));
                }
            }
            Ok(false) => println!("host: not allowed now"),
            Err(err) => println!("host: {}", err),
        }
    }
}

fn cmd_play(seed: u64, config: SessionConfig) -> Result<()> {
    let service = Arc::new(Mutex::new(LocalService::with_prefix(seed, &config.topic_prefix)));
    let host = Session::new(service.clone(), None, config.clone());
    let mut table = Table { service, config, seed, host, guest: None };

    println!("=== Stratego hot-seat ===");
    println!("commands: <host|guest> click <sq> | bench <rank> | random | shuffle");
    println!("          host start | guest join | show | quit");
    table.show(Owner::Host);

    let stdin = io::stdin();
    let mut out = io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        if !table.handle(&line) {
            break;
        }
        out.flush()?;
    }
    Ok(())
}
