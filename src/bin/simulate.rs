//! Simulate CLI — play many random-throw matches of one variant.
//!
//! Usage:
//!   cargo run --release --bin simulate -- --variant cricket --matches 1000 --players 2
//!   cargo run --release --bin simulate -- --variant shanghai --players 4 --shared-ties
//!   cargo run --release --bin simulate -- --variant clock --doubles --triples --no-bull

use std::path::PathBuf;

use clap::Parser;

use darts_engine::engine::config::{load_config, load_default_config};
use darts_engine::engine::error::DartsError;
use darts_engine::engine::simulation::{run_simulations, SimulationParams, SimulationReport};
use darts_engine::games::clock::plugin::ClockEngine;
use darts_engine::games::cricket::plugin::CricketEngine;
use darts_engine::games::shanghai::plugin::ShanghaiEngine;
use darts_engine::games::shanghai::types::TieBreak;

#[derive(Parser)]
#[command(name = "simulate", about = "Run random-throw simulations of a darts variant")]
struct Cli {
    /// Variant id: "cricket", "shanghai" or "clock"
    #[arg(long, default_value = "cricket")]
    variant: String,

    /// Number of matches to play
    #[arg(long, default_value = "100")]
    matches: usize,

    /// Players per match
    #[arg(long, default_value = "2")]
    players: usize,

    /// Base random seed; match i uses seed + i
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Turn cap per match
    #[arg(long, default_value = "10000")]
    max_turns: usize,

    /// Probability that a dart misses the board
    #[arg(long, default_value = "0.1")]
    miss_rate: f64,

    /// Path to darts_engine.toml (default: auto-discover)
    #[arg(long, env = "DARTS_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    // --- Shanghai ---
    /// First target number
    #[arg(long)]
    start_number: Option<u8>,

    /// Number of rounds
    #[arg(long)]
    rounds: Option<u32>,

    /// Tied leaders share the victory instead of the lowest roster order winning
    #[arg(long)]
    shared_ties: bool,

    // --- Around the Clock ---
    /// Drop the bull as the final target
    #[arg(long)]
    no_bull: bool,

    /// Doubles count as hits
    #[arg(long)]
    doubles: bool,

    /// Triples count as hits
    #[arg(long)]
    triples: bool,
}

fn run(cli: &Cli) -> Result<SimulationReport, DartsError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config(),
    };

    let params = SimulationParams {
        num_matches: cli.matches,
        num_players: cli.players,
        base_seed: cli.seed,
        max_turns: cli.max_turns,
        miss_rate: cli.miss_rate,
    };

    match cli.variant.as_str() {
        "cricket" => run_simulations(&CricketEngine::new(), &params),
        "shanghai" => {
            if let Some(v) = cli.start_number { config.shanghai.start_number = v; }
            if let Some(v) = cli.rounds { config.shanghai.round_count = v; }
            if cli.shared_ties { config.shanghai.tie_break = TieBreak::SharedVictory; }
            run_simulations(&ShanghaiEngine::new(config.shanghai)?, &params)
        }
        "clock" => {
            if cli.no_bull { config.clock.include_bull = false; }
            if cli.doubles { config.clock.include_doubles = true; }
            if cli.triples { config.clock.include_triples = true; }
            run_simulations(&ClockEngine::new(config.clock), &params)
        }
        other => Err(DartsError::UnknownVariant(other.to_string())),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    eprintln!(
        "Simulate: variant={}, {} matches, {} players, seed={}, miss_rate={}",
        cli.variant, cli.matches, cli.players, cli.seed, cli.miss_rate
    );

    match run(&cli) {
        Ok(report) => println!("{}", report.summary()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
