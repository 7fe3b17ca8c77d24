//! Montecasino: a flat Monte Carlo Go engine.
//!
//! ## Usage
//!
//! - `montecasino` - Show a demo
//! - `montecasino gtp` - Start GTP server for GUI integration
//! - `montecasino demo` - Pick a move on an empty board
//!
//! Set `RUST_LOG=debug` to see the per-decision statistics grids.

use clap::{Parser, Subcommand};

use montecasino::board::Color;
use montecasino::engine::{EngineParams, search};
use montecasino::gtp::GtpEngine;
use montecasino::hint::DomainHint;
use montecasino::position::{Position, str_coord};

/// Montecasino: a flat Monte Carlo Go engine
#[derive(Parser)]
#[command(name = "montecasino")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Engine parameters as `key=value,...` (games, gamelen, resign_ratio,
    /// loss_threshold, batch, seed, capture_rate, atari_rate, local_rate)
    #[arg(long, global = true)]
    params: Option<EngineParams>,

    /// Playouts per move
    #[arg(long, global = true)]
    games: Option<usize>,

    /// Playout length cap, in moves from the start of the game
    #[arg(long, global = true)]
    gamelen: Option<usize>,

    /// Resign when no move reaches this ratio
    #[arg(long, global = true)]
    resign_ratio: Option<f32>,

    /// Stop early when nothing was lost by this playout
    #[arg(long, global = true)]
    loss_threshold: Option<usize>,

    /// Playouts per parallel batch
    #[arg(long, global = true)]
    batch: Option<usize>,

    /// Random seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Worker threads (defaults to one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Run a simple demo of the engine
    Demo,
}

impl Cli {
    /// `--params` first, then the individual flags on top.
    fn engine_params(&self) -> EngineParams {
        let mut params = self.params.clone().unwrap_or_default();
        if let Some(games) = self.games {
            params.games = games;
        }
        if let Some(gamelen) = self.gamelen {
            params.gamelen = gamelen;
        }
        if let Some(ratio) = self.resign_ratio {
            params.resign_ratio = ratio;
        }
        if let Some(threshold) = self.loss_threshold {
            params.loss_threshold = threshold;
        }
        if let Some(batch) = self.batch {
            params.batch = batch;
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        params
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    let params = cli.engine_params();
    match cli.command {
        Some(Commands::Gtp) => {
            let mut engine = GtpEngine::with_params(params);
            engine.run()?;
        }
        Some(Commands::Demo) | None => run_demo(&params),
    }
    Ok(())
}

fn run_demo(params: &EngineParams) {
    println!("Montecasino: flat Monte Carlo Go engine\n");

    let pos = Position::new();
    println!("{pos}");
    println!("Running {} playouts for Black...", params.games);

    let hint = DomainHint::from_params(params);
    let report = search(&pos, Color::Black, params, &hint);
    println!(
        "Best move: {} ({:.1}%), {} playouts, {:?}",
        str_coord(report.decision.point),
        report.decision.ratio * 100.0,
        report.playouts,
        report.termination
    );

    let mut top = report.ranking.clone();
    top.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (pt, ratio) in top.iter().take(5) {
        println!("  {:>4} {:.3}", str_coord(*pt), ratio);
    }
}
