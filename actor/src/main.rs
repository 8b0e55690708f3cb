//! Actor - Photosynthesis bot and self-play runner
//!
//! Two modes:
//! 1. `play`: speaks the referee line protocol on stdin/stdout for one match,
//!    searching each turn within the configured time budgets
//! 2. `selfplay`: plays many local matches across a worker pool, writes
//!    aggregate statistics as JSON and one training sample per decision

use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::Parser;
use mcts::{MctsSearch, RolloutEvaluator};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::info;

mod bot;
mod config;
mod referee;
mod replay;
mod selfplay;
mod stats;

use crate::bot::ProtocolBot;
use crate::config::{Cli, Command, PlayConfig};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the protocol, so logs always go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn play(config: &PlayConfig) -> Result<()> {
    let mcts = config.search.mcts_config();
    let limit = mcts.time_budget();
    let search = MctsSearch::new(
        mcts,
        RolloutEvaluator::new(),
        limit,
        ChaCha20Rng::seed_from_u64(config.seed),
    );
    let mut bot = ProtocolBot::new(search);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = BufWriter::new(io::stdout().lock());
    let turns = bot::run(&mut bot, &mut input, &mut output).context("Match aborted")?;

    let stats = bot.search().stats();
    info!(
        turns,
        decisions = stats.decisions,
        iterations = stats.iterations,
        reused_trees = stats.reused_trees,
        "Match finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.validate()?;
    init_tracing(&cli.log_level)?;

    match &cli.command {
        Command::Play(config) => {
            info!(
                seed = config.seed,
                first_turn_budget_ms = config.search.first_turn_budget_ms,
                turn_budget_ms = config.search.turn_budget_ms,
                "Starting protocol bot"
            );
            play(config)
        }
        Command::Selfplay(config) => {
            selfplay::run(config)?;
            Ok(())
        }
    }
}
