//! Command-line configuration for the actor binary.
//!
//! Defaults come from the central configuration (config.toml plus
//! `PHOTOSYNTHESIS_*` environment overrides). Arguments given on the command
//! line take priority over both.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use engine_config::{load_config, CentralConfig};
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_first_turn_budget() -> u64 {
    CENTRAL_CONFIG.search.first_turn_budget_ms
}

fn default_turn_budget() -> u64 {
    CENTRAL_CONFIG.search.turn_budget_ms
}

fn default_exploration() -> f64 {
    CENTRAL_CONFIG.search.exploration
}

fn default_max_root_visits() -> u32 {
    CENTRAL_CONFIG.search.max_root_visits
}

fn default_games() -> u32 {
    CENTRAL_CONFIG.selfplay.games
}

fn default_workers() -> usize {
    CENTRAL_CONFIG.selfplay.workers
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.selfplay.seed
}

fn default_visits_per_move() -> u32 {
    CENTRAL_CONFIG.selfplay.visits_per_move
}

fn default_random_move_probability() -> f64 {
    CENTRAL_CONFIG.selfplay.random_move_probability
}

fn default_sample_file() -> String {
    CENTRAL_CONFIG.selfplay.sample_file.clone()
}

fn default_stats_file() -> String {
    CENTRAL_CONFIG.selfplay.stats_file.clone()
}

fn default_log_interval() -> u32 {
    CENTRAL_CONFIG.selfplay.log_interval
}

#[derive(Parser, Debug, Clone)]
#[command(name = "actor")]
#[command(about = "Photosynthesis bot and self-play runner")]
#[command(
    long_about = "Plays Photosynthesis with a UCT search, either as a referee bot
speaking the line protocol on stdin/stdout or as a local self-play harness.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value_t = default_log_level())]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Play one match over the referee protocol (stdin/stdout)
    Play(PlayConfig),
    /// Play many matches between two local bots
    Selfplay(SelfPlayConfig),
}

/// Search settings shared by both modes.
#[derive(Args, Debug, Clone, Serialize)]
pub struct SearchArgs {
    /// Search time on the first turn of a match, in milliseconds
    #[arg(long, default_value_t = default_first_turn_budget())]
    pub first_turn_budget_ms: u64,

    /// Search time on every later turn, in milliseconds
    #[arg(long, default_value_t = default_turn_budget())]
    pub turn_budget_ms: u64,

    /// UCT exploration constant
    #[arg(long, default_value_t = default_exploration())]
    pub exploration: f64,

    /// Hard cap on root visits per decision
    #[arg(long, default_value_t = default_max_root_visits())]
    pub max_root_visits: u32,
}

impl SearchArgs {
    pub fn validate(&self) -> Result<()> {
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(anyhow!(
                "exploration must be a non-negative number, got {}",
                self.exploration
            ));
        }

        if self.max_root_visits == 0 {
            return Err(anyhow!("max_root_visits must be greater than 0"));
        }

        Ok(())
    }

    fn validate_budgets(&self) -> Result<()> {
        if self.first_turn_budget_ms == 0 {
            return Err(anyhow!("first_turn_budget_ms must be greater than 0"));
        }

        if self.turn_budget_ms == 0 {
            return Err(anyhow!("turn_budget_ms must be greater than 0"));
        }

        Ok(())
    }

    pub fn mcts_config(&self) -> MctsConfig {
        MctsConfig::default()
            .with_exploration(self.exploration as f32)
            .with_max_root_visits(self.max_root_visits)
            .with_budgets(
                Duration::from_millis(self.first_turn_budget_ms),
                Duration::from_millis(self.turn_budget_ms),
            )
    }
}

#[derive(Args, Debug, Clone, Serialize)]
pub struct PlayConfig {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Seed for the search's random choices
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,
}

impl PlayConfig {
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.search.validate_budgets()
    }
}

#[derive(Args, Debug, Clone, Serialize)]
pub struct SelfPlayConfig {
    #[command(flatten)]
    pub search: SearchArgs,

    /// Number of matches to play
    #[arg(long, default_value_t = default_games())]
    pub games: u32,

    /// Worker threads
    #[arg(long, default_value_t = default_workers())]
    pub workers: usize,

    /// Base seed; every worker derives its own stream from it
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Root visits per decision (0 searches on the time budgets instead)
    #[arg(long, default_value_t = default_visits_per_move())]
    pub visits_per_move: u32,

    /// Chance of playing a uniformly random move instead of searching
    #[arg(long, default_value_t = default_random_move_probability())]
    pub random_move_probability: f64,

    /// Directory for samples and stats
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Sample file name under data_dir (empty disables export)
    #[arg(long, default_value_t = default_sample_file())]
    pub sample_file: String,

    /// Stats file name under data_dir
    #[arg(long, default_value_t = default_stats_file())]
    pub stats_file: String,

    /// Log progress every N matches (0 to disable)
    #[arg(long, default_value_t = default_log_interval())]
    pub log_interval: u32,
}

impl SelfPlayConfig {
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;

        if self.visits_per_move == 0 {
            self.search.validate_budgets()?;
        }

        if self.games == 0 {
            return Err(anyhow!("games must be greater than 0"));
        }

        if self.workers == 0 {
            return Err(anyhow!("workers must be greater than 0"));
        }

        if !(0.0..=1.0).contains(&self.random_move_probability) {
            return Err(anyhow!(
                "random_move_probability must be within [0, 1], got {}",
                self.random_move_probability
            ));
        }

        if self.stats_file.is_empty() {
            return Err(anyhow!("stats_file cannot be empty"));
        }

        Ok(())
    }

    pub fn mcts_config(&self) -> MctsConfig {
        self.search
            .mcts_config()
            .with_random_move_probability(self.random_move_probability as f32)
    }

    pub fn sample_path(&self) -> Option<PathBuf> {
        if self.sample_file.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.data_dir).join(&self.sample_file))
        }
    }

    pub fn stats_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.stats_file)
    }
}

impl Cli {
    pub fn validate(&self) -> Result<()> {
        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        match &self.command {
            Command::Play(config) => config.validate(),
            Command::Selfplay(config) => config.validate(),
        }
    }
}
