//! Default configuration values loaded from config.defaults.toml.
//!
//! The shared TOML file is embedded at compile time so the binary and the
//! checked-in defaults can never disagree.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    search: SearchDefaults,
    selfplay: SelfPlayDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct SearchDefaults {
    first_turn_budget_ms: u64,
    turn_budget_ms: u64,
    exploration: f64,
    max_root_visits: u32,
}

#[derive(Debug, Deserialize)]
struct SelfPlayDefaults {
    games: u32,
    workers: usize,
    seed: u64,
    visits_per_move: u32,
    random_move_probability: f64,
    sample_file: String,
    stats_file: String,
    log_interval: u32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Search
pub fn first_turn_budget_ms() -> u64 {
    DEFAULTS.search.first_turn_budget_ms
}
pub fn turn_budget_ms() -> u64 {
    DEFAULTS.search.turn_budget_ms
}
pub fn exploration() -> f64 {
    DEFAULTS.search.exploration
}
pub fn max_root_visits() -> u32 {
    DEFAULTS.search.max_root_visits
}

// Self-play
pub fn games() -> u32 {
    DEFAULTS.selfplay.games
}
pub fn workers() -> usize {
    DEFAULTS.selfplay.workers
}
pub fn seed() -> u64 {
    DEFAULTS.selfplay.seed
}
pub fn visits_per_move() -> u32 {
    DEFAULTS.selfplay.visits_per_move
}
pub fn random_move_probability() -> f64 {
    DEFAULTS.selfplay.random_move_probability
}
pub fn sample_file() -> &'static str {
    &DEFAULTS.selfplay.sample_file
}
pub fn stats_file() -> &'static str {
    &DEFAULTS.selfplay.stats_file
}
pub fn log_interval() -> u32 {
    DEFAULTS.selfplay.log_interval
}
