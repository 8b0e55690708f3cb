//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_first_turn_budget() -> u64 {
    defaults::first_turn_budget_ms()
}
fn d_turn_budget() -> u64 {
    defaults::turn_budget_ms()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_max_root_visits() -> u32 {
    defaults::max_root_visits()
}
fn d_games() -> u32 {
    defaults::games()
}
fn d_workers() -> usize {
    defaults::workers()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_visits_per_move() -> u32 {
    defaults::visits_per_move()
}
fn d_random_move_probability() -> f64 {
    defaults::random_move_probability()
}
fn d_sample_file() -> String {
    defaults::sample_file().into()
}
fn d_stats_file() -> String {
    defaults::stats_file().into()
}
fn d_log_interval() -> u32 {
    defaults::log_interval()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub selfplay: SelfPlayConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// Search budgets and UCT tuning
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(default = "d_first_turn_budget")]
    pub first_turn_budget_ms: u64,
    #[serde(default = "d_turn_budget")]
    pub turn_budget_ms: u64,
    #[serde(default = "d_exploration")]
    pub exploration: f64,
    #[serde(default = "d_max_root_visits")]
    pub max_root_visits: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            first_turn_budget_ms: defaults::first_turn_budget_ms(),
            turn_budget_ms: defaults::turn_budget_ms(),
            exploration: defaults::exploration(),
            max_root_visits: defaults::max_root_visits(),
        }
    }
}

/// Self-play harness settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelfPlayConfig {
    #[serde(default = "d_games")]
    pub games: u32,
    #[serde(default = "d_workers")]
    pub workers: usize,
    #[serde(default = "d_seed")]
    pub seed: u64,
    /// 0 means search on the time budgets instead of a visit count.
    #[serde(default = "d_visits_per_move")]
    pub visits_per_move: u32,
    #[serde(default = "d_random_move_probability")]
    pub random_move_probability: f64,
    /// Relative to `common.data_dir`. Empty disables sample export.
    #[serde(default = "d_sample_file")]
    pub sample_file: String,
    /// Relative to `common.data_dir`.
    #[serde(default = "d_stats_file")]
    pub stats_file: String,
    #[serde(default = "d_log_interval")]
    pub log_interval: u32,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            games: defaults::games(),
            workers: defaults::workers(),
            seed: defaults::seed(),
            visits_per_move: defaults::visits_per_move(),
            random_move_probability: defaults::random_move_probability(),
            sample_file: defaults::sample_file().into(),
            stats_file: defaults::stats_file().into(),
            log_interval: defaults::log_interval(),
        }
    }
}
