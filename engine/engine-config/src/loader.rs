//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PHOTOSYNTHESIS_CONFIG";

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from subdirectory)
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by the PHOTOSYNTHESIS_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = Path::new(&path);
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_ENV_VAR, path.display());
            return load_from_path(path);
        }
        warn!(
            "{}={} not found, searching defaults",
            CONFIG_ENV_VAR,
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, u64, f64, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: PHOTOSYNTHESIS_<SECTION>_<KEY>.
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "PHOTOSYNTHESIS_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "PHOTOSYNTHESIS_COMMON_LOG_LEVEL");

    // Search
    env_override!(
        config,
        search.first_turn_budget_ms,
        "PHOTOSYNTHESIS_SEARCH_FIRST_TURN_BUDGET_MS",
        parse
    );
    env_override!(
        config,
        search.turn_budget_ms,
        "PHOTOSYNTHESIS_SEARCH_TURN_BUDGET_MS",
        parse
    );
    env_override!(
        config,
        search.exploration,
        "PHOTOSYNTHESIS_SEARCH_EXPLORATION",
        parse
    );
    env_override!(
        config,
        search.max_root_visits,
        "PHOTOSYNTHESIS_SEARCH_MAX_ROOT_VISITS",
        parse
    );

    // Self-play
    env_override!(config, selfplay.games, "PHOTOSYNTHESIS_SELFPLAY_GAMES", parse);
    env_override!(
        config,
        selfplay.workers,
        "PHOTOSYNTHESIS_SELFPLAY_WORKERS",
        parse
    );
    env_override!(config, selfplay.seed, "PHOTOSYNTHESIS_SELFPLAY_SEED", parse);
    env_override!(
        config,
        selfplay.visits_per_move,
        "PHOTOSYNTHESIS_SELFPLAY_VISITS_PER_MOVE",
        parse
    );
    env_override!(
        config,
        selfplay.random_move_probability,
        "PHOTOSYNTHESIS_SELFPLAY_RANDOM_MOVE_PROBABILITY",
        parse
    );
    env_override!(
        config,
        selfplay.sample_file,
        "PHOTOSYNTHESIS_SELFPLAY_SAMPLE_FILE"
    );
    env_override!(
        config,
        selfplay.stats_file,
        "PHOTOSYNTHESIS_SELFPLAY_STATS_FILE"
    );
    env_override!(
        config,
        selfplay.log_interval,
        "PHOTOSYNTHESIS_SELFPLAY_LOG_INTERVAL",
        parse
    );

    config
}
