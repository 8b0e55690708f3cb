//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic used by
//! the `actor` binary.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`PHOTOSYNTHESIS_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (`config.defaults.toml`, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! PHOTOSYNTHESIS_<SECTION>_<KEY>=value
//!
//! Examples:
//!     PHOTOSYNTHESIS_COMMON_DATA_DIR=/data
//!     PHOTOSYNTHESIS_SEARCH_TURN_BUDGET_MS=45
//!     PHOTOSYNTHESIS_SELFPLAY_WORKERS=8
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_ENV_VAR, CONFIG_SEARCH_PATHS,
};
pub use structs::*;

#[cfg(test)]
mod tests;
