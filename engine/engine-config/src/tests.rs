//! Tests for the configuration module.

use super::*;
use std::io::Write;

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.data_dir, "./data");
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.selfplay.games, 100);
    assert_eq!(config.selfplay.workers, 4);
    assert_eq!(config.selfplay.seed, 42);
}

#[test]
fn test_search_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.search.first_turn_budget_ms, 995);
    assert_eq!(config.search.turn_budget_ms, 95);
    assert!((config.search.exploration - 2.0).abs() < f64::EPSILON);
    assert_eq!(config.search.max_root_visits, 0x00FF_FFFE);
}

#[test]
fn test_selfplay_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.selfplay.visits_per_move, 1600);
    assert_eq!(config.selfplay.random_move_probability, 0.0);
    assert_eq!(config.selfplay.sample_file, "samples.bin");
    assert_eq!(config.selfplay.stats_file, "selfplay_stats.json");
    assert_eq!(config.selfplay.log_interval, 10);
}

#[test]
fn test_env_overrides() {
    std::env::set_var("PHOTOSYNTHESIS_SEARCH_TURN_BUDGET_MS", "45");
    std::env::set_var("PHOTOSYNTHESIS_SELFPLAY_SAMPLE_FILE", "frames.bin");
    std::env::set_var("PHOTOSYNTHESIS_SEARCH_EXPLORATION", "1.5");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.search.turn_budget_ms, 45);
    assert_eq!(config.selfplay.sample_file, "frames.bin");
    assert!((config.search.exploration - 1.5).abs() < f64::EPSILON);

    std::env::remove_var("PHOTOSYNTHESIS_SEARCH_TURN_BUDGET_MS");
    std::env::remove_var("PHOTOSYNTHESIS_SELFPLAY_SAMPLE_FILE");
    std::env::remove_var("PHOTOSYNTHESIS_SEARCH_EXPLORATION");
}

#[test]
fn test_unparseable_env_override_is_ignored() {
    std::env::set_var("PHOTOSYNTHESIS_SELFPLAY_WORKERS", "many");
    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.selfplay.workers, 4);
    std::env::remove_var("PHOTOSYNTHESIS_SELFPLAY_WORKERS");
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
data_dir = "/custom/data"

[search]
first_turn_budget_ms = 500
max_root_visits = 1000

[selfplay]
games = 8
workers = 2
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.data_dir, "/custom/data");
    assert_eq!(config.search.first_turn_budget_ms, 500);
    assert_eq!(config.search.max_root_visits, 1000);
    assert_eq!(config.selfplay.games, 8);
    assert_eq!(config.selfplay.workers, 2);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[search]
turn_budget_ms = 50
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.search.turn_budget_ms, 50);
    assert_eq!(config.search.first_turn_budget_ms, 995); // Default
    assert_eq!(config.common.data_dir, "./data"); // Default
    assert_eq!(config.selfplay.seed, 42); // Default
}

#[test]
fn test_load_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[selfplay]\nseed = 7\nstats_file = \"run.json\"").unwrap();

    let config = load_from_path(file.path());
    assert_eq!(config.selfplay.seed, 7);
    assert_eq!(config.selfplay.stats_file, "run.json");
    assert_eq!(config.selfplay.games, 100);
}

#[test]
fn test_load_from_bad_path_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_from_path(&dir.path().join("missing.toml"));
    assert_eq!(config.selfplay.games, 100);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[search\nturn_budget_ms = ").unwrap();
    let config = load_from_path(file.path());
    assert_eq!(config.selfplay.games, 100);
}

#[test]
fn test_config_clone() {
    let config = CentralConfig::default();
    let cloned = config.clone();
    assert_eq!(config.common.data_dir, cloned.common.data_dir);
    assert_eq!(config.selfplay.seed, cloned.selfplay.seed);
}
