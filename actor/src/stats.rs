//! Self-play statistics.
//!
//! Each worker keeps its own [`SelfPlayStats`]; they are merged once when the
//! workers join, and the total is written as JSON for external tools.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use games_photosynthesis::Winner;
use mcts::SearchStats;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::referee::MatchRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelfPlayStats {
    pub games: u64,
    pub wins: [u64; 2],
    pub ties: u64,
    /// Sum of player 0's point margins.
    pub margin_sum: i64,
    pub frames: u64,
    pub search: SearchStats,
}

impl SelfPlayStats {
    pub fn record_match(&mut self, record: &MatchRecord) {
        self.games += 1;
        match record.outcome.winner {
            Winner::Player0 => self.wins[0] += 1,
            Winner::Player1 => self.wins[1] += 1,
            Winner::Tie => self.ties += 1,
        }
        self.margin_sum += record.outcome.margin();
        self.frames += record.frames.len() as u64;
    }

    pub fn record_search(&mut self, search: &SearchStats) {
        self.search.merge(search);
    }

    pub fn merge(&mut self, other: &SelfPlayStats) {
        self.games += other.games;
        self.wins[0] += other.wins[0];
        self.wins[1] += other.wins[1];
        self.ties += other.ties;
        self.margin_sum += other.margin_sum;
        self.frames += other.frames;
        self.search.merge(&other.search);
    }

    pub fn mean_margin(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.margin_sum as f64 / self.games as f64
        }
    }

    pub fn snapshot(&self, elapsed: Duration) -> StatsSnapshot {
        let search = &self.search;
        StatsSnapshot {
            games: self.games,
            player0_wins: self.wins[0],
            player1_wins: self.wins[1],
            ties: self.ties,
            mean_margin: self.mean_margin(),
            frames: self.frames,
            decisions: search.decisions,
            iterations: search.iterations,
            avg_iterations_per_decision: if search.decisions == 0 {
                0.0
            } else {
                search.iterations as f64 / search.decisions as f64
            },
            fresh_trees: search.fresh_trees,
            reused_trees: search.reused_trees,
            random_moves: search.random_moves,
            search_secs: search.elapsed.as_secs_f64(),
            wall_secs: elapsed.as_secs_f64(),
        }
    }
}

/// Serializable view written to the stats file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub games: u64,
    pub player0_wins: u64,
    pub player1_wins: u64,
    pub ties: u64,
    pub mean_margin: f64,
    pub frames: u64,
    pub decisions: u64,
    pub iterations: u64,
    pub avg_iterations_per_decision: f64,
    pub fresh_trees: u64,
    pub reused_trees: u64,
    pub random_moves: u64,
    pub search_secs: f64,
    pub wall_secs: f64,
}

/// Write stats to a JSON file (write-then-rename).
pub fn write_stats(path: &Path, snapshot: &StatsSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize stats")?;

    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path)
        .with_context(|| format!("Failed to create {}", temp_path.display()))?;
    file.write_all(json.as_bytes())
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e).with_context(|| format!("Failed to rename stats to {}", path.display()));
    }

    debug!("Wrote self-play stats to {}", path.display());
    Ok(())
}
