//! Self-play harness.
//!
//! Matches are split across a rayon pool. Every worker owns its random
//! stream, its pair of bots and its statistics; the statistics are merged
//! once all workers have joined. Samples are appended to the shared sample
//! file one match at a time.

use std::fs;
use std::io::IsTerminal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use games_photosynthesis::random_start;
use indicatif::{ProgressBar, ProgressStyle};
use mcts::{MctsSearch, RolloutEvaluator, SearchLimit, VisitBudget};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::bot::ProtocolBot;
use crate::config::SelfPlayConfig;
use crate::referee::Referee;
use crate::replay::SampleWriter;
use crate::stats::{write_stats, SelfPlayStats};

type SelfPlayBot = ProtocolBot<RolloutEvaluator, Box<dyn SearchLimit>>;

/// State shared by all workers.
struct Shared {
    samples: Option<Mutex<SampleWriter>>,
    completed: AtomicU64,
    progress: Option<ProgressBar>,
    log_interval: u64,
    started: Instant,
}

/// Matches played by `worker` when `games` are split over `workers`.
pub fn games_for_worker(games: u32, workers: usize, worker: usize) -> u32 {
    let workers = workers as u32;
    let worker = worker as u32;
    games / workers + u32::from(worker < games % workers)
}

/// Random stream of one worker: the base seed on its own ChaCha stream.
pub fn worker_rng(seed: u64, worker: usize) -> ChaCha20Rng {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    rng.set_stream(worker as u64);
    rng
}

fn new_bot(config: &SelfPlayConfig, rng: &mut ChaCha20Rng) -> SelfPlayBot {
    let mcts = config.mcts_config();
    let limit: Box<dyn SearchLimit> = if config.visits_per_move > 0 {
        Box::new(VisitBudget::new(config.visits_per_move))
    } else {
        Box::new(mcts.time_budget())
    };
    let search = MctsSearch::new(
        mcts,
        RolloutEvaluator::new(),
        limit,
        ChaCha20Rng::seed_from_u64(rng.gen()),
    );
    ProtocolBot::new(search)
}

/// Play every configured match and write the stats file.
pub fn run(config: &SelfPlayConfig) -> Result<SelfPlayStats> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data dir {}", config.data_dir))?;

    let samples = match config.sample_path() {
        Some(path) => Some(Mutex::new(SampleWriter::open(&path)?)),
        None => None,
    };

    let progress = if std::io::stderr().is_terminal() {
        let pb = ProgressBar::new(u64::from(config.games));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} matches ({eta})")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let shared = Shared {
        samples,
        completed: AtomicU64::new(0),
        progress,
        log_interval: u64::from(config.log_interval),
        started: Instant::now(),
    };

    info!(
        games = config.games,
        workers = config.workers,
        seed = config.seed,
        visits_per_move = config.visits_per_move,
        random_move_probability = config.random_move_probability,
        "Starting self-play"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .context("Failed to build worker pool")?;

    let per_worker: Vec<SelfPlayStats> = pool.install(|| {
        (0..config.workers)
            .into_par_iter()
            .map(|worker| run_worker(config, worker, &shared))
            .collect::<Result<Vec<_>>>()
    })?;

    let mut stats = SelfPlayStats::default();
    for worker_stats in &per_worker {
        stats.merge(worker_stats);
    }

    if let Some(pb) = &shared.progress {
        pb.finish_and_clear();
    }
    if let Some(writer) = shared.samples {
        let writer = writer
            .into_inner()
            .map_err(|_| anyhow!("sample writer lock poisoned"))?;
        let written = writer.finish()?;
        info!(samples = written, "Samples exported");
    }

    let elapsed = shared.started.elapsed();
    let snapshot = stats.snapshot(elapsed);
    write_stats(&config.stats_path(), &snapshot)?;

    info!(
        games = snapshot.games,
        player0_wins = snapshot.player0_wins,
        player1_wins = snapshot.player1_wins,
        ties = snapshot.ties,
        mean_margin = format!("{:.2}", snapshot.mean_margin),
        frames = snapshot.frames,
        avg_iterations = format!("{:.0}", snapshot.avg_iterations_per_decision),
        elapsed_secs = format!("{:.1}", elapsed.as_secs_f64()),
        "Self-play finished"
    );
    Ok(stats)
}

fn run_worker(config: &SelfPlayConfig, worker: usize, shared: &Shared) -> Result<SelfPlayStats> {
    let games = games_for_worker(config.games, config.workers, worker);
    let mut stats = SelfPlayStats::default();
    if games == 0 {
        return Ok(stats);
    }

    let mut rng = worker_rng(config.seed, worker);
    let player0 = new_bot(config, &mut rng);
    let player1 = new_bot(config, &mut rng);
    let mut referee = Referee::new(player0, player1);
    debug!(worker, games, "Worker started");

    for game in 0..games {
        let (start, arid) = random_start(&mut rng);
        let record = referee
            .play(start, arid)
            .with_context(|| format!("Worker {worker} failed in match {game}"))?;
        stats.record_match(&record);

        if let Some(writer) = &shared.samples {
            let mut writer = writer
                .lock()
                .map_err(|_| anyhow!("sample writer lock poisoned"))?;
            writer.write_all(&record.samples())?;
            trace!(worker, game, total_samples = writer.written(), "Match samples appended");
        }

        let done = shared.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(pb) = &shared.progress {
            pb.inc(1);
        }
        if shared.log_interval > 0 && done % shared.log_interval == 0 {
            info!(
                completed = done,
                total = config.games,
                elapsed_secs = format!("{:.1}", shared.started.elapsed().as_secs_f64()),
                "Self-play progress"
            );
        }
    }

    stats.record_search(&referee.search_stats());
    debug!(worker, games = stats.games, "Worker finished");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::read_samples;
    use crate::stats::StatsSnapshot;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path, games: u32, workers: usize) -> SelfPlayConfig {
        SelfPlayConfig {
            search: crate::config::SearchArgs {
                first_turn_budget_ms: 50,
                turn_budget_ms: 10,
                exploration: 2.0,
                max_root_visits: mcts::MAX_ROOT_VISITS,
            },
            games,
            workers,
            seed: 42,
            visits_per_move: 8,
            random_move_probability: 0.0,
            data_dir: dir.to_string_lossy().into_owned(),
            sample_file: "samples.bin".into(),
            stats_file: "stats.json".into(),
            log_interval: 1,
        }
    }

    #[test]
    fn test_games_are_split_evenly() {
        let split: Vec<u32> = (0..4).map(|w| games_for_worker(10, 4, w)).collect();
        assert_eq!(split, vec![3, 3, 2, 2]);
        assert_eq!(games_for_worker(1, 3, 2), 0);
        assert_eq!((0..7).map(|w| games_for_worker(100, 7, w)).sum::<u32>(), 100);
    }

    #[test]
    fn test_worker_streams_differ() {
        let a: u64 = worker_rng(42, 0).gen();
        let b: u64 = worker_rng(42, 1).gen();
        let again: u64 = worker_rng(42, 0).gen();
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[test]
    fn test_selfplay_writes_stats_and_samples() {
        let dir = tempdir().unwrap();
        let config = config(dir.path(), 3, 2);

        let stats = run(&config).unwrap();
        assert_eq!(stats.games, 3);
        assert_eq!(stats.wins[0] + stats.wins[1] + stats.ties, 3);
        assert_eq!(stats.search.decisions, stats.frames);

        let content = fs::read_to_string(config.stats_path()).unwrap();
        let snapshot: StatsSnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(snapshot.games, 3);
        assert_eq!(snapshot.frames, stats.frames);

        let samples = read_samples(&config.sample_path().unwrap()).unwrap();
        assert_eq!(samples.len() as u64, stats.frames);
    }

    #[test]
    fn test_selfplay_is_reproducible_with_one_worker() {
        let first_dir = tempdir().unwrap();
        let second_dir = tempdir().unwrap();

        let first = run(&config(first_dir.path(), 2, 1)).unwrap();
        let second = run(&config(second_dir.path(), 2, 1)).unwrap();
        assert_eq!(first.wins, second.wins);
        assert_eq!(first.margin_sum, second.margin_sum);
        assert_eq!(first.frames, second.frames);
    }

    #[test]
    fn test_sample_export_can_be_disabled() {
        let dir = tempdir().unwrap();
        let mut config = config(dir.path(), 1, 1);
        config.sample_file.clear();

        run(&config).unwrap();
        assert!(!dir.path().join("samples.bin").exists());
        assert!(config.stats_path().exists());
    }
}
