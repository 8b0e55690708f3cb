//! Search benchmarks.
//!
//! Run with: `cargo bench -p mcts`
//!
//! These benchmarks measure:
//! - One decision at fixed visit counts, from the opening and from midgame
//! - Tree operations (selection, rerooting)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use games_photosynthesis::{random_start, rollout_actions, Action, CellSet, State};
use mcts::{MctsConfig, MctsSearch, MctsTree, RolloutEvaluator, VisitBudget};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Random rollout moves until player 0 is to move on `day`.
fn position_on_day(seed: u64, day: u8) -> (State, CellSet) {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let (mut state, arid) = random_start(&mut rng);
    let mut actions = Vec::new();
    while state.day() < day || state.next_player() != 0 {
        rollout_actions(&state, arid, &mut actions);
        let action = *actions.choose(&mut rng).unwrap();
        state.apply(state.next_player(), action, arid).unwrap();
    }
    (state, arid)
}

fn bench_decision(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_decision");
    group.sample_size(20);

    for (label, day) in [("opening", 0u8), ("midgame", 12)] {
        let (state, arid) = position_on_day(42, day);
        for visits in [100u32, 400, 1600] {
            group.throughput(Throughput::Elements(visits as u64));
            group.bench_with_input(BenchmarkId::new(label, visits), &visits, |b, &visits| {
                b.iter(|| {
                    let mut search = MctsSearch::new(
                        MctsConfig::default(),
                        RolloutEvaluator::new(),
                        VisitBudget::new(visits),
                        ChaCha20Rng::seed_from_u64(42),
                    );
                    search.new_match(arid);
                    black_box(search.choose_action(&state).unwrap())
                });
            });
        }
    }
    group.finish();
}

fn bench_tree_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_tree_ops");

    // Wide tree: 30 visited children under the root, 10 grandchildren each.
    let mut tree = MctsTree::new(State::new(), Vec::new());
    for i in 0..30u8 {
        let child = tree.add_child(tree.root(), Action::Grow(i), State::new(), Vec::new());
        for j in 0..10u8 {
            let leaf = tree.add_child(child, Action::Complete(j), State::new(), Vec::new());
            tree.backpropagate(leaf, (i as f32 - 15.0) / 15.0);
        }
    }

    group.bench_function("select_child_30", |b| {
        b.iter(|| black_box(tree.select_child(tree.root(), 1.0, 2.0).unwrap()));
    });

    group.bench_function("reroot_subtree", |b| {
        b.iter_batched(
            || {
                let mut copy = MctsTree::new(State::new(), Vec::new());
                for i in 0..30u8 {
                    let child =
                        copy.add_child(copy.root(), Action::Grow(i), State::new(), Vec::new());
                    for j in 0..10u8 {
                        copy.add_child(child, Action::Complete(j), State::new(), Vec::new());
                    }
                }
                copy
            },
            |mut copy| {
                let target = copy.get(copy.root()).children[15];
                copy.reroot(target);
                copy
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_decision, bench_tree_ops);
criterion_main!(benches);
