//! Monte Carlo Tree Search (UCT) for the photosynthesis engine.
//!
//! The search plays as player 0. It keeps its tree between decisions: after
//! choosing a move the chosen child becomes the root, and on the next call
//! the opponent's reply is looked up among that root's children so the
//! statistics gathered for it are not thrown away.
//!
//! # Overview
//!
//! Each iteration consists of four phases:
//!
//! 1. **Selection**: descend with UCB1, maximising for player 0 and
//!    minimising for player 1 on alternating levels
//! 2. **Expansion**: add one child for a random untried action
//! 3. **Evaluation**: score the new leaf with an [`Evaluator`]
//! 4. **Backpropagation**: add the score and a visit to every node on the
//!    path back to the root
//!
//! Iterations stop when the [`SearchLimit`] says so or the root reaches
//! [`MctsConfig::max_root_visits`].
//!
//! # Usage
//!
//! ```rust
//! use games_photosynthesis::random_start;
//! use mcts::{MctsConfig, MctsSearch, RolloutEvaluator, VisitBudget};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let (state, arid) = random_start(&mut ChaCha20Rng::seed_from_u64(42));
//!
//! let mut search = MctsSearch::new(
//!     MctsConfig::default(),
//!     RolloutEvaluator::new(),
//!     VisitBudget::new(100),
//!     ChaCha20Rng::seed_from_u64(7),
//! );
//! search.new_match(arid);
//!
//! let result = search.choose_action(&state).unwrap();
//! println!("{} after {} iterations", result.action, result.iterations);
//! ```
//!
//! # Evaluators and limits
//!
//! - [`RolloutEvaluator`]: random rollout to the end, scored by
//!   [`margin_value`]
//! - [`ScorerEvaluator`]: any function over
//!   [`Observation`](games_photosynthesis::Observation) features
//! - [`TimeBudget`]: wall clock, front-loaded on the first decision
//! - [`VisitBudget`]: fixed number of root visits

pub mod config;
pub mod evaluator;
pub mod limit;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::{MctsConfig, MAX_ROOT_VISITS};
pub use evaluator::{
    margin_value, outcome_value, Evaluator, EvaluatorError, RolloutEvaluator, ScorerEvaluator,
};
pub use limit::{SearchLimit, TimeBudget, VisitBudget};
pub use node::{MctsNode, NodeId};
pub use search::{MctsSearch, SearchError, SearchResult, SearchStats, TreeReuse};
pub use tree::{MctsTree, TreeStats};
