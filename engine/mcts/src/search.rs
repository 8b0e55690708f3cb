//! UCT search driver.
//!
//! Each iteration runs to completion:
//! 1. Selection: descend by UCT while a node has nothing left to expand
//! 2. Expansion: turn one random untried action into a child
//! 3. Evaluation: score the new leaf with the evaluator
//! 4. Backpropagation: add the score to every node on the path
//!
//! Selection alternates between maximising (player 0) and minimising
//! (player 1) by depth below the root. After the limit is reached the child
//! with the best mean score is played and becomes the root for the next
//! turn, so its statistics carry over when the opponent's reply is found
//! among its children.

use std::time::{Duration, Instant};

use games_photosynthesis::{
    invariant, tree_actions, Action, CellSet, EngineError, MoveFilter, State,
};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace, Level};

use crate::config::MctsConfig;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::limit::SearchLimit;
use crate::node::NodeId;
use crate::tree::MctsTree;

/// Errors that can occur during search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("No legal moves available")]
    NoLegalMoves,
}

/// How the tree for a decision was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeReuse {
    /// No usable tree; a new one was built from the observed position.
    Fresh,
    /// The opponent was waiting, so the root already was the observed position.
    Predicted,
    /// The opponent's reply was found among the root's children.
    Matched,
    /// A random move was played without searching.
    Skipped,
}

/// Result of one decision.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub action: Action,

    /// Mean score of the chosen child, player 0's point of view.
    pub value: f32,

    /// Iterations run for this decision.
    pub iterations: u32,

    /// Root visits when the search stopped, inherited ones included.
    pub root_visits: u32,

    /// Visits of the chosen child.
    pub chosen_visits: u32,

    pub reuse: TreeReuse,
    pub elapsed: Duration,
}

/// Totals over every decision made by one [`MctsSearch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    pub decisions: u64,
    pub iterations: u64,
    pub fresh_trees: u64,
    pub reused_trees: u64,
    pub random_moves: u64,
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn record(&mut self, result: &SearchResult) {
        self.decisions += 1;
        self.iterations += u64::from(result.iterations);
        self.elapsed += result.elapsed;
        match result.reuse {
            TreeReuse::Fresh => self.fresh_trees += 1,
            TreeReuse::Predicted | TreeReuse::Matched => self.reused_trees += 1,
            TreeReuse::Skipped => self.random_moves += 1,
        }
    }

    pub fn merge(&mut self, other: &SearchStats) {
        self.decisions += other.decisions;
        self.iterations += other.iterations;
        self.fresh_trees += other.fresh_trees;
        self.reused_trees += other.reused_trees;
        self.random_moves += other.random_moves;
        self.elapsed += other.elapsed;
    }
}

/// A player that searches as player 0 and keeps its tree between turns.
///
/// One instance plays one match at a time; call [`MctsSearch::new_match`]
/// before reusing it.
pub struct MctsSearch<E: Evaluator, L: SearchLimit> {
    config: MctsConfig,
    evaluator: E,
    limit: L,
    arid: CellSet,
    tree: Option<MctsTree>,
    first_turn: bool,
    rng: ChaCha20Rng,
    stats: SearchStats,
}

impl<E: Evaluator, L: SearchLimit> MctsSearch<E, L> {
    pub fn new(config: MctsConfig, evaluator: E, limit: L, rng: ChaCha20Rng) -> Self {
        Self {
            config,
            evaluator,
            limit,
            arid: CellSet::EMPTY,
            tree: None,
            first_turn: true,
            rng,
            stats: SearchStats::default(),
        }
    }

    /// Forget the previous match and use `arid` for the next one.
    pub fn new_match(&mut self, arid: CellSet) {
        self.arid = arid;
        self.tree = None;
        self.first_turn = true;
    }

    pub fn arid(&self) -> CellSet {
        self.arid
    }

    /// The tree rooted at the last chosen move, if any.
    pub fn tree(&self) -> Option<&MctsTree> {
        self.tree.as_ref()
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Pick player 0's action for `observed`.
    pub fn choose_action(&mut self, observed: &State) -> Result<SearchResult, SearchError> {
        let start = Instant::now();
        if observed.is_terminal() {
            return Err(SearchError::NoLegalMoves);
        }
        invariant!(observed.next_player() == 0);

        if self.config.random_move_probability > 0.0
            && self.rng.gen::<f32>() < self.config.random_move_probability
        {
            return self.random_action(observed, start);
        }

        let reuse = self.track_observed(observed)?;
        let mut tree = match self.tree.take() {
            Some(tree) => tree,
            None => MctsTree::new(*observed, tree_actions(observed, self.arid)),
        };

        let root = tree.root();
        let mut iterations = 0u32;
        while tree.get(root).visit_count <= self.config.max_root_visits {
            self.iterate(&mut tree)?;
            iterations += 1;
            if self
                .limit
                .should_stop(start.elapsed(), tree.get(root).visit_count, self.first_turn)
            {
                break;
            }
        }
        self.first_turn = false;

        let root_visits = tree.get(root).visit_count;
        let best = tree.best_child(root)?;
        let chosen = tree.get(best);
        let action = chosen
            .action
            .ok_or_else(|| invariant!(@violation "child node carries an action"))?;
        let value = chosen.mean_score();
        let chosen_visits = chosen.visit_count;

        if tracing::enabled!(Level::DEBUG) {
            let tree_stats = tree.stats();
            debug!(
                %action,
                value,
                iterations,
                root_visits,
                chosen_visits,
                nodes = tree_stats.total_nodes,
                depth = tree_stats.max_depth,
                root_value = tree_stats.root_value,
                ?reuse,
                "search finished"
            );
        }

        tree.reroot(best);
        self.tree = Some(tree);

        let result = SearchResult {
            action,
            value,
            iterations,
            root_visits,
            chosen_visits,
            reuse,
            elapsed: start.elapsed(),
        };
        self.stats.record(&result);
        Ok(result)
    }

    /// Line the kept tree up with what actually happened since the last move.
    fn track_observed(&mut self, observed: &State) -> Result<TreeReuse, SearchError> {
        let Some(tree) = self.tree.as_mut() else {
            return Ok(TreeReuse::Fresh);
        };
        let root = tree.root();

        if tree.get(root).state.next_player() == 0 {
            // The opponent was waiting: the root already is the new position.
            invariant!(tree.get(root).state == *observed);
            debug!(visits = tree.get(root).visit_count, "opponent waiting, tree kept");
            return Ok(TreeReuse::Predicted);
        }

        match tree.find_child_by_state(root, observed) {
            Some(child) => {
                debug!(
                    reply = ?tree.get(child).action,
                    visits = tree.get(child).visit_count,
                    "opponent reply found, tree reused"
                );
                tree.reroot(child);
                Ok(TreeReuse::Matched)
            }
            None => {
                debug!("opponent reply not in tree, starting fresh");
                self.tree = None;
                Ok(TreeReuse::Fresh)
            }
        }
    }

    fn random_action(&mut self, observed: &State, start: Instant) -> Result<SearchResult, SearchError> {
        self.tree = None;
        self.first_turn = false;
        let actions = observed.legal_actions(0, self.arid, MoveFilter::unblocked());
        if actions.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }
        let action = actions[self.rng.gen_range(0..actions.len())];
        debug!(%action, "random move");

        let result = SearchResult {
            action,
            value: 0.0,
            iterations: 0,
            root_visits: 0,
            chosen_visits: 0,
            reuse: TreeReuse::Skipped,
            elapsed: start.elapsed(),
        };
        self.stats.record(&result);
        Ok(result)
    }

    /// One select, expand, evaluate, backpropagate cycle.
    fn iterate(&mut self, tree: &mut MctsTree) -> Result<(), SearchError> {
        let (mut leaf, depth) = self.select(tree)?;

        if tree.get(leaf).has_untried() {
            leaf = self.expand(tree, leaf)?;
        }

        let score = self
            .evaluator
            .evaluate(&tree.get(leaf).state, self.arid, &mut self.rng)?;
        tree.backpropagate(leaf, score);

        trace!(leaf = leaf.0, depth, score, "iteration complete");
        Ok(())
    }

    /// Descend from the root to a node with untried actions or a finished
    /// position. Returns the node and its depth.
    fn select(&self, tree: &MctsTree) -> Result<(NodeId, u32), SearchError> {
        let mut current = tree.root();
        let mut depth = 0;
        let mut sign = 1.0;

        loop {
            let node = tree.get(current);
            if node.has_untried() {
                break;
            }
            if node.is_dead_end() {
                invariant!(node.state.is_terminal());
                break;
            }
            current = tree.select_child(current, sign, self.config.exploration)?;
            sign = -sign;
            depth += 1;
        }
        Ok((current, depth))
    }

    fn expand(&mut self, tree: &mut MctsTree, node_id: NodeId) -> Result<NodeId, SearchError> {
        let node = tree.get_mut(node_id);
        let index = self.rng.gen_range(0..node.untried.len());
        let action = node.untried.remove(index);
        let state = node.state;

        let next = state.after(state.next_player(), action, self.arid)?;
        let untried = tree_actions(&next, self.arid);
        Ok(tree.add_child(node_id, action, next, untried))
    }
}
