//! Search tree node representation.
//!
//! Each node owns a copy of the position reached by taking `action` from its
//! parent, the actions it has not tried yet, and the statistics UCT needs.

use games_photosynthesis::{Action, State};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Action that led here from the parent. `None` for a fresh root.
    pub action: Option<Action>,

    /// Position at this node.
    pub state: State,

    /// Expansion candidates not turned into children yet.
    pub untried: Vec<Action>,

    /// Children in expansion order.
    pub children: Vec<NodeId>,

    /// Number of evaluations backed up through this node.
    pub visit_count: u32,

    /// Sum of those evaluations, from player 0's point of view.
    pub score_sum: f32,
}

impl MctsNode {
    pub fn new_root(state: State, untried: Vec<Action>) -> Self {
        Self {
            parent: NodeId::NONE,
            action: None,
            state,
            untried,
            children: Vec::new(),
            visit_count: 0,
            score_sum: 0.0,
        }
    }

    pub fn new_child(parent: NodeId, action: Action, state: State, untried: Vec<Action>) -> Self {
        Self {
            parent,
            action: Some(action),
            ..Self::new_root(state, untried)
        }
    }

    /// Mean score, 0.0 if never visited.
    #[inline]
    pub fn mean_score(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.score_sum / self.visit_count as f32
        }
    }

    /// UCT value of this node as seen from a parent with `ln_parent_visits`.
    ///
    /// `sign` is `1.0` when the parent picks for player 0 and `-1.0` when it
    /// picks for player 1. Callers must not pass an unvisited node.
    #[inline]
    pub fn uct_score(&self, sign: f32, ln_parent_visits: f32, exploration: f32) -> f32 {
        let n = self.visit_count as f32;
        sign * self.score_sum / n + (exploration * ln_parent_visits / n).sqrt()
    }

    /// True while there are actions left to expand.
    #[inline]
    pub fn has_untried(&self) -> bool {
        !self.untried.is_empty()
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Nothing to expand and nothing below: only valid for a finished match.
    #[inline]
    pub fn is_dead_end(&self) -> bool {
        self.untried.is_empty() && self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(!NodeId(0).is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_root() {
        let node = MctsNode::new_root(State::new(), vec![Action::Wait]);

        assert!(node.parent.is_none());
        assert_eq!(node.action, None);
        assert_eq!(node.visit_count, 0);
        assert!(node.has_untried());
        assert!(!node.is_expanded());
        assert!(!node.is_dead_end());
    }

    #[test]
    fn test_new_child_keeps_action() {
        let node = MctsNode::new_child(NodeId(3), Action::Grow(7), State::new(), Vec::new());
        assert_eq!(node.parent, NodeId(3));
        assert_eq!(node.action, Some(Action::Grow(7)));
        assert!(node.is_dead_end());
    }

    #[test]
    fn test_mean_score() {
        let mut node = MctsNode::new_root(State::new(), Vec::new());
        assert!((node.mean_score()).abs() < 1e-6);

        node.visit_count = 4;
        node.score_sum = 2.0;
        assert!((node.mean_score() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_uct_score_flips_exploitation_only() {
        let mut node = MctsNode::new_root(State::new(), Vec::new());
        node.visit_count = 10;
        node.score_sum = 5.0;

        let ln_parent = (100f32).ln();
        let bonus = (2.0 * ln_parent / 10.0).sqrt();

        let max = node.uct_score(1.0, ln_parent, 2.0);
        let min = node.uct_score(-1.0, ln_parent, 2.0);
        assert!((max - (0.5 + bonus)).abs() < 1e-5);
        assert!((min - (-0.5 + bonus)).abs() < 1e-5);
    }
}
