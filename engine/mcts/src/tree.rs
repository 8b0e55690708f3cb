//! Search tree structure with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by NodeId indices.
//! Moving the root to a child compacts the kept subtree into a fresh arena
//! and drops everything else.

use std::collections::VecDeque;

use games_photosynthesis::{invariant, Action, EngineError, State};

use crate::node::{MctsNode, NodeId};

/// Search tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0)
    root: NodeId,
}

impl MctsTree {
    /// Create a new tree with the given root position and its candidates.
    pub fn new(root_state: State, untried: Vec<Action>) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(root_state, untried)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a child reached by `action` and return its ID.
    pub fn add_child(
        &mut self,
        parent_id: NodeId,
        action: Action,
        state: State,
        untried: Vec<Action>,
    ) -> NodeId {
        let child_id = self.allocate(MctsNode::new_child(parent_id, action, state, untried));
        self.get_mut(parent_id).children.push(child_id);
        child_id
    }

    /// Add `score` to every node from `leaf_id` up to the root. The score is
    /// always from player 0's point of view, so it is never negated.
    pub fn backpropagate(&mut self, leaf_id: NodeId, score: f32) {
        let mut current_id = leaf_id;
        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visit_count += 1;
            node.score_sum += score;
            current_id = node.parent;
        }
    }

    /// Child of `node_id` with the highest UCT value for the side given by
    /// `sign`. Ties go to the earliest child.
    pub fn select_child(
        &self,
        node_id: NodeId,
        sign: f32,
        exploration: f32,
    ) -> Result<NodeId, EngineError> {
        let node = self.get(node_id);
        invariant!(node.is_expanded());
        invariant!(node.visit_count > 0);
        let ln_parent = (node.visit_count as f32).ln();

        let mut best = (node.children[0], f32::NEG_INFINITY);
        for &child_id in &node.children {
            let child = self.get(child_id);
            invariant!(child.visit_count > 0);
            let value = child.uct_score(sign, ln_parent, exploration);
            if value > best.1 {
                best = (child_id, value);
            }
        }
        Ok(best.0)
    }

    /// Child of `node_id` with the highest mean score. Every child must have
    /// been visited.
    pub fn best_child(&self, node_id: NodeId) -> Result<NodeId, EngineError> {
        let node = self.get(node_id);
        invariant!(node.is_expanded());

        let mut best = (node.children[0], f32::NEG_INFINITY);
        for &child_id in &node.children {
            let child = self.get(child_id);
            invariant!(child.visit_count > 0);
            let mean = child.mean_score();
            if mean > best.1 {
                best = (child_id, mean);
            }
        }
        Ok(best.0)
    }

    /// Child of `node_id` whose position equals `state`.
    pub fn find_child_by_state(&self, node_id: NodeId, state: &State) -> Option<NodeId> {
        self.get(node_id)
            .children
            .iter()
            .copied()
            .find(|&id| self.get(id).state == *state)
    }

    /// Make `new_root` the root, keeping only its subtree. Statistics of the
    /// kept nodes are preserved.
    pub fn reroot(&mut self, new_root: NodeId) {
        if new_root == self.root {
            return;
        }

        let mut old: Vec<Option<MctsNode>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut queue = VecDeque::from([(new_root, NodeId::NONE)]);

        while let Some((old_id, parent)) = queue.pop_front() {
            let Some(mut node) = old.get_mut(old_id.0 as usize).and_then(Option::take) else {
                continue;
            };
            let id = NodeId(self.nodes.len() as u32);
            node.parent = parent;
            for child in std::mem::take(&mut node.children) {
                queue.push_back((child, id));
            }
            self.nodes.push(node);
            if parent.is_some() {
                self.get_mut(parent).children.push(id);
            }
        }
        self.root = NodeId(0);
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_value: root.mean_score(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        self.get(node_id)
            .children
            .iter()
            .map(|id| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_sun(sun: u8) -> State {
        let mut state = State::new();
        state.set_sun(0, sun);
        state
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::new(State::new(), vec![Action::Wait]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.untried, vec![Action::Wait]);
    }

    #[test]
    fn test_add_child() {
        let mut tree = MctsTree::new(State::new(), Vec::new());
        let child_id = tree.add_child(tree.root(), Action::Grow(4), state_with_sun(1), Vec::new());

        assert_eq!(tree.len(), 2);
        assert_eq!(child_id, NodeId(1));
        assert_eq!(tree.get(tree.root()).children, vec![NodeId(1)]);

        let child = tree.get(child_id);
        assert_eq!(child.parent, tree.root());
        assert_eq!(child.action, Some(Action::Grow(4)));
    }

    #[test]
    fn test_backpropagate_adds_same_score_everywhere() {
        let mut tree = MctsTree::new(State::new(), Vec::new());
        let child_id = tree.add_child(tree.root(), Action::Wait, state_with_sun(1), Vec::new());
        let grandchild_id = tree.add_child(child_id, Action::Wait, state_with_sun(2), Vec::new());

        tree.backpropagate(grandchild_id, 0.75);

        for id in [tree.root(), child_id, grandchild_id] {
            assert_eq!(tree.get(id).visit_count, 1);
            assert!((tree.get(id).score_sum - 0.75).abs() < 1e-6);
        }
    }

    #[test]
    fn test_select_child_follows_sign() {
        let mut tree = MctsTree::new(State::new(), Vec::new());
        let good = tree.add_child(tree.root(), Action::Grow(1), state_with_sun(1), Vec::new());
        let bad = tree.add_child(tree.root(), Action::Grow(2), state_with_sun(2), Vec::new());

        for _ in 0..10 {
            tree.backpropagate(good, 1.0);
            tree.backpropagate(bad, -1.0);
        }

        assert_eq!(tree.select_child(tree.root(), 1.0, 2.0).unwrap(), good);
        assert_eq!(tree.select_child(tree.root(), -1.0, 2.0).unwrap(), bad);
    }

    #[test]
    fn test_select_child_rejects_unvisited() {
        let mut tree = MctsTree::new(State::new(), Vec::new());
        let visited = tree.add_child(tree.root(), Action::Grow(1), state_with_sun(1), Vec::new());
        tree.add_child(tree.root(), Action::Grow(2), state_with_sun(2), Vec::new());
        tree.backpropagate(visited, 0.0);

        let err = tree.select_child(tree.root(), 1.0, 2.0).unwrap_err();
        assert!(matches!(err, EngineError::Invariant { .. }));
        assert!(tree.best_child(tree.root()).is_err());
    }

    #[test]
    fn test_best_child_by_mean_not_visits() {
        let mut tree = MctsTree::new(State::new(), Vec::new());
        let busy = tree.add_child(tree.root(), Action::Grow(1), state_with_sun(1), Vec::new());
        let sharp = tree.add_child(tree.root(), Action::Grow(2), state_with_sun(2), Vec::new());

        for _ in 0..20 {
            tree.backpropagate(busy, 0.2);
        }
        tree.backpropagate(sharp, 0.9);

        assert_eq!(tree.best_child(tree.root()).unwrap(), sharp);
    }

    #[test]
    fn test_find_child_by_state() {
        let mut tree = MctsTree::new(State::new(), Vec::new());
        tree.add_child(tree.root(), Action::Grow(1), state_with_sun(1), Vec::new());
        let second = tree.add_child(tree.root(), Action::Grow(2), state_with_sun(2), Vec::new());

        assert_eq!(tree.find_child_by_state(tree.root(), &state_with_sun(2)), Some(second));
        assert_eq!(tree.find_child_by_state(tree.root(), &state_with_sun(9)), None);
    }

    #[test]
    fn test_reroot_keeps_subtree_statistics() {
        let mut tree = MctsTree::new(State::new(), Vec::new());
        let dropped = tree.add_child(tree.root(), Action::Grow(1), state_with_sun(1), Vec::new());
        let kept = tree.add_child(tree.root(), Action::Grow(2), state_with_sun(2), Vec::new());
        let a = tree.add_child(kept, Action::Grow(3), state_with_sun(3), Vec::new());
        let b = tree.add_child(kept, Action::Grow(4), state_with_sun(4), Vec::new());
        let deep = tree.add_child(a, Action::Grow(5), state_with_sun(5), Vec::new());
        tree.add_child(dropped, Action::Grow(6), state_with_sun(6), Vec::new());

        tree.backpropagate(deep, 1.0);
        tree.backpropagate(b, -0.5);

        tree.reroot(kept);

        assert_eq!(tree.len(), 4);
        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.state, state_with_sun(2));
        assert_eq!(root.visit_count, 2);
        assert!((root.score_sum - 0.5).abs() < 1e-6);

        let children: Vec<_> = root.children.iter().map(|&id| tree.get(id).action).collect();
        assert_eq!(children, vec![Some(Action::Grow(3)), Some(Action::Grow(4))]);

        let first = root.children[0];
        let grandchild = tree.get(first).children[0];
        assert_eq!(tree.get(grandchild).parent, first);
        assert_eq!(tree.get(grandchild).state, state_with_sun(5));
        assert_eq!(tree.stats().max_depth, 2);
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = MctsTree::new(State::new(), Vec::new());
        let child = tree.add_child(tree.root(), Action::Wait, state_with_sun(1), Vec::new());
        tree.backpropagate(child, 0.5);

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 2);
        assert_eq!(stats.root_visits, 1);
        assert!((stats.root_value - 0.5).abs() < 1e-6);
        assert_eq!(stats.max_depth, 1);
    }
}
