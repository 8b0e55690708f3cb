//! Legal move enumeration.
//!
//! [`State::for_each_action`] walks the legal actions for one player in a
//! fixed order: `Wait`, grows by ascending size then cell, completions by
//! cell, seeds by source size, source cell, then target cell. The search and
//! rollout presets below prune that list; protocol validation uses it whole.

use crate::action::Action;
use crate::board::{seed_block, seed_destinations, MAX_SIZE};
use crate::cells::CellSet;
use crate::state::{State, COMPLETE_COST};

/// Day before which the search never considers completing a tree.
pub const FIRST_COMPLETE_DAY: u8 = 11;

/// From this day on rollouts complete freely instead of waiting for a
/// stock of four mature trees.
pub const FREE_COMPLETE_DAY: u8 = 22;

/// Rollouts stop growing after this day.
pub const LAST_ROLLOUT_GROW_DAY: u8 = 19;

/// Search expansion always offers `Wait` after this day.
pub const LATE_WAIT_DAY: u8 = 21;

/// Which action kinds to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveFilter {
    /// Forbid seeding next to one's own trees (and from size-1 trees).
    pub block_self_neighbor: bool,
    pub can_grow: bool,
    pub can_complete: bool,
    pub can_seed: bool,
}

impl Default for MoveFilter {
    fn default() -> Self {
        Self {
            block_self_neighbor: true,
            can_grow: true,
            can_complete: true,
            can_seed: true,
        }
    }
}

impl MoveFilter {
    /// Full game legality, as counted by the referee's action list.
    pub fn unblocked() -> Self {
        Self {
            block_self_neighbor: false,
            ..Self::default()
        }
    }

    pub fn with_grow(mut self, allowed: bool) -> Self {
        self.can_grow = allowed;
        self
    }

    pub fn with_complete(mut self, allowed: bool) -> Self {
        self.can_complete = allowed;
        self
    }

    pub fn with_seed(mut self, allowed: bool) -> Self {
        self.can_seed = allowed;
        self
    }
}

impl State {
    /// Feed every action `player` may take under `filter` to `visit`.
    /// A terminal state yields nothing.
    pub fn for_each_action<F: FnMut(Action)>(
        &self,
        player: usize,
        arid: CellSet,
        filter: MoveFilter,
        mut visit: F,
    ) {
        if self.is_terminal() {
            return;
        }

        visit(Action::Wait);

        let sun = self.sun(player) as u32;
        let awake = !self.dormant();

        if filter.can_grow {
            for size in 0..MAX_SIZE {
                if sun < self.grow_cost(player, size) {
                    continue;
                }
                for cell in self.player_trees(player, size) & awake {
                    visit(Action::Grow(cell));
                }
            }
        }

        if filter.can_complete && sun >= COMPLETE_COST as u32 {
            for cell in self.player_trees(player, MAX_SIZE) & awake {
                visit(Action::Complete(cell));
            }
        }

        if filter.can_seed && sun >= self.seed_cost(player) {
            let mut blocked = self.all_trees() | arid;
            if filter.block_self_neighbor {
                for cell in self.owned(player) {
                    blocked |= seed_block(cell);
                }
            }

            let first_size = if filter.block_self_neighbor { 2 } else { 1 };
            for size in first_size..=MAX_SIZE {
                for source in self.player_trees(player, size) & awake {
                    for target in seed_destinations(size, source) - blocked {
                        visit(Action::Seed { source, target });
                    }
                }
            }
        }
    }

    pub fn legal_actions(&self, player: usize, arid: CellSet, filter: MoveFilter) -> Vec<Action> {
        let mut actions = Vec::new();
        self.for_each_action(player, arid, filter, |a| actions.push(a));
        actions
    }

    pub fn count_actions(&self, player: usize, arid: CellSet, filter: MoveFilter) -> usize {
        let mut n = 0;
        self.for_each_action(player, arid, filter, |_| n += 1);
        n
    }
}

/// Actions a search node starts with for the player to move.
///
/// Seeding is only considered while the player holds no seed, completions
/// wait until [`FIRST_COMPLETE_DAY`], and `Wait` is offered only when no
/// seed is possible or the match is nearly over.
pub fn tree_actions(state: &State, arid: CellSet) -> Vec<Action> {
    let player = state.next_player();
    let filter = MoveFilter::default()
        .with_seed(state.tree_count(player, 0) == 0)
        .with_complete(state.day() >= FIRST_COMPLETE_DAY);

    let mut actions = Vec::new();
    let mut can_seed = false;
    state.for_each_action(player, arid, filter, |action| {
        match action {
            Action::Wait => return,
            Action::Seed { .. } => can_seed = true,
            _ => {}
        }
        actions.push(action);
    });

    if (!can_seed || state.day() > LATE_WAIT_DAY) && !state.is_terminal() {
        actions.push(Action::Wait);
    }
    actions
}

/// Actions a random rollout picks from, written into `out`.
///
/// Completing beats growing and either beats seeding; `Wait` is always
/// available until the end.
pub fn rollout_actions(state: &State, arid: CellSet, out: &mut Vec<Action>) {
    out.clear();
    let player = state.next_player();
    let day = state.day();

    let can_complete = if day < FIRST_COMPLETE_DAY {
        false
    } else if day < FREE_COMPLETE_DAY {
        state.tree_count(player, MAX_SIZE) >= 4
    } else {
        true
    };
    let filter = MoveFilter::default()
        .with_seed(state.tree_count(player, 0) == 0)
        .with_complete(can_complete)
        .with_grow(day <= LAST_ROLLOUT_GROW_DAY);

    let (mut grows, mut completes, mut seeds) = (false, false, false);
    state.for_each_action(player, arid, filter, |action| {
        match action {
            Action::Wait => return,
            Action::Grow(_) => grows = true,
            Action::Complete(_) => completes = true,
            Action::Seed { .. } => seeds = true,
        }
        out.push(action);
    });

    if grows && completes {
        out.retain(|a| !matches!(a, Action::Grow(_)));
        grows = false;
    }
    if seeds && (grows || completes) {
        out.retain(|a| !a.is_seed());
    }

    if !state.is_terminal() {
        out.push(Action::Wait);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opening() -> State {
        let mut state = State::new();
        state.place_tree(25, 1, 0, false).unwrap();
        state.place_tree(34, 1, 0, false).unwrap();
        state.place_tree(19, 1, 1, false).unwrap();
        state.place_tree(28, 1, 1, false).unwrap();
        state.set_sun(0, 2);
        state.set_sun(1, 2);
        state
    }

    #[test]
    fn test_terminal_state_has_no_actions() {
        let mut state = opening();
        state.set_day(24);
        assert!(state
            .legal_actions(0, CellSet::EMPTY, MoveFilter::unblocked())
            .is_empty());
        assert!(tree_actions(&state, CellSet::EMPTY).is_empty());
        let mut out = vec![Action::Wait];
        rollout_actions(&state, CellSet::EMPTY, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_wait_is_always_first() {
        let state = opening();
        let actions = state.legal_actions(0, CellSet::EMPTY, MoveFilter::default());
        assert_eq!(actions.first(), Some(&Action::Wait));
    }

    #[test]
    fn test_grow_needs_enough_sun() {
        let mut state = opening();
        // Growing 1 -> 2 costs 3 with no size-2 trees.
        let actions = state.legal_actions(0, CellSet::EMPTY, MoveFilter::unblocked());
        assert!(!actions.iter().any(|a| matches!(a, Action::Grow(_))));

        state.set_sun(0, 3);
        let actions = state.legal_actions(0, CellSet::EMPTY, MoveFilter::unblocked());
        let grows: Vec<_> = actions
            .iter()
            .filter(|a| matches!(a, Action::Grow(_)))
            .collect();
        assert_eq!(grows, vec![&Action::Grow(25), &Action::Grow(34)]);
    }

    #[test]
    fn test_dormant_trees_do_not_act() {
        let mut state = opening();
        state.set_sun(0, 10);
        state.dormant = CellSet::single(25);
        let actions = state.legal_actions(0, CellSet::EMPTY, MoveFilter::unblocked());
        assert!(actions.iter().all(|a| match *a {
            Action::Grow(c) => c != 25,
            Action::Seed { source, .. } => source != 25,
            _ => true,
        }));
    }

    #[test]
    fn test_seed_blocking_filter() {
        let state = opening();
        // Size-1 trees cannot seed at all when self-adjacency is blocked.
        let blocked = state.legal_actions(0, CellSet::EMPTY, MoveFilter::default());
        assert_eq!(blocked, vec![Action::Wait]);

        let unblocked = state.legal_actions(0, CellSet::EMPTY, MoveFilter::unblocked());
        assert_eq!(unblocked.len(), 7);
    }

    #[test]
    fn test_arid_cells_are_not_seedable() {
        let state = opening();
        let arid = CellSet::single(11);
        let actions = state.legal_actions(0, arid, MoveFilter::unblocked());
        assert!(!actions.contains(&Action::Seed {
            source: 25,
            target: 11
        }));
        assert_eq!(actions.len(), 6);
    }

    #[test]
    fn test_tree_actions_prune_wait_while_seeding() {
        let state = opening();
        let actions = tree_actions(&state, CellSet::EMPTY);
        // No seeds held, but size-1 trees cannot seed under the search
        // filter, so waiting is the only option.
        assert_eq!(actions, vec![Action::Wait]);

        let mut state = opening();
        state.place_tree(0, 2, 0, false).unwrap();
        let actions = tree_actions(&state, CellSet::EMPTY);
        assert!(actions.iter().any(|a| a.is_seed()));
        assert!(!actions.contains(&Action::Wait));

        state.set_day(22);
        let actions = tree_actions(&state, CellSet::EMPTY);
        assert_eq!(actions.last(), Some(&Action::Wait));
    }

    #[test]
    fn test_tree_actions_no_complete_before_day_threshold() {
        let mut state = State::new();
        state.place_tree(0, 3, 0, false).unwrap();
        state.set_sun(0, 20);
        state.set_day(10);
        assert!(!tree_actions(&state, CellSet::EMPTY).contains(&Action::Complete(0)));
        state.set_day(11);
        assert!(tree_actions(&state, CellSet::EMPTY).contains(&Action::Complete(0)));
    }

    #[test]
    fn test_rollout_prefers_complete_over_grow_and_seed() {
        let mut state = State::new();
        for cell in [0u8, 1, 2, 3] {
            state.place_tree(cell, 3, 0, false).unwrap();
        }
        state.place_tree(20, 1, 0, false).unwrap();
        state.set_sun(0, 30);
        state.set_day(15);

        let mut out = Vec::new();
        rollout_actions(&state, CellSet::EMPTY, &mut out);
        assert!(out.iter().all(|a| matches!(a, Action::Complete(_) | Action::Wait)));
        assert_eq!(out.len(), 5);
        assert_eq!(out.last(), Some(&Action::Wait));
    }

    #[test]
    fn test_rollout_stops_growing_late() {
        let mut state = State::new();
        state.place_tree(7, 1, 0, false).unwrap();
        state.set_sun(0, 30);
        state.set_day(20);

        let mut out = Vec::new();
        rollout_actions(&state, CellSet::EMPTY, &mut out);
        assert!(!out.iter().any(|a| matches!(a, Action::Grow(_))));
    }
}
