//! Stop conditions for the search loop.
//!
//! The loop asks its limit once per completed iteration; an iteration that
//! starts just before the deadline is allowed to finish.

use std::time::Duration;

/// Decides when a search has done enough work.
pub trait SearchLimit: Send + Sync {
    /// `root_visits` includes visits inherited from a reused tree.
    fn should_stop(&self, elapsed: Duration, root_visits: u32, first_turn: bool) -> bool;
}

/// Wall-clock limit with a larger allowance for the first decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBudget {
    pub first_turn: Duration,
    pub turn: Duration,
}

impl TimeBudget {
    pub fn new(first_turn: Duration, turn: Duration) -> Self {
        Self { first_turn, turn }
    }
}

impl SearchLimit for TimeBudget {
    fn should_stop(&self, elapsed: Duration, _root_visits: u32, first_turn: bool) -> bool {
        let budget = if first_turn { self.first_turn } else { self.turn };
        elapsed >= budget
    }
}

/// Stop once the root has been visited more than `visits` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitBudget {
    pub visits: u32,
}

impl VisitBudget {
    /// Rollout allowance used by scorer-driven self-play.
    pub const SELF_PLAY: VisitBudget = VisitBudget { visits: 1600 };

    pub fn new(visits: u32) -> Self {
        Self { visits }
    }
}

impl SearchLimit for VisitBudget {
    fn should_stop(&self, _elapsed: Duration, root_visits: u32, _first_turn: bool) -> bool {
        root_visits > self.visits
    }
}

impl<L: SearchLimit + ?Sized> SearchLimit for Box<L> {
    fn should_stop(&self, elapsed: Duration, root_visits: u32, first_turn: bool) -> bool {
        (**self).should_stop(elapsed, root_visits, first_turn)
    }
}
