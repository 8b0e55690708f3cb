//! Search configuration parameters.

use std::time::Duration;

use crate::limit::TimeBudget;

/// Root visit count past which a search stops regardless of its limit.
pub const MAX_ROOT_VISITS: u32 = 0x00FF_FFFE;

/// Configuration for the UCT search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Exploration constant `c` in `sqrt(c * ln(N) / n)`.
    /// 2.0 gives the textbook UCB1 bonus.
    pub exploration: f32,

    /// Iterations continue only while the root has at most this many visits.
    pub max_root_visits: u32,

    /// Wall-clock allowance for the first decision of a match.
    pub first_turn_budget: Duration,

    /// Wall-clock allowance for every later decision.
    pub turn_budget: Duration,

    /// Chance of playing a uniformly random legal move instead of searching.
    /// The tree is discarded when this happens. Used to diversify self-play.
    pub random_move_probability: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: 2.0,
            max_root_visits: MAX_ROOT_VISITS,
            first_turn_budget: Duration::from_millis(995),
            turn_budget: Duration::from_millis(95),
            random_move_probability: 0.0,
        }
    }
}

impl MctsConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            first_turn_budget: Duration::from_millis(50),
            turn_budget: Duration::from_millis(10),
            ..Self::default()
        }
    }

    /// Time limit matching this config's budgets.
    pub fn time_budget(&self) -> TimeBudget {
        TimeBudget::new(self.first_turn_budget, self.turn_budget)
    }

    pub fn with_exploration(mut self, c: f32) -> Self {
        self.exploration = c;
        self
    }

    pub fn with_max_root_visits(mut self, visits: u32) -> Self {
        self.max_root_visits = visits;
        self
    }

    /// Builder pattern: set both wall-clock budgets.
    pub fn with_budgets(mut self, first_turn: Duration, turn: Duration) -> Self {
        self.first_turn_budget = first_turn;
        self.turn_budget = turn;
        self
    }

    pub fn with_random_move_probability(mut self, p: f32) -> Self {
        self.random_move_probability = p;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert!((config.exploration - 2.0).abs() < 1e-6);
        assert_eq!(config.max_root_visits, 16_777_214);
        assert_eq!(config.first_turn_budget, Duration::from_millis(995));
        assert_eq!(config.turn_budget, Duration::from_millis(95));
        assert_eq!(config.random_move_probability, 0.0);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_exploration(1.0)
            .with_max_root_visits(500)
            .with_budgets(Duration::from_millis(20), Duration::from_millis(5));

        assert!((config.exploration - 1.0).abs() < 1e-6);
        assert_eq!(config.max_root_visits, 500);
        assert_eq!(config.time_budget().first_turn, Duration::from_millis(20));
        assert_eq!(config.time_budget().turn, Duration::from_millis(5));
    }

    #[test]
    fn test_testing_config_is_faster() {
        let config = MctsConfig::for_testing();
        assert!(config.first_turn_budget < MctsConfig::default().first_turn_budget);
        assert!(config.turn_budget <= config.first_turn_budget);
    }
}
