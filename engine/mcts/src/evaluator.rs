//! Evaluator trait for position evaluation.
//!
//! An evaluator turns a leaf position into a score from player 0's point of
//! view. Two are provided: random rollouts to the end of the match, and a
//! wrapper around any scoring function over [`Observation`] features.

use games_photosynthesis::{rollout_actions, CellSet, EngineError, Observation, State};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("rollout failed: {0}")]
    Rollout(#[from] EngineError),

    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),
}

/// Trait for position evaluators.
pub trait Evaluator: Send + Sync {
    /// Score `state` for player 0. Positive favours player 0.
    fn evaluate(
        &self,
        state: &State,
        arid: CellSet,
        rng: &mut ChaCha20Rng,
    ) -> Result<f32, EvaluatorError>;
}

/// Bounded value of a final point margin (player 0 minus player 1).
///
/// A draw is worth 0. Any win is worth at least 0.5, rising linearly to 1
/// at five points; past that it only creeps upward, so a safe lead is not
/// worth gambling for a bigger one.
pub fn margin_value(margin: i64) -> f32 {
    if margin == 0 {
        return 0.0;
    }
    let diff = margin.unsigned_abs() as f32;
    let magnitude = if diff <= 5.0 {
        0.5 + 0.5 * diff / 5.0
    } else {
        1.0 + (diff - 5.0) * 0.001
    };
    magnitude.copysign(margin as f32)
}

/// Value of a finished (or abandoned) position.
pub fn outcome_value(state: &State) -> f32 {
    margin_value(state.outcome().margin())
}

/// Plays rollout-preset moves uniformly at random until the match ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolloutEvaluator;

impl RolloutEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for RolloutEvaluator {
    fn evaluate(
        &self,
        state: &State,
        arid: CellSet,
        rng: &mut ChaCha20Rng,
    ) -> Result<f32, EvaluatorError> {
        let mut g = *state;
        let mut moves = Vec::with_capacity(32);
        while !g.is_terminal() {
            rollout_actions(&g, arid, &mut moves);
            if moves.is_empty() {
                return Err(EvaluatorError::EvaluationFailed(format!(
                    "no rollout move on day {}",
                    g.day()
                )));
            }
            let action = moves[rng.gen_range(0..moves.len())];
            g.apply(g.next_player(), action, arid)?;
        }
        Ok(outcome_value(&g))
    }
}

/// Scores positions with a function over [`Observation`] features, such as
/// a trained network.
pub struct ScorerEvaluator<F> {
    scorer: F,
}

impl<F> ScorerEvaluator<F>
where
    F: Fn(&Observation) -> f32 + Send + Sync,
{
    pub fn new(scorer: F) -> Self {
        Self { scorer }
    }
}

impl<F> Evaluator for ScorerEvaluator<F>
where
    F: Fn(&Observation) -> f32 + Send + Sync,
{
    fn evaluate(
        &self,
        state: &State,
        arid: CellSet,
        _rng: &mut ChaCha20Rng,
    ) -> Result<f32, EvaluatorError> {
        if state.is_terminal() {
            return Ok(outcome_value(state));
        }
        let value = (self.scorer)(&Observation::from_state(state, arid));
        if !value.is_finite() {
            return Err(EvaluatorError::EvaluationFailed(format!(
                "scorer returned {value}"
            )));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_photosynthesis::random_start;
    use rand::SeedableRng;

    #[test]
    fn test_margin_value_is_linear_near_zero() {
        assert_eq!(margin_value(0), 0.0);
        assert!((margin_value(1) - 0.6).abs() < 1e-6);
        assert!((margin_value(5) - 1.0).abs() < 1e-6);
        assert!((margin_value(-3) + 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_narrow_win_beats_draw() {
        assert!(margin_value(1) >= 0.5);
        assert!(margin_value(-1) <= -0.5);
        // Continuous where the slope changes.
        assert!((margin_value(6) - margin_value(5)).abs() < 0.01);
        assert!((margin_value(-6) - margin_value(-5)).abs() < 0.01);
    }

    #[test]
    fn test_margin_value_saturates() {
        assert!((margin_value(6) - 1.001).abs() < 1e-6);
        assert!((margin_value(-25) + 1.02).abs() < 1e-5);
        assert!(margin_value(100) > margin_value(50));
        assert!(margin_value(100) < 1.1);
    }

    #[test]
    fn test_outcome_value_uses_sun_thirds() {
        let mut state = State::new();
        state.set_score(0, 10);
        state.set_sun(0, 8);
        state.set_score(1, 11);
        // 10 + 8/3 = 12 against 11.
        assert!((outcome_value(&state) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_rollout_reaches_a_bounded_value() {
        let evaluator = RolloutEvaluator::new();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        for _ in 0..10 {
            let (state, arid) = random_start(&mut rng);
            let value = evaluator.evaluate(&state, arid, &mut rng).unwrap();
            assert!(value.abs() < 1.2);
        }
    }

    #[test]
    fn test_rollout_is_reproducible_with_same_seed() {
        let evaluator = RolloutEvaluator::new();
        let mut setup = ChaCha20Rng::seed_from_u64(7);
        let (state, arid) = random_start(&mut setup);

        let a = evaluator
            .evaluate(&state, arid, &mut ChaCha20Rng::seed_from_u64(1))
            .unwrap();
        let b = evaluator
            .evaluate(&state, arid, &mut ChaCha20Rng::seed_from_u64(1))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scorer_sees_features() {
        let evaluator = ScorerEvaluator::new(|obs: &Observation| obs.features[0]);
        let mut state = State::new();
        state.place_tree(0, 3, 0, false).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let value = evaluator.evaluate(&state, CellSet::EMPTY, &mut rng).unwrap();
        assert!((value - Observation::MAX_TREE_FEATURE).abs() < 1e-6);
    }

    #[test]
    fn test_scorer_rejects_nan() {
        let evaluator = ScorerEvaluator::new(|_: &Observation| f32::NAN);
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let result = evaluator.evaluate(&State::new(), CellSet::EMPTY, &mut rng);
        assert!(matches!(result, Err(EvaluatorError::EvaluationFailed(_))));
    }
}
