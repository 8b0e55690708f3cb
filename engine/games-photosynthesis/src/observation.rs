//! Feature vector for learned position scorers.

use crate::board::MAX_SIZE;
use crate::cells::{CellSet, CELL_COUNT};
use crate::state::State;

/// Per-cell tree, dormancy and arid planes plus seven scalars.
pub const FEATURE_COUNT: usize = 3 * CELL_COUNT + 7;

/// Position encoded from player 0's point of view.
///
/// Layout:
/// - `[0, 37)`: tree size `s` as `±0.25 * (s + 1)`, positive for player 0
/// - `[37, 74)`: `1.0` dormant, `-1.0` awake
/// - `[74, 111)`: `1.0` arid, `-1.0` fertile
/// - then day, nutrients, score and sun for each player, light phase, each
///   scaled to roughly `[-0.5, 0.5]`
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub features: [f32; FEATURE_COUNT],
}

fn plane(set: CellSet, cell: u8) -> f32 {
    if set.contains(cell) {
        1.0
    } else {
        -1.0
    }
}

impl Observation {
    pub fn from_state(state: &State, arid: CellSet) -> Self {
        let mut features = [0.0f32; FEATURE_COUNT];

        for cell in 0..CELL_COUNT as u8 {
            let i = cell as usize;
            if let Some(size) = state.size_at(cell) {
                let magnitude = 0.25 * (size as f32 + 1.0);
                features[i] = if state.owned(0).contains(cell) {
                    magnitude
                } else {
                    -magnitude
                };
            }
            features[CELL_COUNT + i] = plane(state.dormant(), cell);
            features[2 * CELL_COUNT + i] = plane(arid, cell);
        }

        let scalars = [
            state.day() as f32 / 24.0 - 0.5,
            state.nutrients() as f32 / 20.0 - 0.5,
            state.score(0) as f32 / 100.0 - 0.5,
            state.sun(0) as f32 / 40.0 - 0.5,
            state.score(1) as f32 / 100.0 - 0.5,
            state.sun(1) as f32 / 40.0 - 0.5,
            (state.day() % 6) as f32 / 5.0 - 0.5,
        ];
        features[3 * CELL_COUNT..].copy_from_slice(&scalars);

        Self { features }
    }

    /// Largest tree feature a cell can take.
    pub const MAX_TREE_FEATURE: f32 = 0.25 * (MAX_SIZE as f32 + 1.0);
}
