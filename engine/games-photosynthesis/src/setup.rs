//! Random symmetric match setup.

use rand::Rng;
use tracing::{debug, warn};

use crate::board::opposite;
use crate::cells::{CellSet, CELL_COUNT};
use crate::state::State;

/// First cell of the outer ring. The ring runs 19..=36 in order and wraps.
const OUTER_RING_START: u8 = 19;
const OUTER_RING_LEN: i32 = 18;

/// Most arid holes a board can get.
const MAX_HOLES: u32 = 10;

/// Number of cells strictly between two outer-ring cells, going the short
/// way round. Equal cells give -1.
fn ring_gap(a: u8, b: u8) -> i32 {
    let d = (a as i32 - b as i32).abs();
    d.min(OUTER_RING_LEN - d) - 1
}

fn spread_out(cells: &[u8]) -> bool {
    cells.iter().enumerate().all(|(i, &a)| {
        cells
            .iter()
            .enumerate()
            .all(|(j, &b)| i == j || ring_gap(a, b) >= 2)
    })
}

/// Every ordered pair of outer-ring cells that can take player 0's two
/// starting trees, given the arid cells.
fn starting_placements(arid: CellSet) -> Vec<(u8, u8)> {
    let options: Vec<u8> = (OUTER_RING_START..CELL_COUNT as u8)
        .filter(|&c| !arid.contains(c))
        .collect();

    let mut placements = Vec::new();
    for &first in &options {
        for &second in &options {
            if second == first || second == opposite(first) {
                continue;
            }
            if spread_out(&[first, second, opposite(first), opposite(second)]) {
                placements.push((first, second));
            }
        }
    }
    placements
}

/// Build a starting position and its arid cells.
///
/// Holes come in mirrored pairs (the centre alone when it is drawn). Each
/// player receives two size-1 trees on the outer ring; player 1's are the
/// mirror images of player 0's, and no two starting trees are closer than
/// two empty ring cells apart.
pub fn random_start<R: Rng + ?Sized>(rng: &mut R) -> (State, CellSet) {
    let desired_holes = rng.gen_range(0..=MAX_HOLES);
    let mut arid = CellSet::EMPTY;
    let mut holes = 0;
    while holes + 1 < desired_holes {
        let cell = rng.gen_range(0..CELL_COUNT as u8);
        if arid.contains(cell) {
            continue;
        }
        arid.insert(cell);
        holes += 1;
        if cell > 0 {
            arid.insert(opposite(cell));
            holes += 1;
        }
    }

    let mut placements = starting_placements(arid);
    if placements.is_empty() {
        warn!(?arid, "no room for starting trees, clearing holes");
        arid = CellSet::EMPTY;
        placements = starting_placements(arid);
    }
    let (first, second) = placements[rng.gen_range(0..placements.len())];

    let mut state = State::new();
    let candidates = [first, second, opposite(first), opposite(second)];
    for (i, &cell) in candidates.iter().enumerate() {
        let sapling = CellSet::single(cell);
        state.trees[1] |= sapling;
        state.owner[i / 2] |= sapling;
    }

    debug!(
        holes = arid.len(),
        trees = ?state.all_trees(),
        "random start"
    );
    (state, arid)
}
