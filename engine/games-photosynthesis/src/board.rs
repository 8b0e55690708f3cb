//! Board topology.
//!
//! The board is a hexagon of 37 cells in three rings around the centre:
//!
//! ```text
//! cell  0        centre      richness 4
//! cells 1..=6    inner ring  richness 4
//! cells 7..=18   middle ring richness 2
//! cells 19..=36  outer ring  richness 0
//! ```
//!
//! Directions are numbered 0..6 clockwise starting east; direction `d` and
//! `(d + 3) % 6` are opposite. Every derived table (shadows, seed ranges) is
//! computed at compile time from the adjacency table.

use crate::cells::{CellSet, CELL_COUNT};

/// Number of hex directions.
pub const DIRECTIONS: usize = 6;

/// Largest tree size. Sizes run 0 (seed) ..= 3.
pub const MAX_SIZE: u8 = 3;

const NO_NEIGHBOR: i8 = -1;

#[rustfmt::skip]
const NEIGHBORS: [[i8; DIRECTIONS]; CELL_COUNT] = [
    [1, 2, 3, 4, 5, 6],
    [7, 8, 2, 0, 6, 18],
    [8, 9, 10, 3, 0, 1],
    [2, 10, 11, 12, 4, 0],
    [0, 3, 12, 13, 14, 5],
    [6, 0, 4, 14, 15, 16],
    [18, 1, 0, 5, 16, 17],
    [19, 20, 8, 1, 18, 36],
    [20, 21, 9, 2, 1, 7],
    [21, 22, 23, 10, 2, 8],
    [9, 23, 24, 11, 3, 2],
    [10, 24, 25, 26, 12, 3],
    [3, 11, 26, 27, 13, 4],
    [4, 12, 27, 28, 29, 14],
    [5, 4, 13, 29, 30, 15],
    [16, 5, 14, 30, 31, 32],
    [17, 6, 5, 15, 32, 33],
    [35, 18, 6, 16, 33, 34],
    [36, 7, 1, 6, 17, 35],
    [-1, -1, 20, 7, 36, -1],
    [-1, -1, 21, 8, 7, 19],
    [-1, -1, 22, 9, 8, 20],
    [-1, -1, -1, 23, 9, 21],
    [22, -1, -1, 24, 10, 9],
    [23, -1, -1, 25, 11, 10],
    [24, -1, -1, -1, 26, 11],
    [11, 25, -1, -1, 27, 12],
    [12, 26, -1, -1, 28, 13],
    [13, 27, -1, -1, -1, 29],
    [14, 13, 28, -1, -1, 30],
    [15, 14, 29, -1, -1, 31],
    [32, 15, 30, -1, -1, -1],
    [33, 16, 15, 31, -1, -1],
    [34, 17, 16, 32, -1, -1],
    [-1, 35, 17, 33, -1, -1],
    [-1, 36, 18, 17, 34, -1],
    [-1, 19, 7, 18, 35, -1],
];

#[rustfmt::skip]
const OPPOSITE: [u8; CELL_COUNT] = [
    0, 4, 5, 6, 1, 2, 3,
    13, 14, 15, 16, 17, 18, 7, 8, 9, 10, 11, 12,
    28, 29, 30, 31, 32, 33, 34, 35, 36, 19, 20, 21, 22, 23, 24, 25, 26, 27,
];

const fn ring_richness(cell: usize) -> u8 {
    if cell <= 6 {
        4
    } else if cell <= 18 {
        2
    } else {
        0
    }
}

const fn build_shadows() -> [[[CellSet; CELL_COUNT]; MAX_SIZE as usize]; DIRECTIONS] {
    let mut table = [[[CellSet::EMPTY; CELL_COUNT]; MAX_SIZE as usize]; DIRECTIONS];
    let mut dir = 0;
    while dir < DIRECTIONS {
        let mut size = 1;
        while size <= MAX_SIZE as usize {
            let mut origin = 0;
            while origin < CELL_COUNT {
                let mut set = CellSet::EMPTY;
                let mut current = origin;
                let mut step = 0;
                while step < size {
                    let next = NEIGHBORS[current][dir];
                    if next == NO_NEIGHBOR {
                        break;
                    }
                    current = next as usize;
                    set = set.with(current as u8);
                    step += 1;
                }
                table[dir][size - 1][origin] = set;
                origin += 1;
            }
            size += 1;
        }
        dir += 1;
    }
    table
}

const fn build_seed_blocks() -> [CellSet; CELL_COUNT] {
    let mut table = [CellSet::EMPTY; CELL_COUNT];
    let mut cell = 0;
    while cell < CELL_COUNT {
        let mut set = CellSet::single(cell as u8);
        let mut dir = 0;
        while dir < DIRECTIONS {
            let n = NEIGHBORS[cell][dir];
            if n != NO_NEIGHBOR {
                set = set.with(n as u8);
            }
            dir += 1;
        }
        table[cell] = set;
        cell += 1;
    }
    table
}

const fn build_seed_destinations() -> [[CellSet; CELL_COUNT]; MAX_SIZE as usize] {
    let mut table = [[CellSet::EMPTY; CELL_COUNT]; MAX_SIZE as usize];
    let mut size = 1;
    while size <= MAX_SIZE as usize {
        let mut origin = 0;
        while origin < CELL_COUNT {
            let mut reach = CellSet::single(origin as u8);
            let mut round = 0;
            while round < size {
                let mut grown = reach;
                let mut cell = 0;
                while cell < CELL_COUNT {
                    if reach.contains(cell as u8) {
                        grown = grown.union(SEED_BLOCKS[cell]);
                    }
                    cell += 1;
                }
                reach = grown;
                round += 1;
            }
            table[size - 1][origin] = reach.without(origin as u8);
            origin += 1;
        }
        size += 1;
    }
    table
}

static SHADOWS: [[[CellSet; CELL_COUNT]; MAX_SIZE as usize]; DIRECTIONS] = build_shadows();
const SEED_BLOCKS: [CellSet; CELL_COUNT] = build_seed_blocks();
static SEED_DESTINATIONS: [[CellSet; CELL_COUNT]; MAX_SIZE as usize] = build_seed_destinations();

/// Neighbour of `cell` in `direction`, if the board continues that way.
pub fn neighbor(cell: u8, direction: usize) -> Option<u8> {
    let n = *NEIGHBORS.get(cell as usize)?.get(direction)?;
    (n != NO_NEIGHBOR).then_some(n as u8)
}

/// Raw neighbour row in protocol form (`-1` for no neighbour).
pub fn neighbor_row(cell: u8) -> [i8; DIRECTIONS] {
    NEIGHBORS
        .get(cell as usize)
        .copied()
        .unwrap_or([NO_NEIGHBOR; DIRECTIONS])
}

/// Point reflection of `cell` through the centre.
pub fn opposite(cell: u8) -> u8 {
    OPPOSITE[cell as usize % CELL_COUNT]
}

/// Completion bonus of a cell by ring. Arid cells are handled by the caller.
pub fn richness(cell: u8) -> u8 {
    ring_richness(cell as usize)
}

/// Cells shadowed by a tree of `size` at `origin` when light comes from
/// `direction`. Seeds (size 0) cast no shadow.
pub fn shadow(direction: usize, size: u8, origin: u8) -> CellSet {
    if size == 0 || size > MAX_SIZE || origin as usize >= CELL_COUNT {
        return CellSet::EMPTY;
    }
    SHADOWS[direction % DIRECTIONS][size as usize - 1][origin as usize]
}

/// `cell` plus its direct neighbours.
pub fn seed_block(cell: u8) -> CellSet {
    SEED_BLOCKS
        .get(cell as usize)
        .copied()
        .unwrap_or(CellSet::EMPTY)
}

/// Cells a tree of `size` at `origin` can throw a seed to (origin excluded).
pub fn seed_destinations(size: u8, origin: u8) -> CellSet {
    if size == 0 || size > MAX_SIZE || origin as usize >= CELL_COUNT {
        return CellSet::EMPTY;
    }
    SEED_DESTINATIONS[size as usize - 1][origin as usize]
}
