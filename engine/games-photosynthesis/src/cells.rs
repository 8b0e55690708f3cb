//! Bitmask over the 37 board cells.
//!
//! Every set-like property of a position (occupancy per size class,
//! ownership, dormancy, arid cells, shadows) is a [`CellSet`]. Iteration is
//! always lowest-index-first so move generation is reproducible.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Sub, SubAssign};

/// Number of cells on the board.
pub const CELL_COUNT: usize = 37;

/// A set of cell indices stored as the low 37 bits of a `u64`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellSet(u64);

impl CellSet {
    pub const EMPTY: CellSet = CellSet(0);
    pub const ALL: CellSet = CellSet((1u64 << CELL_COUNT) - 1);

    /// Build a set from raw bits. Bits above the board are dropped.
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        CellSet(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Set holding only `cell`. Out-of-range cells give the empty set.
    #[inline]
    pub const fn single(cell: u8) -> Self {
        if (cell as usize) < CELL_COUNT {
            CellSet(1u64 << cell)
        } else {
            Self::EMPTY
        }
    }

    #[inline]
    pub const fn contains(self, cell: u8) -> bool {
        (cell as usize) < CELL_COUNT && self.0 & (1u64 << cell) != 0
    }

    #[inline]
    pub const fn with(self, cell: u8) -> Self {
        CellSet(self.0 | Self::single(cell).0)
    }

    #[inline]
    pub const fn without(self, cell: u8) -> Self {
        CellSet(self.0 & !Self::single(cell).0)
    }

    #[inline]
    pub fn insert(&mut self, cell: u8) {
        *self = self.with(cell);
    }

    #[inline]
    pub fn remove(&mut self, cell: u8) {
        *self = self.without(cell);
    }

    #[inline]
    pub const fn union(self, other: CellSet) -> Self {
        CellSet(self.0 | other.0)
    }

    #[inline]
    pub const fn intersection(self, other: CellSet) -> Self {
        CellSet(self.0 & other.0)
    }

    #[inline]
    pub const fn difference(self, other: CellSet) -> Self {
        CellSet(self.0 & !other.0)
    }

    /// Cells not in the set, restricted to the board.
    #[inline]
    pub const fn complement(self) -> Self {
        CellSet(!self.0 & Self::ALL.0)
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Lowest cell in the set.
    #[inline]
    pub const fn first(self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as u8)
        }
    }

    #[inline]
    pub fn iter(self) -> Cells {
        Cells(self.0)
    }
}

/// Iterator over the cells of a [`CellSet`], lowest index first.
#[derive(Debug, Clone)]
pub struct Cells(u64);

impl Iterator for Cells {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<u8> {
        if self.0 == 0 {
            return None;
        }
        let cell = self.0.trailing_zeros() as u8;
        self.0 &= self.0 - 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Cells {}

impl IntoIterator for CellSet {
    type Item = u8;
    type IntoIter = Cells;

    fn into_iter(self) -> Cells {
        self.iter()
    }
}

impl FromIterator<u8> for CellSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        iter.into_iter().fold(CellSet::EMPTY, CellSet::with)
    }
}

impl BitOr for CellSet {
    type Output = CellSet;
    fn bitor(self, rhs: CellSet) -> CellSet {
        self.union(rhs)
    }
}

impl BitOrAssign for CellSet {
    fn bitor_assign(&mut self, rhs: CellSet) {
        *self = self.union(rhs);
    }
}

impl BitAnd for CellSet {
    type Output = CellSet;
    fn bitand(self, rhs: CellSet) -> CellSet {
        self.intersection(rhs)
    }
}

impl BitAndAssign for CellSet {
    fn bitand_assign(&mut self, rhs: CellSet) {
        *self = self.intersection(rhs);
    }
}

impl Sub for CellSet {
    type Output = CellSet;
    fn sub(self, rhs: CellSet) -> CellSet {
        self.difference(rhs)
    }
}

impl SubAssign for CellSet {
    fn sub_assign(&mut self, rhs: CellSet) {
        *self = self.difference(rhs);
    }
}

impl Not for CellSet {
    type Output = CellSet;
    fn not(self) -> CellSet {
        self.complement()
    }
}

impl fmt::Debug for CellSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
