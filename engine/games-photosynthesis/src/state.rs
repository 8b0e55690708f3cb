//! Game state and the day transition.
//!
//! Both players act "at once" each day but the engine receives their actions
//! one after the other. The first action of a day is applied immediately and
//! remembered in a pending slot together with the nutrient level at that
//! moment. When the second player answers:
//!
//! - a completion is paid from the remembered nutrient level, not the level
//!   the first player's own completion may have lowered;
//! - a seed thrown onto the very cell the first player just seeded is a
//!   collision: the first seed is taken back and refunded, the second player
//!   pays nothing, and both source trees stay dormant for the day.
//!
//! Counters are `u8`. Additions wrap; a well-formed match never gets near 255.

use crate::action::Action;
use crate::board::{richness, seed_destinations, shadow, DIRECTIONS, MAX_SIZE};
use crate::cells::{CellSet, CELL_COUNT};
use crate::error::EngineError;
use crate::invariant;

/// Number of players.
pub const PLAYERS: usize = 2;

/// Day index at which the match is over.
pub const TERMINAL_DAY: u8 = 24;

/// Nutrient pool at the start of a match.
pub const START_NUTRIENTS: u8 = 20;

/// Sun cost of completing a size-3 tree.
pub const COMPLETE_COST: u8 = 4;

const SIZES: usize = MAX_SIZE as usize + 1;

/// First action of the day, remembered until the second player acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub action: Action,
    /// Nutrient pool before the first action was applied.
    pub nutrients: u8,
    /// Sun the first player paid if the action was a seed.
    pub seed_cost: u8,
}

/// One position. Cheap to copy; search nodes own their own copies.
#[derive(Debug, Clone, Copy)]
pub struct State {
    pub(crate) trees: [CellSet; SIZES],
    pub(crate) owner: [CellSet; PLAYERS],
    pub(crate) dormant: CellSet,
    pub(crate) waiting: [bool; PLAYERS],
    pub(crate) day: u8,
    pub(crate) nutrients: u8,
    pub(crate) sun: [u8; PLAYERS],
    pub(crate) score: [u8; PLAYERS],
    pub(crate) pending: Option<Pending>,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// Two positions are equal when everything a player can observe matches.
/// The day counter and the pending slot are not compared.
impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.trees == other.trees
            && self.dormant == other.dormant
            && self.owner == other.owner
            && self.score == other.score
            && self.sun == other.sun
            && self.waiting == other.waiting
            && self.nutrients == other.nutrients
    }
}

impl Eq for State {}

#[inline]
fn on_board(cell: u8) -> Result<CellSet, EngineError> {
    invariant!((cell as usize) < CELL_COUNT);
    Ok(CellSet::single(cell))
}

/// Fixed part of the cost of growing a tree into `size`: 1, 3, 7.
#[inline]
pub fn grow_fixed_cost(size: u8) -> u32 {
    (1u32 << size) - 1
}

impl State {
    /// Empty board on day 0 with a full nutrient pool.
    pub fn new() -> Self {
        Self {
            trees: [CellSet::EMPTY; SIZES],
            owner: [CellSet::EMPTY; PLAYERS],
            dormant: CellSet::EMPTY,
            waiting: [false; PLAYERS],
            day: 0,
            nutrients: START_NUTRIENTS,
            sun: [0; PLAYERS],
            score: [0; PLAYERS],
            pending: None,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[inline]
    pub fn day(&self) -> u8 {
        self.day
    }

    #[inline]
    pub fn nutrients(&self) -> u8 {
        self.nutrients
    }

    #[inline]
    pub fn sun(&self, player: usize) -> u8 {
        self.sun[player]
    }

    #[inline]
    pub fn score(&self, player: usize) -> u8 {
        self.score[player]
    }

    #[inline]
    pub fn is_waiting(&self, player: usize) -> bool {
        self.waiting[player]
    }

    #[inline]
    pub fn dormant(&self) -> CellSet {
        self.dormant
    }

    #[inline]
    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    /// All trees of one size class, both players.
    #[inline]
    pub fn trees(&self, size: u8) -> CellSet {
        self.trees[size as usize]
    }

    /// Every occupied cell.
    #[inline]
    pub fn all_trees(&self) -> CellSet {
        self.trees.iter().fold(CellSet::EMPTY, |acc, &t| acc | t)
    }

    /// Every tree `player` owns.
    #[inline]
    pub fn owned(&self, player: usize) -> CellSet {
        self.owner[player]
    }

    #[inline]
    pub fn player_trees(&self, player: usize, size: u8) -> CellSet {
        self.trees[size as usize] & self.owner[player]
    }

    #[inline]
    pub fn tree_count(&self, player: usize, size: u8) -> u32 {
        self.player_trees(player, size).len()
    }

    /// Size of the tree on `cell`, if any.
    pub fn size_at(&self, cell: u8) -> Option<u8> {
        (0..=MAX_SIZE).find(|&s| self.trees[s as usize].contains(cell))
    }

    /// Owner of the tree on `cell`, if any.
    pub fn owner_at(&self, cell: u8) -> Option<usize> {
        (0..PLAYERS).find(|&p| self.owner[p].contains(cell))
    }

    /// Sun needed for `player` to grow a tree currently of `size`.
    pub fn grow_cost(&self, player: usize, size: u8) -> u32 {
        self.tree_count(player, size + 1) + grow_fixed_cost(size + 1)
    }

    /// Sun needed for `player` to plant one more seed.
    pub fn seed_cost(&self, player: usize) -> u32 {
        self.tree_count(player, 0)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.day >= TERMINAL_DAY
    }

    /// Who acts next. Player 0 leads each day; once one side waits the other
    /// keeps the turn, and a pending first action hands the turn to player 1.
    pub fn next_player(&self) -> usize {
        if self.waiting[0] {
            1
        } else if self.waiting[1] {
            0
        } else if self.pending.is_some() {
            1
        } else {
            0
        }
    }

    /// Final standing of `player`: score plus a third of leftover sun.
    pub fn points(&self, player: usize) -> u32 {
        self.score[player] as u32 + self.sun[player] as u32 / 3
    }

    // ------------------------------------------------------------------
    // Setup (protocol input, match setup, tests)
    // ------------------------------------------------------------------

    pub fn set_day(&mut self, day: u8) {
        self.day = day;
    }

    pub fn set_nutrients(&mut self, nutrients: u8) {
        self.nutrients = nutrients;
    }

    pub fn set_sun(&mut self, player: usize, sun: u8) {
        self.sun[player] = sun;
    }

    pub fn set_score(&mut self, player: usize, score: u8) {
        self.score[player] = score;
    }

    pub fn set_waiting(&mut self, player: usize, waiting: bool) {
        self.waiting[player] = waiting;
    }

    /// Put a tree on an empty cell.
    pub fn place_tree(
        &mut self,
        cell: u8,
        size: u8,
        player: usize,
        dormant: bool,
    ) -> Result<(), EngineError> {
        let bit = on_board(cell)?;
        invariant!(size <= MAX_SIZE);
        invariant!(player < PLAYERS);
        invariant!(!self.all_trees().contains(cell));

        self.trees[size as usize] |= bit;
        self.owner[player] |= bit;
        if dormant {
            self.dormant |= bit;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transition
    // ------------------------------------------------------------------

    /// Copy of this state with `action` applied for `player`.
    pub fn after(&self, player: usize, action: Action, arid: CellSet) -> Result<State, EngineError> {
        let mut next = *self;
        next.apply(player, action, arid)?;
        Ok(next)
    }

    /// Apply one action. Any illegal input is an invariant violation and
    /// leaves the state unspecified.
    pub fn apply(&mut self, player: usize, action: Action, arid: CellSet) -> Result<(), EngineError> {
        invariant!(player < PLAYERS);
        invariant!(player == self.next_player());
        invariant!(self.day < TERMINAL_DAY);

        let first = self.pending.take();
        if let Some(first) = first {
            invariant!(player == 1);
            if let (
                Action::Seed {
                    target: planted, ..
                },
                Action::Seed { source, target },
            ) = (first.action, action)
            {
                if planted == target {
                    return self.seed_collision(source, target, first.seed_cost, arid);
                }
            }
        } else if player == 0 && !self.waiting[1] {
            self.pending = Some(Pending {
                action,
                nutrients: self.nutrients,
                seed_cost: 0,
            });
        }

        match action {
            Action::Wait => {
                self.waiting[player] = true;
                if self.waiting[1 - player] {
                    self.end_day();
                }
            }
            Action::Grow(cell) => self.grow(player, cell)?,
            Action::Complete(cell) => {
                let nutrients = first.map_or(self.nutrients, |f| f.nutrients);
                self.complete(player, cell, nutrients, arid)?;
            }
            Action::Seed { source, target } => {
                let cost = self.seed(player, source, target, arid)?;
                if let Some(pending) = self.pending.as_mut() {
                    pending.seed_cost = cost;
                }
            }
        }
        Ok(())
    }

    /// Size of `player`'s awake tree on `cell`.
    fn active_tree(&self, player: usize, cell: u8) -> Result<u8, EngineError> {
        on_board(cell)?;
        invariant!(self.owner[player].contains(cell));
        invariant!(!self.dormant.contains(cell));
        self.size_at(cell)
            .ok_or_else(|| invariant!(@violation "owned cell holds a tree"))
    }

    fn grow(&mut self, player: usize, cell: u8) -> Result<(), EngineError> {
        let size = self.active_tree(player, cell)?;
        invariant!(size < MAX_SIZE);
        let cost = self.grow_cost(player, size);
        invariant!(self.sun[player] as u32 >= cost);

        let bit = CellSet::single(cell);
        self.trees[size as usize] -= bit;
        self.trees[size as usize + 1] |= bit;
        self.dormant |= bit;
        self.sun[player] = self.sun[player].wrapping_sub(cost as u8);
        Ok(())
    }

    fn complete(
        &mut self,
        player: usize,
        cell: u8,
        nutrients: u8,
        arid: CellSet,
    ) -> Result<(), EngineError> {
        let size = self.active_tree(player, cell)?;
        invariant!(size == MAX_SIZE);
        invariant!(self.sun[player] >= COMPLETE_COST);

        let bonus = if arid.contains(cell) { 0 } else { richness(cell) };
        let bit = CellSet::single(cell);
        self.trees[MAX_SIZE as usize] -= bit;
        self.owner[player] -= bit;
        self.sun[player] = self.sun[player].wrapping_sub(COMPLETE_COST);
        self.score[player] = self.score[player].wrapping_add(nutrients.wrapping_add(bonus));
        self.nutrients = self.nutrients.saturating_sub(1);
        Ok(())
    }

    fn seed(
        &mut self,
        player: usize,
        source: u8,
        target: u8,
        arid: CellSet,
    ) -> Result<u8, EngineError> {
        let size = self.active_tree(player, source)?;
        invariant!(size > 0);
        let cost = self.seed_cost(player);
        invariant!(self.sun[player] as u32 >= cost);
        let seed = on_board(target)?;
        invariant!(!self.all_trees().contains(target));
        invariant!(!arid.contains(target));
        invariant!(seed_destinations(size, source).contains(target));

        self.trees[0] |= seed;
        self.owner[player] |= seed;
        self.dormant |= seed | CellSet::single(source);
        self.sun[player] = self.sun[player].wrapping_sub(cost as u8);
        Ok(cost as u8)
    }

    /// Player 1 seeded onto the cell player 0 seeded this day.
    fn seed_collision(
        &mut self,
        source: u8,
        target: u8,
        refund: u8,
        arid: CellSet,
    ) -> Result<(), EngineError> {
        let size = self.active_tree(1, source)?;
        invariant!(size > 0);
        invariant!(self.sun[1] as u32 >= self.seed_cost(1));
        invariant!(self.size_at(target) == Some(0));
        invariant!(self.owner[0].contains(target));
        invariant!(!arid.contains(target));
        invariant!(seed_destinations(size, source).contains(target));

        let seed = CellSet::single(target);
        self.trees[0] -= seed;
        self.owner[0] -= seed;
        self.dormant -= seed;
        self.dormant |= CellSet::single(source);
        self.sun[0] = self.sun[0].wrapping_add(refund);
        Ok(())
    }

    /// Advance the day. Income is paid for every day but the last: light
    /// comes from `new_day % 6`, and a tree of size `s` earns `s` sun unless
    /// it stands in the shadow of a tree of size `s` or taller.
    pub(crate) fn end_day(&mut self) {
        let next_day = self.day.wrapping_add(1);
        self.waiting = [false; PLAYERS];

        if self.day < TERMINAL_DAY - 1 {
            let direction = next_day as usize % DIRECTIONS;
            let mut shaded = CellSet::EMPTY;
            let mut income = [0u32; PLAYERS];

            for size in (1..=MAX_SIZE).rev() {
                for cell in self.trees[size as usize] {
                    shaded |= shadow(direction, size, cell);
                }
                for (player, earned) in income.iter_mut().enumerate() {
                    *earned += (self.player_trees(player, size) - shaded).len() * size as u32;
                }
            }

            for (sun, earned) in self.sun.iter_mut().zip(income) {
                *sun = sun.wrapping_add(earned as u8);
            }
            self.dormant = CellSet::EMPTY;
        }

        self.day = next_day;
    }
}
