//! Match result.

use std::fmt;

use crate::state::{State, PLAYERS};

/// Winner tag as stored in training samples: 0, 1, or 2 for a tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Winner {
    Player0,
    Player1,
    Tie,
}

impl Winner {
    pub fn tag(self) -> u8 {
        match self {
            Winner::Player0 => 0,
            Winner::Player1 => 1,
            Winner::Tie => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Winner> {
        match tag {
            0 => Some(Winner::Player0),
            1 => Some(Winner::Player1),
            2 => Some(Winner::Tie),
            _ => None,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Player0 => write!(f, "player 0"),
            Winner::Player1 => write!(f, "player 1"),
            Winner::Tie => write!(f, "tie"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Score plus a third of leftover sun, per player.
    pub points: [u32; PLAYERS],
    /// Trees still standing, per player.
    pub trees: [u32; PLAYERS],
    pub winner: Winner,
}

impl Outcome {
    /// Points of player 0 minus points of player 1.
    pub fn margin(&self) -> i64 {
        self.points[0] as i64 - self.points[1] as i64
    }
}

impl State {
    /// Who is ahead: more points wins, then more trees standing.
    pub fn outcome(&self) -> Outcome {
        let points = [self.points(0), self.points(1)];
        let trees = [self.owned(0).len(), self.owned(1).len()];

        let winner = match points[0].cmp(&points[1]).then(trees[0].cmp(&trees[1])) {
            std::cmp::Ordering::Greater => Winner::Player0,
            std::cmp::Ordering::Less => Winner::Player1,
            std::cmp::Ordering::Equal => Winner::Tie,
        };

        Outcome {
            points,
            trees,
            winner,
        }
    }
}
