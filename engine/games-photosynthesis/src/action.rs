//! Player actions and their text/bit encodings.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::cells::CELL_COUNT;

/// One player decision for the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Pass for the rest of the day (the idle action).
    Wait,
    /// Grow the tree on a cell by one size.
    Grow(u8),
    /// Harvest a size-3 tree for points.
    Complete(u8),
    /// Throw a seed from `source` onto the empty cell `target`.
    Seed { source: u8, target: u8 },
}

const KIND_WAIT: u16 = 0;
const KIND_GROW: u16 = 1;
const KIND_COMPLETE: u16 = 2;
const KIND_SEED: u16 = 3;

impl Action {
    /// Pack into 14 bits: kind in bits 0-1, first cell in 2-7, second in 8-13.
    pub fn to_bits(self) -> u16 {
        match self {
            Action::Wait => KIND_WAIT,
            Action::Grow(cell) => KIND_GROW | (cell as u16) << 2,
            Action::Complete(cell) => KIND_COMPLETE | (cell as u16) << 2,
            Action::Seed { source, target } => {
                KIND_SEED | (source as u16) << 2 | (target as u16) << 8
            }
        }
    }

    /// Inverse of [`Action::to_bits`]. Rejects unknown kinds and off-board cells.
    pub fn from_bits(bits: u16) -> Option<Action> {
        let a = ((bits >> 2) & 0x3F) as u8;
        let b = ((bits >> 8) & 0x3F) as u8;
        if bits >> 14 != 0 || a as usize >= CELL_COUNT || b as usize >= CELL_COUNT {
            return None;
        }
        match bits & 0b11 {
            KIND_WAIT if a == 0 && b == 0 => Some(Action::Wait),
            KIND_GROW if b == 0 => Some(Action::Grow(a)),
            KIND_COMPLETE if b == 0 => Some(Action::Complete(a)),
            KIND_SEED => Some(Action::Seed {
                source: a,
                target: b,
            }),
            _ => None,
        }
    }

    #[inline]
    pub fn is_wait(self) -> bool {
        matches!(self, Action::Wait)
    }

    #[inline]
    pub fn is_seed(self) -> bool {
        matches!(self, Action::Seed { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Wait => write!(f, "WAIT"),
            Action::Grow(cell) => write!(f, "GROW {cell}"),
            Action::Complete(cell) => write!(f, "COMPLETE {cell}"),
            Action::Seed { source, target } => write!(f, "SEED {source} {target}"),
        }
    }
}

/// Error returned when an action line cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable action: {0:?}")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseActionError(s.to_string());
        let mut words = s.split_whitespace();
        let keyword = words.next().ok_or_else(err)?;
        let mut cell = || -> Result<u8, ParseActionError> {
            let value: u8 = words.next().ok_or_else(err)?.parse().map_err(|_| err())?;
            if value as usize >= CELL_COUNT {
                return Err(err());
            }
            Ok(value)
        };

        // Anything after the action's own arguments is a free-form message.
        let action = match keyword {
            "WAIT" => Action::Wait,
            "GROW" => Action::Grow(cell()?),
            "COMPLETE" => Action::Complete(cell()?),
            "SEED" => {
                let source = cell()?;
                let target = cell()?;
                Action::Seed { source, target }
            }
            _ => return Err(err()),
        };
        Ok(action)
    }
}
