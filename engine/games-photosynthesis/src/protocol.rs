//! Line-based referee protocol.
//!
//! The reading side turns the referee's text into a [`State`] seen from the
//! bot's own seat: "mine" is always player 0. The writing side renders a
//! state for either seat, which lets a local referee drive bots through the
//! exact same text they would receive in a real match.
//!
//! Board setup:
//!
//! ```text
//! 37
//! <index> <richness> <n0> <n1> <n2> <n3> <n4> <n5>    (x37)
//! ```
//!
//! Each turn:
//!
//! ```text
//! <day>
//! <nutrients>
//! <mySun> <myScore>
//! <oppSun> <oppScore> <oppIsWaiting>
//! <treeCount>
//! <index> <size> <isMine> <isDormant>                 (x treeCount)
//! <actionCount>
//! <action>                                            (x actionCount)
//! ```

use std::io::{BufRead, Write};
use std::str::FromStr;

use thiserror::Error;

use crate::board::{neighbor_row, richness, MAX_SIZE};
use crate::cells::{CellSet, CELL_COUNT};
use crate::error::EngineError;
use crate::movegen::MoveFilter;
use crate::state::State;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input ended while reading {0}")]
    Eof(&'static str),

    #[error("malformed {what}: {line:?}")]
    Malformed { what: &'static str, line: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One parsed turn.
#[derive(Debug, Clone)]
pub struct TurnInput {
    /// Position with the reading bot as player 0.
    pub state: State,
    /// Action lines as the referee listed them.
    pub actions: Vec<String>,
}

/// Reads whitespace-separated fields line by line.
struct Lines<'a, R> {
    input: &'a mut R,
    buf: String,
}

impl<'a, R: BufRead> Lines<'a, R> {
    fn new(input: &'a mut R) -> Self {
        Self {
            input,
            buf: String::new(),
        }
    }

    fn next_line(&mut self, what: &'static str) -> Result<&str, ProtocolError> {
        self.buf.clear();
        if self.input.read_line(&mut self.buf)? == 0 {
            return Err(ProtocolError::Eof(what));
        }
        Ok(self.buf.trim_end_matches(['\r', '\n']))
    }

    fn fields<T: FromStr, const N: usize>(
        &mut self,
        what: &'static str,
    ) -> Result<[T; N], ProtocolError> {
        let line = self.next_line(what)?;
        let malformed = || ProtocolError::Malformed {
            what,
            line: line.to_string(),
        };
        let mut words = line.split_whitespace();
        let mut values = Vec::with_capacity(N);
        for _ in 0..N {
            let value = words
                .next()
                .ok_or_else(malformed)?
                .parse::<T>()
                .map_err(|_| malformed())?;
            values.push(value);
        }
        values.try_into().map_err(|_| malformed())
    }

    fn field<T: FromStr>(&mut self, what: &'static str) -> Result<T, ProtocolError> {
        let [value] = self.fields::<T, 1>(what)?;
        Ok(value)
    }
}

fn flag(value: u8, what: &'static str) -> Result<bool, ProtocolError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ProtocolError::Malformed {
            what,
            line: value.to_string(),
        }),
    }
}

/// Read the board description and return the arid cells (richness 0).
pub fn read_board<R: BufRead>(input: &mut R) -> Result<CellSet, ProtocolError> {
    let mut lines = Lines::new(input);
    let count: usize = lines.field("cell count")?;

    let mut arid = CellSet::EMPTY;
    for _ in 0..count {
        let [index, richness, ..] = lines.fields::<i16, 8>("cell")?;
        if index < 0 || index as usize >= CELL_COUNT {
            return Err(ProtocolError::Malformed {
                what: "cell index",
                line: index.to_string(),
            });
        }
        if richness == 0 {
            arid.insert(index as u8);
        }
    }
    Ok(arid)
}

/// Read one turn. The listed actions are kept but not interpreted; use
/// [`validate_action_count`] to cross-check them against the generator.
pub fn read_turn<R: BufRead>(input: &mut R) -> Result<TurnInput, ProtocolError> {
    let mut lines = Lines::new(input);
    let mut state = State::new();

    state.set_day(lines.field("day")?);
    state.set_nutrients(lines.field("nutrients")?);

    let [sun, score] = lines.fields::<u8, 2>("own sun and score")?;
    state.set_sun(0, sun);
    state.set_score(0, score);

    let [sun, score, waiting] = lines.fields::<u8, 3>("opponent sun, score and waiting")?;
    state.set_sun(1, sun);
    state.set_score(1, score);
    state.set_waiting(1, flag(waiting, "opponent waiting flag")?);

    let tree_count: usize = lines.field("tree count")?;
    for _ in 0..tree_count {
        let [cell, size, mine, dormant] = lines.fields::<u8, 4>("tree")?;
        if size > MAX_SIZE {
            return Err(ProtocolError::Malformed {
                what: "tree size",
                line: size.to_string(),
            });
        }
        let owner = if flag(mine, "tree owner flag")? { 0 } else { 1 };
        state.place_tree(cell, size, owner, flag(dormant, "tree dormant flag")?)?;
    }

    let action_count: usize = lines.field("action count")?;
    let mut actions = Vec::with_capacity(action_count);
    for _ in 0..action_count {
        actions.push(lines.next_line("action")?.to_string());
    }

    Ok(TurnInput { state, actions })
}

/// Check that our generator produces as many actions for player 0 as the
/// referee listed.
pub fn validate_action_count(
    state: &State,
    arid: CellSet,
    reported: usize,
) -> Result<(), EngineError> {
    let generated = state.count_actions(0, arid, MoveFilter::unblocked());
    if generated != reported {
        return Err(EngineError::ActionCountMismatch {
            reported,
            generated,
        });
    }
    Ok(())
}

/// Richness number the referee prints for a cell: 0 arid, 1 outer, 2
/// middle, 3 inner.
pub fn protocol_richness(cell: u8, arid: CellSet) -> u8 {
    if arid.contains(cell) {
        0
    } else {
        richness(cell) / 2 + 1
    }
}

pub fn write_board<W: Write>(out: &mut W, arid: CellSet) -> std::io::Result<()> {
    writeln!(out, "{CELL_COUNT}")?;
    for cell in 0..CELL_COUNT as u8 {
        write!(out, "{} {}", cell, protocol_richness(cell, arid))?;
        for n in neighbor_row(cell) {
            write!(out, " {n}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Render `state` as the turn text `player` would receive.
pub fn write_turn<W: Write>(
    out: &mut W,
    state: &State,
    arid: CellSet,
    player: usize,
) -> std::io::Result<()> {
    let other = 1 - player;
    writeln!(out, "{}", state.day())?;
    writeln!(out, "{}", state.nutrients())?;
    writeln!(out, "{} {}", state.sun(player), state.score(player))?;
    writeln!(
        out,
        "{} {} {}",
        state.sun(other),
        state.score(other),
        u8::from(state.is_waiting(other))
    )?;

    writeln!(out, "{}", state.all_trees().len())?;
    let mine = state.owned(player);
    for size in 0..=MAX_SIZE {
        for cell in state.trees(size) {
            writeln!(
                out,
                "{} {} {} {}",
                cell,
                size,
                u8::from(mine.contains(cell)),
                u8::from(state.dormant().contains(cell))
            )?;
        }
    }

    let actions = state.legal_actions(player, arid, MoveFilter::unblocked());
    writeln!(out, "{}", actions.len())?;
    for action in actions {
        writeln!(out, "{action}")?;
    }
    Ok(())
}
