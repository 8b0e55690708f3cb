//! Local referee for two in-process bots.
//!
//! Both bots are driven through the same text they would receive from a
//! remote referee, each seeing itself as player 0. Player 0's answer is
//! applied before player 1's within a day; a waiting player is not asked.

use std::io::Cursor;

use games_photosynthesis::protocol::{write_board, write_turn};
use games_photosynthesis::{
    Action, CellSet, EngineError, Outcome, State, TrainingSample, PLAYERS,
};
use mcts::{Evaluator, SearchLimit, SearchStats};
use thiserror::Error;
use tracing::{debug, trace};

use crate::bot::{BotError, ProtocolBot};

#[derive(Debug, Error)]
pub enum RefereeError {
    #[error("player {player}: {source}")]
    Bot {
        player: usize,
        #[source]
        source: BotError,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One applied action and the state it was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub state: State,
    pub player: usize,
    pub action: Action,
}

/// Everything that happened in one match.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub arid: CellSet,
    pub frames: Vec<Frame>,
    pub final_state: State,
    pub outcome: Outcome,
}

impl MatchRecord {
    /// One training sample per frame, labelled with the final result.
    pub fn samples(&self) -> Vec<TrainingSample> {
        let final_points = self
            .outcome
            .points
            .map(|points| u16::try_from(points).unwrap_or(u16::MAX));
        self.frames
            .iter()
            .map(|frame| TrainingSample {
                state: frame.state,
                arid: self.arid,
                final_points,
                winner: self.outcome.winner,
            })
            .collect()
    }
}

/// Plays matches between two bots of the same kind.
pub struct Referee<E: Evaluator, L: SearchLimit> {
    bots: [ProtocolBot<E, L>; PLAYERS],
}

impl<E: Evaluator, L: SearchLimit> Referee<E, L> {
    pub fn new(player0: ProtocolBot<E, L>, player1: ProtocolBot<E, L>) -> Self {
        Self {
            bots: [player0, player1],
        }
    }

    #[cfg(test)]
    pub fn bot(&self, player: usize) -> &ProtocolBot<E, L> {
        &self.bots[player]
    }

    /// Search totals of both seats combined.
    pub fn search_stats(&self) -> SearchStats {
        let mut stats = self.bots[0].search().stats().clone();
        stats.merge(self.bots[1].search().stats());
        stats
    }

    /// Play from `start` until the last day is over.
    pub fn play(&mut self, start: State, arid: CellSet) -> Result<MatchRecord, RefereeError> {
        let mut board = Vec::new();
        write_board(&mut board, arid)?;
        for (player, bot) in self.bots.iter_mut().enumerate() {
            bot.begin(&mut Cursor::new(&board))
                .map_err(|source| RefereeError::Bot { player, source })?;
        }

        let mut state = start;
        let mut frames = Vec::new();
        while !state.is_terminal() {
            let seats = [0, 1];
            let acting = if state.is_waiting(0) || state.is_waiting(1) {
                let next = state.next_player();
                &seats[next..=next]
            } else {
                &seats[..]
            };

            // Everyone acting this step sees the same position.
            let mut answers = [Action::Wait; PLAYERS];
            for &player in acting {
                answers[player] = self.ask(player, &state, arid)?;
            }
            for &player in acting {
                let action = answers[player];
                frames.push(Frame {
                    state,
                    player,
                    action,
                });
                state.apply(player, action, arid)?;
            }
            trace!(day = state.day(), frames = frames.len(), "Step applied");
        }

        let outcome = state.outcome();
        debug!(
            winner = %outcome.winner,
            points0 = outcome.points[0],
            points1 = outcome.points[1],
            frames = frames.len(),
            "Match finished"
        );

        Ok(MatchRecord {
            arid,
            frames,
            final_state: state,
            outcome,
        })
    }

    fn ask(&mut self, player: usize, state: &State, arid: CellSet) -> Result<Action, RefereeError> {
        let mut turn = Vec::new();
        write_turn(&mut turn, state, arid, player)?;

        let mut answer = Vec::new();
        self.bots[player]
            .play_turn(&mut Cursor::new(turn), &mut answer)
            .map_err(|source| RefereeError::Bot { player, source })?;

        let text = String::from_utf8_lossy(&answer);
        let line = text.trim_end_matches(['\r', '\n']);
        line.parse::<Action>().map_err(|_| {
            RefereeError::Engine(EngineError::InvalidAction {
                player,
                text: line.to_string(),
            })
        })
    }
}
