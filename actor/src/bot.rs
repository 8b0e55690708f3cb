//! Referee-protocol bot.
//!
//! Reads the board once, then for every turn reads the position, checks
//! that our move generator agrees with the referee's action list, searches,
//! and answers with exactly one line.

use std::io::{BufRead, Write};

use games_photosynthesis::protocol::{read_board, read_turn, validate_action_count};
use games_photosynthesis::{CellSet, EngineError, ProtocolError};
use mcts::{Evaluator, MctsSearch, SearchError, SearchLimit, SearchResult};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("failed to write action: {0}")]
    Io(#[from] std::io::Error),
}

/// A search speaking the referee protocol as player 0.
pub struct ProtocolBot<E: Evaluator, L: SearchLimit> {
    search: MctsSearch<E, L>,
    turns: u32,
}

impl<E: Evaluator, L: SearchLimit> ProtocolBot<E, L> {
    pub fn new(search: MctsSearch<E, L>) -> Self {
        Self { search, turns: 0 }
    }

    pub fn search(&self) -> &MctsSearch<E, L> {
        &self.search
    }

    /// Turns answered in the current match.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Read the board description and start a new match on it.
    pub fn begin<R: BufRead>(&mut self, input: &mut R) -> Result<CellSet, BotError> {
        let arid = read_board(input)?;
        self.search.new_match(arid);
        self.turns = 0;
        debug!(arid = arid.len(), "Board read");
        Ok(arid)
    }

    /// Answer one turn.
    pub fn play_turn<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<SearchResult, BotError> {
        let turn = read_turn(input)?;
        validate_action_count(&turn.state, self.search.arid(), turn.actions.len())?;

        let result = self.search.choose_action(&turn.state)?;
        writeln!(output, "{}", result.action)?;
        output.flush()?;
        self.turns += 1;

        debug!(
            day = turn.state.day(),
            action = %result.action,
            value = result.value,
            iterations = result.iterations,
            root_visits = result.root_visits,
            reuse = ?result.reuse,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Turn answered"
        );
        Ok(result)
    }
}

/// Play a whole match: board, then turns until the input ends.
///
/// Input ending cleanly before a turn's first line finishes the match;
/// ending anywhere else is an error.
pub fn run<R, W, E, L>(
    bot: &mut ProtocolBot<E, L>,
    input: &mut R,
    output: &mut W,
) -> Result<u32, BotError>
where
    R: BufRead,
    W: Write,
    E: Evaluator,
    L: SearchLimit,
{
    bot.begin(input)?;
    loop {
        match bot.play_turn(input, output) {
            Ok(_) => {}
            Err(BotError::Protocol(ProtocolError::Eof("day"))) => return Ok(bot.turns()),
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_photosynthesis::protocol::{write_board, write_turn};
    use games_photosynthesis::{random_start, Action, MoveFilter};
    use mcts::{MctsConfig, RolloutEvaluator, VisitBudget};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::io::Cursor;

    fn bot(seed: u64) -> ProtocolBot<RolloutEvaluator, VisitBudget> {
        ProtocolBot::new(MctsSearch::new(
            MctsConfig::for_testing(),
            RolloutEvaluator::new(),
            VisitBudget::new(50),
            ChaCha20Rng::seed_from_u64(seed),
        ))
    }

    #[test]
    fn test_answers_each_turn_with_one_legal_line() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let (state, arid) = random_start(&mut rng);

        let mut input = Vec::new();
        write_board(&mut input, arid).unwrap();
        write_turn(&mut input, &state, arid, 0).unwrap();

        let mut bot = bot(1);
        let mut output = Vec::new();
        let turns = run(&mut bot, &mut Cursor::new(input), &mut output).unwrap();
        assert_eq!(turns, 1);
        assert_eq!(bot.search().arid(), arid);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 1);
        let action: Action = text.trim_end().parse().unwrap();
        assert!(state
            .legal_actions(0, arid, MoveFilter::unblocked())
            .contains(&action));
    }

    #[test]
    fn test_action_count_mismatch_is_fatal() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let (state, arid) = random_start(&mut rng);
        let listed = state.legal_actions(0, arid, MoveFilter::unblocked()).len();

        let mut turn = Vec::new();
        write_turn(&mut turn, &state, arid, 0).unwrap();
        let text = String::from_utf8(turn).unwrap();

        // Drop the last listed action and lower the count to match.
        let mut lines: Vec<String> = text.lines().map(String::from).collect();
        let count_at = lines.len() - listed - 1;
        lines[count_at] = (listed - 1).to_string();
        lines.pop();

        let mut input = Vec::new();
        write_board(&mut input, arid).unwrap();
        input.extend_from_slice((lines.join("\n") + "\n").as_bytes());

        let err = run(&mut bot(2), &mut Cursor::new(input), &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            BotError::Engine(EngineError::ActionCountMismatch { .. })
        ));
    }

    #[test]
    fn test_truncated_turn_is_an_error() {
        let mut input = Vec::new();
        write_board(&mut input, CellSet::EMPTY).unwrap();
        input.extend_from_slice(b"0\n20\n");

        let err = run(&mut bot(5), &mut Cursor::new(input), &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            BotError::Protocol(ProtocolError::Eof("own sun and score"))
        ));
    }
}
