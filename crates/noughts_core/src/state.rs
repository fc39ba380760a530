//! Authoritative game state: the board, whose turn it is, and the outcome.

use crate::error::IllegalMoveError;
use crate::invariants::{history_consistent, marks_balanced};
use crate::rules::{GameOutcome, evaluate_outcome};
use crate::types::{Board, CELL_COUNT, Cell, Mark};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Read-only copy of the board and the mark to move.
///
/// Copies are detached from the live [`BoardState`]; later moves never
/// show through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    board: Board,
    turn: Mark,
}

impl Snapshot {
    /// Creates a snapshot from explicit parts.
    pub fn new(board: Board, turn: Mark) -> Self {
        Self { board, turn }
    }

    /// Creates a snapshot whose turn is implied by the mark counts.
    pub fn from_board(board: Board) -> Self {
        let turn = if board.count(Mark::X) > board.count(Mark::O) {
            Mark::O
        } else {
            Mark::X
        };
        Self { board, turn }
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mark to move.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Outcome of the captured board.
    pub fn outcome(&self) -> GameOutcome {
        evaluate_outcome(&self.board)
    }
}

/// The single live game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    board: Board,
    current_turn: Mark,
    outcome: GameOutcome,
    /// Cell indices in the order they were played.
    history: Vec<usize>,
}

impl BoardState {
    /// Creates an empty game with X to move.
    #[instrument]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_turn: Mark::X,
            outcome: GameOutcome::InProgress,
            history: Vec::with_capacity(CELL_COUNT),
        }
    }

    /// Clears the board and hands the first move back to X.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        debug!(moves_played = self.history.len(), "Resetting board");
        *self = Self::new();
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mark to move. After a win this stays on the winner.
    pub fn current_turn(&self) -> Mark {
        self.current_turn
    }

    /// Current outcome.
    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    /// Cell indices in play order.
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    /// Re-derives the outcome from the cells alone.
    pub fn evaluate_outcome(&self) -> GameOutcome {
        evaluate_outcome(&self.board)
    }

    /// Copies the board and turn for read-only consumers.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.board, self.current_turn)
    }

    /// Places `mark` at `index`.
    ///
    /// Fails without touching state when the game is over, the index is
    /// outside 0-8, the cell is taken, or it's not `mark`'s turn. On
    /// success returns the new outcome; the turn passes to the opponent
    /// only while the game remains in progress.
    #[instrument(skip(self), fields(turn = %self.current_turn))]
    pub fn play_move(&mut self, index: usize, mark: Mark) -> Result<GameOutcome, IllegalMoveError> {
        if self.outcome.is_terminal() {
            return Err(IllegalMoveError::GameAlreadyOver);
        }
        match self.board.get(index) {
            None => return Err(IllegalMoveError::OutOfRange(index)),
            Some(Cell::Occupied(_)) => return Err(IllegalMoveError::CellOccupied(index)),
            Some(Cell::Empty) => {}
        }
        if mark != self.current_turn {
            return Err(IllegalMoveError::WrongTurn {
                attempted: mark,
                expected: self.current_turn,
            });
        }

        self.board.set(index, Cell::Occupied(mark));
        self.history.push(index);
        self.outcome = evaluate_outcome(&self.board);

        debug_assert!(marks_balanced(&self.board), "Mark balance violated");
        debug_assert!(
            history_consistent(&self.board, &self.history),
            "History disagrees with board"
        );

        if self.outcome.is_terminal() {
            info!(outcome = %self.outcome, moves = self.history.len(), "Game finished");
        } else {
            self.current_turn = mark.opponent();
        }
        debug!(index, %mark, "Move applied");

        Ok(self.outcome)
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game() {
        let state = BoardState::new();
        assert_eq!(state.current_turn(), Mark::X);
        assert_eq!(state.outcome(), GameOutcome::InProgress);
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_precondition_order() {
        let mut state = BoardState::new();
        // Out of range wins over wrong turn.
        assert_eq!(
            state.play_move(9, Mark::O),
            Err(IllegalMoveError::OutOfRange(9))
        );
        state.play_move(4, Mark::X).unwrap();
        // Occupied wins over wrong turn.
        assert_eq!(
            state.play_move(4, Mark::X),
            Err(IllegalMoveError::CellOccupied(4))
        );
        assert_eq!(
            state.play_move(0, Mark::X),
            Err(IllegalMoveError::WrongTurn {
                attempted: Mark::X,
                expected: Mark::O
            })
        );
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut state = BoardState::new();
        state.play_move(0, Mark::X).unwrap();
        let snap = state.snapshot();
        state.play_move(4, Mark::O).unwrap();

        assert!(snap.board().is_empty(4));
        assert_eq!(snap.turn(), Mark::O);
        assert_eq!(state.current_turn(), Mark::X);
    }

    #[test]
    fn test_turn_stays_on_winner() {
        let mut state = BoardState::new();
        for (i, index) in [0, 3, 1, 4, 2].into_iter().enumerate() {
            let mark = if i % 2 == 0 { Mark::X } else { Mark::O };
            state.play_move(index, mark).unwrap();
        }
        assert_eq!(state.outcome().winner(), Some(Mark::X));
        assert_eq!(state.current_turn(), Mark::X);
        assert_eq!(
            state.play_move(5, Mark::O),
            Err(IllegalMoveError::GameAlreadyOver)
        );
    }

    #[test]
    fn test_snapshot_from_board_infers_turn() {
        let board: Board = "X........".parse().unwrap();
        assert_eq!(Snapshot::from_board(board).turn(), Mark::O);
        assert_eq!(Snapshot::from_board(Board::new()).turn(), Mark::X);
    }
}
