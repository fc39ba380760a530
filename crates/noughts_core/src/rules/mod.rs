//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]. Rules are kept apart from board
//! storage so the move selector can reuse them on snapshots.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{WIN_LINES, WinLine, completing_cell, find_winning_line};

use crate::types::{Board, Mark};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Outcome of the game so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Moves are still accepted.
    InProgress,
    /// `mark` holds every cell of `line`.
    Won {
        /// The winning mark.
        mark: Mark,
        /// The completed line.
        line: WinLine,
    },
    /// Board is full with no winner.
    Draw,
}

impl GameOutcome {
    /// Won or Draw.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            GameOutcome::Won { mark, .. } => Some(*mark),
            _ => None,
        }
    }

    /// Returns the winning line if there is one.
    pub fn winning_line(&self) -> Option<WinLine> {
        match self {
            GameOutcome::Won { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOutcome::InProgress => write!(f, "In progress"),
            GameOutcome::Won { mark, line } => {
                write!(f, "{} wins on {:?}", mark, line.cells())
            }
            GameOutcome::Draw => write!(f, "Draw"),
        }
    }
}

/// Evaluates a board: first winning line in table order, else draw when
/// full, else in progress.
#[instrument]
pub fn evaluate_outcome(board: &Board) -> GameOutcome {
    if let Some((mark, line)) = find_winning_line(board) {
        GameOutcome::Won { mark, line }
    } else if is_full(board) {
        GameOutcome::Draw
    } else {
        GameOutcome::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_empty_board() {
        assert_eq!(evaluate_outcome(&Board::new()), GameOutcome::InProgress);
    }

    #[test]
    fn test_evaluate_column_win() {
        let board: Board = ".XO .XO .X.".parse().unwrap();
        let outcome = evaluate_outcome(&board);
        assert_eq!(outcome.winner(), Some(Mark::X));
        assert_eq!(outcome.winning_line().unwrap().cells(), [1, 4, 7]);
        assert!(outcome.is_terminal());
    }

    #[test]
    fn test_evaluate_draw() {
        let board: Board = "XOX XOO OXX".parse().unwrap();
        assert_eq!(evaluate_outcome(&board), GameOutcome::Draw);
    }
}
