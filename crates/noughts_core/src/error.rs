//! Errors raised by the game core.

use crate::types::Mark;
use derive_more::{Display, Error};

/// A move that violates a board precondition. The board is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IllegalMoveError {
    /// Index outside 0-8.
    #[display("Cell index {} is out of range (must be 0-8)", _0)]
    OutOfRange(usize),

    /// The cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(usize),

    /// It's the other mark's turn.
    #[display("It's not {}'s turn ({} to move)", attempted, expected)]
    WrongTurn {
        /// Mark that tried to move.
        attempted: Mark,
        /// Mark whose turn it is.
        expected: Mark,
    },

    /// The game has been won or drawn.
    #[display("Game is already over")]
    GameAlreadyOver,
}

impl std::error::Error for IllegalMoveError {}

/// The move selector was asked to move on a board with no empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("No empty cell available")]
pub struct NoMoveAvailable;
