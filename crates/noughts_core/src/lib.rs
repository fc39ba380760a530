//! Pure tic-tac-toe game logic.
//!
//! # Architecture
//!
//! - **State**: [`BoardState`] owns the grid, the turn marker and the
//!   outcome, and is the only place moves are validated.
//! - **Rules**: pure win/draw detection over a [`Board`].
//! - **Selector**: [`MoveSelector`] picks moves for a computer player from
//!   a read-only [`Snapshot`].
//!
//! # Example
//!
//! ```
//! use noughts_core::{BoardState, GameOutcome, Mark, MoveSelector};
//!
//! let mut state = BoardState::new();
//! state.play_move(0, Mark::X).unwrap();
//!
//! let mut selector = MoveSelector::seeded(7);
//! let reply = selector.select_move(&state.snapshot(), Mark::O, Mark::X).unwrap();
//! assert_eq!(reply, 4);
//!
//! assert_eq!(state.play_move(reply, Mark::O).unwrap(), GameOutcome::InProgress);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod invariants;
mod position;
mod rules;
mod selector;
mod state;
mod types;

pub use error::{IllegalMoveError, NoMoveAvailable};
pub use position::Position;
pub use rules::{
    GameOutcome, WIN_LINES, WinLine, completing_cell, evaluate_outcome,
    find_winning_line, is_full,
};
pub use selector::{Choice, MoveSelector, RandomSource, RngSource, Rule, ScriptedSource};
pub use state::{BoardState, Snapshot};
pub use types::{Board, BoardParseError, CELL_COUNT, Cell, Mark};
