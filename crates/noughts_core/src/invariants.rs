//! Structural invariants of a legally played board.
//!
//! These hold after every accepted move. [`BoardState`](crate::BoardState)
//! asserts them in debug builds.

use crate::types::{Board, Cell, Mark};
use tracing::{instrument, warn};

/// X moves first, so X has as many marks as O or exactly one more.
#[instrument(skip(board))]
pub(crate) fn marks_balanced(board: &Board) -> bool {
    let x_count = board.count(Mark::X);
    let o_count = board.count(Mark::O);

    let valid = x_count == o_count || x_count == o_count + 1;
    if !valid {
        warn!(x_count, o_count, "Mark balance violated");
    }
    valid
}

/// Every history entry names an occupied cell, once, and nothing else is
/// occupied. Entries alternate X, O, X, ... starting from X.
#[instrument(skip(board, history))]
pub(crate) fn history_consistent(board: &Board, history: &[usize]) -> bool {
    let filled = board.cells().iter().filter(|c| **c != Cell::Empty).count();
    if filled != history.len() {
        warn!(filled, history_len = history.len(), "History length mismatch");
        return false;
    }

    let mut seen = [false; 9];
    for (turn, &index) in history.iter().enumerate() {
        let expected = if turn % 2 == 0 { Mark::X } else { Mark::O };
        if index >= seen.len() || seen[index] {
            warn!(index, "History names a cell twice or out of range");
            return false;
        }
        seen[index] = true;
        if board.get(index) != Some(Cell::Occupied(expected)) {
            warn!(index, ?expected, "History disagrees with board");
            return false;
        }
    }
    true
}
