//! Win detection logic for tic-tac-toe.

use crate::types::{Board, Cell, Mark};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Three cell indices that win when they hold the same mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WinLine([usize; 3]);

impl WinLine {
    /// The cell indices of this line.
    pub fn cells(&self) -> [usize; 3] {
        self.0
    }

    /// Whether `index` lies on this line.
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }
}

/// All winning lines. Scan order is rows, columns, diagonals; callers rely
/// on it for deterministic tie-breaks.
pub const WIN_LINES: [WinLine; 8] = [
    // Rows
    WinLine([0, 1, 2]),
    WinLine([3, 4, 5]),
    WinLine([6, 7, 8]),
    // Columns
    WinLine([0, 3, 6]),
    WinLine([1, 4, 7]),
    WinLine([2, 5, 8]),
    // Diagonals
    WinLine([0, 4, 8]),
    WinLine([2, 4, 6]),
];

/// Finds the first line, in table order, holding three equal marks.
#[instrument]
pub fn find_winning_line(board: &Board) -> Option<(Mark, WinLine)> {
    WIN_LINES.iter().find_map(|line| {
        let [a, b, c] = line.cells();
        match board.get(a) {
            Some(Cell::Occupied(mark))
                if board.get(b) == Some(Cell::Occupied(mark))
                    && board.get(c) == Some(Cell::Occupied(mark)) =>
            {
                Some((mark, *line))
            }
            _ => None,
        }
    })
}

/// Finds the empty cell that would complete a line for `mark`.
///
/// The first line in table order with two `mark` cells and one empty
/// cell wins.
#[instrument]
pub fn completing_cell(board: &Board, mark: Mark) -> Option<usize> {
    WIN_LINES.iter().find_map(|line| {
        let cells = line.cells();
        let owned = cells
            .iter()
            .filter(|&&i| board.get(i) == Some(Cell::Occupied(mark)))
            .count();
        if owned != 2 {
            return None;
        }
        cells.iter().copied().find(|&i| board.is_empty(i))
    })
}
