//! Named board positions.

use serde::{Deserialize, Serialize};

/// A cell of the board by name, in row-major index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Position {
    /// Index 0
    #[strum(to_string = "Top-left")]
    TopLeft,
    /// Index 1
    #[strum(to_string = "Top-center")]
    TopCenter,
    /// Index 2
    #[strum(to_string = "Top-right")]
    TopRight,
    /// Index 3
    #[strum(to_string = "Middle-left")]
    MiddleLeft,
    /// Index 4
    #[strum(to_string = "Center")]
    Center,
    /// Index 5
    #[strum(to_string = "Middle-right")]
    MiddleRight,
    /// Index 6
    #[strum(to_string = "Bottom-left")]
    BottomLeft,
    /// Index 7
    #[strum(to_string = "Bottom-center")]
    BottomCenter,
    /// Index 8
    #[strum(to_string = "Bottom-right")]
    BottomRight,
}

impl Position {
    /// All 9 positions in index order.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// Cell index (0-8).
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Position for a cell index, `None` past 8.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}
