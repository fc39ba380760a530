//! Game session: one live board plus the players, mode and scores around it.

use derive_more::{Display, Error};
use noughts_core::{
    BoardState, GameOutcome, IllegalMoveError, Mark, MoveSelector, NoMoveAvailable, RandomSource,
    RngSource, Rule,
};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Who is playing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, clap::ValueEnum,
)]
pub enum GameMode {
    /// Two humans sharing the keyboard.
    #[strum(to_string = "Player vs Player")]
    #[value(name = "pvp")]
    PlayerVsPlayer,
    /// Human as X against the computer as O.
    #[strum(to_string = "Player vs Computer")]
    #[value(name = "pvc")]
    PlayerVsComputer,
}

impl GameMode {
    /// Mark played by the computer in this mode.
    pub fn computer_mark(self) -> Option<Mark> {
        match self {
            GameMode::PlayerVsPlayer => None,
            GameMode::PlayerVsComputer => Some(Mark::O),
        }
    }
}

/// Wins per mark for the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Games won by X.
    pub x: u32,
    /// Games won by O.
    pub o: u32,
}

impl Scoreboard {
    /// Wins for `mark`.
    pub fn wins(&self, mark: Mark) -> u32 {
        match mark {
            Mark::X => self.x,
            Mark::O => self.o,
        }
    }

    fn record(&mut self, mark: Mark) {
        match mark {
            Mark::X => self.x += 1,
            Mark::O => self.o += 1,
        }
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct MoveReport {
    /// Cell that was played.
    pub index: usize,
    /// Mark that was placed.
    pub mark: Mark,
    /// Outcome after the move.
    pub outcome: GameOutcome,
    /// Heuristic rule, for computer moves.
    pub rule: Option<Rule>,
}

/// Why a session refused an action. The board is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum SessionError {
    /// The board rejected the move.
    #[display("Illegal move: {}", _0)]
    IllegalMove(IllegalMoveError),

    /// A human tried to move while the computer is to play.
    #[display("Waiting for the computer to move")]
    ComputerToMove,

    /// The computer was asked to move when it isn't its turn.
    #[display("It's not the computer's turn")]
    NotComputerTurn,

    /// The selector found no empty cell.
    #[display("Computer could not move: {}", _0)]
    NoMove(NoMoveAvailable),
}

impl From<IllegalMoveError> for SessionError {
    fn from(err: IllegalMoveError) -> Self {
        Self::IllegalMove(err)
    }
}

impl From<NoMoveAvailable> for SessionError {
    fn from(err: NoMoveAvailable) -> Self {
        Self::NoMove(err)
    }
}

/// A sequence of games between two named players.
#[derive(Debug, Clone)]
pub struct GameSession<R = RngSource<StdRng>> {
    mode: GameMode,
    x_name: String,
    o_name: String,
    scores: Scoreboard,
    state: BoardState,
    selector: MoveSelector<R>,
}

impl GameSession {
    /// Creates a session with an entropy-seeded selector.
    pub fn new(mode: GameMode, x_name: impl Into<String>, o_name: impl Into<String>) -> Self {
        Self::with_selector(mode, x_name, o_name, MoveSelector::new())
    }
}

impl<R: RandomSource> GameSession<R> {
    /// Creates a session using `selector` for computer moves.
    #[instrument(skip(x_name, o_name, selector))]
    pub fn with_selector(
        mode: GameMode,
        x_name: impl Into<String>,
        o_name: impl Into<String>,
        selector: MoveSelector<R>,
    ) -> Self {
        let session = Self {
            mode,
            x_name: x_name.into(),
            o_name: o_name.into(),
            scores: Scoreboard::default(),
            state: BoardState::new(),
            selector,
        };
        info!(x = %session.x_name, o = %session.o_name, "Session created");
        session
    }

    /// Game mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// The live board.
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Scores so far.
    pub fn scores(&self) -> Scoreboard {
        self.scores
    }

    /// Display name for `mark`.
    pub fn name(&self, mark: Mark) -> &str {
        match mark {
            Mark::X => &self.x_name,
            Mark::O => &self.o_name,
        }
    }

    /// True while the game is open and the computer is to move.
    pub fn is_computer_turn(&self) -> bool {
        !self.state.outcome().is_terminal()
            && self.mode.computer_mark() == Some(self.state.current_turn())
    }

    /// Plays a human move for whoever's turn it is.
    #[instrument(skip(self))]
    pub fn human_move(&mut self, index: usize) -> Result<MoveReport, SessionError> {
        if self.is_computer_turn() {
            warn!("Human input while computer is to move");
            return Err(SessionError::ComputerToMove);
        }
        let mark = self.state.current_turn();
        self.apply(index, mark, None)
    }

    /// Lets the computer pick and play its move.
    #[instrument(skip(self))]
    pub fn computer_move(&mut self) -> Result<MoveReport, SessionError> {
        if !self.is_computer_turn() {
            return Err(SessionError::NotComputerTurn);
        }
        let me = self.state.current_turn();
        let choice = self
            .selector
            .choose(&self.state.snapshot(), me, me.opponent())?;
        self.apply(choice.index, me, Some(choice.rule))
    }

    fn apply(
        &mut self,
        index: usize,
        mark: Mark,
        rule: Option<Rule>,
    ) -> Result<MoveReport, SessionError> {
        let outcome = self.state.play_move(index, mark)?;
        if let Some(winner) = outcome.winner() {
            self.scores.record(winner);
            info!(winner = %self.name(winner), x = self.scores.x, o = self.scores.o, "Score updated");
        }
        debug!(index, %mark, ?rule, "Move accepted");
        Ok(MoveReport::new(index, mark, outcome, rule))
    }

    /// Starts a new game, keeping names and scores.
    #[instrument(skip(self))]
    pub fn restart(&mut self) {
        self.state.reset();
    }

    /// Zeroes the scoreboard.
    #[instrument(skip(self))]
    pub fn reset_scores(&mut self) {
        self.scores = Scoreboard::default();
    }

    /// One-line status for the current position.
    pub fn status_message(&self) -> String {
        match self.state.outcome() {
            GameOutcome::Won { mark, .. } => format!("{} has won!", self.name(mark)),
            GameOutcome::Draw => "Game ended in a draw!".to_string(),
            GameOutcome::InProgress => {
                let name = self.name(self.state.current_turn());
                if self.is_computer_turn() {
                    format!("{} is thinking...", name)
                } else {
                    format!("{}'s turn", name)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pvp_has_no_computer() {
        let session = GameSession::new(GameMode::PlayerVsPlayer, "Alice", "Bob");
        assert!(!session.is_computer_turn());
        assert_eq!(session.status_message(), "Alice's turn");
    }

    #[test]
    fn test_scoreboard_counts_per_mark() {
        let mut scores = Scoreboard::default();
        scores.record(Mark::O);
        scores.record(Mark::O);
        scores.record(Mark::X);
        assert_eq!(scores.wins(Mark::X), 1);
        assert_eq!(scores.wins(Mark::O), 2);
    }
}
