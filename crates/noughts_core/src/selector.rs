//! Heuristic move selection for the computer opponent.
//!
//! The selector runs a fixed priority cascade rather than a game-tree
//! search:
//!
//! 1. complete a line of its own,
//! 2. block the opponent's line,
//! 3. take the center,
//! 4. take a random free corner,
//! 5. take a random free side.
//!
//! It can be beaten by a fork. Random picks go through [`RandomSource`] so
//! callers can pin them down.

use crate::error::NoMoveAvailable;
use crate::rules::completing_cell;
use crate::state::Snapshot;
use crate::types::{Board, Mark};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, instrument};

const CENTER: usize = 4;
const CORNERS: [usize; 4] = [0, 2, 6, 8];
const SIDES: [usize; 4] = [1, 3, 5, 7];

/// Source of the uniform picks used to break corner/side ties.
pub trait RandomSource {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// [`RandomSource`] backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// [`RandomSource`] that replays a fixed list of picks.
///
/// Each pick is reduced modulo `len`; once the list runs out every pick
/// is 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    picks: VecDeque<usize>,
}

impl ScriptedSource {
    /// Creates a source that yields `picks` in order.
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedSource {
    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % len
    }
}

/// Which cascade rule produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Rule {
    /// Completes the mover's own line.
    #[display("winning move")]
    Win,
    /// Stops the opponent completing a line.
    #[display("block")]
    Block,
    /// Center cell.
    #[display("center")]
    Center,
    /// Random free corner.
    #[display("corner")]
    Corner,
    /// Random free side.
    #[display("side")]
    Side,
}

/// A chosen cell and the rule that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    /// Cell index (0-8).
    pub index: usize,
    /// Rule that fired.
    pub rule: Rule,
}

/// Picks moves for an automated player.
#[derive(Debug, Clone)]
pub struct MoveSelector<R = RngSource<StdRng>> {
    random: R,
}

impl MoveSelector {
    /// Selector seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_source(RngSource(StdRng::from_entropy()))
    }

    /// Selector with a fixed seed, for reproducible games.
    pub fn seeded(seed: u64) -> Self {
        Self::with_source(RngSource(StdRng::seed_from_u64(seed)))
    }
}

impl Default for MoveSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandomSource> MoveSelector<R> {
    /// Selector drawing tie-breaks from `random`.
    pub fn with_source(random: R) -> Self {
        Self { random }
    }

    /// Returns the cell index `me` should play.
    pub fn select_move(
        &mut self,
        snapshot: &Snapshot,
        me: Mark,
        opponent: Mark,
    ) -> Result<usize, NoMoveAvailable> {
        self.choose(snapshot, me, opponent).map(|choice| choice.index)
    }

    /// Runs the cascade and reports the rule that fired.
    #[instrument(skip(self, snapshot), fields(board = ?snapshot.board().cells()))]
    pub fn choose(
        &mut self,
        snapshot: &Snapshot,
        me: Mark,
        opponent: Mark,
    ) -> Result<Choice, NoMoveAvailable> {
        let board = snapshot.board();

        let choice = if let Some(index) = completing_cell(board, me) {
            Choice { index, rule: Rule::Win }
        } else if let Some(index) = completing_cell(board, opponent) {
            Choice { index, rule: Rule::Block }
        } else if board.is_empty(CENTER) {
            Choice { index: CENTER, rule: Rule::Center }
        } else if let Some(index) = self.pick_free(board, &CORNERS) {
            Choice { index, rule: Rule::Corner }
        } else if let Some(index) = self.pick_free(board, &SIDES) {
            Choice { index, rule: Rule::Side }
        } else {
            debug!("No empty cell left");
            return Err(NoMoveAvailable);
        };

        debug!(index = choice.index, rule = %choice.rule, "Move selected");
        Ok(choice)
    }

    fn pick_free(&mut self, board: &Board, candidates: &[usize]) -> Option<usize> {
        let free: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| board.is_empty(i))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[self.random.pick(free.len())])
    }
}
