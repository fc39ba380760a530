//! Natural-language tips and post-game analysis.

use crate::llm_client::LlmClient;
use noughts_core::{Board, GameOutcome, Mark, Snapshot};
use tracing::{instrument, warn};

/// Shown when the language model can't be reached.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't get a response. Please try again.";

const TIP_SYSTEM_PROMPT: &str = "You are a professional tic-tac-toe coach.";
const ANALYSIS_SYSTEM_PROMPT: &str = "You are a professional tic-tac-toe game analyst.";

/// Which kind of coaching was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CoachRequest {
    /// Hint for the player to move.
    #[strum(to_string = "Game Tip")]
    Tip,
    /// Review of a finished game.
    #[strum(to_string = "Game Analysis")]
    Analysis,
}

/// Renders the board as three `| X | O |   |` rows.
pub fn render_board(board: &Board) -> String {
    board
        .cells()
        .chunks(3)
        .map(|row| {
            let cells: Vec<String> = row.iter().map(|c| c.symbol().to_string()).collect();
            format!("| {} |", cells.join(" | "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt asking for a tip for the player to move.
pub fn tip_prompt(snapshot: &Snapshot) -> String {
    format!(
        "The current player is '{}'. The current board state is:\n\n{}\n\n\
         Give a single, concise strategic tip for the current player without giving away \
         the exact winning move or the best move.",
        snapshot.turn(),
        render_board(snapshot.board())
    )
}

/// Prompt asking for a review of a finished game.
pub fn analysis_prompt(
    snapshot: &Snapshot,
    outcome: GameOutcome,
    x_name: &str,
    o_name: &str,
) -> String {
    let result = match outcome {
        GameOutcome::Won { mark: Mark::X, .. } => format!("{} has won!", x_name),
        GameOutcome::Won { mark: Mark::O, .. } => format!("{} has won!", o_name),
        GameOutcome::Draw => "Game ended in a draw!".to_string(),
        GameOutcome::InProgress => "The game is still in progress.".to_string(),
    };
    format!(
        "Analyze the following game. The board is represented by indices 0-8. \
         'X' is {}, 'O' is {}. The final board state is:\n\n{}\n\nOutcome: {}\n\n\
         Provide a summary of the game, highlight a key move or a missed opportunity for \
         either player, and offer a single piece of strategic advice. \
         Format the response using markdown.",
        x_name,
        o_name,
        render_board(snapshot.board()),
        result
    )
}

/// Asks a language model for coaching text.
#[derive(Debug, Clone)]
pub struct Coach {
    client: LlmClient,
}

impl Coach {
    /// Creates a coach backed by `client`.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Tip for the player to move. Never fails; errors become
    /// [`FALLBACK_REPLY`].
    #[instrument(skip(self, snapshot), fields(turn = %snapshot.turn()))]
    pub async fn tip(&self, snapshot: &Snapshot) -> String {
        self.ask(TIP_SYSTEM_PROMPT, &tip_prompt(snapshot)).await
    }

    /// Review of a finished game. Never fails; errors become
    /// [`FALLBACK_REPLY`].
    #[instrument(skip(self, snapshot))]
    pub async fn analysis(
        &self,
        snapshot: &Snapshot,
        outcome: GameOutcome,
        x_name: &str,
        o_name: &str,
    ) -> String {
        let prompt = analysis_prompt(snapshot, outcome, x_name, o_name);
        self.ask(ANALYSIS_SYSTEM_PROMPT, &prompt).await
    }

    async fn ask(&self, system_prompt: &str, prompt: &str) -> String {
        match self.client.generate(system_prompt, prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Coach request failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
