//! Noughts - terminal tic-tac-toe.
//!
//! The game rules and the computer opponent live in `noughts_core`; this
//! crate adds everything around them.
//!
//! # Architecture
//!
//! - **Session**: named players, game mode and the scoreboard around one
//!   live board
//! - **Coach**: tips and post-game analysis from an LLM (Gemini, OpenAI,
//!   Anthropic) with rate-limit backoff
//! - **TUI**: ratatui front end driving a session
//!
//! # Example
//!
//! ```
//! use noughts::{GameMode, GameSession};
//!
//! let mut session = GameSession::new(GameMode::PlayerVsComputer, "Ada", "AI");
//! session.human_move(0).unwrap();
//! assert!(session.is_computer_turn());
//!
//! let reply = session.computer_move().unwrap();
//! assert_eq!(reply.index, 4);
//! assert_eq!(session.status_message(), "Ada's turn");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
mod coach;
mod config;
mod llm_client;
mod session;
pub mod tui;

pub use coach::{
    Coach, CoachRequest, FALLBACK_REPLY, analysis_prompt, render_board, tip_prompt,
};
pub use config::{AppConfig, CoachConfig, ConfigError};
pub use llm_client::{
    LlmClient, LlmConfig, LlmError, LlmErrorKind, LlmProvider, RetryPolicy, with_backoff,
};
pub use session::{GameMode, GameSession, MoveReport, Scoreboard, SessionError};
