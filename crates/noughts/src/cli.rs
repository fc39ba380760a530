//! Command-line interface for noughts.

use crate::session::GameMode;
use clap::{Parser, Subcommand};
use noughts_core::Mark;
use std::path::PathBuf;

/// Noughts - terminal tic-tac-toe with a computer opponent and a coach
#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Terminal tic-tac-toe with a heuristic opponent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal UI
    Play {
        /// Who is playing
        #[arg(short, long, value_enum, default_value_t = GameMode::PlayerVsComputer)]
        mode: GameMode,

        /// Name for the X player
        #[arg(long)]
        x_name: Option<String>,

        /// Name for the O player (ignored against the computer)
        #[arg(long)]
        o_name: Option<String>,

        /// Path to the config file
        #[arg(short, long, default_value = "noughts.toml")]
        config: PathBuf,
    },

    /// Print the computer's move for a board
    Suggest {
        /// Nine cells, row by row: X, O and `.` for empty
        #[arg(short, long)]
        board: String,

        /// Mark to move (inferred from the board by default)
        #[arg(long)]
        mark: Option<Mark>,

        /// Print the choice as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the coach for a tip on a board
    Tip {
        /// Nine cells, row by row: X, O and `.` for empty
        #[arg(short, long)]
        board: String,

        /// Path to the config file
        #[arg(short, long, default_value = "noughts.toml")]
        config: PathBuf,
    },

    /// Ask the coach to review a finished board
    Analyze {
        /// Nine cells, row by row: X, O and `.` for empty
        #[arg(short, long)]
        board: String,

        /// Name for the X player
        #[arg(long)]
        x_name: Option<String>,

        /// Name for the O player
        #[arg(long)]
        o_name: Option<String>,

        /// Path to the config file
        #[arg(short, long, default_value = "noughts.toml")]
        config: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_defaults_to_pvc() {
        let cli = Cli::try_parse_from(["noughts", "play"]).unwrap();
        match cli.command {
            Command::Play { mode, config, .. } => {
                assert_eq!(mode, GameMode::PlayerVsComputer);
                assert_eq!(config, PathBuf::from("noughts.toml"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_suggest_parses_mark() {
        let cli =
            Cli::try_parse_from(["noughts", "suggest", "--board", "X........", "--mark", "O"])
                .unwrap();
        match cli.command {
            Command::Suggest { board, mark, json } => {
                assert_eq!(board, "X........");
                assert_eq!(mark, Some(Mark::O));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_mode_value_names() {
        let cli = Cli::try_parse_from(["noughts", "play", "--mode", "pvp"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Play {
                mode: GameMode::PlayerVsPlayer,
                ..
            }
        ));
    }
}
