//! Noughts - unified CLI.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use noughts::cli::{Cli, Command};
use noughts::{AppConfig, Coach, GameMode, GameSession, LlmClient};
use noughts_core::{Board, Mark, MoveSelector, Position, Snapshot};
use std::path::Path;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            mode,
            x_name,
            o_name,
            config,
        } => {
            noughts::tui::init_logging()?;
            run_play(mode, x_name, o_name, &config).await
        }
        Command::Suggest { board, mark, json } => {
            init_stderr_logging();
            run_suggest(&board, mark, json)
        }
        Command::Tip { board, config } => {
            init_stderr_logging();
            run_tip(&board, &config).await
        }
        Command::Analyze {
            board,
            x_name,
            o_name,
            config,
        } => {
            init_stderr_logging();
            run_analyze(&board, x_name, o_name, &config).await
        }
    }
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn parse_board(board: &str) -> Result<Board> {
    board
        .parse()
        .with_context(|| format!("Invalid board '{}'", board))
}

/// Run the interactive game
async fn run_play(
    mode: GameMode,
    x_name: Option<String>,
    o_name: Option<String>,
    config_path: &Path,
) -> Result<()> {
    let config = AppConfig::load_or_default(config_path)?;

    let x_name = x_name.unwrap_or_else(|| config.player_x_name().clone());
    let o_name = match mode {
        GameMode::PlayerVsComputer => config.computer_name().clone(),
        GameMode::PlayerVsPlayer => o_name.unwrap_or_else(|| config.player_o_name().clone()),
    };

    // Tips and analysis stay disabled without an API key.
    let coach = match config.coach().create_llm_config() {
        Ok(llm) => Some(Coach::new(LlmClient::new(llm))),
        Err(e) => {
            warn!(error = %e, "Coach disabled");
            None
        }
    };

    let session = GameSession::new(mode, x_name, o_name);
    noughts::tui::run_tui(session, coach, config.computer_delay()).await
}

/// Print the computer's choice for a board
#[instrument]
fn run_suggest(board: &str, mark: Option<Mark>, json: bool) -> Result<()> {
    let board = parse_board(board)?;
    let snapshot = match mark {
        Some(mark) => Snapshot::new(board, mark),
        None => Snapshot::from_board(board),
    };
    let me = snapshot.turn();
    anyhow::ensure!(
        !snapshot.outcome().is_terminal(),
        "Game is already over: {}",
        snapshot.outcome()
    );

    let choice = MoveSelector::new().choose(&snapshot, me, me.opponent())?;
    info!(index = choice.index, rule = %choice.rule, "Move chosen");

    if json {
        println!("{}", serde_json::to_string(&choice)?);
    } else {
        let position = Position::from_index(choice.index)
            .context("Selector returned an index off the board")?;
        println!("{}\n", snapshot.board().display());
        println!(
            "{} plays cell {} ({}, rule: {})",
            me, choice.index, position, choice.rule
        );
    }
    Ok(())
}

fn build_coach(config_path: &Path) -> Result<Coach> {
    let config = AppConfig::load_or_default(config_path)?;
    let llm = config.coach().create_llm_config()?;
    Ok(Coach::new(LlmClient::new(llm)))
}

/// Ask the coach for a tip
#[instrument]
async fn run_tip(board: &str, config_path: &Path) -> Result<()> {
    let snapshot = Snapshot::from_board(parse_board(board)?);
    anyhow::ensure!(
        !snapshot.outcome().is_terminal(),
        "Tips are only available while the game is in progress"
    );
    let coach = build_coach(config_path)?;
    println!("{}", coach.tip(&snapshot).await);
    Ok(())
}

/// Ask the coach to review a finished game
#[instrument]
async fn run_analyze(
    board: &str,
    x_name: Option<String>,
    o_name: Option<String>,
    config_path: &Path,
) -> Result<()> {
    let config = AppConfig::load_or_default(config_path)?;
    let snapshot = Snapshot::from_board(parse_board(board)?);
    let outcome = snapshot.outcome();
    anyhow::ensure!(
        outcome.is_terminal(),
        "Analysis is only available once the game is over"
    );

    let x_name = x_name.unwrap_or_else(|| config.player_x_name().clone());
    let o_name = o_name.unwrap_or_else(|| config.player_o_name().clone());
    let coach = build_coach(config_path)?;
    println!(
        "{}",
        coach.analysis(&snapshot, outcome, &x_name, &o_name).await
    );
    Ok(())
}
