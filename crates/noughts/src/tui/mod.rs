//! Terminal UI for noughts.

mod app;
mod input;
mod ui;

pub use app::{App, CoachModal};

use crate::coach::Coach;
use crate::session::GameSession;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

/// File the TUI writes its logs to, keeping the terminal clean.
pub const LOG_FILE: &str = "noughts_tui.log";

/// Sends logs to [`LOG_FILE`] so they don't draw over the game.
///
/// Call before anything that logs; a second call is a no-op.
pub fn init_logging() -> Result<()> {
    let log_file = std::fs::File::create(LOG_FILE)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,noughts=debug")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

/// Runs the interactive game until the user quits.
///
/// Expects [`init_logging`] to have run already.
#[instrument(skip_all, fields(mode = %session.mode()))]
pub async fn run_tui(
    session: GameSession,
    coach: Option<Coach>,
    computer_delay: Duration,
) -> Result<()> {
    info!(coach = coach.is_some(), "Starting noughts TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(session, coach, computer_delay);
    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        error!(error = %e, "TUI exited with error");
    }
    info!("TUI closed");
    res
}

// Coach requests run on other runtime workers while this loop polls.
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key.code);
        }

        app.tick(Instant::now());

        if app.should_quit() {
            return Ok(());
        }
    }
}
