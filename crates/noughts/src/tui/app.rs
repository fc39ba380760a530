//! Application state and key handling.

use crate::coach::{Coach, CoachRequest};
use crate::session::{GameSession, SessionError};
use crossterm::event::KeyCode;
use noughts_core::Position;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::input::{digit_cell, move_cursor};

/// Coach text shown over the board.
#[derive(Debug)]
pub struct CoachModal {
    /// Dialog title.
    pub title: String,
    /// Reply text, `None` while the request is outstanding.
    pub body: Option<String>,
    reply: Option<oneshot::Receiver<String>>,
}

/// Main application state.
pub struct App {
    session: GameSession,
    cursor: Position,
    coach: Option<Coach>,
    modal: Option<CoachModal>,
    notice: Option<String>,
    computer_delay: Duration,
    computer_due: Option<Instant>,
    should_quit: bool,
}

impl App {
    /// Creates a new application. Without a coach, tip and analysis keys
    /// only show a notice.
    pub fn new(session: GameSession, coach: Option<Coach>, computer_delay: Duration) -> Self {
        Self {
            session,
            cursor: Position::Center,
            coach,
            modal: None,
            notice: None,
            computer_delay,
            computer_due: None,
            should_quit: false,
        }
    }

    /// The game session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Highlighted cell.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Open coach dialog, if any.
    pub fn modal(&self) -> Option<&CoachModal> {
        self.modal.as_ref()
    }

    /// Transient message from the last rejected action.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Whether the user asked to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Whether a coach reply is still outstanding.
    pub fn awaiting_coach(&self) -> bool {
        self.modal.as_ref().is_some_and(|m| m.reply.is_some())
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyCode) {
        if self.modal.is_some() {
            if matches!(key, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                debug!("Closing coach dialog");
                self.modal = None;
            }
            return;
        }

        self.notice = None;
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                info!("User quit");
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                self.cursor = move_cursor(self.cursor, key);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.play(self.cursor.to_index()),
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('s') => {
                info!("Scores reset");
                self.session.reset_scores();
            }
            KeyCode::Char('t') => self.request_coach(CoachRequest::Tip),
            KeyCode::Char('a') => self.request_coach(CoachRequest::Analysis),
            other => {
                if let Some(index) = digit_cell(other) {
                    self.cursor = Position::from_index(index).unwrap_or(self.cursor);
                    self.play(index);
                }
            }
        }
    }

    /// Advances timers: collects coach replies and plays a due computer
    /// move.
    pub fn tick(&mut self, now: Instant) {
        if let Some(modal) = self.modal.as_mut()
            && let Some(reply) = modal.reply.as_mut()
        {
            match reply.try_recv() {
                Ok(text) => {
                    modal.body = Some(text);
                    modal.reply = None;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    modal.body = Some(crate::coach::FALLBACK_REPLY.to_string());
                    modal.reply = None;
                }
            }
        }

        if self.awaiting_coach() {
            return;
        }
        if let Some(due) = self.computer_due
            && now >= due
        {
            self.computer_due = None;
            match self.session.computer_move() {
                Ok(report) => {
                    debug!(index = report.index, rule = ?report.rule, "Computer moved");
                    self.cursor = Position::from_index(report.index).unwrap_or(self.cursor);
                }
                Err(e) => warn!(error = %e, "Computer move failed"),
            }
        }
    }

    fn play(&mut self, index: usize) {
        match self.session.human_move(index) {
            Ok(_) => self.schedule_computer(),
            Err(SessionError::IllegalMove(e)) => {
                debug!(error = %e, "Ignoring illegal move");
                self.notice = Some(e.to_string());
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn restart(&mut self) {
        info!("Restarting game");
        self.session.restart();
        self.cursor = Position::Center;
        self.computer_due = None;
        self.schedule_computer();
    }

    fn schedule_computer(&mut self) {
        if self.session.is_computer_turn() {
            self.computer_due = Some(Instant::now() + self.computer_delay);
        }
    }

    fn request_coach(&mut self, request: CoachRequest) {
        let state = self.session.state();
        let game_over = state.outcome().is_terminal();
        match request {
            CoachRequest::Tip if game_over || self.session.is_computer_turn() => {
                self.notice = Some("Tips are available on your turn".to_string());
                return;
            }
            CoachRequest::Analysis if !game_over => {
                self.notice = Some("Analysis is available once the game is over".to_string());
                return;
            }
            _ => {}
        }
        let Some(coach) = self.coach.clone() else {
            self.notice = Some("Coach unavailable: no API key configured".to_string());
            return;
        };

        let snapshot = state.snapshot();
        let outcome = state.outcome();
        let x_name = self.session.name(noughts_core::Mark::X).to_string();
        let o_name = self.session.name(noughts_core::Mark::O).to_string();
        let (tx, rx) = oneshot::channel();

        info!(%request, "Requesting coach");
        tokio::spawn(async move {
            let text = match request {
                CoachRequest::Tip => coach.tip(&snapshot).await,
                CoachRequest::Analysis => {
                    coach.analysis(&snapshot, outcome, &x_name, &o_name).await
                }
            };
            let _ = tx.send(text);
        });

        self.modal = Some(CoachModal {
            title: request.to_string(),
            body: None,
            reply: Some(rx),
        });
    }
}
