//! Tests for game sessions: turn routing between human and computer,
//! scores, restarts and rejected actions.

use noughts::{GameMode, GameSession, SessionError};
use noughts_core::{
    GameOutcome, IllegalMoveError, Mark, MoveSelector, Rule, ScriptedSource, WinLine,
};

const WIN_LINE_BOTTOM_ROW: WinLine = noughts_core::WIN_LINES[2];

fn scripted_pvc(picks: impl IntoIterator<Item = usize>) -> GameSession<ScriptedSource> {
    GameSession::with_selector(
        GameMode::PlayerVsComputer,
        "Ada",
        "AI",
        MoveSelector::with_source(ScriptedSource::new(picks)),
    )
}

#[test]
fn test_computer_wins_and_scores() {
    let mut session = scripted_pvc([0]);

    session.human_move(4).expect("center");
    let reply = session.computer_move().expect("corner");
    assert_eq!((reply.index, reply.rule), (0, Some(Rule::Corner)));

    session.human_move(1).expect("top side");
    let reply = session.computer_move().expect("block column");
    assert_eq!((reply.index, reply.rule), (7, Some(Rule::Block)));

    session.human_move(2).expect("top right");
    let reply = session.computer_move().expect("block diagonal");
    assert_eq!((reply.index, reply.rule), (6, Some(Rule::Block)));

    session.human_move(5).expect("middle right");
    let reply = session.computer_move().expect("win");
    assert_eq!((reply.index, reply.rule), (8, Some(Rule::Win)));
    assert_eq!(reply.mark, Mark::O);

    let outcome = session.state().outcome();
    assert_eq!(outcome.winner(), Some(Mark::O));
    assert_eq!(outcome.winning_line(), Some(WIN_LINE_BOTTOM_ROW));
    assert_eq!(session.state().history(), &[4, 0, 1, 7, 2, 6, 5, 8]);
    assert_eq!(session.scores().o, 1);
    assert_eq!(session.scores().x, 0);
    assert_eq!(session.status_message(), "AI has won!");
}

#[test]
fn test_human_blocked_on_computer_turn() {
    let mut session = scripted_pvc(std::iter::empty());
    session.human_move(0).unwrap();

    assert_eq!(session.human_move(1), Err(SessionError::ComputerToMove));
    assert_eq!(session.state().history(), &[0]);
    assert_eq!(session.status_message(), "AI is thinking...");
}

#[test]
fn test_computer_refuses_out_of_turn() {
    let mut session = scripted_pvc(std::iter::empty());
    assert_eq!(session.computer_move(), Err(SessionError::NotComputerTurn));
    assert!(session.state().history().is_empty());
}

#[test]
fn test_pvp_never_asks_computer() {
    let mut session = GameSession::new(GameMode::PlayerVsPlayer, "Ada", "Bob");
    session.human_move(0).unwrap();
    assert!(!session.is_computer_turn());
    assert_eq!(session.status_message(), "Bob's turn");

    let report = session.human_move(3).unwrap();
    assert_eq!(report.mark, Mark::O);
    assert_eq!(report.rule, None);
    assert_eq!(session.computer_move(), Err(SessionError::NotComputerTurn));
}

#[test]
fn test_illegal_move_passes_through() {
    let mut session = GameSession::new(GameMode::PlayerVsPlayer, "Ada", "Bob");
    session.human_move(4).unwrap();

    assert_eq!(
        session.human_move(4),
        Err(SessionError::IllegalMove(IllegalMoveError::CellOccupied(4)))
    );
    assert_eq!(
        session.human_move(9),
        Err(SessionError::IllegalMove(IllegalMoveError::OutOfRange(9)))
    );
    assert_eq!(session.state().current_turn(), Mark::O);
}

#[test]
fn test_draw_scores_nobody() {
    let mut session = GameSession::new(GameMode::PlayerVsPlayer, "Ada", "Bob");
    for index in [0, 1, 2, 4, 3, 5, 7, 6, 8] {
        session.human_move(index).unwrap();
    }
    assert_eq!(session.state().outcome(), GameOutcome::Draw);
    assert_eq!(session.scores().x + session.scores().o, 0);
    assert_eq!(session.status_message(), "Game ended in a draw!");
    assert_eq!(
        session.human_move(0),
        Err(SessionError::IllegalMove(IllegalMoveError::GameAlreadyOver))
    );
}

#[test]
fn test_restart_and_reset_scores() {
    let mut session = GameSession::new(GameMode::PlayerVsPlayer, "Ada", "Bob");
    for index in [0, 3, 1, 4, 2] {
        session.human_move(index).unwrap();
    }
    assert_eq!(session.scores().wins(Mark::X), 1);

    session.restart();
    assert!(session.state().history().is_empty());
    assert_eq!(session.state().outcome(), GameOutcome::InProgress);
    assert_eq!(session.state().current_turn(), Mark::X);
    assert_eq!(session.scores().x, 1);
    assert_eq!(session.name(Mark::X), "Ada");

    session.reset_scores();
    assert_eq!(session.scores().x, 0);
}

#[test]
fn test_seeded_games_are_always_legal() {
    for seed in 0..20 {
        let mut session = GameSession::with_selector(
            GameMode::PlayerVsComputer,
            "Ada",
            "AI",
            MoveSelector::seeded(seed),
        );
        let mut human = MoveSelector::seeded(seed + 100);

        while !session.state().outcome().is_terminal() {
            if session.is_computer_turn() {
                session.computer_move().unwrap();
            } else {
                let snapshot = session.state().snapshot();
                let index = human.select_move(&snapshot, Mark::X, Mark::O).unwrap();
                session.human_move(index).unwrap();
            }
        }
        assert!(session.state().history().len() >= 5);
    }
}
