use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::constants::{UI_CHANNEL_CAPACITY, UI_REFRESH_INTERVAL_MS};
use crate::gateway::{Gateway, GatewayError};
use crate::session::{dispatch, PendingTurn, TurnReply};
use crate::tui::app::{App, Focus};
use crate::tui::render::render_ui;
use crate::utils::AdewinError;

/// A finished backend call on its way back to the UI loop
type TurnResult = (PendingTurn, Result<TurnReply, GatewayError>);

/// Run the terminal UI
pub async fn run_ui(mut app: App, gateway: Arc<dyn Gateway>) -> Result<()> {
    // Check if we have an interactive terminal
    if !crossterm::tty::IsTty::is_tty(&io::stdout()) {
        eprintln!("❌ Adewin requires an interactive terminal.");
        eprintln!("   Use --prompt to send messages without the UI.");
        return Err(AdewinError::UIError("No interactive terminal available".to_string()).into());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let (tx, mut rx) = mpsc::channel::<TurnResult>(UI_CHANNEL_CAPACITY);

    let res = run_app(&mut terminal, &mut app, gateway, tx, &mut rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    gateway: Arc<dyn Gateway>,
    tx: mpsc::Sender<TurnResult>,
    rx: &mut mpsc::Receiver<TurnResult>,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(Duration::from_millis(UI_REFRESH_INTERVAL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(pending) = handle_key(app, key) {
                        spawn_turn(gateway.clone(), pending, tx.clone());
                    }
                }
            }
        }

        // Apply every reply that arrived since the last frame
        while let Ok((pending, result)) = rx.try_recv() {
            let outcome = app.finish_turn(pending, result);
            debug!(?outcome, "turn finished");
        }
    }

    Ok(())
}

/// Run the gateway call off the UI loop and send the result back
fn spawn_turn(gateway: Arc<dyn Gateway>, pending: PendingTurn, tx: mpsc::Sender<TurnResult>) {
    tokio::spawn(async move {
        let result = dispatch(gateway.as_ref(), pending.request()).await;
        let _ = tx.send((pending, result)).await;
    });
}

/// Map a key press to an intent. Returns a turn to dispatch when a send starts.
pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> Option<PendingTurn> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.quit(),
            KeyCode::Char('n') => app.new_chat(),
            KeyCode::Char('l') => app.launch_campaign(),
            _ => {}
        }
        return None;
    }

    match key.code {
        KeyCode::Tab => {
            app.toggle_focus();
            return None;
        }
        KeyCode::Esc => {
            app.show_temporary_chat();
            return None;
        }
        KeyCode::PageUp => {
            app.scroll_up(10);
            return None;
        }
        KeyCode::PageDown => {
            app.scroll_down(10);
            return None;
        }
        _ => {}
    }

    match app.focus {
        Focus::Sidebar => {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
                KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                KeyCode::Delete | KeyCode::Char('d') => app.delete_highlighted(),
                KeyCode::Enter => app.focus = Focus::Input,
                _ => {}
            }
            None
        }
        Focus::Input => match key.code {
            KeyCode::Enter => app.submit_input(),
            KeyCode::Char(c) => {
                app.input.push(c);
                None
            }
            KeyCode::Backspace => {
                app.input.pop();
                None
            }
            KeyCode::Up => {
                app.scroll_up(1);
                None
            }
            KeyCode::Down => {
                app.scroll_down(1);
                None
            }
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::OfflineGateway;
    use crate::session::SessionManager;

    fn press(app: &mut App, code: KeyCode) -> Option<PendingTurn> {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut App, c: char) -> Option<PendingTurn> {
        handle_key(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_typing_and_sending() {
        let mut app = App::new(SessionManager::default(), "offline".to_string(), true);
        let gateway = OfflineGateway::new();

        type_text(&mut app, "Hi!");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "Hi");

        let pending = press(&mut app, KeyCode::Enter).unwrap();
        let result = dispatch(&gateway, pending.request()).await;
        app.finish_turn(pending, result);

        assert_eq!(app.manager.view().messages.len(), 2);
        assert!(!app.manager.is_loading());
    }

    #[tokio::test]
    async fn test_launch_then_browse_with_keys() {
        let mut app = App::new(SessionManager::default(), "offline".to_string(), true);
        let gateway = OfflineGateway::new();

        type_text(&mut app, "Plan a launch");
        let pending = press(&mut app, KeyCode::Enter).unwrap();
        let result = dispatch(&gateway, pending.request()).await;
        app.finish_turn(pending, result);

        ctrl(&mut app, 'l');
        assert!(app.manager.has_chat_history());
        assert!(!app.manager.is_temporary_chat());

        // Typing 'd' in the input box is just text
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.input, "d");
        assert_eq!(app.manager.chats().len(), 1);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Sidebar);
        press(&mut app, KeyCode::Char('d'));
        assert!(app.manager.chats().is_empty());
        assert!(app.manager.is_temporary_chat());
    }

    #[test]
    fn test_new_chat_and_quit_shortcuts() {
        let mut app = App::new(SessionManager::default(), "offline".to_string(), true);
        type_text(&mut app, "Draft");
        press(&mut app, KeyCode::Enter).unwrap();

        ctrl(&mut app, 'n');
        assert!(app.manager.view().messages.is_empty());

        ctrl(&mut app, 'c');
        assert!(!app.running);
    }
}
