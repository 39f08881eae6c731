use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::app::{App, AppState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::Esc => {
            // First Esc clears messages, a second one quits
            if app.notices.is_empty() {
                app.state = AppState::Quitting;
                return true;
            }
            app.notices.dismiss_all();
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            if !app.start_load(true) {
                debug!("Refresh ignored, a load is already running");
            }
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        _ => {}
    }
    false
}
