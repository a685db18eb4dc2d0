mod confirm;
mod navigate;
mod prompt;

use crossterm::event::{KeyCode, KeyEvent};

use super::app::{App, Mode};

use confirm::handle_confirm;
use navigate::handle_navigate;
use prompt::handle_prompt;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Input => handle_prompt(app, key),
        Mode::Confirm => handle_confirm(app, key),
    }
}
