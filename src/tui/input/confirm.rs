use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Confirm: y
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('y' | 'Y')) => app.confirm_delete(),
        // Cancel: n or Esc
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('n' | 'N')) | (_, KeyCode::Esc) => {
            app.cancel_confirm()
        }
        _ => {}
    }
}
