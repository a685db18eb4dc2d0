use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

pub(super) fn handle_prompt(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => app.submit_prompt(),
        (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => app.cancel_prompt(),

        (KeyModifiers::CONTROL, KeyCode::Char('a')) | (_, KeyCode::Home) => app.input.home(),
        (KeyModifiers::CONTROL, KeyCode::Char('e')) | (_, KeyCode::End) => app.input.end(),
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => app.input.delete_word(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => app.input.clear(),
        (_, KeyCode::Left) => app.input.left(),
        (_, KeyCode::Right) => app.input.right(),
        (_, KeyCode::Backspace) => app.input.backspace(),
        (_, KeyCode::Delete) => app.input.delete(),

        (m, KeyCode::Char(c)) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            let full = app
                .prompt
                .and_then(|p| p.max_chars())
                .is_some_and(|max| app.input.text().chars().count() >= max);
            if !full {
                app.input.insert(c);
            }
        }
        _ => {}
    }
}
