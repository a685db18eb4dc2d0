use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            app.should_quit = true;
        }

        // Movement
        (_, KeyCode::Char('j') | KeyCode::Down) => app.move_cursor(1),
        (_, KeyCode::Char('k') | KeyCode::Up) => app.move_cursor(-1),
        (_, KeyCode::Char('g') | KeyCode::Home) => app.cursor = 0,
        (_, KeyCode::Char('G') | KeyCode::End) => app.move_cursor(isize::MAX),

        // Expand / collapse
        (_, KeyCode::Enter) => app.toggle_selected(),
        (_, KeyCode::Char('l') | KeyCode::Right) => app.expand_selected(),
        (_, KeyCode::Char('h') | KeyCode::Left) => app.collapse_selected(),

        // Goals and tasks
        (_, KeyCode::Char('a')) => app.begin_new_goal(),
        (_, KeyCode::Char('e')) => app.begin_edit_goal(),
        (_, KeyCode::Char('t')) => app.begin_new_task(),
        (_, KeyCode::Char(' ') | KeyCode::Char('x')) => app.toggle_selected_task(),
        (_, KeyCode::Char('d')) => app.request_delete(),
        (_, KeyCode::Char('r')) => app.reload(),

        // Esc clears a stale goal error
        (_, KeyCode::Esc) => app.goals.clear_error(),
        _ => {}
    }
}
