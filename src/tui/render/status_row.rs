use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::unicode::{display_width, truncate_to_width};

const KEY_HINTS: &str =
    "j/k move  enter open  a goal  e edit  t task  space done  d delete  r reload  q quit";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = match app.mode {
        Mode::Input => {
            let label = app.prompt.map(|p| p.label()).unwrap_or("");
            let prefix = format!("{}: ", label);
            let cursor_x = display_width(&prefix) + app.input.cursor_col();
            // Hidden cursor when the text runs past the right edge
            if cursor_x < width {
                frame.set_cursor_position((area.x + cursor_x as u16, area.y));
            }
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(app.theme.accent).bg(bg)),
                Span::styled(
                    app.input.text().to_string(),
                    Style::default().fg(app.theme.bright).bg(bg),
                ),
            ])
        }
        Mode::Confirm => {
            let prompt = app.confirm.map(|c| c.prompt()).unwrap_or("");
            Line::from(vec![
                Span::styled(
                    truncate_to_width(prompt, width.saturating_sub(6)),
                    Style::default()
                        .fg(app.theme.warning)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" [y/n]", Style::default().fg(app.theme.muted).bg(bg)),
            ])
        }
        Mode::Navigate => match app.goals.error() {
            Some(err) => Line::from(Span::styled(
                truncate_to_width(err, width),
                Style::default().fg(app.theme.error).bg(bg),
            )),
            None if app.show_key_hints => Line::from(Span::styled(
                truncate_to_width(KEY_HINTS, width),
                Style::default().fg(app.theme.muted).bg(bg),
            )),
            None => Line::from(Span::styled(" ".repeat(width), Style::default().bg(bg))),
        },
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
