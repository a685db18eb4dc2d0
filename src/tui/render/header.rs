use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

/// App name and API URL on the left, session state on the right, with a
/// separator line below.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let bg = app.theme.background;
    let width = chunks[0].width as usize;

    let (dot, who, who_color) = match (&app.user, app.is_logged_in()) {
        (Some(user), true) => ("\u{25CF}", user.email.clone(), app.theme.done),
        (None, true) => ("\u{25CF}", "logged in".to_string(), app.theme.done),
        (_, false) => ("\u{25CB}", "logged out (dt login)".to_string(), app.theme.error),
    };
    let busy = if app.in_flight > 0 { "\u{2026} " } else { "" };
    let right = format!("{}{} {} ", busy, dot, who);
    let right_width = display_width(&right);

    let name = " devtrackr ";
    let url_room = width.saturating_sub(display_width(name) + right_width + 1);
    let url = truncate_to_width(app.client.base_url(), url_room);
    let used = display_width(name) + display_width(&url);
    let padding = width.saturating_sub(used + right_width);

    let line = Line::from(vec![
        Span::styled(
            name,
            Style::default()
                .fg(app.theme.accent)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(url, Style::default().fg(app.theme.muted).bg(bg)),
        Span::styled(" ".repeat(padding), Style::default().bg(bg)),
        Span::styled(right, Style::default().fg(who_color).bg(bg)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), chunks[0]);

    let sep = Span::styled(
        "\u{2500}".repeat(chunks[1].width as usize),
        Style::default().fg(app.theme.muted).bg(bg),
    );
    frame.render_widget(Paragraph::new(Line::from(sep)), chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;
    use crate::tui::app::testing::stub_app;
    use crate::tui::render::test_helpers::render_to_string;

    #[test]
    fn shows_user_email_when_known() {
        let (mut app, _stub) = stub_app();
        app.user = Some(User {
            id: 1,
            email: "ada@example.com".into(),
            created_at: "T".into(),
        });
        let out = render_to_string(60, 2, |frame, area| render_header(frame, &app, area));
        let first = out.lines().next().unwrap();
        assert!(first.starts_with(" devtrackr http://api.test"));
        assert!(first.ends_with("\u{25CF} ada@example.com"));
    }

    #[test]
    fn shows_logged_out_after_session_clear() {
        let (app, _stub) = stub_app();
        app.client.session().clear();
        let out = render_to_string(60, 2, |frame, area| render_header(frame, &app, area));
        assert!(out.lines().next().unwrap().ends_with("\u{25CB} logged out (dt login)"));
        assert_eq!(out.lines().nth(1).unwrap(), "\u{2500}".repeat(60));
    }
}
