use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::{Goal, Task};
use crate::state::TaskPanel;
use crate::tui::app::{App, FlatItem};
use crate::util::unicode::{display_width, truncate_to_width};

const TASK_INDENT: &str = "    ";

/// Render the goal list with any expanded task panels
pub fn render_goal_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let flat_items = app.build_flat_items();

    if flat_items.is_empty() {
        let msg = if app.goals.is_loading() {
            " Loading goals\u{2026}"
        } else {
            " No goals yet. Press a to add one."
        };
        let empty = Paragraph::new(msg).style(Style::default().fg(app.theme.muted).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    // Keep the cursor on screen
    let visible_height = area.height as usize;
    app.cursor = app.cursor.min(flat_items.len() - 1);
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if app.cursor >= app.scroll_offset + visible_height {
        app.scroll_offset = app.cursor.saturating_sub(visible_height.saturating_sub(1));
    }

    let width = area.width as usize;
    let end = flat_items.len().min(app.scroll_offset + visible_height);
    let mut lines: Vec<Line> = Vec::with_capacity(visible_height);

    for (row, item) in flat_items
        .iter()
        .enumerate()
        .take(end)
        .skip(app.scroll_offset)
    {
        let is_cursor = row == app.cursor;
        let mut spans = match *item {
            FlatItem::Goal { goal_id } => match app.goals.goal(goal_id) {
                Some(goal) => goal_spans(app, goal, width),
                None => continue,
            },
            FlatItem::Task { goal_id, task_id } => {
                let task = app
                    .board
                    .panel(goal_id)
                    .and_then(|p| p.tasks())
                    .and_then(|tasks| tasks.iter().find(|t| t.id == task_id));
                match task {
                    Some(task) => task_spans(app, task, width),
                    None => continue,
                }
            }
            FlatItem::PanelNote { goal_id } => match app.board.panel(goal_id) {
                Some(panel) => note_spans(app, panel),
                None => continue,
            },
        };

        if is_cursor {
            for span in spans.iter_mut() {
                span.style = span.style.bg(app.theme.cursor_bg);
            }
            let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
            spans.push(Span::styled(
                " ".repeat(width.saturating_sub(used)),
                Style::default().bg(app.theme.cursor_bg),
            ));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn goal_spans<'a>(app: &App, goal: &Goal, width: usize) -> Vec<Span<'a>> {
    let bg = app.theme.background;
    let expanded = app.board.is_expanded(goal.id);
    let arrow = if expanded { "\u{25BE}" } else { "\u{25B8}" };

    // Right-hand badge: busy marker, or done/total once tasks are known
    let badge = if app.goals.is_busy(goal.id) {
        "saving\u{2026}".to_string()
    } else {
        match app.board.panel(goal.id).and_then(|p| p.tasks()) {
            Some(tasks) if !tasks.is_empty() => {
                let done = tasks.iter().filter(|t| t.is_done).count();
                format!("{}/{}", done, tasks.len())
            }
            _ => String::new(),
        }
    };
    let editing = app
        .goals
        .editing()
        .is_some_and(|d| d.goal_id == goal.id);
    let marker = if editing { " \u{270E}" } else { "" };

    let room = width.saturating_sub(display_width(&badge) + 4 + display_width(marker));
    let title = truncate_to_width(&goal.title, room);
    let mut spans = vec![
        Span::styled(format!(" {} ", arrow), Style::default().fg(app.theme.muted).bg(bg)),
        Span::styled(
            title.clone(),
            Style::default()
                .fg(app.theme.bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(marker, Style::default().fg(app.theme.warning).bg(bg)),
    ];

    let mut used = 3 + display_width(&title) + display_width(marker);
    if let Some(desc) = &goal.description {
        let room = width.saturating_sub(used + display_width(&badge) + 3);
        if room > 3 {
            let desc = truncate_to_width(desc.lines().next().unwrap_or(""), room);
            used += 2 + display_width(&desc);
            spans.push(Span::styled(
                format!("  {}", desc),
                Style::default().fg(app.theme.muted).bg(bg),
            ));
        }
    }
    if !badge.is_empty() {
        let padding = width.saturating_sub(used + display_width(&badge) + 1);
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(badge, Style::default().fg(app.theme.muted).bg(bg)));
    }
    spans
}

fn task_spans<'a>(app: &App, task: &Task, width: usize) -> Vec<Span<'a>> {
    let bg = app.theme.background;
    let checkbox = if task.is_done { "[x]" } else { "[ ]" };
    let title_style = if task.is_done {
        Style::default()
            .fg(app.theme.muted)
            .bg(bg)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(app.theme.text).bg(bg)
    };
    let room = width.saturating_sub(TASK_INDENT.len() + 4);
    vec![
        Span::styled(TASK_INDENT, Style::default().bg(bg)),
        Span::styled(
            checkbox,
            Style::default().fg(app.theme.checkbox_color(task.is_done)).bg(bg),
        ),
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(truncate_to_width(&task.title, room), title_style),
    ]
}

fn note_spans<'a>(app: &App, panel: &TaskPanel) -> Vec<Span<'a>> {
    let bg = app.theme.background;
    let (text, color) = if let Some(err) = panel.error() {
        (format!("! {}", err), app.theme.error)
    } else if !panel.is_loaded() {
        ("loading tasks\u{2026}".to_string(), app.theme.muted)
    } else {
        ("no tasks yet (t to add)".to_string(), app.theme.muted)
    };
    vec![
        Span::styled(TASK_INDENT, Style::default().bg(bg)),
        Span::styled(text, Style::default().fg(color).bg(bg)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::tui::app::testing::*;
    use crate::tui::render::test_helpers::render_to_string;
    use pretty_assertions::assert_eq;

    fn render(app: &mut App, w: u16, h: u16) -> String {
        render_to_string(w, h, |frame, area| render_goal_list(frame, app, area))
    }

    #[test]
    fn empty_list_hint() {
        let (mut app, _stub) = stub_app();
        assert_eq!(render(&mut app, 40, 3), " No goals yet. Press a to add one.");
        app.goals.begin_load();
        assert_eq!(render(&mut app, 40, 3), " Loading goals\u{2026}");
    }

    #[test]
    fn expanded_goal_shows_tasks_in_display_order() {
        let (mut app, _stub) = stub_app();
        let mut learn = goal(1, "Learn Rust");
        learn.description = Some("the book".into());
        app.goals.finish_load(Ok(vec![learn, goal(2, "Ship it")]));
        app.board.expand(1);
        app.board.finish_load(
            1,
            Ok(vec![
                task(1, 1, true, "Install rustup"),
                task(2, 1, false, "Chapter 1"),
                task(3, 1, false, "Chapter 2"),
            ]),
        );
        app.cursor = 3;

        let out = render(&mut app, 40, 6);
        assert_eq!(
            out,
            [
                " \u{25BE} Learn Rust  the book             1/3",
                "    [ ] Chapter 2",
                "    [ ] Chapter 1",
                "    [x] Install rustup",
                " \u{25B8} Ship it",
            ]
            .join("\n")
        );
    }

    #[test]
    fn panel_notes() {
        let (mut app, _stub) = stub_app();
        app.goals.finish_load(Ok(vec![goal(1, "One"), goal(2, "Two"), goal(3, "Three")]));
        app.board.expand(1);
        app.board.begin_load(1);
        app.board.expand(2);
        app.board.finish_load(2, Ok(vec![]));
        app.board.expand(3);
        app.board.finish_load(
            3,
            Err(ApiError::Request {
                status: 500,
                message: String::new(),
            }),
        );

        let out = render(&mut app, 40, 8);
        assert_eq!(
            out,
            [
                " \u{25BE} One",
                "    loading tasks\u{2026}",
                " \u{25BE} Two",
                "    no tasks yet (t to add)",
                " \u{25BE} Three",
                "    ! Failed to load tasks",
            ]
            .join("\n")
        );
    }

    #[test]
    fn busy_goal_shows_saving() {
        let (mut app, _stub) = stub_app();
        app.goals.finish_load(Ok(vec![goal(1, "One")]));
        app.goals.begin_remove(1);
        let out = render(&mut app, 30, 2);
        assert_eq!(out, format!(" \u{25B8} One{}saving\u{2026}", " ".repeat(16)));
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let (mut app, _stub) = stub_app();
        let goals: Vec<_> = (1..=10).map(|i| goal(i, &format!("Goal {}", i))).collect();
        app.goals.finish_load(Ok(goals));
        app.cursor = 9;
        let out = render(&mut app, 30, 3);
        assert_eq!(app.scroll_offset, 7);
        assert!(out.ends_with("Goal 10"));
    }
}
