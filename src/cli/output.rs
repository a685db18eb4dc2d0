use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

use crate::model::{ClientConfig, Goal, Task, User};

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

/// A goal with its tasks in display order, for `tasks --json`
#[derive(Serialize)]
pub struct GoalTasksJson<'a> {
    pub goal_id: i64,
    pub tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
pub struct SessionJson {
    pub logged_in: bool,
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Calendar date of a server timestamp, or the raw text if it doesn't parse
pub fn format_date(created_at: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(created_at) {
        return dt.format("%Y-%m-%d").to_string();
    }
    match NaiveDateTime::parse_from_str(created_at, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) => created_at.to_string(),
    }
}

fn checkbox(task: &Task) -> char {
    if task.is_done { 'x' } else { ' ' }
}

pub fn format_goal_line(goal: &Goal) -> String {
    format!("#{} {} ({})", goal.id, goal.title, format_date(&goal.created_at))
}

/// Goal summary with its description indented underneath
pub fn format_goal(goal: &Goal) -> Vec<String> {
    let mut lines = vec![format_goal_line(goal)];
    if let Some(desc) = &goal.description {
        for line in desc.lines() {
            lines.push(format!("    {}", line));
        }
    }
    lines
}

pub fn format_goal_listing(goals: &[Goal]) -> Vec<String> {
    if goals.is_empty() {
        return vec!["no goals yet".to_string()];
    }
    goals.iter().flat_map(format_goal).collect()
}

pub fn format_task_line(task: &Task) -> String {
    format!("[{}] #{} {}", checkbox(task), task.id, task.title)
}

/// Header plus one line per task; `tasks` should already be in display order.
pub fn format_task_listing(goal_id: i64, tasks: &[&Task]) -> Vec<String> {
    let mut lines = vec![format!("== goal #{} ==", goal_id)];
    if tasks.is_empty() {
        lines.push("no tasks yet".to_string());
    }
    lines.extend(tasks.iter().map(|t| format_task_line(t)));
    let done = tasks.iter().filter(|t| t.is_done).count();
    if !tasks.is_empty() {
        lines.push(format!("{}/{} done", done, tasks.len()));
    }
    lines
}

pub fn format_user(user: &User) -> String {
    format!("{} (user #{}, since {})", user.email, user.id, format_date(&user.created_at))
}

pub fn format_config(config: &ClientConfig, config_dir: &std::path::Path) -> Vec<String> {
    vec![
        format!("config_dir = {}", config_dir.display()),
        format!("api.base_url = {}", config.api.base_url),
        format!("api.timeout_secs = {}", config.api.timeout_secs),
        format!("ui.show_key_hints = {}", config.ui.show_key_hints),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::display_order;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn task(id: i64, done: bool, title: &str, created_at: &str) -> Task {
        Task {
            id,
            goal_id: 4,
            title: title.into(),
            is_done: done,
            created_at: created_at.into(),
        }
    }

    #[test]
    fn dates_accept_naive_and_offset_timestamps() {
        assert_eq!(format_date("2025-06-01T12:30:00"), "2025-06-01");
        assert_eq!(format_date("2025-06-01T12:30:00.123456"), "2025-06-01");
        assert_eq!(format_date("2025-06-01T23:30:00+00:00"), "2025-06-01");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn goal_with_multiline_description() {
        let goal = Goal {
            id: 4,
            title: "Learn Rust".into(),
            description: Some("Finish the book\nShip a CLI".into()),
            created_at: "2025-06-01T12:00:00".into(),
        };
        assert_snapshot!(format_goal(&goal).join("\n"), @r"
        #4 Learn Rust (2025-06-01)
            Finish the book
            Ship a CLI
        ");
    }

    #[test]
    fn task_listing_in_display_order() {
        let tasks = vec![
            task(1, false, "Read chapter 1", "2025-06-01T10:00:00"),
            task(2, true, "Install rustup", "2025-06-01T09:00:00"),
            task(3, false, "Read chapter 2", "2025-06-02T10:00:00"),
        ];
        let ordered = display_order(&tasks);
        assert_snapshot!(format_task_listing(4, &ordered).join("\n"), @r"
        == goal #4 ==
        [ ] #3 Read chapter 2
        [ ] #1 Read chapter 1
        [x] #2 Install rustup
        1/3 done
        ");
    }

    #[test]
    fn empty_listings() {
        assert_eq!(format_goal_listing(&[]), vec!["no goals yet"]);
        assert_eq!(format_task_listing(9, &[]), vec!["== goal #9 ==", "no tasks yet"]);
    }

    #[test]
    fn json_is_server_shape() {
        let t = task(1, true, "x", "T");
        let json = to_json(&GoalTasksJson {
            goal_id: 4,
            tasks: vec![&t],
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tasks"][0]["is_done"], serde_json::json!(true));
        assert_eq!(value["goal_id"], serde_json::json!(4));
    }
}
