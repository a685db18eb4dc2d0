use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime};
use indexmap::IndexMap;

use super::Confirm;
use super::optimistic::Tentative;
use crate::api::{ApiError, Backend};
use crate::model::{Task, TaskCreate, TaskUpdate};

pub const DELETE_TASK_PROMPT: &str = "Delete this task? This cannot be undone.";

/// Task state for one goal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPanel {
    /// `None` until the first successful fetch
    tasks: Option<Vec<Task>>,
    loading: bool,
    error: Option<String>,
    /// Text of the add-task input
    pub draft: String,
    expanded: bool,
}

impl TaskPanel {
    pub fn tasks(&self) -> Option<&[Task]> {
        self.tasks.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.tasks.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Tasks in display order; empty when nothing is loaded
    pub fn ordered(&self) -> Vec<&Task> {
        self.tasks.as_deref().map(display_order).unwrap_or_default()
    }

    fn fail(&mut self, err: &ApiError, fallback: &str) {
        tracing::debug!(error = %err, "task operation failed");
        self.error = Some(err.message_or(fallback));
    }
}

/// Per-goal task panels, keyed by goal id in first-touched order.
#[derive(Debug, Default)]
pub struct TaskBoard {
    panels: IndexMap<i64, TaskPanel>,
}

impl TaskBoard {
    pub fn new() -> Self {
        TaskBoard::default()
    }

    pub fn panel(&self, goal_id: i64) -> Option<&TaskPanel> {
        self.panels.get(&goal_id)
    }

    fn panel_mut(&mut self, goal_id: i64) -> &mut TaskPanel {
        self.panels.entry(goal_id).or_default()
    }

    pub fn is_expanded(&self, goal_id: i64) -> bool {
        self.panel(goal_id).is_some_and(|p| p.expanded)
    }

    /// Drop all state for a goal that no longer exists.
    pub fn forget(&mut self, goal_id: i64) {
        self.panels.shift_remove(&goal_id);
    }

    // -----------------------------------------------------------------------
    // Visibility
    // -----------------------------------------------------------------------

    /// Show a goal's tasks. Returns true when the caller should fetch them:
    /// nothing has been loaded yet and no fetch is already running.
    pub fn expand(&mut self, goal_id: i64) -> bool {
        let panel = self.panel_mut(goal_id);
        panel.expanded = true;
        panel.tasks.is_none() && !panel.loading
    }

    pub fn collapse(&mut self, goal_id: i64) {
        if let Some(panel) = self.panels.get_mut(&goal_id) {
            panel.expanded = false;
        }
    }

    /// Flip visibility. Returns true when a fetch is needed (see [`expand`]).
    ///
    /// [`expand`]: TaskBoard::expand
    pub fn toggle_expanded(&mut self, goal_id: i64) -> bool {
        if self.is_expanded(goal_id) {
            self.collapse(goal_id);
            false
        } else {
            self.expand(goal_id)
        }
    }

    /// Expand and, the first time only, fetch the goal's tasks.
    pub fn expand_and_load(&mut self, backend: &dyn Backend, goal_id: i64) {
        if self.expand(goal_id) {
            self.load_tasks(backend, goal_id);
        }
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    pub fn begin_load(&mut self, goal_id: i64) {
        let panel = self.panel_mut(goal_id);
        panel.loading = true;
        panel.error = None;
    }

    /// Replace the goal's task list. Late responses for collapsed goals still
    /// land; the last response to arrive wins. A forgotten goal stays gone.
    pub fn finish_load(&mut self, goal_id: i64, result: Result<Vec<Task>, ApiError>) {
        let Some(panel) = self.panels.get_mut(&goal_id) else {
            tracing::debug!(goal_id, "dropping task list for forgotten goal");
            return;
        };
        panel.loading = false;
        match result {
            Ok(mut tasks) => {
                let before = tasks.len();
                tasks.retain(|t| t.goal_id == goal_id);
                if tasks.len() != before {
                    tracing::warn!(goal_id, dropped = before - tasks.len(), "ignoring tasks for another goal");
                }
                panel.tasks = Some(tasks);
                panel.error = None;
            }
            Err(e) => panel.fail(&e, "Failed to load tasks"),
        }
    }

    pub fn load_tasks(&mut self, backend: &dyn Backend, goal_id: i64) {
        self.begin_load(goal_id);
        let result = backend.list_tasks(goal_id);
        self.finish_load(goal_id, result);
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    pub fn set_draft(&mut self, goal_id: i64, text: &str) {
        self.panel_mut(goal_id).draft = text.to_string();
    }

    pub fn draft(&self, goal_id: i64) -> &str {
        self.panel(goal_id).map(|p| p.draft.as_str()).unwrap_or("")
    }

    /// The request body for the goal's draft, or `None` when the trimmed
    /// draft is empty.
    pub fn begin_create(&mut self, goal_id: i64) -> Option<TaskCreate> {
        let panel = self.panel_mut(goal_id);
        let title = panel.draft.trim();
        if title.is_empty() {
            return None;
        }
        let body = TaskCreate {
            title: title.to_string(),
        };
        panel.error = None;
        Some(body)
    }

    pub fn finish_create(&mut self, goal_id: i64, result: Result<Task, ApiError>) {
        let Some(panel) = self.panels.get_mut(&goal_id) else {
            tracing::debug!(goal_id, "dropping created task for forgotten goal");
            return;
        };
        match result {
            Ok(task) => {
                tracing::info!(goal_id, task_id = task.id, "task created");
                // An unloaded list picks the task up on its first fetch
                if let Some(tasks) = panel.tasks.as_mut() {
                    tasks.insert(0, task);
                }
                panel.draft.clear();
                panel.error = None;
            }
            Err(e) => panel.fail(&e, "Failed to create task"),
        }
    }

    /// Set the draft and submit it. Returns true if a task was created.
    pub fn create_task(&mut self, backend: &dyn Backend, goal_id: i64, title: &str) -> bool {
        self.set_draft(goal_id, title);
        self.submit_draft(backend, goal_id)
    }

    pub fn submit_draft(&mut self, backend: &dyn Backend, goal_id: i64) -> bool {
        let Some(body) = self.begin_create(goal_id) else {
            return false;
        };
        let result = backend.create_task(goal_id, &body);
        let ok = result.is_ok();
        self.finish_create(goal_id, result);
        ok
    }

    // -----------------------------------------------------------------------
    // Toggle
    // -----------------------------------------------------------------------

    /// Flip `is_done` locally and return the pending change with its request
    /// body. `None` if the task is not in the goal's loaded list.
    pub fn begin_toggle(&mut self, goal_id: i64, task_id: i64) -> Option<(Tentative<Task>, TaskUpdate)> {
        let panel = self.panels.get_mut(&goal_id)?;
        let tasks = panel.tasks.as_mut()?;
        let mut done = false;
        let change = Tentative::on_record(goal_id, tasks, task_id, |t| {
            t.is_done = !t.is_done;
            done = t.is_done;
        })?;
        panel.error = None;
        let body = TaskUpdate {
            is_done: Some(done),
            ..TaskUpdate::default()
        };
        Some((change, body))
    }

    /// Fold in the server's record, or restore the exact pre-toggle record.
    pub fn finish_toggle(&mut self, change: Tentative<Task>, result: Result<Task, ApiError>) {
        let Some(panel) = self.panels.get_mut(&change.scope) else {
            return;
        };
        let Some(tasks) = panel.tasks.as_mut() else {
            return;
        };
        match result {
            Ok(task) => {
                change.commit(tasks, Some(task));
                panel.error = None;
            }
            Err(e) => {
                tracing::info!(goal_id = change.scope, task_id = change.key, "reverting task toggle");
                change.rollback(tasks);
                panel.fail(&e, "Failed to update task");
            }
        }
    }

    /// Returns true if the server accepted the toggle.
    pub fn toggle_done(&mut self, backend: &dyn Backend, goal_id: i64, task_id: i64) -> bool {
        let Some((change, body)) = self.begin_toggle(goal_id, task_id) else {
            return false;
        };
        let result = backend.update_task(task_id, &body);
        let ok = result.is_ok();
        self.finish_toggle(change, result);
        ok
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Remove the task locally, keeping a snapshot of the whole list.
    pub fn begin_delete(&mut self, goal_id: i64, task_id: i64) -> Option<Tentative<Task>> {
        let panel = self.panels.get_mut(&goal_id)?;
        let tasks = panel.tasks.as_mut()?;
        if !tasks.iter().any(|t| t.id == task_id) {
            return None;
        }
        panel.error = None;
        Some(Tentative::on_list(goal_id, tasks, task_id, |list| {
            list.retain(|t| t.id != task_id)
        }))
    }

    /// On failure the whole pre-delete list comes back, in its old order.
    pub fn finish_delete(&mut self, change: Tentative<Task>, result: Result<(), ApiError>) {
        let Some(panel) = self.panels.get_mut(&change.scope) else {
            return;
        };
        let Some(tasks) = panel.tasks.as_mut() else {
            return;
        };
        match result {
            Ok(()) => {
                tracing::info!(goal_id = change.scope, task_id = change.key, "task deleted");
                change.commit(tasks, None);
                panel.error = None;
            }
            Err(e) => {
                change.rollback(tasks);
                panel.fail(&e, "Failed to delete task");
            }
        }
    }

    /// Delete after confirmation. Returns true if the server deleted it.
    pub fn delete_task(
        &mut self,
        backend: &dyn Backend,
        goal_id: i64,
        task_id: i64,
        confirm: &mut dyn Confirm,
    ) -> bool {
        if !confirm.confirm(DELETE_TASK_PROMPT) {
            return false;
        }
        let Some(change) = self.begin_delete(goal_id, task_id) else {
            return false;
        };
        let result = backend.delete_task(task_id);
        let ok = result.is_ok();
        self.finish_delete(change, result);
        ok
    }
}

// ---------------------------------------------------------------------------
// Display order
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 timestamp, with or without an offset.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

fn newest_first(a: &Task, b: &Task) -> Ordering {
    let ka = (parse_timestamp(&a.created_at), a.created_at.as_str(), a.id);
    let kb = (parse_timestamp(&b.created_at), b.created_at.as_str(), b.id);
    kb.cmp(&ka)
}

/// Open tasks before done ones; newest first within each group.
///
/// Timestamps that do not parse sort after those that do and fall back to
/// comparing the raw text.
pub fn display_order(tasks: &[Task]) -> Vec<&Task> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by(|a, b| a.is_done.cmp(&b.is_done).then_with(|| newest_first(a, b)));
    ordered
}
