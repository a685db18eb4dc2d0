use std::collections::HashSet;

use super::optimistic::replace_by_key;
use super::{Confirm, ValidationError};
use crate::api::{ApiError, Backend};
use crate::model::{Goal, GoalCreate, GoalUpdate, normalize_description, title_is_valid};

pub const DELETE_GOAL_PROMPT: &str = "Delete this goal? This cannot be undone.";

/// Contents of the "create goal" form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalForm {
    pub title: String,
    pub description: String,
}

/// Unsaved edits for the one goal in edit mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub goal_id: i64,
    pub title: String,
    pub description: String,
}

/// The goal list and everything the goal form/edit controls need.
///
/// Network-backed operations come in `begin_*`/`finish_*` pairs so the call
/// itself can run elsewhere; `load`, `create`, `save_edit` and `remove`
/// compose both halves over a [`Backend`].
#[derive(Debug, Default)]
pub struct GoalsState {
    goals: Vec<Goal>,
    /// The "create goal" form
    pub form: GoalForm,
    editing: Option<EditDraft>,
    busy: HashSet<i64>,
    loading: bool,
    error: Option<String>,
}

impl GoalsState {
    pub fn new() -> Self {
        GoalsState::default()
    }

    /// Goals in collection order (newest created first after local creates)
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, goal_id: i64) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == goal_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The most recent error for the goal scope
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Whether a save or delete is in flight for this goal
    pub fn is_busy(&self, goal_id: i64) -> bool {
        self.busy.contains(&goal_id)
    }

    pub fn editing(&self) -> Option<&EditDraft> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut EditDraft> {
        self.editing.as_mut()
    }

    fn fail(&mut self, err: &ApiError) {
        tracing::debug!(error = %err, "goal operation failed");
        self.error = Some(err.message_or("Unknown error"));
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Replace the collection with the server's list. Responses are applied
    /// in arrival order: the last one to land wins.
    pub fn finish_load(&mut self, result: Result<Vec<Goal>, ApiError>) {
        self.loading = false;
        match result {
            Ok(goals) => {
                tracing::debug!(count = goals.len(), "goals loaded");
                self.goals = goals;
                self.error = None;
            }
            Err(e) => self.fail(&e),
        }
    }

    pub fn load(&mut self, backend: &dyn Backend) {
        self.begin_load();
        let result = backend.list_goals();
        self.finish_load(result);
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Check the form's title, setting the validation error when it is too
    /// short and clearing any previous error otherwise.
    pub fn check_form_title(&mut self) -> bool {
        let valid = title_is_valid(&self.form.title);
        self.error = if valid {
            None
        } else {
            Some(ValidationError::TitleTooShort.to_string())
        };
        valid
    }

    /// Validate the form. Returns the request body, or `None` after setting
    /// a validation error.
    pub fn begin_create(&mut self) -> Option<GoalCreate> {
        if !self.check_form_title() {
            return None;
        }
        Some(GoalCreate {
            title: self.form.title.trim().to_string(),
            description: normalize_description(&self.form.description),
        })
    }

    /// Prepend the created goal and reset the form; on failure leave both
    /// untouched.
    pub fn finish_create(&mut self, result: Result<Goal, ApiError>) {
        match result {
            Ok(goal) => {
                tracing::info!(goal_id = goal.id, "goal created");
                self.goals.insert(0, goal);
                self.form = GoalForm::default();
                self.error = None;
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Fill the form and submit it. Returns true if the goal was created.
    pub fn create(&mut self, backend: &dyn Backend, title: &str, description: Option<&str>) -> bool {
        self.form = GoalForm {
            title: title.to_string(),
            description: description.unwrap_or_default().to_string(),
        };
        self.submit_form(backend)
    }

    pub fn submit_form(&mut self, backend: &dyn Backend) -> bool {
        let Some(body) = self.begin_create() else {
            return false;
        };
        let result = backend.create_goal(&body);
        let ok = result.is_ok();
        self.finish_create(result);
        ok
    }

    // -----------------------------------------------------------------------
    // Edit
    // -----------------------------------------------------------------------

    /// Enter edit mode for a goal, replacing any other edit in progress.
    pub fn start_edit(&mut self, goal_id: i64) -> bool {
        let Some(goal) = self.goal(goal_id) else {
            return false;
        };
        self.editing = Some(EditDraft {
            goal_id,
            title: goal.title.clone(),
            description: goal.description.clone().unwrap_or_default(),
        });
        true
    }

    /// Leave edit mode, discarding unsaved edits.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Validate and mark the goal busy. Returns the request body, or `None`
    /// when validation fails (edit mode stays open) or a call is already in
    /// flight for this goal.
    pub fn begin_save_edit(&mut self, goal_id: i64, title: &str, description: &str) -> Option<GoalUpdate> {
        let title = title.trim();
        if !title_is_valid(title) {
            self.error = Some(ValidationError::TitleTooShort.to_string());
            return None;
        }
        if !self.busy.insert(goal_id) {
            return None;
        }
        self.error = None;
        Some(GoalUpdate {
            title: Some(title.to_string()),
            description: Some(normalize_description(description)),
        })
    }

    pub fn finish_save_edit(&mut self, goal_id: i64, result: Result<Goal, ApiError>) {
        self.busy.remove(&goal_id);
        match result {
            Ok(goal) => {
                replace_by_key(&mut self.goals, goal);
                if self.editing.as_ref().is_some_and(|d| d.goal_id == goal_id) {
                    self.editing = None;
                }
                self.error = None;
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Save `title`/`description` for a goal. Returns true on success.
    pub fn save_edit(&mut self, backend: &dyn Backend, goal_id: i64, title: &str, description: &str) -> bool {
        let Some(body) = self.begin_save_edit(goal_id, title, description) else {
            return false;
        };
        let result = backend.update_goal(goal_id, &body);
        let ok = result.is_ok();
        self.finish_save_edit(goal_id, result);
        ok
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Mark the goal busy ahead of a delete call. False if it already is.
    pub fn begin_remove(&mut self, goal_id: i64) -> bool {
        if !self.busy.insert(goal_id) {
            return false;
        }
        self.error = None;
        true
    }

    pub fn finish_remove(&mut self, goal_id: i64, result: Result<(), ApiError>) {
        self.busy.remove(&goal_id);
        match result {
            Ok(()) => {
                tracing::info!(goal_id, "goal deleted");
                self.goals.retain(|g| g.id != goal_id);
                if self.editing.as_ref().is_some_and(|d| d.goal_id == goal_id) {
                    self.editing = None;
                }
                self.error = None;
            }
            Err(e) => self.fail(&e),
        }
    }

    /// Delete a goal after confirmation. Returns true if it was deleted;
    /// declining is a silent no-op.
    pub fn remove(&mut self, backend: &dyn Backend, goal_id: i64, confirm: &mut dyn Confirm) -> bool {
        if !confirm.confirm(DELETE_GOAL_PROMPT) {
            return false;
        }
        if !self.begin_remove(goal_id) {
            return false;
        }
        let result = backend.delete_goal(goal_id);
        let ok = result.is_ok();
        self.finish_remove(goal_id, result);
        ok
    }
}
