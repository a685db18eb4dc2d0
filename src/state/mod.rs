pub mod goals;
pub mod optimistic;
pub mod tasks;

pub use goals::{EditDraft, GoalForm, GoalsState};
pub use optimistic::{Keyed, Snapshot, Tentative};
pub use tasks::{TaskBoard, TaskPanel, display_order};

/// Client-side rejection; never reaches the network
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title must be at least 3 characters.")]
    TitleTooShort,
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use crate::api::{ApiError, Backend};
    use crate::model::{Goal, GoalCreate, GoalUpdate, Task, TaskCreate, TaskUpdate};

    /// In-memory stand-in for the API with per-operation failure injection.
    #[derive(Default)]
    pub struct FakeBackend {
        pub goals: RefCell<Vec<Goal>>,
        pub tasks: RefCell<Vec<Task>>,
        next_id: Cell<i64>,
        clock: Cell<u32>,
        calls: RefCell<Vec<String>>,
        failures: RefCell<HashMap<&'static str, ApiError>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            let fake = FakeBackend::default();
            fake.next_id.set(100);
            fake
        }

        pub fn with_goals(goals: Vec<Goal>) -> Self {
            let fake = FakeBackend::new();
            *fake.goals.borrow_mut() = goals;
            fake
        }

        pub fn with_tasks(tasks: Vec<Task>) -> Self {
            let fake = FakeBackend::new();
            *fake.tasks.borrow_mut() = tasks;
            fake
        }

        /// Make every subsequent call of `op` fail with `err`.
        pub fn fail(&self, op: &'static str, err: ApiError) {
            self.failures.borrow_mut().insert(op, err);
        }

        pub fn heal(&self, op: &'static str) {
            self.failures.borrow_mut().remove(op);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        pub fn count(&self, op: &str) -> usize {
            self.calls.borrow().iter().filter(|c| c.as_str() == op).count()
        }

        fn enter(&self, op: &'static str) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(op.to_string());
            match self.failures.borrow().get(op) {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn fresh_id(&self) -> i64 {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            id
        }

        fn now(&self) -> String {
            let tick = self.clock.get() + 1;
            self.clock.set(tick);
            format!("2025-06-01T12:00:{tick:02}")
        }

        fn not_found(what: &str) -> ApiError {
            ApiError::Request {
                status: 404,
                message: format!(r#"{{"detail":"{what} not found"}}"#),
            }
        }
    }

    impl Backend for FakeBackend {
        fn list_goals(&self) -> Result<Vec<Goal>, ApiError> {
            self.enter("list_goals")?;
            Ok(self.goals.borrow().clone())
        }

        fn create_goal(&self, body: &GoalCreate) -> Result<Goal, ApiError> {
            self.enter("create_goal")?;
            let goal = Goal {
                id: self.fresh_id(),
                title: body.title.clone(),
                description: body.description.clone(),
                created_at: self.now(),
            };
            self.goals.borrow_mut().insert(0, goal.clone());
            Ok(goal)
        }

        fn update_goal(&self, goal_id: i64, body: &GoalUpdate) -> Result<Goal, ApiError> {
            self.enter("update_goal")?;
            let mut goals = self.goals.borrow_mut();
            let goal = goals
                .iter_mut()
                .find(|g| g.id == goal_id)
                .ok_or_else(|| Self::not_found("Goal"))?;
            if let Some(title) = &body.title {
                goal.title = title.clone();
            }
            if let Some(description) = &body.description {
                goal.description = description.clone();
            }
            Ok(goal.clone())
        }

        fn delete_goal(&self, goal_id: i64) -> Result<(), ApiError> {
            self.enter("delete_goal")?;
            let mut goals = self.goals.borrow_mut();
            let before = goals.len();
            goals.retain(|g| g.id != goal_id);
            if goals.len() == before {
                return Err(Self::not_found("Goal"));
            }
            Ok(())
        }

        fn list_tasks(&self, goal_id: i64) -> Result<Vec<Task>, ApiError> {
            self.enter("list_tasks")?;
            Ok(self
                .tasks
                .borrow()
                .iter()
                .filter(|t| t.goal_id == goal_id)
                .cloned()
                .collect())
        }

        fn create_task(&self, goal_id: i64, body: &TaskCreate) -> Result<Task, ApiError> {
            self.enter("create_task")?;
            let task = Task {
                id: self.fresh_id(),
                goal_id,
                title: body.title.clone(),
                is_done: false,
                created_at: self.now(),
            };
            self.tasks.borrow_mut().push(task.clone());
            Ok(task)
        }

        fn update_task(&self, task_id: i64, body: &TaskUpdate) -> Result<Task, ApiError> {
            self.enter("update_task")?;
            let mut tasks = self.tasks.borrow_mut();
            let task = tasks
                .iter_mut()
                .find(|t| t.id == task_id)
                .ok_or_else(|| Self::not_found("Task"))?;
            if let Some(title) = &body.title {
                task.title = title.clone();
            }
            if let Some(done) = body.is_done {
                task.is_done = done;
            }
            Ok(task.clone())
        }

        fn delete_task(&self, task_id: i64) -> Result<(), ApiError> {
            self.enter("delete_task")?;
            let mut tasks = self.tasks.borrow_mut();
            let before = tasks.len();
            tasks.retain(|t| t.id != task_id);
            if tasks.len() == before {
                return Err(Self::not_found("Task"));
            }
            Ok(())
        }
    }
}
