use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::api::{ApiClient, ApiError, Backend};
use crate::io::config_io::Settings;
use crate::io::logging;
use crate::io::session::Session;
use crate::model::{
    Goal, MAX_DESCRIPTION_LEN, MAX_GOAL_TITLE_LEN, Task, UiConfig, User,
};
use crate::state::goals::DELETE_GOAL_PROMPT;
use crate::state::tasks::DELETE_TASK_PROMPT;
use crate::state::{GoalsState, TaskBoard, Tentative};
use crate::util::unicode::LineBuffer;

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into the status-row prompt
    Input,
    /// Waiting for y/n on a delete
    Confirm,
}

/// What the status-row prompt is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    NewGoalTitle,
    NewGoalDescription,
    EditGoalTitle { goal_id: i64 },
    EditGoalDescription { goal_id: i64 },
    NewTask { goal_id: i64 },
}

impl Prompt {
    pub fn label(self) -> &'static str {
        match self {
            Prompt::NewGoalTitle => "new goal",
            Prompt::NewGoalDescription => "description (optional)",
            Prompt::EditGoalTitle { .. } => "title",
            Prompt::EditGoalDescription { .. } => "description",
            Prompt::NewTask { .. } => "new task",
        }
    }

    /// Longest input the API accepts for this field
    pub fn max_chars(self) -> Option<usize> {
        match self {
            Prompt::NewGoalTitle | Prompt::EditGoalTitle { .. } => Some(MAX_GOAL_TITLE_LEN),
            Prompt::NewGoalDescription | Prompt::EditGoalDescription { .. } => {
                Some(MAX_DESCRIPTION_LEN)
            }
            Prompt::NewTask { .. } => None,
        }
    }
}

/// A delete awaiting confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteGoal { goal_id: i64 },
    DeleteTask { goal_id: i64, task_id: i64 },
}

impl ConfirmAction {
    pub fn prompt(self) -> &'static str {
        match self {
            ConfirmAction::DeleteGoal { .. } => DELETE_GOAL_PROMPT,
            ConfirmAction::DeleteTask { .. } => DELETE_TASK_PROMPT,
        }
    }
}

/// One row of the goal list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatItem {
    Goal { goal_id: i64 },
    Task { goal_id: i64, task_id: i64 },
    /// Loading, error or "no tasks" line of an expanded goal
    PanelNote { goal_id: i64 },
}

impl FlatItem {
    pub fn goal_id(self) -> i64 {
        match self {
            FlatItem::Goal { goal_id }
            | FlatItem::Task { goal_id, .. }
            | FlatItem::PanelNote { goal_id } => goal_id,
        }
    }
}

/// A finished network call, sent back from its worker thread
#[derive(Debug)]
pub enum Outcome {
    Goals(Result<Vec<Goal>, ApiError>),
    GoalCreated(Result<Goal, ApiError>),
    GoalSaved {
        goal_id: i64,
        result: Result<Goal, ApiError>,
    },
    GoalRemoved {
        goal_id: i64,
        result: Result<(), ApiError>,
    },
    Tasks {
        goal_id: i64,
        result: Result<Vec<Task>, ApiError>,
    },
    TaskCreated {
        goal_id: i64,
        result: Result<Task, ApiError>,
    },
    TaskToggled {
        change: Tentative<Task>,
        result: Result<Task, ApiError>,
    },
    TaskDeleted {
        change: Tentative<Task>,
        result: Result<(), ApiError>,
    },
    Me(Result<User, ApiError>),
}

/// Main application state
pub struct App {
    pub client: ApiClient,
    pub goals: GoalsState,
    pub board: TaskBoard,
    pub mode: Mode,
    pub prompt: Option<Prompt>,
    pub input: LineBuffer,
    pub confirm: Option<ConfirmAction>,
    /// Cursor index into the flat item list
    pub cursor: usize,
    /// First visible row
    pub scroll_offset: usize,
    pub theme: Theme,
    pub show_key_hints: bool,
    /// The logged-in user, once `/auth/me` has answered
    pub user: Option<User>,
    /// Calls sent to workers whose outcome has not been applied yet
    pub in_flight: usize,
    pub should_quit: bool,
    tx: Sender<Outcome>,
    pub(crate) outcomes: Receiver<Outcome>,
}

impl App {
    pub fn new(client: ApiClient, ui: &UiConfig) -> Self {
        let (tx, outcomes) = mpsc::channel();
        App {
            client,
            goals: GoalsState::new(),
            board: TaskBoard::new(),
            mode: Mode::Navigate,
            prompt: None,
            input: LineBuffer::default(),
            confirm: None,
            cursor: 0,
            scroll_offset: 0,
            theme: Theme::from_config(ui),
            show_key_hints: ui.show_key_hints,
            user: None,
            in_flight: 0,
            should_quit: false,
            tx,
            outcomes,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.client.session().is_logged_in()
    }

    /// Initial fetches: the goal list, plus who we are when a token exists.
    pub fn start(&mut self) {
        self.reload();
        if self.is_logged_in() {
            self.spawn(|c| Outcome::Me(c.me()));
        }
    }

    /// Run `job` against the API on a worker thread. Its outcome is applied
    /// by [`App::drain_outcomes`].
    pub fn spawn<F>(&mut self, job: F)
    where
        F: FnOnce(&ApiClient) -> Outcome + Send + 'static,
    {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.in_flight += 1;
        std::thread::spawn(move || {
            let _ = tx.send(job(&client));
        });
    }

    /// Apply every outcome that has arrived, in arrival order.
    pub fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.apply(outcome);
        }
    }

    pub fn apply(&mut self, outcome: Outcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Outcome::Goals(result) => self.goals.finish_load(result),
            Outcome::GoalCreated(result) => {
                let created = result.is_ok();
                self.goals.finish_create(result);
                if created {
                    self.cursor = 0;
                }
            }
            Outcome::GoalSaved { goal_id, result } => self.goals.finish_save_edit(goal_id, result),
            Outcome::GoalRemoved { goal_id, result } => {
                let removed = result.is_ok();
                self.goals.finish_remove(goal_id, result);
                if removed {
                    self.board.forget(goal_id);
                }
            }
            Outcome::Tasks { goal_id, result } => self.board.finish_load(goal_id, result),
            Outcome::TaskCreated { goal_id, result } => self.board.finish_create(goal_id, result),
            Outcome::TaskToggled { change, result } => self.board.finish_toggle(change, result),
            Outcome::TaskDeleted { change, result } => self.board.finish_delete(change, result),
            Outcome::Me(result) => match result {
                Ok(user) => self.user = Some(user),
                Err(e) => tracing::debug!(error = %e, "could not fetch current user"),
            },
        }
        if !self.is_logged_in() {
            self.user = None;
        }
        self.clamp_cursor();
    }

    // -----------------------------------------------------------------------
    // Rows and selection
    // -----------------------------------------------------------------------

    /// Goals in collection order; an expanded goal is followed by its task
    /// panel.
    pub fn build_flat_items(&self) -> Vec<FlatItem> {
        let mut items = Vec::new();
        for goal in self.goals.goals() {
            let goal_id = goal.id;
            items.push(FlatItem::Goal { goal_id });
            let Some(panel) = self.board.panel(goal_id).filter(|p| p.is_expanded()) else {
                continue;
            };
            let tasks = panel.ordered();
            let note = panel.error().is_some()
                || (panel.is_loading() && !panel.is_loaded())
                || (panel.is_loaded() && tasks.is_empty());
            if note {
                items.push(FlatItem::PanelNote { goal_id });
            }
            items.extend(tasks.iter().map(|t| FlatItem::Task {
                goal_id,
                task_id: t.id,
            }));
        }
        items
    }

    pub fn selected(&self) -> Option<FlatItem> {
        self.build_flat_items().get(self.cursor).copied()
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.build_flat_items().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.build_flat_items().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Put the cursor on a goal's own row.
    fn select_goal(&mut self, goal_id: i64) {
        if let Some(idx) = self
            .build_flat_items()
            .iter()
            .position(|i| *i == FlatItem::Goal { goal_id })
        {
            self.cursor = idx;
        }
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Refetch goals, plus tasks for every goal whose panel is open.
    pub fn reload(&mut self) {
        self.goals.begin_load();
        self.spawn(|c| Outcome::Goals(c.list_goals()));
        let open: Vec<i64> = self
            .goals
            .goals()
            .iter()
            .map(|g| g.id)
            .filter(|id| self.board.is_expanded(*id))
            .collect();
        for goal_id in open {
            self.load_tasks(goal_id);
        }
    }

    pub fn load_tasks(&mut self, goal_id: i64) {
        self.board.begin_load(goal_id);
        self.spawn(move |c| Outcome::Tasks {
            goal_id,
            result: c.list_tasks(goal_id),
        });
    }

    pub fn expand_selected(&mut self) {
        let Some(item) = self.selected() else {
            return;
        };
        let goal_id = item.goal_id();
        if self.board.expand(goal_id) {
            self.load_tasks(goal_id);
        }
    }

    pub fn collapse_selected(&mut self) {
        let Some(item) = self.selected() else {
            return;
        };
        let goal_id = item.goal_id();
        self.board.collapse(goal_id);
        self.select_goal(goal_id);
    }

    pub fn toggle_selected(&mut self) {
        let Some(item) = self.selected() else {
            return;
        };
        let goal_id = item.goal_id();
        if self.board.is_expanded(goal_id) {
            self.collapse_selected();
        } else if self.board.toggle_expanded(goal_id) {
            self.load_tasks(goal_id);
        }
    }

    // -----------------------------------------------------------------------
    // Prompts
    // -----------------------------------------------------------------------

    fn open_prompt(&mut self, prompt: Prompt, text: &str) {
        self.prompt = Some(prompt);
        self.input = LineBuffer::with_text(text);
        self.mode = Mode::Input;
    }

    fn close_prompt(&mut self) {
        self.prompt = None;
        self.input.clear();
        self.mode = Mode::Navigate;
    }

    pub fn begin_new_goal(&mut self) {
        let title = self.goals.form.title.clone();
        self.open_prompt(Prompt::NewGoalTitle, &title);
    }

    /// Edit the selected goal. Reopening the goal already in edit mode keeps
    /// the unsaved draft.
    pub fn begin_edit_goal(&mut self) {
        let Some(item) = self.selected() else {
            return;
        };
        let goal_id = item.goal_id();
        if self.goals.is_busy(goal_id) {
            return;
        }
        let resume = self.goals.editing().is_some_and(|d| d.goal_id == goal_id);
        if !resume && !self.goals.start_edit(goal_id) {
            return;
        }
        let title = self
            .goals
            .editing()
            .map(|d| d.title.clone())
            .unwrap_or_default();
        self.open_prompt(Prompt::EditGoalTitle { goal_id }, &title);
    }

    pub fn begin_new_task(&mut self) {
        let Some(item) = self.selected() else {
            return;
        };
        let goal_id = item.goal_id();
        if self.board.expand(goal_id) {
            self.load_tasks(goal_id);
        }
        let draft = self.board.draft(goal_id).to_string();
        self.open_prompt(Prompt::NewTask { goal_id }, &draft);
    }

    /// Enter on the prompt: advance to the next field or issue the call.
    pub fn submit_prompt(&mut self) {
        let Some(prompt) = self.prompt else {
            return;
        };
        let text = self.input.text().to_string();
        match prompt {
            Prompt::NewGoalTitle => {
                self.goals.form.title = text;
                if self.goals.check_form_title() {
                    let description = self.goals.form.description.clone();
                    self.open_prompt(Prompt::NewGoalDescription, &description);
                } else {
                    self.close_prompt();
                }
            }
            Prompt::NewGoalDescription => {
                self.goals.form.description = text;
                self.close_prompt();
                if let Some(body) = self.goals.begin_create() {
                    self.spawn(move |c| Outcome::GoalCreated(c.create_goal(&body)));
                }
            }
            Prompt::EditGoalTitle { goal_id } => {
                let description = match self.goals.editing_mut() {
                    Some(draft) => {
                        draft.title = text;
                        draft.description.clone()
                    }
                    None => return self.close_prompt(),
                };
                self.open_prompt(Prompt::EditGoalDescription { goal_id }, &description);
            }
            Prompt::EditGoalDescription { goal_id } => {
                let Some(draft) = self.goals.editing_mut() else {
                    return self.close_prompt();
                };
                draft.description = text;
                let (title, description) = (draft.title.clone(), draft.description.clone());
                self.close_prompt();
                if let Some(body) = self.goals.begin_save_edit(goal_id, &title, &description) {
                    self.spawn(move |c| Outcome::GoalSaved {
                        goal_id,
                        result: c.update_goal(goal_id, &body),
                    });
                }
            }
            Prompt::NewTask { goal_id } => {
                self.board.set_draft(goal_id, &text);
                self.close_prompt();
                if let Some(body) = self.board.begin_create(goal_id) {
                    self.spawn(move |c| Outcome::TaskCreated {
                        goal_id,
                        result: c.create_task(goal_id, &body),
                    });
                }
            }
        }
    }

    /// Esc on the prompt. Typed text survives in the goal form or the task
    /// draft; goal edits are discarded.
    pub fn cancel_prompt(&mut self) {
        let text = self.input.text().to_string();
        match self.prompt {
            Some(Prompt::NewGoalTitle) => self.goals.form.title = text,
            Some(Prompt::NewGoalDescription) => self.goals.form.description = text,
            Some(Prompt::EditGoalTitle { .. } | Prompt::EditGoalDescription { .. }) => {
                self.goals.cancel_edit()
            }
            Some(Prompt::NewTask { goal_id }) => self.board.set_draft(goal_id, &text),
            None => {}
        }
        self.close_prompt();
    }

    // -----------------------------------------------------------------------
    // Task toggle and deletes
    // -----------------------------------------------------------------------

    pub fn toggle_selected_task(&mut self) {
        let Some(FlatItem::Task { goal_id, task_id }) = self.selected() else {
            return;
        };
        if let Some((change, body)) = self.board.begin_toggle(goal_id, task_id) {
            self.spawn(move |c| {
                let result = c.update_task(task_id, &body);
                Outcome::TaskToggled { change, result }
            });
        }
    }

    /// Ask before deleting the selected goal or task.
    pub fn request_delete(&mut self) {
        let action = match self.selected() {
            Some(FlatItem::Task { goal_id, task_id }) => ConfirmAction::DeleteTask { goal_id, task_id },
            Some(FlatItem::Goal { goal_id }) if !self.goals.is_busy(goal_id) => {
                ConfirmAction::DeleteGoal { goal_id }
            }
            _ => return,
        };
        self.confirm = Some(action);
        self.mode = Mode::Confirm;
    }

    pub fn confirm_delete(&mut self) {
        let action = self.confirm.take();
        self.mode = Mode::Navigate;
        match action {
            Some(ConfirmAction::DeleteGoal { goal_id }) => {
                if self.goals.begin_remove(goal_id) {
                    self.spawn(move |c| Outcome::GoalRemoved {
                        goal_id,
                        result: c.delete_goal(goal_id),
                    });
                }
            }
            Some(ConfirmAction::DeleteTask { goal_id, task_id }) => {
                if let Some(change) = self.board.begin_delete(goal_id, task_id) {
                    self.spawn(move |c| {
                        let result = c.delete_task(task_id);
                        Outcome::TaskDeleted { change, result }
                    });
                    self.clamp_cursor();
                }
            }
            None => {}
        }
    }

    pub fn cancel_confirm(&mut self) {
        self.confirm = None;
        self.mode = Mode::Navigate;
    }
}

// ---------------------------------------------------------------------------
// Terminal lifecycle
// ---------------------------------------------------------------------------

/// Run the TUI application
pub fn run(api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(api_url)?;
    logging::init_file(&settings.log_path());
    let session = Session::from_config_dir(&settings.config_dir);
    let client = ApiClient::from_settings(&settings, session);
    tracing::info!(base_url = client.base_url(), "starting tui");

    let mut app = App::new(client, &settings.config.ui);
    app.start();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        // Worker results land between frames, on this thread only
        app.drain_outcomes();

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
