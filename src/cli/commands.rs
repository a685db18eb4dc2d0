use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dt", about = concat!("devtrackr v", env!("CARGO_PKG_VERSION"), " - goals and tasks from the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// API base URL (overrides DEVTRACKR_API_BASE_URL and config.toml)
    #[arg(long = "api-url", global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the API is reachable
    Health,
    /// Create an account
    Register(CredentialArgs),
    /// Log in and store the session token
    Login(CredentialArgs),
    /// Forget the stored session token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List goals
    Goals,
    /// Create, edit or delete a goal
    Goal(GoalCmd),
    /// List a goal's tasks (open first, newest first)
    Tasks(TasksArgs),
    /// Create, toggle or delete a task
    Task(TaskCmd),
    /// Show or change client configuration
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CredentialArgs {
    /// Account email
    pub email: String,
    /// Password (prompted for when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct GoalCmd {
    #[command(subcommand)]
    pub action: GoalAction,
}

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a goal
    Add(GoalAddArgs),
    /// Change a goal's title or description
    Edit(GoalEditArgs),
    /// Delete a goal
    Rm(GoalRmArgs),
}

#[derive(Args)]
pub struct GoalAddArgs {
    /// Goal title (at least 3 characters)
    pub title: String,
    /// Goal description
    #[arg(short, long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct GoalEditArgs {
    /// Goal ID
    pub id: i64,
    /// New title (default: keep)
    #[arg(long)]
    pub title: Option<String>,
    /// New description; an empty string clears it (default: keep)
    #[arg(short, long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct GoalRmArgs {
    /// Goal ID
    pub id: i64,
    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TasksArgs {
    /// Goal ID
    pub goal_id: i64,
}

#[derive(Args)]
pub struct TaskCmd {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a goal
    Add(TaskAddArgs),
    /// Flip a task between open and done
    Toggle(TaskRefArgs),
    /// Delete a task
    Rm(TaskRmArgs),
}

#[derive(Args)]
pub struct TaskAddArgs {
    /// Goal ID
    pub goal_id: i64,
    /// Task title
    pub title: String,
}

#[derive(Args)]
pub struct TaskRefArgs {
    /// Goal ID
    pub goal_id: i64,
    /// Task ID
    pub task_id: i64,
}

#[derive(Args)]
pub struct TaskRmArgs {
    /// Goal ID
    pub goal_id: i64,
    /// Task ID
    pub task_id: i64,
    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the resolved configuration (default)
    Show,
    /// Set a value in config.toml
    Set(ConfigSetArgs),
    /// Print the config directory path
    Path,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// One of api.base_url, api.timeout_secs, ui.show_key_hints
    pub key: String,
    pub value: String,
}
