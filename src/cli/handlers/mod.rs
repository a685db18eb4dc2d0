mod auth;

use std::io::Write;

use crate::api::ApiClient;
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, Settings};
use crate::io::session::Session;
use crate::state::{Confirm, GoalsState, TaskBoard};

/// What every command needs: resolved settings and an API client bound to
/// the persisted session.
pub(crate) struct Context {
    pub settings: Settings,
    pub client: ApiClient,
    pub json: bool,
}

impl Context {
    fn new(cli: &Cli) -> Result<Context, Box<dyn std::error::Error>> {
        let settings = Settings::load(cli.api_url.as_deref())?;
        let session = Session::from_config_dir(&settings.config_dir);
        let client = ApiClient::from_settings(&settings, session);
        Ok(Context {
            settings,
            client,
            json: cli.json,
        })
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::new(&cli)?;
    let Some(cmd) = cli.command else {
        return Err("no command given (try `dt --help`)".into());
    };
    tracing::debug!(base_url = ctx.client.base_url(), "dispatching command");

    match cmd {
        Commands::Health => auth::cmd_health(&ctx),
        Commands::Register(args) => auth::cmd_register(&ctx, args),
        Commands::Login(args) => auth::cmd_login(&ctx, args),
        Commands::Logout => auth::cmd_logout(&ctx),
        Commands::Whoami => auth::cmd_whoami(&ctx),

        Commands::Goals => cmd_goals(&ctx),
        Commands::Goal(GoalCmd { action }) => match action {
            GoalAction::Add(args) => cmd_goal_add(&ctx, args),
            GoalAction::Edit(args) => cmd_goal_edit(&ctx, args),
            GoalAction::Rm(args) => cmd_goal_rm(&ctx, args),
        },

        Commands::Tasks(args) => cmd_tasks(&ctx, args),
        Commands::Task(TaskCmd { action }) => match action {
            TaskAction::Add(args) => cmd_task_add(&ctx, args),
            TaskAction::Toggle(args) => cmd_task_toggle(&ctx, args),
            TaskAction::Rm(args) => cmd_task_rm(&ctx, args),
        },

        Commands::Config(ConfigCmd { action }) => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => cmd_config_show(&ctx),
            ConfigAction::Set(args) => cmd_config_set(&ctx, args),
            ConfigAction::Path => {
                println!("{}", ctx.settings.config_dir.display());
                Ok(())
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Turn a scope's error slot into a command failure.
fn scope_error(message: Option<&str>, fallback: &str) -> Box<dyn std::error::Error> {
    message.unwrap_or(fallback).to_string().into()
}

/// Ask on stderr, answer on stdin. `--yes` skips the question.
struct StdinConfirm {
    assume_yes: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{} [y/n] ", prompt);
        let _ = std::io::stderr().flush();
        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        input.trim().eq_ignore_ascii_case("y")
    }
}

fn loaded_goals(ctx: &Context) -> Result<GoalsState, Box<dyn std::error::Error>> {
    let mut goals = GoalsState::new();
    goals.load(&ctx.client);
    if let Some(e) = goals.error() {
        return Err(e.into());
    }
    Ok(goals)
}

fn loaded_board(ctx: &Context, goal_id: i64) -> Result<TaskBoard, Box<dyn std::error::Error>> {
    let mut board = TaskBoard::new();
    board.expand_and_load(&ctx.client, goal_id);
    if let Some(e) = board.panel(goal_id).and_then(|p| p.error()) {
        return Err(e.into());
    }
    Ok(board)
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

fn cmd_goals(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let goals = loaded_goals(ctx)?;
    if ctx.json {
        println!("{}", to_json(goals.goals())?);
    } else {
        for line in format_goal_listing(goals.goals()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_goal_add(ctx: &Context, args: GoalAddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut goals = GoalsState::new();
    if !goals.create(&ctx.client, &args.title, args.description.as_deref()) {
        return Err(scope_error(goals.error(), "Unknown error"));
    }
    let goal = goals.goals().first().ok_or("created goal missing from list")?;
    if ctx.json {
        println!("{}", to_json(goal)?);
    } else {
        println!("created {}", format_goal_line(goal));
    }
    Ok(())
}

fn cmd_goal_edit(ctx: &Context, args: GoalEditArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut goals = loaded_goals(ctx)?;
    let current = goals
        .goal(args.id)
        .ok_or_else(|| format!("goal #{} not found", args.id))?;
    let title = args.title.unwrap_or_else(|| current.title.clone());
    let description = args
        .description
        .or_else(|| current.description.clone())
        .unwrap_or_default();

    goals.start_edit(args.id);
    if !goals.save_edit(&ctx.client, args.id, &title, &description) {
        return Err(scope_error(goals.error(), "Unknown error"));
    }
    let goal = goals.goal(args.id).ok_or("edited goal missing from list")?;
    if ctx.json {
        println!("{}", to_json(goal)?);
    } else {
        println!("updated {}", format_goal_line(goal));
    }
    Ok(())
}

fn cmd_goal_rm(ctx: &Context, args: GoalRmArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut goals = GoalsState::new();
    let mut confirm = StdinConfirm {
        assume_yes: args.yes,
    };
    if goals.remove(&ctx.client, args.id, &mut confirm) {
        println!("deleted goal #{}", args.id);
    } else if let Some(e) = goals.error() {
        return Err(e.into());
    } else {
        println!("cancelled");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

fn cmd_tasks(ctx: &Context, args: TasksArgs) -> Result<(), Box<dyn std::error::Error>> {
    let board = loaded_board(ctx, args.goal_id)?;
    let ordered = board
        .panel(args.goal_id)
        .map(|p| p.ordered())
        .unwrap_or_default();
    if ctx.json {
        let out = GoalTasksJson {
            goal_id: args.goal_id,
            tasks: ordered,
        };
        println!("{}", to_json(&out)?);
    } else {
        for line in format_task_listing(args.goal_id, &ordered) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_task_add(ctx: &Context, args: TaskAddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut board = loaded_board(ctx, args.goal_id)?;
    if !board.create_task(&ctx.client, args.goal_id, &args.title) {
        return Err(scope_error(
            board.panel(args.goal_id).and_then(|p| p.error()),
            "task title cannot be empty",
        ));
    }
    let task = board
        .panel(args.goal_id)
        .and_then(|p| p.tasks())
        .and_then(|t| t.first())
        .ok_or("created task missing from list")?;
    if ctx.json {
        println!("{}", to_json(task)?);
    } else {
        println!("created {}", format_task_line(task));
    }
    Ok(())
}

fn cmd_task_toggle(ctx: &Context, args: TaskRefArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut board = loaded_board(ctx, args.goal_id)?;
    if !board.toggle_done(&ctx.client, args.goal_id, args.task_id) {
        return Err(scope_error(
            board.panel(args.goal_id).and_then(|p| p.error()),
            &format!("task #{} not found in goal #{}", args.task_id, args.goal_id),
        ));
    }
    let task = board
        .panel(args.goal_id)
        .and_then(|p| p.tasks())
        .and_then(|t| t.iter().find(|t| t.id == args.task_id))
        .ok_or("toggled task missing from list")?;
    if ctx.json {
        println!("{}", to_json(task)?);
    } else {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

fn cmd_task_rm(ctx: &Context, args: TaskRmArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut board = loaded_board(ctx, args.goal_id)?;
    let exists = board
        .panel(args.goal_id)
        .and_then(|p| p.tasks())
        .is_some_and(|t| t.iter().any(|t| t.id == args.task_id));
    if !exists {
        return Err(format!("task #{} not found in goal #{}", args.task_id, args.goal_id).into());
    }
    let mut confirm = StdinConfirm {
        assume_yes: args.yes,
    };
    if board.delete_task(&ctx.client, args.goal_id, args.task_id, &mut confirm) {
        println!("deleted task #{}", args.task_id);
    } else if let Some(e) = board.panel(args.goal_id).and_then(|p| p.error()) {
        return Err(e.into());
    } else {
        println!("cancelled");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config_show(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    if ctx.json {
        println!("{}", to_json(&ctx.settings.config)?);
    } else {
        for line in format_config(&ctx.settings.config, &ctx.settings.config_dir) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_config_set(ctx: &Context, args: ConfigSetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let dir = &ctx.settings.config_dir;
    let (_, mut doc) = config_io::read_config(dir)?;
    config_io::set_value(&mut doc, &args.key, &args.value)?;
    config_io::write_config(dir, &doc)?;
    println!("{} = {}", args.key, args.value.trim());
    Ok(())
}
