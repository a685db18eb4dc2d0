use std::io::{IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use super::Context;
use crate::cli::commands::CredentialArgs;
use crate::cli::output::{SessionJson, format_user, to_json};

pub(super) fn cmd_health(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let health = ctx.client.health()?;
    if ctx.json {
        println!("{}", to_json(&health)?);
    } else {
        println!("{} ({})", health.status, ctx.client.base_url());
    }
    Ok(())
}

pub(super) fn cmd_register(ctx: &Context, args: CredentialArgs) -> Result<(), Box<dyn std::error::Error>> {
    let password = password_or_prompt(args.password)?;
    let user = ctx.client.register(&args.email, &password)?;
    if ctx.json {
        println!("{}", to_json(&user)?);
    } else {
        println!("registered {}", user.email);
    }
    Ok(())
}

pub(super) fn cmd_login(ctx: &Context, args: CredentialArgs) -> Result<(), Box<dyn std::error::Error>> {
    let password = password_or_prompt(args.password)?;
    ctx.client.login(&args.email, &password)?;
    if ctx.json {
        println!("{}", to_json(&SessionJson { logged_in: true })?);
    } else {
        println!("logged in as {}", args.email.trim().to_lowercase());
    }
    Ok(())
}

pub(super) fn cmd_logout(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    ctx.client.logout();
    if ctx.json {
        println!("{}", to_json(&SessionJson { logged_in: false })?);
    } else {
        println!("logged out");
    }
    Ok(())
}

pub(super) fn cmd_whoami(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    if !ctx.client.session().is_logged_in() {
        return Err("not logged in (run `dt login <email>`)".into());
    }
    let user = ctx.client.me()?;
    if ctx.json {
        println!("{}", to_json(&user)?);
    } else {
        println!("{}", format_user(&user));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Password prompt
// ---------------------------------------------------------------------------

fn password_or_prompt(given: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    let password = match given {
        Some(p) => p,
        None => prompt_password("Password: ")?,
    };
    if password.is_empty() {
        return Err("password cannot be empty".into());
    }
    Ok(password)
}

/// Read a password from the terminal without echoing it. Piped stdin is
/// read as a plain line.
fn prompt_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    if !std::io::stdin().is_terminal() {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    eprint!("{}", prompt);
    std::io::stderr().flush()?;
    terminal::enable_raw_mode()?;
    let result = read_hidden_line();
    terminal::disable_raw_mode()?;
    eprintln!();
    result
}

fn read_hidden_line() -> Result<String, Box<dyn std::error::Error>> {
    let mut password = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };
        match code {
            KeyCode::Enter => return Ok(password),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err("cancelled".into());
            }
            KeyCode::Esc => return Err("cancelled".into()),
            KeyCode::Backspace => {
                password.pop();
            }
            KeyCode::Char(c) => password.push(c),
            _ => {}
        }
    }
}
