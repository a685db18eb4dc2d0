use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the tracing filter directive
pub const LOG_ENV: &str = "DEVTRACKR_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Log to stderr. Used by the CLI, where stdout carries command output.
pub fn init_stderr() {
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Log to a file so the TUI's screen stays clean. Falls back to no logging
/// when the file cannot be opened.
pub fn init_file(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(_) => return,
    };
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init();
}
