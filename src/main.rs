use std::fs;
use std::panic;
use std::path::Path;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{info, Level};

use tasklist::cli::Cli;
use tasklist::config::{default_data_dir, Config};
use tasklist::ui::{self, run_app, App, TerminalGuard};
use tasklist::{FileStore, TaskManager};

fn parse_level(level: Option<&str>) -> Level {
    match level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => Level::TRACE,
        Some("DEBUG") => Level::DEBUG,
        Some("WARN") | Some("WARNING") => Level::WARN,
        Some("ERROR") => Level::ERROR,
        Some("INFO") | None => Level::INFO,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            Level::INFO
        }
    }
}

/// Log to a file; the terminal belongs to the TUI
fn setup_logging(log_dir: &Path, level: Level) -> Result<()> {
    fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    let log_file = fs::File::create(log_dir.join("tasklist.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

/// Put the terminal back before the default hook prints the panic message
fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = ui::restore();
        default_hook(info);
    }));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let level = parse_level(cli.log_level.as_deref().or(config.log_level.as_deref()));
    setup_logging(&default_data_dir().join("logs"), level).context("Failed to setup logging")?;

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir());
    info!("Using data directory {}", data_dir.display());
    let mut app = App::new(TaskManager::new(FileStore::new(data_dir)));

    install_panic_hook();
    let _guard = TerminalGuard::new(ui::restore);
    let mut terminal = ui::init().context("Failed to initialize terminal")?;

    let result = run_app(&mut terminal, &mut app);

    result.context("Task list UI failed")?;
    info!("Exiting with {} tasks", app.manager().tasks().len());
    Ok(())
}
