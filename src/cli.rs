//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

/// Terminal task list editor
#[derive(Debug, Parser)]
#[command(name = "tasklist", about = "Create, filter, sort, edit and delete tasks", version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding tasks.json
    #[arg(short, long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}
