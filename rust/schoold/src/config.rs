use std::path::PathBuf;

use clap::{Parser, ValueEnum};

pub const DEFAULT_DB_FILE: &str = "school.sqlite3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "schoold")]
#[command(about = "School results sidecar: grades, final averages and access checks over JSON lines")]
pub struct Cli {
    /// Workspace directory to open at start-up
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Database file name inside the workspace
    #[arg(long, default_value = DEFAULT_DB_FILE)]
    pub db_file: String,

    /// Log output format (logs always go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Settings resolved once at start-up and handed to the components that
/// need them.
#[derive(Debug, Clone)]
pub struct Config {
    pub workspace: Option<PathBuf>,
    pub db_file: String,
    pub log_format: LogFormat,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            workspace: cli.workspace,
            db_file: cli.db_file,
            log_format: cli.log_format,
        }
    }
}
