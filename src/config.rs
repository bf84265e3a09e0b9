use crate::operations::export::ReportKind;
use crate::operations::notification::DEFAULT_NOTIFICATION_TTL;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "bcon", version, about = "Budget allocation and control dashboard")]
pub struct Cli {
    /// SQLite database holding allocations and transactions
    #[arg(long, env = "BCON_DB", default_value = "budget_control.db", global = true)]
    pub db: PathBuf,

    /// Log file; the terminal itself is reserved for the dashboard
    #[arg(long, env = "BCON_LOG", default_value = "budget_control.log", global = true)]
    pub log_file: PathBuf,

    /// Seconds a save/delete notification stays on screen
    #[arg(long, default_value_t = DEFAULT_NOTIFICATION_TTL.as_secs(), global = true)]
    pub notify_secs: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive dashboard (default)
    Ui,
    /// Print a report to stdout
    Report {
        #[arg(value_enum)]
        kind: ReportTarget,
    },
    /// Write report rows as CSV
    Export {
        #[arg(value_enum)]
        kind: ReportKind,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportTarget {
    Plan,
    Control,
    Summary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub notification_ttl: Duration,
    pub command: Command,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            db_path: cli.db,
            log_path: cli.log_file,
            notification_ttl: Duration::from_secs(cli.notify_secs),
            command: cli.command.unwrap_or(Command::Ui),
        }
    }
}
