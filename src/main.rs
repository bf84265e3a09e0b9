mod aggregation;
mod app;
mod config;
mod db;
mod error;
mod forms;
mod models;
mod operations;
mod report;
mod store;
mod tui;

use anyhow::Context;
use app::AppContext;
use clap::Parser;
use config::{Cli, Command, Config, ReportTarget};
use operations::export::{ReportKind, export_control_rows, export_plan_rows};
use report::{ControlRow, PlanRow, summary_lines};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use store::SqliteStore;
use tracing_subscriber::EnvFilter;

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file '{}'", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn print_table<const N: usize>(headers: [&str; N], rows: impl Iterator<Item = [String; N]>) {
    println!("{}", headers.join("\t"));
    for cells in rows {
        println!("{}", cells.join("\t"));
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::from(Cli::parse());
    init_logging(&config.log_path)?;

    tracing::info!(db = %config.db_path.display(), command = ?config.command, "starting");
    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database '{}'", config.db_path.display()))?;
    let mut ctx = AppContext::new(store).context("Failed to load budget data")?;

    match config.command {
        Command::Ui => {
            let state = tui::UiState::new(config.notification_ttl);
            let source = config.db_path.display().to_string();
            tui::run(&mut ctx, state, &source).map_err(|e| anyhow::anyhow!(e))?;
        }
        Command::Report { kind } => {
            let views = ctx.views();
            match kind {
                ReportTarget::Plan => print_table(PlanRow::HEADERS, views.plan_rows.iter().map(PlanRow::cells)),
                ReportTarget::Control => {
                    print_table(ControlRow::HEADERS, views.control_rows.iter().map(ControlRow::cells))
                }
                ReportTarget::Summary => {
                    for line in summary_lines(ctx.summary()) {
                        println!("{}", line);
                    }
                }
            }
        }
        Command::Export { kind, output } => {
            let views = ctx.views();
            let written = match kind {
                ReportKind::Plan => export_plan_rows(&views.plan_rows, &output),
                ReportKind::Control => export_control_rows(&views.control_rows, &output),
            }
            .map_err(|e| anyhow::anyhow!(e))?;
            tracing::info!(rows = written, path = %output.display(), "report exported");
            println!("Exported {} rows to {}", written, output.display());
        }
    }

    tracing::info!("exiting");
    Ok(())
}
