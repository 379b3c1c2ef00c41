mod logging;
mod tui;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use logging::LogTarget;
use quake_core::config::{ConfigOverrides, DashboardConfig};
use quake_core::models::{DashboardError, TaskId};
use quake_core::registry;
use quake_core::render::{EMPTY_MESSAGE, View, render_text};
use quake_core::sqlite::SqliteDataSource;
use quake_core::{Dashboard, DataSource};

#[derive(Parser)]
#[command(name = "quake", version, about = "Global seismic trends dashboard")]
struct Cli {
    /// JSON config file (defaults to ./quake.json when present)
    #[arg(long, global = true, env = "QUAKE_CONFIG")]
    config: Option<PathBuf>,
    /// SQLite database holding the earthquake table
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Per-query timeout in milliseconds; 0 disables it
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// Rows shown in the dataset preview
    #[arg(long, global = true)]
    preview_rows: Option<usize>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Subcommand)]
enum Commands {
    /// Interactive dashboard (default)
    Tui,
    /// List the available tasks
    List,
    /// Print the first rows of the earthquake table
    Preview,
    /// Run one task and print its result
    Report {
        /// Task number, 1 to 28
        #[arg(long)]
        task: TaskId,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct TaskReport<'a> {
    task: TaskId,
    title: &'a str,
    #[serde(flatten)]
    view: &'a View,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(error = %error, "quake exited with an error");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let config = load_config(&cli)?;
    let command = cli.command.unwrap_or(Commands::Tui);

    let target = match command {
        Commands::Tui => config
            .log
            .file
            .clone()
            .map(LogTarget::File)
            .unwrap_or(LogTarget::Discard),
        _ => LogTarget::Stderr,
    };
    logging::init(config.log.filter.as_deref(), target)?;

    match command {
        Commands::List => {
            for definition in registry::tasks() {
                println!("{:>2}  {}", definition.id, definition.title);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Preview => {
            let source = open_source(&config)?;
            let table = source.preview(config.preview_rows())?;
            let view = if table.is_empty() {
                View::Empty {
                    message: EMPTY_MESSAGE.to_string(),
                }
            } else {
                View::Table { table }
            };
            print!("{}", render_text(&view));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Report { task, json } => {
            let dashboard = Dashboard::open(open_source(&config)?, config.preview_rows())?;
            let outcome = dashboard.run(task)?;
            if json {
                let report = TaskReport {
                    task,
                    title: outcome.definition.title,
                    view: &outcome.view,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}: {}", task.label(), outcome.definition.title);
                println!();
                print!("{}", render_text(&outcome.view));
            }
            Ok(match outcome.view {
                View::Error { .. } => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            })
        }
        Commands::Tui => {
            let dashboard = Dashboard::open(open_source(&config)?, config.preview_rows())?;
            tui::run(&dashboard)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(cli: &Cli) -> Result<DashboardConfig, DashboardError> {
    let base_dir = std::env::current_dir().map_err(|err| {
        DashboardError::invalid_config(format!("resolve working directory: {err}"))
    })?;
    DashboardConfig::discover(cli.config.as_deref(), &base_dir)?
        .apply_env(|key| std::env::var(key).ok())?
        .apply_overrides(&ConfigOverrides {
            database_path: cli.db.clone(),
            query_timeout_ms: cli.timeout_ms,
            preview_rows: cli.preview_rows,
        })
}

fn open_source(config: &DashboardConfig) -> Result<SqliteDataSource, DashboardError> {
    SqliteDataSource::open(config.database_path(), config.query_timeout())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_line_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_accepts_numbers_and_labels() {
        let cli = Cli::try_parse_from(["quake", "report", "--task", "Task 21", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Report { task, json }) => {
                assert_eq!(task.get(), 21);
                assert!(json);
            }
            _ => panic!("expected report command"),
        }

        assert!(Cli::try_parse_from(["quake", "report", "--task", "29"]).is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "quake",
            "preview",
            "--db",
            "quakes.db",
            "--preview-rows",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("quakes.db")));
        assert_eq!(cli.preview_rows, Some(3));
        assert!(matches!(cli.command, Some(Commands::Preview)));
    }

    #[test]
    fn tui_is_the_default_command() {
        let cli = Cli::try_parse_from(["quake"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn json_report_flattens_the_view() {
        let report = TaskReport {
            task: TaskId::new(25).unwrap(),
            title: "Average Magnitude Difference (Tsunami vs Non-Tsunami)",
            view: &View::Metric {
                label: "Avg Magnitude Difference".to_string(),
                value: quake_core::models::Value::Real(0.85),
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["task"], 25);
        assert_eq!(json["view"], "metric");
        assert_eq!(json["value"], 0.85);
    }
}
