use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use quake_core::models::{DashboardError, DashboardResult};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const DEFAULT_FILTER: &str = "warn";

/// Where log lines go. The interactive UI owns the terminal, so it logs to a
/// file or nowhere.
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    Discard,
}

/// Installs the global subscriber. `RUST_LOG` wins over `fallback_filter`.
pub fn init(fallback_filter: Option<&str>, target: LogTarget) -> DashboardResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback_filter.unwrap_or(DEFAULT_FILTER)).map_err(|err| {
            DashboardError::invalid_config(format!("invalid log.filter: {err}"))
        })?,
    };

    let (writer, ansi) = match target {
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogTarget::Discard => (BoxMakeWriter::new(std::io::sink), false),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|err| {
                    DashboardError::invalid_config(format!(
                        "open log file {}: {err}",
                        path.display()
                    ))
                })?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    // a subscriber installed earlier in the process keeps precedence
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .try_init();
    Ok(())
}
