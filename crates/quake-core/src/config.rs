use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{DashboardError, DashboardResult};

pub const DEFAULT_CONFIG_NAME: &str = "quake.json";
pub const DEFAULT_DATABASE_PATH: &str = "earthquakes.sqlite3";
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

pub const DATABASE_ENV: &str = "QUAKE_DB";
pub const QUERY_TIMEOUT_ENV: &str = "QUAKE_QUERY_TIMEOUT_MS";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: Option<String>,
    /// Log destination for the interactive UI.
    pub file: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Zero disables the deadline.
    pub query_timeout_ms: Option<u64>,
    pub preview_rows: Option<usize>,
    #[serde(default)]
    pub log: LogConfig,
}

/// Values given on the command line; they win over file and environment.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub query_timeout_ms: Option<u64>,
    pub preview_rows: Option<usize>,
}

impl DashboardConfig {
    pub fn from_json(raw: &str) -> DashboardResult<Self> {
        let config: DashboardConfig = serde_json::from_str(raw)
            .map_err(|err| DashboardError::invalid_config(format!("parse config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> DashboardResult<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            DashboardError::invalid_config(format!("read config {}: {err}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Loads `explicit` when given, else `quake.json` in `base_dir` when it
    /// exists, else the defaults.
    pub fn discover(explicit: Option<&Path>, base_dir: &Path) -> DashboardResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = base_dir.join(DEFAULT_CONFIG_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using config file");
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }

    /// Applies `QUAKE_DB` and `QUAKE_QUERY_TIMEOUT_MS` read through `lookup`.
    pub fn apply_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> DashboardResult<Self> {
        if let Some(path) = lookup(DATABASE_ENV).filter(|raw| !raw.trim().is_empty()) {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(QUERY_TIMEOUT_ENV) {
            let millis = raw.trim().parse::<u64>().map_err(|_| {
                DashboardError::invalid_config(format!(
                    "{QUERY_TIMEOUT_ENV} must be a whole number of milliseconds, got '{raw}'"
                ))
            })?;
            self.query_timeout_ms = Some(millis);
        }
        Ok(self)
    }

    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> DashboardResult<Self> {
        if let Some(path) = &overrides.database_path {
            self.database.path = Some(path.clone());
        }
        if let Some(millis) = overrides.query_timeout_ms {
            self.query_timeout_ms = Some(millis);
        }
        if let Some(rows) = overrides.preview_rows {
            self.preview_rows = Some(rows);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> DashboardResult<()> {
        if self
            .database
            .path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            return Err(DashboardError::invalid_config("database.path must not be empty"));
        }
        if self.preview_rows == Some(0) {
            return Err(DashboardError::invalid_config(
                "preview_rows must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        match self.query_timeout_ms.unwrap_or(DEFAULT_QUERY_TIMEOUT_MS) {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    pub fn preview_rows(&self) -> usize {
        self.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS)
    }
}
