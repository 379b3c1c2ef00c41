use thiserror::Error;

use crate::models::TaskId;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DashboardErrorKind {
    Connection,
    Query,
    Timeout,
    UnknownTask,
    InvalidConfig,
}

impl DashboardErrorKind {
    /// Whether the error ends the whole session rather than a single task run.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            DashboardErrorKind::Connection | DashboardErrorKind::InvalidConfig
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{kind:?}: {message}")]
pub struct DashboardError {
    pub kind: DashboardErrorKind,
    pub task: Option<TaskId>,
    pub message: String,
}

impl DashboardError {
    pub fn new(kind: DashboardErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            task: None,
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(DashboardErrorKind::Connection, message)
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::new(DashboardErrorKind::Query, message)
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(DashboardErrorKind::InvalidConfig, message)
    }

    pub fn unknown_task(raw: impl std::fmt::Display) -> Self {
        Self::new(
            DashboardErrorKind::UnknownTask,
            format!("unknown task id '{raw}'; expected a value in 1..=28"),
        )
    }

    pub fn for_task(mut self, task: TaskId) -> Self {
        self.task = Some(task);
        self
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
