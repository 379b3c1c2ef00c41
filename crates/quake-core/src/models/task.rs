use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::models::{BaseDataset, DashboardError, QueryResult};

pub const TASK_COUNT: u8 = 28;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct TaskId(u8);

impl TaskId {
    pub const fn new(raw: u8) -> Option<Self> {
        if raw >= 1 && raw <= TASK_COUNT {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// For compile-time registry entries; an out-of-range id fails const evaluation.
    pub(crate) const fn known(raw: u8) -> Self {
        match Self::new(raw) {
            Some(id) => id,
            None => panic!("task id out of range"),
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Sidebar label, `Task 1` through `Task 28`.
    pub fn label(self) -> String {
        format!("Task {}", self.0)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for TaskId {
    type Error = DashboardError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        u8::try_from(raw)
            .ok()
            .and_then(TaskId::new)
            .ok_or_else(|| DashboardError::unknown_task(raw))
    }
}

impl FromStr for TaskId {
    type Err = DashboardError;

    /// Accepts `7` as well as the `Task 7` label form.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("Task")
            .or_else(|| trimmed.strip_prefix("task"))
            .map(str::trim)
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .map_err(|_| DashboardError::unknown_task(trimmed))
            .and_then(TaskId::try_from)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TaskShape {
    TopN,
    FilterCount,
    GroupAggregate,
    Sequential,
    Bucketing,
    ScalarDifference,
    Ratio,
}

/// In-memory computation over the loaded base dataset.
pub type Transform = fn(&BaseDataset) -> QueryResult;

#[derive(Clone, Copy)]
pub enum TaskSource {
    Sql(&'static str),
    InMemory(Transform),
}

impl std::fmt::Debug for TaskSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskSource::Sql(query) => f.debug_tuple("Sql").field(query).finish(),
            TaskSource::InMemory(_) => f.write_str("InMemory"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChartSpec {
    pub key: &'static str,
    pub value: &'static str,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Summary {
    /// `{lead} {key} {joiner} {value} {unit}` built from the first row.
    TopRow {
        key: &'static str,
        value: &'static str,
        lead: &'static str,
        joiner: &'static str,
        unit: &'static str,
    },
    /// `{label}: {row count}`.
    RowCount { label: &'static str },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DisplayMode {
    Table,
    BarChart(ChartSpec),
    LineChart(ChartSpec),
    Metric { label: &'static str },
    TableWithSummary(Summary),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PostProcess {
    TakeTop(usize),
    ExtractScalar(&'static str),
}

#[derive(Clone, Copy, Debug)]
pub struct TaskDefinition {
    pub id: TaskId,
    pub title: &'static str,
    pub shape: TaskShape,
    pub source: TaskSource,
    pub columns: &'static [&'static str],
    pub display: DisplayMode,
    pub post: Option<PostProcess>,
}

impl TaskDefinition {
    pub fn is_in_memory(&self) -> bool {
        matches!(self.source, TaskSource::InMemory(_))
    }
}
