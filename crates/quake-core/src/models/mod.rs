pub mod dataset;
pub mod error;
pub mod event;
pub mod task;
pub mod value;

pub use dataset::BaseDataset;
pub use error::{DashboardError, DashboardErrorKind, DashboardResult};
pub use event::{EVENT_COLUMNS, Event, format_event_time, parse_event_time};
pub use task::{
    ChartSpec, DisplayMode, PostProcess, Summary, TASK_COUNT, TaskDefinition, TaskId, TaskShape,
    TaskSource, Transform,
};
pub use value::{QueryResult, Value};
