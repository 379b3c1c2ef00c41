pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod registry;
pub mod render;
pub mod selector;
pub mod source;
pub mod sqlite;

pub use dashboard::{Dashboard, TaskOutcome};
pub use selector::Selector;
pub use source::DataSource;
