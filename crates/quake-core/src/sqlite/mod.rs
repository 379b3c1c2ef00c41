pub mod schema;
pub mod store;

pub use schema::{EARTHQUAKE_DDL, EARTHQUAKE_TABLE, verify_schema};
pub use store::SqliteDataSource;
