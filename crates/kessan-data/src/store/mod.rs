//! Persistence of the raw and derived datasets.

pub mod sqlite;

pub use sqlite::{DEFAULT_TABLE_PREFIX, ResultStore, StoreStats, TableNames};
