// Pipeline storage: persisting the cleaned table with replace semantics

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use sqlite::{quote_identifier, read_table, save_data, SqliteStore};

use crate::error::Result;
use crate::types::Table;

/// Storage trait for the pipeline's output table
pub trait TableStore {
    /// Drop any table named `name`, recreate it from `table`, and insert every
    /// row. Returns the number of rows written.
    fn replace_table(&mut self, name: &str, table: &Table) -> Result<usize>;

    /// Read a stored table back, rows in insertion order
    fn read_table(&self, name: &str) -> Result<Table>;

    /// Human-readable location for logs and the run summary
    fn location(&self) -> String;
}
