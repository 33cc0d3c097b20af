use super::TableStore;
use crate::error::{EtlError, Result};
use crate::types::Table;
use std::collections::HashMap;
use tracing::debug;

/// In-memory store for tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: HashMap<String, Table>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl TableStore for InMemoryStore {
    fn replace_table(&mut self, name: &str, table: &Table) -> Result<usize> {
        let replaced = self.tables.insert(name.to_string(), table.clone()).is_some();
        debug!(table = name, rows = table.len(), replaced, "Stored table in memory");
        Ok(table.len())
    }

    fn read_table(&self, name: &str) -> Result<Table> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| EtlError::TableNotFound(name.to_string()))
    }

    fn location(&self) -> String {
        ":memory:".to_string()
    }
}
