use super::TableStore;
use crate::error::{EtlError, Result};
use crate::metrics::StorageMetrics;
use crate::types::{Table, Value};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params, params_from_iter, Connection, ToSql};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// SQLite-backed table store
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "Opened SQLite database");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: None,
        })
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn write_table(&mut self, name: &str, table: &Table) -> Result<usize> {
        if table.headers().is_empty() {
            return Err(EtlError::SchemaMismatch {
                row: 0,
                message: format!("table '{name}' has no columns to store"),
            });
        }
        let quoted_name = quote_identifier(name);
        let columns: Vec<String> = table
            .headers()
            .iter()
            .enumerate()
            .map(|(i, h)| {
                format!(
                    "{} {}",
                    quote_identifier(h),
                    table.column_type(i).sql_name()
                )
            })
            .collect();
        let placeholders: Vec<String> = (1..=table.headers().len())
            .map(|i| format!("?{i}"))
            .collect();

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {quoted_name};\nCREATE TABLE {quoted_name} ({});",
            columns.join(", ")
        ))?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {quoted_name} VALUES ({})",
                placeholders.join(", ")
            ))?;
            for row in table.rows() {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(table.len())
    }
}

impl TableStore for SqliteStore {
    #[instrument(skip(self, table), fields(rows = table.len()))]
    fn replace_table(&mut self, name: &str, table: &Table) -> Result<usize> {
        match self.write_table(name, table) {
            Ok(written) => {
                StorageMetrics::record_write_success(written, table.headers().len());
                info!(
                    table = name,
                    rows = written,
                    location = %self.location(),
                    "Replaced table"
                );
                Ok(written)
            }
            Err(e) => {
                StorageMetrics::record_write_error();
                Err(e)
            }
        }
    }

    fn read_table(&self, name: &str) -> Result<Table> {
        if !self.table_exists(name)? {
            return Err(EtlError::TableNotFound(name.to_string()));
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT * FROM {} ORDER BY rowid",
            quote_identifier(name)
        ))?;
        let headers: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        let mut result = stmt.query([])?;
        while let Some(row) = result.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(value_from_sql(row.get_ref(i)?));
            }
            rows.push(cells);
        }
        Table::from_rows(headers, rows)
    }

    fn location(&self) -> String {
        match &self.path {
            Some(p) => p.display().to_string(),
            None => ":memory:".to_string(),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

fn value_from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Quote an SQL identifier, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Write `table` to the SQLite file at `database_path` under `table_name`,
/// replacing any existing table of that name
pub fn save_data(table: &Table, database_path: &Path, table_name: &str) -> Result<usize> {
    SqliteStore::open(database_path)?.replace_table(table_name, table)
}

/// Read `table_name` back from the SQLite file at `database_path`
pub fn read_table(database_path: &Path, table_name: &str) -> Result<Table> {
    SqliteStore::open(database_path)?.read_table(table_name)
}
