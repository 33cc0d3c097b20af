use super::ingestion::{load_and_join, InputFingerprint, LoadOutcome};
use super::processing::{clean_data, CleanOutcome};
use super::storage::{SqliteStore, TableStore};
use crate::config::EtlConfig;
use crate::error::Result;
use crate::metrics::core::time_stage;
use crate::types::Table;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// The three paths a run works on
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub messages_path: PathBuf,
    pub categories_path: PathBuf,
    pub database_path: PathBuf,
}

/// Summary of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub messages: InputFingerprint,
    pub categories: InputFingerprint,
    pub joined_rows: usize,
    pub category_columns: Vec<String>,
    pub values_remapped: usize,
    pub duplicates_dropped: usize,
    pub rows_written: usize,
    pub columns: Vec<String>,
    pub table_name: String,
    pub database: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Load, clean and save, strictly in sequence
pub struct Pipeline<'a> {
    config: &'a EtlConfig,
    progress: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a EtlConfig) -> Self {
        Self {
            config,
            progress: false,
        }
    }

    /// Print human-readable progress lines to stdout at each stage
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Run against the SQLite file named in the request.
    ///
    /// The database is only opened once loading and cleaning have succeeded.
    pub fn run(&self, request: &RunRequest) -> Result<PipelineResult> {
        let started_at = Utc::now();
        let LoadOutcome {
            table,
            messages,
            categories,
        } = self.load(&request.messages_path, &request.categories_path)?;
        let joined_rows = table.len();
        let cleaned = self.clean(table)?;

        self.report(format!(
            "Saving data...\n    DATABASE: {}",
            request.database_path.display()
        ));
        let mut store = SqliteStore::open(&request.database_path)?;
        let rows_written = self.save(&mut store, &cleaned.table)?;

        Ok(self.summarize(
            [messages, categories],
            joined_rows,
            cleaned,
            rows_written,
            &store,
            started_at,
        ))
    }

    /// Run against any store, e.g. `InMemoryStore` in tests
    pub fn run_with_store(
        &self,
        messages_path: &Path,
        categories_path: &Path,
        store: &mut dyn TableStore,
    ) -> Result<PipelineResult> {
        let started_at = Utc::now();
        let LoadOutcome {
            table,
            messages,
            categories,
        } = self.load(messages_path, categories_path)?;
        let joined_rows = table.len();
        let cleaned = self.clean(table)?;

        self.report(format!("Saving data...\n    DATABASE: {}", store.location()));
        let rows_written = self.save(store, &cleaned.table)?;
        Ok(self.summarize(
            [messages, categories],
            joined_rows,
            cleaned,
            rows_written,
            store,
            started_at,
        ))
    }

    pub fn load(&self, messages_path: &Path, categories_path: &Path) -> Result<LoadOutcome> {
        self.report(format!(
            "Loading data...\n    MESSAGES: {}\n    CATEGORIES: {}",
            messages_path.display(),
            categories_path.display()
        ));
        let _timing = time_stage("load");

        let loaded = load_and_join(
            messages_path,
            categories_path,
            &self.config.input.id_column,
        )?;
        info!(rows = loaded.table.len(), "Loaded and joined inputs");
        Ok(loaded)
    }

    pub fn clean(&self, table: Table) -> Result<CleanOutcome> {
        self.report("Cleaning data...".to_string());
        let _timing = time_stage("clean");
        clean_data(table, &self.config.categories)
    }

    pub fn save(&self, store: &mut dyn TableStore, table: &Table) -> Result<usize> {
        let _timing = time_stage("save");
        store.replace_table(&self.config.output.table_name, table)
    }

    fn summarize(
        &self,
        [messages, categories]: [InputFingerprint; 2],
        joined_rows: usize,
        cleaned: CleanOutcome,
        rows_written: usize,
        store: &dyn TableStore,
        started_at: DateTime<Utc>,
    ) -> PipelineResult {
        self.report("Cleaned data saved to database!".to_string());
        PipelineResult {
            messages,
            categories,
            joined_rows,
            category_columns: cleaned.categories,
            values_remapped: cleaned.values_remapped,
            duplicates_dropped: cleaned.duplicates_dropped,
            rows_written,
            columns: cleaned.table.headers().to_vec(),
            table_name: self.config.output.table_name.clone(),
            database: store.location(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    fn report(&self, message: String) {
        if self.progress {
            println!("{message}");
        }
    }
}

impl PipelineResult {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let body = serde_json::to_string_pretty(self)?;
        std::fs::write(path, body)?;
        Ok(())
    }
}
