// Data processing pipeline: ingestion, processing, and storage

pub mod ingestion;
pub mod orchestrator;
pub mod processing;
pub mod storage;

// Re-export key types and functions from each stage
pub use ingestion::{inner_join, load_and_join, load_data, read_csv, LoadOutcome};
pub use orchestrator::{Pipeline, PipelineResult, RunRequest};
pub use processing::{clean_data, CleanOutcome};
pub use storage::{read_table, save_data, InMemoryStore, SqliteStore, TableStore};
