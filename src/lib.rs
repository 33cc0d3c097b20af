pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;

pub use config::EtlConfig;
pub use error::{EtlError, Result};
pub use pipeline::{
    clean_data, load_data, read_table, save_data, Pipeline, PipelineResult, RunRequest,
};
pub use types::{Table, Value};
