//! Metrics for the ETL run
//!
//! Each pipeline phase owns its metrics in a dedicated submodule. Names follow
//! `etl_{phase}_{metric_name}[_total]`. The recorder is only installed when a
//! Prometheus textfile is configured; without it the macros are no-ops.

pub mod cleaning;
pub mod core;
pub mod ingestion;
pub mod registry;
pub mod storage;

pub use cleaning::CleaningMetrics;
pub use ingestion::IngestionMetrics;
pub use storage::StorageMetrics;

use crate::error::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the in-process Prometheus recorder and register all phase metrics.
///
/// Idempotent; returns whether a recorder is available for rendering.
pub fn init_metrics() -> bool {
    if HANDLE.get().is_some() {
        return true;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics handle was already set");
            }
            registry::register_all_metrics();
            info!("Prometheus recorder installed");
            true
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            false
        }
    }
}

/// Render the current metrics in Prometheus text format
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

/// Write the rendered metrics to `path` (textfile collector style)
pub fn write_textfile(path: &Path) -> Result<bool> {
    let Some(body) = render() else {
        return Ok(false);
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, body)?;
    info!(path = %path.display(), "Wrote metrics textfile");
    Ok(true)
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    fn phase_name() -> &'static str;

    /// Documentation for all metrics in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Build a phase-prefixed metric name: `etl_{phase}_{name}_{type}`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("etl_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("etl_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("etl_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_naming_convention() {
        assert_eq!(
            phase_metric!(counter, "ingestion", "rows_read"),
            "etl_ingestion_rows_read_total"
        );
        assert_eq!(
            phase_metric!(histogram, "storage", "duration_seconds"),
            "etl_storage_duration_seconds"
        );
        assert_eq!(
            phase_metric!(gauge, "cleaning", "category_columns"),
            "etl_cleaning_category_columns"
        );
    }

    #[test]
    fn test_textfile_contains_recorded_counters() {
        assert!(init_metrics());
        IngestionMetrics::record_rows_read("messages", 3);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etl.prom");
        assert!(write_textfile(&path).unwrap());

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("etl_ingestion_rows_read_total"));
    }
}
