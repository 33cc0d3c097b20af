//! Registration of all phase metrics, with conflict detection

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Register metrics for every phase, warning on duplicate names
pub fn register_all_metrics() -> usize {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::ingestion::IngestionMetrics>(&mut all_metrics);
    register_phase_metrics::<super::cleaning::CleaningMetrics>(&mut all_metrics);
    register_phase_metrics::<super::storage::StorageMetrics>(&mut all_metrics);

    info!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );
    all_metrics.len()
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();

    for doc in T::metrics_documentation() {
        if extract_phase_from_metric_name(doc.name) != phase_name {
            warn!(
                "Metric '{}' does not carry the '{}' phase prefix",
                doc.name, phase_name
            );
        }
        if let Some(existing) = all_metrics.get(doc.name) {
            warn!(
                "Metric name conflict: '{}' ({}) is also defined by phase '{}'",
                doc.name, existing.help, phase_name
            );
        } else {
            debug!(
                "  - {} ({:?}, labels: {:?}): {}",
                doc.name, doc.metric_type, doc.labels, doc.help
            );
            all_metrics.insert(doc.name, doc);
        }
    }
}

/// Extract the phase from a metric name (e.g. "etl_storage_rows_written_total" -> "storage")
fn extract_phase_from_metric_name(metric_name: &str) -> &str {
    if let Some(stripped) = metric_name.strip_prefix("etl_") {
        if let Some(next_underscore) = stripped.find('_') {
            return &stripped[..next_underscore];
        }
    }
    "unknown"
}
