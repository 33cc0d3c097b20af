//! Storage Phase Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the Storage phase
pub struct StorageMetrics;

impl StorageMetrics {
    pub fn record_write_success(rows: usize, columns: usize) {
        ::metrics::counter!(phase_metric!(counter, "storage", "rows_written"))
            .increment(rows as u64);
        ::metrics::gauge!(phase_metric!(gauge, "storage", "table_columns")).set(columns as f64);
    }

    pub fn record_write_error() {
        ::metrics::counter!(phase_metric!(counter, "storage", "write_errors")).increment(1);
    }
}

impl PhaseMetrics for StorageMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge};

        let _ = counter!(phase_metric!(counter, "storage", "rows_written"));
        let _ = counter!(phase_metric!(counter, "storage", "write_errors"));
        let _ = gauge!(phase_metric!(gauge, "storage", "table_columns"));
    }

    fn phase_name() -> &'static str {
        "storage"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "storage", "rows_written"),
                metric_type: MetricType::Counter,
                help: "Rows inserted into the output table",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "storage", "write_errors"),
                metric_type: MetricType::Counter,
                help: "Failed attempts to replace the output table",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "storage", "table_columns"),
                metric_type: MetricType::Gauge,
                help: "Columns in the output table",
                labels: vec![],
            },
        ]
    }
}
