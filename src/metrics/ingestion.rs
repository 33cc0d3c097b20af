//! Ingestion Phase Metrics
//!
//! Rows read from each input file and rows produced by the join.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the Ingestion phase
pub struct IngestionMetrics;

impl IngestionMetrics {
    /// Record rows read from one input (`messages` or `categories`)
    pub fn record_rows_read(input: &'static str, rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "ingestion", "rows_read"), "input" => input)
            .increment(rows as u64);
    }

    pub fn record_bytes_read(input: &'static str, bytes: u64) {
        ::metrics::counter!(phase_metric!(counter, "ingestion", "bytes_read"), "input" => input)
            .increment(bytes);
    }

    /// Record the joined row count and the rows without a partner on the other side
    pub fn record_join(joined_rows: usize, unmatched_rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "ingestion", "rows_joined"))
            .increment(joined_rows as u64);
        ::metrics::counter!(phase_metric!(counter, "ingestion", "rows_unmatched"))
            .increment(unmatched_rows as u64);
    }
}

impl PhaseMetrics for IngestionMetrics {
    fn register_metrics() {
        use metrics::counter;

        let _ = counter!(phase_metric!(counter, "ingestion", "rows_read"));
        let _ = counter!(phase_metric!(counter, "ingestion", "bytes_read"));
        let _ = counter!(phase_metric!(counter, "ingestion", "rows_joined"));
        let _ = counter!(phase_metric!(counter, "ingestion", "rows_unmatched"));
    }

    fn phase_name() -> &'static str {
        "ingestion"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "ingestion", "rows_read"),
                metric_type: MetricType::Counter,
                help: "Data rows read from an input file",
                labels: vec!["input"],
            },
            MetricDoc {
                name: phase_metric!(counter, "ingestion", "bytes_read"),
                metric_type: MetricType::Counter,
                help: "Bytes read from an input file",
                labels: vec!["input"],
            },
            MetricDoc {
                name: phase_metric!(counter, "ingestion", "rows_joined"),
                metric_type: MetricType::Counter,
                help: "Rows produced by the inner join on the id column",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "ingestion", "rows_unmatched"),
                metric_type: MetricType::Counter,
                help: "Input rows whose id has no partner in the other file",
                labels: vec![],
            },
        ]
    }
}
