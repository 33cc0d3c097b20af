//! Cleaning Phase Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the Cleaning phase
pub struct CleaningMetrics;

impl CleaningMetrics {
    pub fn record_clean(category_columns: usize, remapped_values: usize, duplicates: usize) {
        ::metrics::gauge!(phase_metric!(gauge, "cleaning", "category_columns"))
            .set(category_columns as f64);
        ::metrics::counter!(phase_metric!(counter, "cleaning", "values_remapped"))
            .increment(remapped_values as u64);
        ::metrics::counter!(phase_metric!(counter, "cleaning", "duplicates_dropped"))
            .increment(duplicates as u64);
    }

    pub fn record_schema_error() {
        ::metrics::counter!(phase_metric!(counter, "cleaning", "schema_errors")).increment(1);
    }
}

impl PhaseMetrics for CleaningMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge};

        let _ = gauge!(phase_metric!(gauge, "cleaning", "category_columns"));
        let _ = counter!(phase_metric!(counter, "cleaning", "values_remapped"));
        let _ = counter!(phase_metric!(counter, "cleaning", "duplicates_dropped"));
        let _ = counter!(phase_metric!(counter, "cleaning", "schema_errors"));
    }

    fn phase_name() -> &'static str {
        "cleaning"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(gauge, "cleaning", "category_columns"),
                metric_type: MetricType::Gauge,
                help: "Category columns derived from the packed categories string",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "cleaning", "values_remapped"),
                metric_type: MetricType::Counter,
                help: "Category values normalized from 2 to 1",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "cleaning", "duplicates_dropped"),
                metric_type: MetricType::Counter,
                help: "Exact duplicate rows removed after cleaning",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "cleaning", "schema_errors"),
                metric_type: MetricType::Counter,
                help: "Rows rejected because their categories disagree with the first row",
                labels: vec![],
            },
        ]
    }
}
