//! Normalize phase metrics
//!
//! Batch sizes, emitted records and the records removed by the required-field
//! filter or in-batch link dedup.

use crate::metrics::{describe, phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct NormalizeMetrics;

impl NormalizeMetrics {
    /// One finished batch for a source
    pub fn record_batch(source: &str, raw: usize, emitted: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "batches"), "source" => source.to_string())
            .increment(1);
        ::metrics::counter!(phase_metric!(counter, "normalize", "records_in"), "source" => source.to_string())
            .increment(raw as u64);
        ::metrics::counter!(phase_metric!(counter, "normalize", "records_out"), "source" => source.to_string())
            .increment(emitted as u64);
        ::metrics::histogram!(phase_metric!(histogram, "normalize", "duration_seconds"), "source" => source.to_string())
            .record(duration_secs);
    }

    pub fn record_dropped_missing(source: &str, count: usize) {
        ::metrics::counter!(
            phase_metric!(counter, "normalize", "records_dropped"),
            "source" => source.to_string(),
            "reason" => "missing_required"
        )
        .increment(count as u64);
    }

    pub fn record_dropped_duplicate(source: &str, count: usize) {
        ::metrics::counter!(
            phase_metric!(counter, "normalize", "records_dropped"),
            "source" => source.to_string(),
            "reason" => "duplicate_link"
        )
        .increment(count as u64);
    }
}

impl PhaseMetrics for NormalizeMetrics {
    fn register_metrics() {
        describe(&Self::metrics_documentation());
    }

    fn phase_name() -> &'static str {
        "normalize"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "normalize", "batches"),
                metric_type: MetricType::Counter,
                help: "Raw batches processed",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "records_in"),
                metric_type: MetricType::Counter,
                help: "Raw records received",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "records_out"),
                metric_type: MetricType::Counter,
                help: "Canonical records emitted",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "normalize", "records_dropped"),
                metric_type: MetricType::Counter,
                help: "Records removed from a batch",
                labels: vec!["source", "reason"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "normalize", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time to transform one batch",
                labels: vec!["source"],
            },
        ]
    }
}
