//! Enrich phase metrics

use crate::metrics::{describe, phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct EnrichMetrics;

impl EnrichMetrics {
    /// A field that had text but could not be parsed
    pub fn record_field_error(source: &str, field: &str) {
        ::metrics::counter!(
            phase_metric!(counter, "enrich", "field_errors"),
            "source" => source.to_string(),
            "field" => field.to_string()
        )
        .increment(1);
    }

    /// Titles the classifier could not place
    pub fn record_uncategorized(source: &str, count: usize) {
        ::metrics::counter!(phase_metric!(counter, "enrich", "uncategorized"), "source" => source.to_string())
            .increment(count as u64);
    }
}

impl PhaseMetrics for EnrichMetrics {
    fn register_metrics() {
        describe(&Self::metrics_documentation());
    }

    fn phase_name() -> &'static str {
        "enrich"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "enrich", "field_errors"),
                metric_type: MetricType::Counter,
                help: "Salary, date or link values that failed to parse",
                labels: vec!["source", "field"],
            },
            MetricDoc {
                name: phase_metric!(counter, "enrich", "uncategorized"),
                metric_type: MetricType::Counter,
                help: "Records classified as Other",
                labels: vec!["source"],
            },
        ]
    }
}
