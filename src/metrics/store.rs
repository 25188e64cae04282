//! Store and export phase metrics

use crate::metrics::{describe, phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct StoreMetrics;

impl StoreMetrics {
    pub fn record_insert(table: &str, inserted: usize, skipped: usize) {
        ::metrics::counter!(phase_metric!(counter, "store", "rows_inserted"), "table" => table.to_string())
            .increment(inserted as u64);
        ::metrics::counter!(phase_metric!(counter, "store", "rows_skipped"), "table" => table.to_string())
            .increment(skipped as u64);
        ::metrics::histogram!(phase_metric!(histogram, "store", "batch_size"), "table" => table.to_string())
            .record((inserted + skipped) as f64);
    }

    pub fn record_export(rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "store", "csv_rows_written")).increment(rows as u64);
    }
}

impl PhaseMetrics for StoreMetrics {
    fn register_metrics() {
        describe(&Self::metrics_documentation());
    }

    fn phase_name() -> &'static str {
        "store"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "store", "rows_inserted"),
                metric_type: MetricType::Counter,
                help: "New rows written to a transformed table",
                labels: vec!["table"],
            },
            MetricDoc {
                name: phase_metric!(counter, "store", "rows_skipped"),
                metric_type: MetricType::Counter,
                help: "Rows skipped because their job_id was already stored",
                labels: vec!["table"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "store", "batch_size"),
                metric_type: MetricType::Histogram,
                help: "Rows offered to the store per batch",
                labels: vec!["table"],
            },
            MetricDoc {
                name: phase_metric!(counter, "store", "csv_rows_written"),
                metric_type: MetricType::Counter,
                help: "Rows written to CSV exports",
                labels: vec![],
            },
        ]
    }
}
