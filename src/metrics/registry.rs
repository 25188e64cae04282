//! Registration of every phase's metrics with the installed recorder.
//!
//! Duplicate names across phases are reported at startup.

use crate::metrics::{EnrichMetrics, MetricDoc, NormalizeMetrics, PhaseMetrics, StoreMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub fn register_all_metrics() {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<NormalizeMetrics>(&mut all_metrics);
    register_phase_metrics::<EnrichMetrics>(&mut all_metrics);
    register_phase_metrics::<StoreMetrics>(&mut all_metrics);

    info!("Registered {} metrics across all phases", all_metrics.len());

    if std::env::var("SEA_JOBS_METRICS_DEBUG").is_ok() {
        log_metrics_summary(&all_metrics);
    }
}

/// Describe one phase and record its names, warning on conflicts
fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, (&'static str, MetricDoc)>) {
    T::register_metrics();
    let phase = T::phase_name();

    for doc in T::metrics_documentation() {
        match all_metrics.get(doc.name) {
            Some((owner, _)) => warn!(
                "Metric '{}' declared by both '{}' and '{}'",
                doc.name, owner, phase
            ),
            None => {
                all_metrics.insert(doc.name, (phase, doc));
            }
        }
    }
}

fn log_metrics_summary(all_metrics: &HashMap<&'static str, (&'static str, MetricDoc)>) {
    let mut names: Vec<&&str> = all_metrics.keys().collect();
    names.sort();
    for name in names {
        let (phase, doc) = &all_metrics[*name];
        debug!(
            phase = %phase,
            phase_from_name = %extract_phase_from_metric_name(doc.name),
            labels = ?doc.labels,
            "{} ({:?}): {}",
            doc.name,
            doc.metric_type,
            doc.help
        );
    }
}

/// "sea_jobs_store_rows_inserted_total" -> "store"
fn extract_phase_from_metric_name(metric_name: &str) -> &str {
    metric_name
        .strip_prefix("sea_jobs_")
        .and_then(|rest| rest.split('_').next())
        .unwrap_or("unknown")
}
