//! Metrics for the job pipeline
//!
//! Each pipeline phase owns its metric names in a dedicated submodule. Names
//! are built by `phase_metric!` so every metric follows
//! `sea_jobs_{phase}_{name}[_total]`.

pub mod enrich;
pub mod normalize;
pub mod registry;
pub mod store;

pub use enrich::EnrichMetrics;
pub use normalize::NormalizeMetrics;
pub use store::StoreMetrics;

use std::sync::Once;
use tracing::{info, warn};

/// Address for the Prometheus scrape endpoint; unset means no exporter
pub const METRICS_ADDR_ENV: &str = "SEA_JOBS_METRICS_ADDR";

static INIT: Once = Once::new();

/// Install the Prometheus exporter when `SEA_JOBS_METRICS_ADDR` is set and
/// register every phase's metrics. Without an exporter the `metrics` macros
/// are no-ops. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| {
        let addr_str = match std::env::var(METRICS_ADDR_ENV) {
            Ok(v) if !v.trim().is_empty() => v,
            _ => {
                info!("{} not set, metrics exporter disabled", METRICS_ADDR_ENV);
                return;
            }
        };

        let addr = match addr_str.parse::<std::net::SocketAddr>() {
            Ok(addr) => addr,
            Err(e) => {
                warn!("Invalid metrics addr '{}': {}", addr_str, e);
                return;
            }
        };

        let result = metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install();
        match result {
            Ok(()) => {
                info!("📊 Prometheus exporter listening at http://{}/metrics", addr);
                registry::register_all_metrics();
            }
            Err(e) => warn!("Failed to install Prometheus exporter: {}", e),
        }
    });
}

/// Implemented by every phase's metrics collection
pub trait PhaseMetrics {
    /// Describe the phase's metrics to the installed recorder
    fn register_metrics();

    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub enum MetricType {
    Counter,
    Histogram,
}

/// sea_jobs_{phase}_{name}_total for counters, sea_jobs_{phase}_{name} otherwise
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("sea_jobs_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("sea_jobs_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

/// Describe each documented metric to the active recorder
pub(crate) fn describe(docs: &[MetricDoc]) {
    for doc in docs {
        match doc.metric_type {
            MetricType::Counter => ::metrics::describe_counter!(doc.name, doc.help),
            MetricType::Histogram => ::metrics::describe_histogram!(doc.name, doc.help),
        }
    }
}
