use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "pipeline.log";
const DEFAULT_FILTER: &str = "sea_jobs=info,warn";

/// `RUST_LOG` when set, otherwise info for this crate and warn for dependencies
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Console logging on stderr plus a daily-rotated JSON file under `log_dir`.
///
/// Hold the returned guard until exit; dropping it flushes the file writer.
pub fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = fs::create_dir_all(log_dir) {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
        tracing::warn!("File logging disabled, cannot create {}: {}", log_dir.display(), e);
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    Some(guard)
}
