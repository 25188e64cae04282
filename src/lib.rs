pub mod categories;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod sources;

pub use categories::CategoryConfig;
pub use domain::{CanonicalJobRecord, Level, RawJobRecord};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineRun, RunReport};
pub use sources::SourceId;
