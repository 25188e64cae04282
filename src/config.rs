use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Environment variable that points at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "SEA_JOBS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Category tables (JSON); `None` uses the tables built into the binary
    pub categories_path: Option<PathBuf>,
    /// Where CSV exports are written
    pub output_dir: PathBuf,
    /// SQLite file used for dedup/insert; `None` disables persistence
    pub store_path: Option<PathBuf>,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories_path: None,
            output_dir: PathBuf::from("output"),
            store_path: None,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Load from `$SEA_JOBS_CONFIG` or `config.toml`. A missing default file
    /// yields the built-in defaults; a missing file that was asked for is an error.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from(path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load_from(DEFAULT_CONFIG_PATH),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "output_dir = \"exports\"\nstore_path = \"jobs.db\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert_eq!(config.store_path, Some(PathBuf::from("jobs.db")));
        assert_eq!(config.categories_path, None);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::load_from("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
