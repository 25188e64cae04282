//! Category configuration
//!
//! Keyword tables driving the title classifier. Loaded once per process and
//! shared read-only by every pipeline run. Tables are ordered lists so that
//! the declaration order can be used for tie-breaking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::constants::DEFAULT_SCORE_THRESHOLD;
use crate::error::{PipelineError, Result};

const BUILTIN_CATEGORIES: &str = include_str!("../config/categories.json");

/// Keywords that map a title straight to a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualLookup {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Token weights used by the scoring fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub category: String,
    pub tokens: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    pub manual_lookup: Vec<ManualLookup>,
    pub weights: Vec<CategoryWeights>,
    /// Source code -> words stripped from titles before classification
    #[serde(default)]
    pub noise_keywords: HashMap<String, Vec<String>>,
}

fn default_threshold() -> f64 {
    DEFAULT_SCORE_THRESHOLD
}

impl CategoryConfig {
    /// Tables shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATEGORIES)
    }

    /// Load tables from a JSON file. Any failure here is fatal for the run.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read category config '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_json(&content)?;
        info!(
            "Loaded {} manual lookups and {} weighted categories from {}",
            config.manual_lookup.len(),
            config.weights.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: CategoryConfig = serde_json::from_str(content)
            .map_err(|e| PipelineError::Config(format!("Malformed category config: {}", e)))?;
        config.validate()?;
        Ok(config.lowercased())
    }

    fn validate(&self) -> Result<()> {
        if self.weights.is_empty() {
            return Err(PipelineError::Config("category weights table is empty".into()));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(PipelineError::Config(format!(
                "invalid score threshold {}",
                self.threshold
            )));
        }
        for entry in &self.manual_lookup {
            if entry.category.trim().is_empty() {
                return Err(PipelineError::Config("manual lookup entry without a category".into()));
            }
            if entry.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(PipelineError::Config(format!(
                    "blank manual keyword for '{}'",
                    entry.category
                )));
            }
        }
        for entry in &self.weights {
            if entry.category.trim().is_empty() {
                return Err(PipelineError::Config("weighted entry without a category".into()));
            }
            if let Some((token, weight)) = entry.tokens.iter().find(|(_, w)| !w.is_finite()) {
                return Err(PipelineError::Config(format!(
                    "weight for '{}' in '{}' is not a number: {}",
                    token, entry.category, weight
                )));
            }
        }
        Ok(())
    }

    /// Matching is done on lower-cased text, so store the tables that way
    fn lowercased(mut self) -> Self {
        for entry in &mut self.manual_lookup {
            for keyword in &mut entry.keywords {
                *keyword = keyword.trim().to_lowercase();
            }
        }
        for entry in &mut self.weights {
            entry.tokens = entry
                .tokens
                .drain()
                .map(|(token, weight)| (token.trim().to_lowercase(), weight))
                .collect();
        }
        for keywords in self.noise_keywords.values_mut() {
            for keyword in keywords.iter_mut() {
                *keyword = keyword.trim().to_lowercase();
            }
            keywords.retain(|k| !k.is_empty());
        }
        self
    }

    /// Noise list for a source, empty when the source has none
    pub fn noise_for(&self, source: &str) -> &[String] {
        self.noise_keywords
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every category name the config can produce, in declaration order
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let declared = self
            .manual_lookup
            .iter()
            .map(|m| m.category.as_str())
            .chain(self.weights.iter().map(|w| w.category.as_str()));
        for name in declared {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}
