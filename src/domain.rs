use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw listing exactly as a board's extractor produced it.
pub type RawJobRecord = serde_json::Map<String, serde_json::Value>;

/// Canonical column order for every tabular rendering of a job
pub const CANONICAL_COLUMNS: [&str; 16] = [
    "title",
    "category",
    "company",
    "location",
    "country",
    "min_salary",
    "max_salary",
    "avg_salary",
    "currency",
    "job_type",
    "work_arrangement",
    "level",
    "date_posted",
    "job_link",
    "source",
    "job_id",
];

/// Seniority derived from title keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Intern,
    Entry,
    Junior,
    Senior,
    Manager,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Intern => "Intern",
            Level::Entry => "Entry",
            Level::Junior => "Junior",
            Level::Senior => "Senior",
            Level::Manager => "Manager",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified job posting every source is normalized into.
///
/// `None` is the single missing marker across the pipeline: string fields
/// never hold an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalJobRecord {
    pub title: String,
    pub category: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub country: String,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub avg_salary: Option<i64>,
    pub currency: Option<String>,
    pub job_type: Option<String>,
    pub work_arrangement: Option<String>,
    pub level: Option<Level>,
    pub date_posted: NaiveDate,
    pub job_link: String,
    pub source: String,
    pub job_id: String,
}

impl CanonicalJobRecord {
    /// Render the record as strings in `CANONICAL_COLUMNS` order; missing values are empty cells.
    pub fn to_row(&self) -> Vec<String> {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(|v| v.to_string()).unwrap_or_default()
        }

        vec![
            self.title.clone(),
            self.category.clone(),
            opt(&self.company),
            opt(&self.location),
            self.country.clone(),
            opt(&self.min_salary),
            opt(&self.max_salary),
            opt(&self.avg_salary),
            opt(&self.currency),
            opt(&self.job_type),
            opt(&self.work_arrangement),
            opt(&self.level),
            self.date_posted.format("%Y-%m-%d").to_string(),
            self.job_link.clone(),
            self.source.clone(),
            self.job_id.clone(),
        ]
    }
}

/// Map a blank string to the missing marker.
pub fn non_blank<S: AsRef<str>>(value: S) -> Option<String> {
    let trimmed = value.as_ref().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
