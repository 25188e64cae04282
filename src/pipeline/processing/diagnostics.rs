use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Canonical field a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Category,
    Company,
    Location,
    Country,
    Salary,
    DatePosted,
    JobLink,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Category => "category",
            Field::Company => "company",
            Field::Location => "location",
            Field::Country => "country",
            Field::Salary => "salary",
            Field::DatePosted => "date_posted",
            Field::JobLink => "job_link",
        };
        f.write_str(name)
    }
}

/// A recoverable, field-level parse failure. The field becomes missing and
/// the record keeps moving through the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: cannot parse '{input}': {reason}")]
pub struct FieldError {
    pub field: Field,
    pub input: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: Field, input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field,
            input: input.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

/// Structured record of something the pipeline recovered from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Position of the raw record in its batch
    pub record_index: usize,
    pub field: Field,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn from_error(record_index: usize, err: &FieldError) -> Self {
        Self {
            record_index,
            field: err.field,
            severity: Severity::Warning,
            message: err.to_string(),
        }
    }

    pub fn info(record_index: usize, field: Field, message: impl Into<String>) -> Self {
        Self {
            record_index,
            field,
            severity: Severity::Info,
            message: message.into(),
        }
    }
}

/// Why a record was removed from the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    MissingRequired(Vec<Field>),
    DuplicateLink(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingRequired(fields) => {
                let names: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
                write!(f, "missing required field(s): {}", names.join(", "))
            }
            DropReason::DuplicateLink(link) => write!(f, "duplicate job_link in batch: {}", link),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedRecord {
    pub record_index: usize,
    pub reason: DropReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_message() {
        let err = FieldError::new(Field::Salary, "abc SGD", "no numeric amount");
        assert_eq!(err.to_string(), "salary: cannot parse 'abc SGD': no numeric amount");

        let diag = Diagnostic::from_error(4, &err);
        assert_eq!(diag.record_index, 4);
        assert_eq!(diag.severity, Severity::Warning);
    }

    #[test]
    fn test_drop_reason_display() {
        let reason = DropReason::MissingRequired(vec![Field::Title, Field::DatePosted]);
        assert_eq!(reason.to_string(), "missing required field(s): title, date_posted");
    }
}
