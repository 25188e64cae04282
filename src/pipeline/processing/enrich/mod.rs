//! Enrichment: salary decomposition, posting date, category and seniority.

pub mod classify;
pub mod date;
pub mod salary;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Level;
use crate::pipeline::processing::diagnostics::{Diagnostic, Field};
use crate::pipeline::processing::normalize::NormalizedJob;
use crate::sources::SourceConfig;

use self::classify::{seniority, TitleClassifier};
use self::date::normalize_date;
use self::salary::{is_negotiable, parse_salary, SalaryRange};

/// A normalized record with every derived field filled in where possible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedJob {
    pub title: Option<String>,
    pub category: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub salary: Option<SalaryRange>,
    pub job_type: Option<String>,
    pub work_arrangement: Option<String>,
    pub level: Option<Level>,
    pub date_posted: Option<NaiveDate>,
    pub job_link: Option<String>,
}

pub struct Enricher<'a> {
    classifier: TitleClassifier<'a>,
}

impl<'a> Enricher<'a> {
    pub fn new(classifier: TitleClassifier<'a>) -> Self {
        Self { classifier }
    }

    /// Enrich one record. Field failures become diagnostics and leave the
    /// field missing.
    pub fn enrich(
        &self,
        record_index: usize,
        job: NormalizedJob,
        config: &SourceConfig,
        now: DateTime<Utc>,
    ) -> (EnrichedJob, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();

        let salary = match parse_salary(job.salary.as_deref(), config.salary_format, config.currency) {
            Ok(parsed) => parsed,
            Err(e) => {
                diagnostics.push(Diagnostic::from_error(record_index, &e));
                None
            }
        };
        if job.salary.as_deref().is_some_and(is_negotiable) {
            diagnostics.push(Diagnostic::info(
                record_index,
                Field::Salary,
                "salary listed as negotiable",
            ));
        }

        let date_posted =
            match normalize_date(job.date_posted.as_deref(), config.date_formats, now, config.timezone) {
                Ok(date) => date,
                Err(e) => {
                    diagnostics.push(Diagnostic::from_error(record_index, &e));
                    None
                }
            };

        let source = config.id.as_str();
        let category = job
            .title
            .as_deref()
            .map(|title| self.classifier.categorize(title, source).to_string());
        let level = job.title.as_deref().and_then(seniority);

        let enriched = EnrichedJob {
            title: job.title,
            category,
            company: job.company,
            location: job.location,
            country: job.country,
            salary,
            job_type: job.job_type,
            work_arrangement: job.work_arrangement,
            level,
            date_posted,
            job_link: job.job_link,
        };
        (enriched, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::CategoryConfig;
    use crate::pipeline::processing::diagnostics::Severity;
    use crate::sources::SourceId;
    use chrono::TimeZone;

    #[test]
    fn test_enrich_reports_field_failures() {
        let config = CategoryConfig::builtin().unwrap();
        let enricher = Enricher::new(TitleClassifier::new(&config).unwrap());
        let job = NormalizedJob {
            title: Some("Senior Network Engineer".to_string()),
            salary: Some("Negotiable".to_string()),
            date_posted: Some("sometime last spring".to_string()),
            ..Default::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();

        let (enriched, diagnostics) = enricher.enrich(3, job, SourceId::JobnetMm.config(), now);
        assert_eq!(enriched.category.as_deref(), Some("Network"));
        assert_eq!(enriched.level, Some(Level::Senior));
        assert_eq!(enriched.salary, None);
        assert_eq!(enriched.date_posted, None);

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.record_index == 3));
        assert!(diagnostics
            .iter()
            .any(|d| d.field == Field::Salary && d.severity == Severity::Info));
        assert!(diagnostics
            .iter()
            .any(|d| d.field == Field::DatePosted && d.severity == Severity::Warning));
    }
}
