//! Per-source transform: raw batch in, canonical keyed batch out.
//!
//! A run is synchronous and touches no shared mutable state, so batches for
//! different sources can be processed in parallel against the same
//! `CategoryConfig`.

pub mod ingestion;
pub mod output;
pub mod processing;
pub mod storage;

use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::categories::CategoryConfig;
use crate::constants::OTHER_CATEGORY;
use crate::domain::{CanonicalJobRecord, RawJobRecord};
use crate::error::Result;
use crate::metrics::{EnrichMetrics, NormalizeMetrics};
use crate::sources::SourceId;

use processing::diagnostics::{Diagnostic, DropReason, DroppedRecord, Field, Severity};
use processing::enrich::classify::TitleClassifier;
use processing::enrich::date::Clock;
use processing::enrich::{EnrichedJob, Enricher};
use processing::identity::{assign_job_ids, KeylessRecord};
use processing::normalize::normalize_record;

/// What happened to a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub source: SourceId,
    pub total_raw: usize,
    pub emitted: usize,
    pub dropped: Vec<DroppedRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    pub fn dropped_missing(&self) -> usize {
        self.dropped
            .iter()
            .filter(|d| matches!(d.reason, DropReason::MissingRequired(_)))
            .count()
    }

    pub fn dropped_duplicates(&self) -> usize {
        self.dropped
            .iter()
            .filter(|d| matches!(d.reason, DropReason::DuplicateLink(_)))
            .count()
    }

    pub fn warnings(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub source: SourceId,
    pub records: Vec<CanonicalJobRecord>,
    pub report: RunReport,
}

/// Keep a record only if every required field survived enrichment
fn require_complete(job: EnrichedJob, source: SourceId) -> std::result::Result<KeylessRecord, Vec<Field>> {
    let mut missing = Vec::new();
    if job.title.is_none() {
        missing.push(Field::Title);
    }
    if job.category.is_none() {
        missing.push(Field::Category);
    }
    if job.country.is_none() {
        missing.push(Field::Country);
    }
    if job.date_posted.is_none() {
        missing.push(Field::DatePosted);
    }
    if job.job_link.is_none() {
        missing.push(Field::JobLink);
    }

    match (job.title, job.category, job.country, job.date_posted, job.job_link) {
        (Some(title), Some(category), Some(country), Some(date_posted), Some(job_link)) => {
            let (min_salary, max_salary, avg_salary, currency) = match job.salary {
                Some(s) => (s.min, s.max, Some(s.avg), s.currency),
                None => (None, None, None, None),
            };
            Ok(KeylessRecord {
                title,
                category,
                company: job.company,
                location: job.location,
                country,
                min_salary,
                max_salary,
                avg_salary,
                currency,
                job_type: job.job_type,
                work_arrangement: job.work_arrangement,
                level: job.level,
                date_posted,
                job_link,
                source: source.as_str().to_string(),
            })
        }
        _ => Err(missing),
    }
}

pub struct Pipeline<'a> {
    enricher: Enricher<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(categories: &'a CategoryConfig) -> Result<Self> {
        let classifier = TitleClassifier::new(categories)?;
        Ok(Self {
            enricher: Enricher::new(classifier),
        })
    }

    /// Transform a batch named by its source code. Unknown codes are rejected
    /// before any record is looked at.
    pub fn run_named(&self, source: &str, raw_batch: &[RawJobRecord], clock: &dyn Clock) -> Result<PipelineRun> {
        let source: SourceId = source.parse()?;
        Ok(self.run(source, raw_batch, clock))
    }

    /// Transform one source's raw batch. Never fails: bad fields become
    /// diagnostics and incomplete records are dropped with a reason.
    #[instrument(skip(self, raw_batch, clock), fields(source = %source, raw = raw_batch.len()))]
    pub fn run(&self, source: SourceId, raw_batch: &[RawJobRecord], clock: &dyn Clock) -> PipelineRun {
        let started = Instant::now();
        let config = source.config();
        let now = clock.now();

        let mut diagnostics = Vec::new();
        let mut dropped = Vec::new();
        let mut seen_links: HashSet<String> = HashSet::new();
        let mut complete = Vec::with_capacity(raw_batch.len());

        for (index, raw) in raw_batch.iter().enumerate() {
            let (normalized, link_errors) = normalize_record(raw, config);
            diagnostics.extend(link_errors.iter().map(|e| Diagnostic::from_error(index, e)));

            let (enriched, notes) = self.enricher.enrich(index, normalized, config, now);
            diagnostics.extend(notes);

            let record = match require_complete(enriched, source) {
                Ok(record) => record,
                Err(missing) => {
                    debug!("record {} dropped, missing {:?}", index, missing);
                    dropped.push(DroppedRecord {
                        record_index: index,
                        reason: DropReason::MissingRequired(missing),
                    });
                    continue;
                }
            };

            if !seen_links.insert(record.job_link.clone()) {
                dropped.push(DroppedRecord {
                    record_index: index,
                    reason: DropReason::DuplicateLink(record.job_link),
                });
                continue;
            }
            complete.push(record);
        }

        let records = assign_job_ids(complete);

        for diagnostic in diagnostics.iter().filter(|d| d.severity == Severity::Warning) {
            warn!("record {}: {}", diagnostic.record_index, diagnostic.message);
            EnrichMetrics::record_field_error(source.as_str(), &diagnostic.field.to_string());
        }

        let report = RunReport {
            source,
            total_raw: raw_batch.len(),
            emitted: records.len(),
            dropped,
            diagnostics,
        };

        let other = records.iter().filter(|r| r.category == OTHER_CATEGORY).count();
        EnrichMetrics::record_uncategorized(source.as_str(), other);
        NormalizeMetrics::record_dropped_missing(source.as_str(), report.dropped_missing());
        NormalizeMetrics::record_dropped_duplicate(source.as_str(), report.dropped_duplicates());
        NormalizeMetrics::record_batch(
            source.as_str(),
            report.total_raw,
            report.emitted,
            started.elapsed().as_secs_f64(),
        );

        info!(
            "✅ {}: {} raw -> {} emitted ({} incomplete, {} duplicate links, {} field warnings)",
            source,
            report.total_raw,
            report.emitted,
            report.dropped_missing(),
            report.dropped_duplicates(),
            report.warnings()
        );

        PipelineRun {
            source,
            records,
            report,
        }
    }
}
