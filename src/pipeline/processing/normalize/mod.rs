//! Schema normalization
//!
//! Maps a raw record from any board onto the canonical field names. The
//! mapping is data: every board is handled by the same code, parameterized by
//! its `SourceConfig`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::domain::{non_blank, RawJobRecord};
use crate::pipeline::processing::diagnostics::{Field, FieldError};
use crate::sources::{CountryPolicy, SourceConfig};

/// A record with canonical field names and string values, before enrichment.
/// Salary and date are still the board's text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedJob {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub work_arrangement: Option<String>,
    pub date_posted: Option<String>,
    pub job_link: Option<String>,
}

/// Render a raw value as text. Lists are joined with `", "`, objects are ignored.
fn render(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Null | Value::Object(_) => None,
    }
}

/// Value of a canonical field: constant, renamed raw field, or the raw field
/// that already carries the canonical name.
fn field(raw: &RawJobRecord, config: &SourceConfig, canonical: &str) -> Option<String> {
    if let Some((_, value)) = config.fixed_fields.iter().find(|(name, _)| *name == canonical) {
        return non_blank(value);
    }

    let renamed = config
        .renames
        .iter()
        .filter(|(_, to)| *to == canonical)
        .find_map(|(from, _)| raw.get(*from));

    renamed.or_else(|| raw.get(canonical)).and_then(render)
}

/// Two-letter upper-case code, or an error when the board's value is not one
fn country(raw: &RawJobRecord, config: &SourceConfig) -> Result<Option<String>, FieldError> {
    let value = match config.country {
        CountryPolicy::Fixed(code) => Some(code.to_string()),
        CountryPolicy::FromField(name) => raw
            .get(name)
            .or_else(|| raw.get("country"))
            .and_then(render)
            .map(|c| c.to_uppercase()),
    };
    match value {
        Some(code) if code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase()) => Ok(Some(code)),
        Some(code) => Err(FieldError::new(Field::Country, &code, "expected a two-letter country code")),
        None => Ok(None),
    }
}

/// `th.jobsdb.com/job/2`: a host written without its scheme
fn is_schemeless_host(link: &str) -> bool {
    let first = link.split('/').next().unwrap_or_default();
    first.contains('.') && first != "." && first != ".." && !first.contains(char::is_whitespace)
}

/// Make a board-relative link absolute against the board's origin.
///
/// Only `http` and `https` results are accepted.
pub fn complete_link(link: &str, base_url: &str) -> Result<String, FieldError> {
    let bad = |reason: String| FieldError::new(Field::JobLink, link, reason);
    let base = Url::parse(base_url).map_err(|e| bad(e.to_string()))?;

    let url = match Url::parse(link) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) if is_schemeless_host(link) => {
            Url::parse(&format!("{}://{}", base.scheme(), link)).map_err(|e| bad(e.to_string()))?
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(link).map_err(|e| bad(e.to_string()))?,
        Err(e) => return Err(bad(e.to_string())),
    };

    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url.to_string()),
        scheme => Err(bad(format!("not a web link (scheme '{}')", scheme))),
    }
}

/// Project one raw record onto the canonical field names.
///
/// Never fails as a whole: a link that cannot be completed, or a country that
/// is not a two-letter code, is reported and left missing.
pub fn normalize_record(raw: &RawJobRecord, config: &SourceConfig) -> (NormalizedJob, Vec<FieldError>) {
    let mut errors = Vec::new();

    let job_link = match field(raw, config, "job_link") {
        Some(link) => match complete_link(&link, config.base_url) {
            Ok(absolute) => Some(absolute),
            Err(e) => {
                errors.push(e);
                None
            }
        },
        None => None,
    };

    let job = NormalizedJob {
        title: field(raw, config, "title"),
        company: field(raw, config, "company"),
        location: field(raw, config, "location"),
        country: match country(raw, config) {
            Ok(code) => code,
            Err(e) => {
                errors.push(e);
                None
            }
        },
        salary: field(raw, config, "salary"),
        job_type: field(raw, config, "job_type"),
        work_arrangement: field(raw, config, "work_arrangement"),
        date_posted: field(raw, config, "date_posted"),
        job_link,
    };
    (job, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceId;
    use serde_json::json;

    fn raw(value: Value) -> RawJobRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn test_jobnet_renames_and_fixed_country() {
        let record = raw(json!({
            "Title": "Network Engineer",
            "Company": "  ",
            "Location": "Yangon",
            "Salary": "Negotiable",
            "Date_Posted": "12 Jan 2024",
            "Job_Link": "https://www.jobnet.com.mm/jobs/42"
        }));
        let (job, errors) = normalize_record(&record, SourceId::JobnetMm.config());
        assert!(errors.is_empty());
        assert_eq!(job.title.as_deref(), Some("Network Engineer"));
        assert_eq!(job.company, None);
        assert_eq!(job.country.as_deref(), Some("MM"));
        assert_eq!(job.date_posted.as_deref(), Some("12 Jan 2024"));
        assert_eq!(job.job_link.as_deref(), Some("https://www.jobnet.com.mm/jobs/42"));
    }

    #[test]
    fn test_foundit_lists_and_blank_work_arrangement() {
        let record = raw(json!({
            "title": "Java Developer",
            "companyName": "Acme",
            "locations": ["Singapore", "Remote"],
            "jobTypes": ["Full time", "Contract"],
            "salary": "5000-7000 SGD",
            "postedBy": "2 days ago",
            "seoJdUrl": "/job/java-developer-acme-123",
            "work_arrangement": "Hybrid"
        }));
        let (job, _) = normalize_record(&record, SourceId::FounditSg.config());
        assert_eq!(job.location.as_deref(), Some("Singapore, Remote"));
        assert_eq!(job.job_type.as_deref(), Some("Full time, Contract"));
        assert_eq!(job.work_arrangement, None);
        assert_eq!(job.country.as_deref(), Some("SG"));
        assert_eq!(
            job.job_link.as_deref(),
            Some("https://www.foundit.sg/job/java-developer-acme-123")
        );
    }

    #[test]
    fn test_country_from_field_is_uppercased() {
        let record = raw(json!({
            "job_title": "QA Engineer",
            "country_code": "th",
            "job_link": "https://th.jobsdb.com/job/9",
            "salary": 45000
        }));
        let (job, _) = normalize_record(&record, SourceId::JobsdbTh.config());
        assert_eq!(job.title.as_deref(), Some("QA Engineer"));
        assert_eq!(job.country.as_deref(), Some("TH"));
        assert_eq!(job.salary.as_deref(), Some("45000"));

        let (job, _) = normalize_record(&raw(json!({"job_title": "QA"})), SourceId::JobsdbTh.config());
        assert_eq!(job.country, None);
    }

    #[test]
    fn test_canonical_keys_pass_through() {
        let record = raw(json!({
            "title": "Data Engineer",
            "company": "Acme",
            "job_link": "/job/1",
            "date_posted": "2024-01-05T00:00:00.000Z",
            "extra": {"nested": true}
        }));
        let (job, _) = normalize_record(&record, SourceId::JobsdbSg.config());
        assert_eq!(job.title.as_deref(), Some("Data Engineer"));
        assert_eq!(job.company.as_deref(), Some("Acme"));
        assert_eq!(job.job_link.as_deref(), Some("https://sg.jobsdb.com/job/1"));
    }

    #[test]
    fn test_unusable_link_is_reported() {
        let record = raw(json!({"title": "Dev", "job_link": "http://[broken"}));
        let (job, errors) = normalize_record(&record, SourceId::JobsdbSg.config());
        assert_eq!(job.job_link, None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, Field::JobLink);
    }

    #[test]
    fn test_country_name_is_not_a_code() {
        let record = raw(json!({
            "job_title": "Data Analyst",
            "country_code": "Thailand",
            "job_link": "https://th.jobsdb.com/job/3"
        }));
        let (job, errors) = normalize_record(&record, SourceId::JobsdbTh.config());
        assert_eq!(job.country, None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, Field::Country);
        assert_eq!(errors[0].input, "THAILAND");
    }

    #[test]
    fn test_only_web_links_are_accepted() {
        let base = SourceId::JobsdbTh.config().base_url;
        for bad in ["javascript:void(0)", "mailto:hr@example.com", "ftp://th.jobsdb.com/job/1"] {
            let err = complete_link(bad, base).unwrap_err();
            assert_eq!(err.field, Field::JobLink, "{}", bad);
        }
        assert_eq!(
            complete_link("th.jobsdb.com/job/2", base).unwrap(),
            "https://th.jobsdb.com/job/2"
        );
        assert_eq!(complete_link("/job/2", base).unwrap(), "https://th.jobsdb.com/job/2");
        assert_eq!(
            complete_link("http://th.jobsdb.com/job/2", base).unwrap(),
            "http://th.jobsdb.com/job/2"
        );
    }
}
