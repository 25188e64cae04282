//! Source registry
//!
//! Every supported board is described by one `SourceConfig` value. The
//! pipeline is a single generic transform parameterized by that value, so
//! adding a board means adding a config here, not a new normalizer type.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{self, TRANSFORMED_TABLE_SUFFIX};
use crate::error::PipelineError;
use crate::pipeline::processing::enrich::date::DateFormat;
use crate::pipeline::processing::enrich::salary::SalaryFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    JobnetMm,
    JobsdbSg,
    JobsdbTh,
    FounditSg,
    JobstreetMalay,
}

impl SourceId {
    pub const ALL: [SourceId; 5] = [
        SourceId::JobnetMm,
        SourceId::JobsdbSg,
        SourceId::JobsdbTh,
        SourceId::FounditSg,
        SourceId::JobstreetMalay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::JobnetMm => constants::JOBNET_MM,
            SourceId::JobsdbSg => constants::JOBSDB_SG,
            SourceId::JobsdbTh => constants::JOBSDB_TH,
            SourceId::FounditSg => constants::FOUNDIT_SG,
            SourceId::JobstreetMalay => constants::JOBSTREET_MY,
        }
    }

    /// Table name the persistence layer expects for this source
    pub fn table_name(&self) -> String {
        format!("{}{}", self.as_str(), TRANSFORMED_TABLE_SUFFIX)
    }

    pub fn config(&self) -> &'static SourceConfig {
        match self {
            SourceId::JobnetMm => &JOBNET_MM,
            SourceId::JobsdbSg => &JOBSDB_SG,
            SourceId::JobsdbTh => &JOBSDB_TH,
            SourceId::FounditSg => &FOUNDIT_SG,
            SourceId::JobstreetMalay => &JOBSTREET_MY,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| PipelineError::UnknownSource(s.to_string()))
    }
}

/// How the canonical `country` column is populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryPolicy {
    /// Constant for single-country boards
    Fixed(&'static str),
    /// Copied (upper-cased) from a raw field
    FromField(&'static str),
}

/// Per-source normalization rules
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub id: SourceId,
    /// Raw field name -> canonical field name
    pub renames: &'static [(&'static str, &'static str)],
    /// Canonical fields that are constant for this board
    pub fixed_fields: &'static [(&'static str, &'static str)],
    pub country: CountryPolicy,
    /// Origin that relative job links are resolved against
    pub base_url: &'static str,
    /// Local timezone of the board; relative dates are truncated in it
    pub timezone: Tz,
    pub salary_format: SalaryFormat,
    /// Currency to report when the salary text carries only a symbol
    pub currency: Option<&'static str>,
    /// Date representations, tried in order
    pub date_formats: &'static [DateFormat],
}

const ISO_SECONDS: DateFormat = DateFormat::Absolute("%Y-%m-%dT%H:%M:%SZ");
const ISO_FRACTIONAL: DateFormat = DateFormat::Absolute("%Y-%m-%dT%H:%M:%S%.fZ");
const DAY_MONTH_YEAR: DateFormat = DateFormat::Absolute("%d %b %Y");

static JOBNET_MM: SourceConfig = SourceConfig {
    id: SourceId::JobnetMm,
    renames: &[
        ("Title", "title"),
        ("Company", "company"),
        ("Location", "location"),
        ("Salary", "salary"),
        ("Date_Posted", "date_posted"),
        ("Job_Link", "job_link"),
    ],
    fixed_fields: &[],
    country: CountryPolicy::Fixed("MM"),
    base_url: constants::JOBNET_MM_ORIGIN,
    timezone: chrono_tz::Asia::Yangon,
    salary_format: SalaryFormat::Kyat,
    currency: Some("Ks"),
    date_formats: &[DateFormat::Today, DAY_MONTH_YEAR, DateFormat::Relative],
};

static JOBSDB_SG: SourceConfig = SourceConfig {
    id: SourceId::JobsdbSg,
    renames: &[
        ("Title", "title"),
        ("Company", "company"),
        ("Location", "location"),
        ("Salary", "salary"),
        ("Job_Type", "job_type"),
        ("Work_Arrangement", "work_arrangement"),
        ("Job_Link", "job_link"),
        ("Date_Posted", "date_posted"),
    ],
    fixed_fields: &[],
    country: CountryPolicy::Fixed("SG"),
    base_url: constants::JOBSDB_SG_ORIGIN,
    timezone: chrono_tz::Asia::Singapore,
    salary_format: SalaryFormat::Symbol,
    currency: Some("SGD"),
    date_formats: &[
        ISO_FRACTIONAL,
        DateFormat::Relative,
        DateFormat::Compact,
        DateFormat::Today,
    ],
};

static JOBSDB_TH: SourceConfig = SourceConfig {
    id: SourceId::JobsdbTh,
    renames: &[("job_title", "title")],
    fixed_fields: &[],
    country: CountryPolicy::FromField("country_code"),
    base_url: constants::JOBSDB_TH_ORIGIN,
    timezone: chrono_tz::Asia::Bangkok,
    salary_format: SalaryFormat::Symbol,
    currency: Some("THB"),
    date_formats: &[ISO_SECONDS, ISO_FRACTIONAL, DateFormat::Relative],
};

static FOUNDIT_SG: SourceConfig = SourceConfig {
    id: SourceId::FounditSg,
    renames: &[
        ("companyName", "company"),
        ("locations", "location"),
        ("jobTypes", "job_type"),
        ("postedBy", "date_posted"),
        ("seoJdUrl", "job_link"),
    ],
    // The board has no work arrangement; make that explicit rather than leaking a raw field
    fixed_fields: &[("work_arrangement", "")],
    country: CountryPolicy::Fixed("SG"),
    base_url: constants::FOUNDIT_SG_ORIGIN,
    // Foundit's relative timestamps were calibrated against Yangon local time
    timezone: chrono_tz::Asia::Yangon,
    salary_format: SalaryFormat::SpaceSeparated,
    currency: None,
    date_formats: &[DateFormat::Relative, DateFormat::Today],
};

static JOBSTREET_MY: SourceConfig = SourceConfig {
    id: SourceId::JobstreetMalay,
    renames: &[("job_title", "title")],
    fixed_fields: &[],
    country: CountryPolicy::FromField("country_code"),
    base_url: constants::JOBSTREET_MY_ORIGIN,
    timezone: chrono_tz::Asia::Kuala_Lumpur,
    salary_format: SalaryFormat::Symbol,
    currency: Some("MYR"),
    date_formats: &[ISO_SECONDS, ISO_FRACTIONAL, DateFormat::Relative],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_sources() {
        for name in constants::get_supported_sources() {
            let id: SourceId = name.parse().unwrap();
            assert_eq!(id.as_str(), name);
            assert_eq!(id.config().id, id);
        }
        assert_eq!(" JobsDBSG ".parse::<SourceId>().unwrap(), SourceId::JobsdbSg);
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let err = "linkedin".parse::<SourceId>().unwrap_err();
        assert!(matches!(err, PipelineError::UnknownSource(ref s) if s == "linkedin"));
    }

    #[test]
    fn test_table_name() {
        assert_eq!(SourceId::FounditSg.table_name(), "founditsg_transformed");
    }
}
