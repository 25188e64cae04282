use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{self, OTHER_CATEGORY};
use crate::domain::{CanonicalJobRecord, Level};

const HASH_LEN: usize = 8;
const UNKNOWN_CATEGORY_CODE: &str = "xx";
const UNKNOWN_SOURCE_CODE: &str = "xxx";

/// A complete record still waiting for its key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeylessRecord {
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
}

pub fn category_code(category: &str) -> &'static str {
    match category {
        "Data & Analytics" => "da",
        "Network" => "nw",
        "Cybersecurity" => "cy",
        "Infra & System" => "is",
        "Cloud & Devops" => "cd",
        "Software/Web Development" => "sw",
        "Project & Product Management" => "pm",
        "Quality Assurance & Testing" => "qa",
        "SAP/ERP/CRM" | "SAP / ERP / CRM" => "sp",
        "IT Consulting & Solutions" => "co",
        "AI / Data Science" => "ai",
        "Sales / Technical Sales" => "sa",
        "UI/UX" => "ui",
        "Database" => "db",
        "Mobile Development" => "md",
        "Technical Support" => "ts",
        "Architecture" => "ar",
        OTHER_CATEGORY => "ot",
        _ => UNKNOWN_CATEGORY_CODE,
    }
}

pub fn source_code(source: &str) -> &'static str {
    match source {
        constants::JOBNET_MM => "jmm",
        constants::JOBSDB_SG => "jsg",
        constants::JOBSDB_TH => "jth",
        constants::FOUNDIT_SG => "fit",
        constants::JOBSTREET_MY => "jst",
        _ => UNKNOWN_SOURCE_CODE,
    }
}

/// First 8 hex chars of SHA-256 over `job_link + source`, each part trimmed
/// before joining and the result lower-cased.
///
/// 32 bits: collisions become likely somewhere around tens of thousands of
/// listings sharing the same category, source, country and month.
pub fn short_hash(job_link: &str, source: &str) -> String {
    let key = format!("{}{}", job_link.trim(), source.trim()).to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..HASH_LEN].to_string()
}

/// `<hash8>_<category>_<source>_<country>_<YYYYMM>`
///
/// Only the hash is derived from the link. The other segments come from
/// enrichment, so a reclassified listing or a changed posting month yields a
/// new key for the same link.
pub fn job_id(record: &KeylessRecord) -> String {
    format!(
        "{}_{}_{}_{}_{}",
        short_hash(&record.job_link, &record.source),
        category_code(&record.category),
        source_code(&record.source),
        record.country.to_lowercase(),
        record.date_posted.format("%Y%m")
    )
}

impl KeylessRecord {
    pub fn into_canonical(self) -> CanonicalJobRecord {
        let job_id = job_id(&self);
        CanonicalJobRecord {
            title: self.title,
            category: self.category,
            company: self.company,
            location: self.location,
            country: self.country,
            min_salary: self.min_salary,
            max_salary: self.max_salary,
            avg_salary: self.avg_salary,
            currency: self.currency,
            job_type: self.job_type,
            work_arrangement: self.work_arrangement,
            level: self.level,
            date_posted: self.date_posted,
            job_link: self.job_link,
            source: self.source,
            job_id,
        }
    }
}

/// Key every record in the batch
pub fn assign_job_ids(records: Vec<KeylessRecord>) -> Vec<CanonicalJobRecord> {
    records.into_iter().map(KeylessRecord::into_canonical).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(link: &str, category: &str, source: &str) -> KeylessRecord {
        KeylessRecord {
            title: "Senior DevOps Engineer".to_string(),
            category: category.to_string(),
            company: None,
            location: None,
            country: "SG".to_string(),
            min_salary: None,
            max_salary: None,
            avg_salary: None,
            currency: None,
            job_type: None,
            work_arrangement: None,
            level: None,
            date_posted: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            job_link: link.to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_job_id_layout() {
        let id = job_id(&record("https://sg.jobsdb.com/job/123", "Cloud & Devops", "jobsdbsg"));
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0].len(), 8);
        assert!(parts[0].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(&parts[1..], &["cd", "jsg", "sg", "202401"]);
    }

    #[test]
    fn test_job_id_is_deterministic() {
        let a = record("https://sg.jobsdb.com/job/123", "Cloud & Devops", "jobsdbsg");
        assert_eq!(job_id(&a), job_id(&a.clone()));
        assert_eq!(
            short_hash("https://SG.jobsdb.com/job/123 ", "jobsdbsg"),
            short_hash("https://sg.jobsdb.com/job/123", "jobsdbsg")
        );
        assert_ne!(
            short_hash("https://sg.jobsdb.com/job/123", "jobsdbsg"),
            short_hash("https://sg.jobsdb.com/job/124", "jobsdbsg")
        );
    }

    #[test]
    fn test_short_hash_trims_each_part() {
        let clean = short_hash("https://sg.jobsdb.com/job/123", "jobsdbsg");
        assert_eq!(short_hash(" https://sg.jobsdb.com/job/123 ", "jobsdbsg"), clean);
        assert_eq!(short_hash("https://sg.jobsdb.com/job/123", " jobsdbsg\n"), clean);
    }

    #[test]
    fn test_short_hash_is_sha256_prefix() {
        // sha256("abc") = ba7816bf...
        assert_eq!(short_hash("ab", "c"), "ba7816bf");
    }

    #[test]
    fn test_unknown_codes_fall_back() {
        assert_eq!(category_code("Basket Weaving"), "xx");
        assert_eq!(category_code("Other"), "ot");
        assert_eq!(source_code("linkedin"), "xxx");

        let id = job_id(&record("x", "Basket Weaving", "linkedin"));
        assert!(id.contains("_xx_xxx_sg_202401"));
    }

    #[test]
    fn test_assign_keeps_order_and_fields() {
        let records = vec![
            record("https://a/1", "Network", "jobnetmm"),
            record("https://a/2", "Database", "jobnetmm"),
        ];
        let keyed = assign_job_ids(records);
        assert_eq!(keyed[0].job_link, "https://a/1");
        assert!(keyed[1].job_id.contains("_db_jmm_"));
    }
}
