/// Source code constants to ensure consistency across the codebase
/// These are the identifiers accepted on the CLI and written to the `source` column

pub const JOBNET_MM: &str = "jobnetmm";
pub const JOBSDB_SG: &str = "jobsdbsg";
pub const JOBSDB_TH: &str = "jobsdbth";
pub const FOUNDIT_SG: &str = "founditsg";
pub const JOBSTREET_MY: &str = "jobstreetmalay";

// Base origins used to complete relative job links
pub const JOBNET_MM_ORIGIN: &str = "https://www.jobnet.com.mm";
pub const JOBSDB_SG_ORIGIN: &str = "https://sg.jobsdb.com";
pub const JOBSDB_TH_ORIGIN: &str = "https://th.jobsdb.com";
pub const FOUNDIT_SG_ORIGIN: &str = "https://www.foundit.sg";
pub const JOBSTREET_MY_ORIGIN: &str = "https://my.jobstreet.com";

/// Category assigned when neither the manual lookup nor the scorer is confident
pub const OTHER_CATEGORY: &str = "Other";

/// Minimum score the n-gram classifier needs before it commits to a category
pub const DEFAULT_SCORE_THRESHOLD: f64 = 1.5;

/// Suffix of the per-source table handed to persistence
pub const TRANSFORMED_TABLE_SUFFIX: &str = "_transformed";

/// Get all supported source codes
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![JOBNET_MM, JOBSDB_SG, JOBSDB_TH, FOUNDIT_SG, JOBSTREET_MY]
}
