use anyhow::Result;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;

use sea_jobs::config::Config;
use sea_jobs::pipeline::ingestion::read_raw_batch;
use sea_jobs::pipeline::output::export_batch;
use sea_jobs::pipeline::processing::enrich::date::FixedClock;
use sea_jobs::pipeline::storage::{
    persist, persist_combined, InMemoryJobStore, JobStore, SqliteJobStore, COMBINED_TABLE,
};
use sea_jobs::{CanonicalJobRecord, CategoryConfig, Pipeline, PipelineError, SourceId};

fn transform(source: SourceId, raw: Value) -> Result<Vec<CanonicalJobRecord>> {
    let categories = CategoryConfig::builtin()?;
    let pipeline = Pipeline::new(&categories)?;
    let batch = match raw {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect::<Vec<_>>(),
        _ => Vec::new(),
    };
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 10, 4, 0, 0).unwrap());
    Ok(pipeline.run(source, &batch, &clock).records)
}

fn sample_batch() -> Value {
    json!([
        {"title": "Data Analyst", "date_posted": "1 day ago", "job_link": "/job/1"},
        {"title": "Cloud Engineer", "date_posted": "2 days ago", "job_link": "/job/2"},
        {"title": "Scrum Master", "date_posted": "today", "job_link": "/job/3"}
    ])
}

#[test]
fn test_sqlite_store_dedups_by_job_id() -> Result<()> {
    let dir = tempdir()?;
    let db = dir.path().join("data").join("jobs.db");
    let records = transform(SourceId::JobsdbSg, sample_batch())?;
    assert_eq!(records.len(), 3);

    let store = SqliteJobStore::open(&db)?;
    assert_eq!(persist(&store, SourceId::JobsdbSg, records.clone())?, 3);
    assert_eq!(persist(&store, SourceId::JobsdbSg, records.clone())?, 0);
    assert_eq!(store.count("jobsdbsg_transformed")?, 3);

    // A reopened store still knows what it has
    drop(store);
    let store = SqliteJobStore::open(&db)?;
    assert!(store.filter_new("jobsdbsg_transformed", records)?.is_empty());
    assert_eq!(store.job_ids("jobsdbsg_transformed")?.len(), 3);
    assert_eq!(store.count("jobsdbth_transformed")?, 0);
    Ok(())
}

#[test]
fn test_in_memory_store_matches_sqlite_semantics() -> Result<()> {
    let records = transform(SourceId::JobsdbSg, sample_batch())?;
    let store = InMemoryJobStore::new();

    assert_eq!(persist(&store, SourceId::JobsdbSg, records[..2].to_vec())?, 2);
    assert_eq!(persist(&store, SourceId::JobsdbSg, records.clone())?, 1);
    assert_eq!(store.count("jobsdbsg_transformed")?, 3);

    let stored = store.rows("jobsdbsg_transformed")?;
    assert_eq!(stored[2].job_link, "https://sg.jobsdb.com/job/3");
    Ok(())
}

#[test]
fn test_sources_merge_into_the_combined_table() -> Result<()> {
    let dir = tempdir()?;
    let store = SqliteJobStore::open(dir.path().join("jobs.db"))?;

    let sg = transform(SourceId::JobsdbSg, sample_batch())?;
    let th = transform(
        SourceId::JobsdbTh,
        json!([{
            "job_title": "Network Engineer",
            "country_code": "TH",
            "date_posted": "2024-01-04T08:30:00Z",
            "job_link": "https://th.jobsdb.com/job/8"
        }]),
    )?;
    assert_eq!(th.len(), 1);

    persist(&store, SourceId::JobsdbSg, sg.clone())?;
    persist(&store, SourceId::JobsdbTh, th.clone())?;

    let mut all = sg.clone();
    all.extend(th.clone());
    assert_eq!(persist_combined(&store, all.clone())?, 4);
    assert_eq!(store.count(COMBINED_TABLE)?, 4);

    // A later run with one fresh listing only adds that one
    let next = transform(
        SourceId::JobsdbSg,
        json!([
            {"title": "Data Analyst", "date_posted": "1 day ago", "job_link": "/job/1"},
            {"title": "Site Reliability Engineer", "date_posted": "today", "job_link": "/job/9"}
        ]),
    )?;
    assert_eq!(persist_combined(&store, next)?, 1);
    assert_eq!(store.count(COMBINED_TABLE)?, 5);
    assert_eq!(store.count("jobsdbsg_transformed")?, 3);

    let memory = InMemoryJobStore::new();
    assert_eq!(persist_combined(&memory, all.clone())?, 4);
    assert_eq!(persist_combined(&memory, all)?, 0);
    Ok(())
}

#[test]
fn test_invalid_table_is_rejected() -> Result<()> {
    let store = SqliteJobStore::open_in_memory()?;
    let err = store.count("x; DROP TABLE y").unwrap_err();
    assert!(matches!(err, PipelineError::InvalidTable(_)));
    Ok(())
}

#[test]
fn test_file_round_trip_through_csv_export() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("jobsdbsg.json");
    fs::write(&input, serde_json::to_string(&sample_batch())?)?;

    let raw = read_raw_batch(&input)?;
    let categories = CategoryConfig::builtin()?;
    let pipeline = Pipeline::new(&categories)?;
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 10, 4, 0, 0).unwrap());
    let run = pipeline.run(SourceId::JobsdbSg, &raw, &clock);

    let out = export_batch(&dir.path().join("out"), SourceId::JobsdbSg, &run.records)?;
    assert!(out.ends_with("jobsdbsg_transformed.csv"));

    let mut reader = csv::Reader::from_path(&out)?;
    assert_eq!(reader.headers()?.len(), 16);
    let rows: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][15], run.records[0].job_id.as_str());
    assert_eq!(&rows[0][2], "");
    Ok(())
}

#[test]
fn test_category_config_failures_are_fatal() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("categories.json");
    fs::write(&path, r#"{"manual_lookup": [], "weights": "nope"}"#)?;
    assert!(matches!(CategoryConfig::load(&path), Err(PipelineError::Config(_))));

    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, format!("categories_path = {:?}\n", path.display().to_string()))?;
    let config = Config::load_from(&config_path)?;
    assert_eq!(config.categories_path.as_deref(), Some(path.as_path()));
    Ok(())
}
