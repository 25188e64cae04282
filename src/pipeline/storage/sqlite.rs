use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::{check_table_name, JobStore};
use crate::domain::CanonicalJobRecord;
use crate::error::Result;

/// SQLite-backed store, one table per source
pub struct SqliteJobStore {
    conn: Connection,
}

impl SqliteJobStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path.as_ref())?;
        // Sources may be written concurrently by separate connections
        conn.busy_timeout(Duration::from_secs(10))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    fn ensure_table(&self, table: &str) -> Result<()> {
        check_table_name(table)?;
        self.conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                job_id           TEXT PRIMARY KEY,
                title            TEXT NOT NULL,
                category         TEXT NOT NULL,
                company          TEXT,
                location         TEXT,
                country          TEXT NOT NULL,
                min_salary       INTEGER,
                max_salary       INTEGER,
                avg_salary       INTEGER,
                currency         TEXT,
                job_type         TEXT,
                work_arrangement TEXT,
                level            TEXT,
                date_posted      TEXT NOT NULL,
                job_link         TEXT NOT NULL,
                source           TEXT NOT NULL
            );
            "#
        ))?;
        Ok(())
    }

    /// Stored ids, ordered
    pub fn job_ids(&self, table: &str) -> Result<Vec<String>> {
        self.ensure_table(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT job_id FROM {} ORDER BY job_id", table))?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

impl JobStore for SqliteJobStore {
    fn filter_new(&self, table: &str, records: Vec<CanonicalJobRecord>) -> Result<Vec<CanonicalJobRecord>> {
        self.ensure_table(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT 1 FROM {} WHERE job_id = ?1", table))?;

        let mut fresh = Vec::with_capacity(records.len());
        for record in records {
            let exists: Option<i64> = stmt.query_row(params![record.job_id], |row| row.get(0)).optional()?;
            if exists.is_none() {
                fresh.push(record);
            }
        }
        Ok(fresh)
    }

    fn insert(&self, table: &str, records: &[CanonicalJobRecord]) -> Result<usize> {
        self.ensure_table(table)?;
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR IGNORE INTO {} (job_id, title, category, company, location, country, \
                 min_salary, max_salary, avg_salary, currency, job_type, work_arrangement, level, \
                 date_posted, job_link, source) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                table
            ))?;
            for r in records {
                inserted += stmt.execute(params![
                    r.job_id,
                    r.title,
                    r.category,
                    r.company,
                    r.location,
                    r.country,
                    r.min_salary,
                    r.max_salary,
                    r.avg_salary,
                    r.currency,
                    r.job_type,
                    r.work_arrangement,
                    r.level.map(|l| l.as_str()),
                    r.date_posted.format("%Y-%m-%d").to_string(),
                    r.job_link,
                    r.source,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Inserted {} rows into {}", inserted, table);
        Ok(inserted)
    }

    fn count(&self, table: &str) -> Result<usize> {
        self.ensure_table(table)?;
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(n as usize)
    }
}
