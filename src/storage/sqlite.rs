use rusqlite::{params, Connection};
use std::path::Path;

use crate::error::Result;
use crate::models::{Consensus, FinalAssessment, ReviewReport, SecurityContext};

/// Cache of completed review runs keyed by changeset digest. Only final
/// artifacts are stored; the graph itself is rebuilt from its input file on
/// every run.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY,
                changeset_digest TEXT UNIQUE NOT NULL,
                changed_files_json TEXT NOT NULL,
                context_json TEXT NOT NULL,
                consensus_json TEXT NOT NULL,
                assessment_json TEXT NOT NULL,
                passes_completed INTEGER NOT NULL,
                passes_degraded INTEGER NOT NULL,
                reviewed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reports_digest ON reports(changeset_digest);
            "#,
        )?;

        Ok(())
    }

    pub fn save_report(&self, report: &ReviewReport) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO reports (
                changeset_digest, changed_files_json, context_json,
                consensus_json, assessment_json, passes_completed,
                passes_degraded, reviewed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(changeset_digest) DO UPDATE SET
                changed_files_json = excluded.changed_files_json,
                context_json = excluded.context_json,
                consensus_json = excluded.consensus_json,
                assessment_json = excluded.assessment_json,
                passes_completed = excluded.passes_completed,
                passes_degraded = excluded.passes_degraded,
                reviewed_at = excluded.reviewed_at
            "#,
            params![
                report.changeset_digest,
                serde_json::to_string(&report.changed_files)?,
                serde_json::to_string(&report.context)?,
                serde_json::to_string(&report.consensus)?,
                serde_json::to_string(&report.assessment)?,
                report.passes_completed as i64,
                report.passes_degraded as i64,
                report.reviewed_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    pub fn get_report(&self, changeset_digest: &str) -> Result<Option<ReviewReport>> {
        let result = self.conn.query_row(
            r#"
            SELECT changed_files_json, context_json, consensus_json,
                   assessment_json, passes_completed, passes_degraded, reviewed_at
            FROM reports
            WHERE changeset_digest = ?1
            "#,
            params![changeset_digest],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, String>(6)?,
                ))
            },
        );

        match result {
            Ok((files_json, context_json, consensus_json, assessment_json, completed, degraded, reviewed_at_str)) => {
                let changed_files: Vec<String> = serde_json::from_str(&files_json)?;
                let context: SecurityContext = serde_json::from_str(&context_json)?;
                let consensus: Consensus = serde_json::from_str(&consensus_json)?;
                let assessment: FinalAssessment = serde_json::from_str(&assessment_json)?;
                let reviewed_at = chrono::DateTime::parse_from_rfc3339(&reviewed_at_str)
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .unwrap_or_else(|_| chrono::Utc::now());

                Ok(Some(ReviewReport {
                    changeset_digest: changeset_digest.to_string(),
                    changed_files,
                    context,
                    consensus,
                    assessment,
                    passes_completed: completed as usize,
                    passes_degraded: degraded as usize,
                    reviewed_at,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_digests(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT changeset_digest FROM reports ORDER BY reviewed_at DESC")?;

        let digests = stmt.query_map([], |row| row.get(0))?;
        digests
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}
