use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nd_core::AnalysisReport;

use crate::error::{Result, StoreError};
use crate::schema;

const LAST_REFRESH: &str = "last_refresh";

/// Row metadata for a persisted analysis run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: Uuid,
    pub refreshed_at: String,
    pub narrative_count: usize,
    pub strategy: String,
}

/// A persisted report together with its row metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub record: SnapshotRecord,
    pub report: AnalysisReport,
}

/// SQLite-backed history of analysis reports, keyed by refresh timestamp.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Refresh timestamp of the most recently saved snapshot.
    pub fn last_refresh(&self) -> Result<Option<String>> {
        self.get_metadata(LAST_REFRESH)
    }

    // --- Save ---

    /// Persist a report as a new snapshot in one transaction.
    pub fn save(&self, report: &AnalysisReport) -> Result<SnapshotRecord> {
        let payload = serde_json::to_string(report)?;
        let record = SnapshotRecord {
            id: Uuid::new_v4(),
            refreshed_at: report.analysis_timestamp.clone(),
            narrative_count: report.narrative_count,
            strategy: report.strategy.to_string(),
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO snapshots (id, refreshed_at, narrative_count, strategy, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.to_string(),
                record.refreshed_at,
                record.narrative_count as i64,
                record.strategy,
                payload,
            ],
        )?;
        self.set_metadata(LAST_REFRESH, &record.refreshed_at)?;
        tx.commit()?;

        tracing::info!(
            "snapshot {} persisted ({} narratives)",
            record.id,
            record.narrative_count
        );
        Ok(record)
    }

    // --- Load ---

    /// Most recent snapshot by refresh timestamp; later inserts win ties.
    pub fn latest(&self) -> Result<Option<Snapshot>> {
        self.load_one(
            "SELECT id, refreshed_at, narrative_count, strategy, payload FROM snapshots
             ORDER BY refreshed_at DESC, rowid DESC LIMIT 1",
            [],
        )
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<Snapshot>> {
        self.load_one(
            "SELECT id, refreshed_at, narrative_count, strategy, payload FROM snapshots
             WHERE id = ?1",
            [id.to_string()],
        )
    }

    /// The snapshot refreshed exactly at `refreshed_at`.
    pub fn at(&self, refreshed_at: &str) -> Result<Option<Snapshot>> {
        self.load_one(
            "SELECT id, refreshed_at, narrative_count, strategy, payload FROM snapshots
             WHERE refreshed_at = ?1 ORDER BY rowid DESC LIMIT 1",
            [refreshed_at],
        )
    }

    /// Snapshot metadata, newest first.
    pub fn list(&self, limit: usize) -> Result<Vec<SnapshotRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, refreshed_at, narrative_count, strategy FROM snapshots
             ORDER BY refreshed_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows: Vec<(String, String, i64, String)> = stmt
            .query_map([limit as i64], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<std::result::Result<_, _>>()?;

        rows.into_iter()
            .map(|(id, refreshed_at, count, strategy)| {
                Ok(SnapshotRecord {
                    id: parse_uuid(&id)?,
                    refreshed_at,
                    narrative_count: count.max(0) as usize,
                    strategy,
                })
            })
            .collect()
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
        Ok(n.max(0) as usize)
    }

    /// Delete all but the `keep` newest snapshots. Returns the number removed.
    pub fn prune(&self, keep: usize) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM snapshots WHERE id NOT IN (
                SELECT id FROM snapshots ORDER BY refreshed_at DESC, rowid DESC LIMIT ?1
             )",
            [keep as i64],
        )?;
        if removed > 0 {
            tracing::info!("pruned {removed} snapshots, kept {keep}");
        }
        Ok(removed)
    }

    fn load_one<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Option<Snapshot>> {
        let row: Option<(String, String, i64, String, String)> = self
            .conn
            .query_row(sql, params, |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })
            .optional()?;

        let Some((id, refreshed_at, count, strategy, payload)) = row else {
            return Ok(None);
        };
        let report: AnalysisReport = serde_json::from_str(&payload)?;
        Ok(Some(Snapshot {
            record: SnapshotRecord {
                id: parse_uuid(&id)?,
                refreshed_at,
                narrative_count: count.max(0) as usize,
                strategy,
            },
            report,
        }))
    }
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::InvalidData(format!("invalid UUID '{s}': {e}")))
}
