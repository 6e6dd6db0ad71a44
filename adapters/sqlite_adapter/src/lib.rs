use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ninefive_core::domain::VictimRecord;
use ninefive_core::error::AnalysisError;
use ninefive_core::ports::{Result, VictimStore};
use ninefive_core::utils::canonical_timestamp;
use rusqlite::{params, Connection, Row};
use tracing::{debug, warn};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS victims (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        group_name TEXT NOT NULL,
        discovered TEXT NOT NULL,
        victim TEXT NOT NULL DEFAULT '',
        UNIQUE(group_name, discovered, victim)
    )
"#;

fn store_err(e: rusqlite::Error) -> AnalysisError {
    AnalysisError::Store(e.to_string())
}

/// SQLite implementation of the VictimStore trait
pub struct SqliteVictimStore {
    db_path: PathBuf,
}

impl SqliteVictimStore {
    /// Opens the database at `db_path`, creating the file and table if absent.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            db_path: db_path.into(),
        };
        store.connect()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path).map_err(store_err)?;
        conn.execute(SCHEMA, []).map_err(store_err)?;
        Ok(conn)
    }
}

/// Maps a `(group_name, discovered, victim)` row; `None` if the stored
/// timestamp no longer parses.
fn map_row(row: &Row) -> rusqlite::Result<Option<VictimRecord>> {
    let group: String = row.get(0)?;
    let discovered: String = row.get(1)?;
    let victim: String = row.get(2)?;

    let timestamp = match DateTime::parse_from_rfc3339(&discovered) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            warn!(
                group = %group,
                discovered = %discovered,
                error = %e,
                "ignoring row with unreadable timestamp"
            );
            return Ok(None);
        }
    };

    let victim = if victim.is_empty() { None } else { Some(victim) };
    Ok(Some(VictimRecord::new(group, timestamp, victim)))
}

impl VictimStore for SqliteVictimStore {
    fn upsert(&self, records: &[VictimRecord]) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction().map_err(store_err)?;

        let mut inserted = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO victims (group_name, discovered, victim) VALUES (?1, ?2, ?3)",
                )
                .map_err(store_err)?;

            for record in records {
                inserted += stmt
                    .execute(params![
                        record.group,
                        canonical_timestamp(&record.timestamp),
                        record.victim.as_deref().unwrap_or(""),
                    ])
                    .map_err(store_err)?;
            }
        }

        tx.commit().map_err(store_err)?;
        debug!(offered = records.len(), inserted, "upserted victims");
        Ok(inserted)
    }

    fn all_records(&self) -> Result<Vec<VictimRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT group_name, discovered, victim FROM victims ORDER BY id ASC")
            .map_err(store_err)?;

        let records = stmt
            .query_map([], map_row)
            .map_err(store_err)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
            .map_err(store_err)?;

        Ok(records.into_iter().flatten().collect())
    }

    /// Number of rows `all_records` can return; unreadable rows are not counted.
    fn count(&self) -> Result<usize> {
        Ok(self.all_records()?.len())
    }
}
