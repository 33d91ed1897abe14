//! SQLite persistence layer.
//!
//! Two concerns survive restarts:
//! - Snapshot history (one row per ticker per day, full scored document)
//! - Daily picks and their tracked outcomes
//!
//! Rows store the serialized document alongside the columns we query on.

use crate::types::{GuaranteedPick, ScoredSnapshot};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info};

/// SQLite store for snapshot history and pick archives.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("SQLite store initialized");
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub fn new_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS snapshot_history (
                ticker TEXT NOT NULL,
                hist_date TEXT NOT NULL,
                doc TEXT NOT NULL,
                PRIMARY KEY (ticker, hist_date)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_snapshots_date ON snapshot_history(hist_date)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS picks (
                id TEXT PRIMARY KEY,
                pick_date TEXT NOT NULL,
                ticker TEXT NOT NULL,
                tracked INTEGER NOT NULL,
                outcome TEXT NOT NULL,
                doc TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_picks_date ON picks(pick_date)",
            [],
        )?;

        info!("SQLite schema initialized");
        Ok(())
    }

    // ========== Snapshot Methods ==========

    /// Archive a batch of scored snapshots in one transaction. Existing
    /// rows for the same ticker-day are replaced.
    pub fn archive_snapshots(&self, batch: &[ScoredSnapshot]) -> Result<(), rusqlite::Error> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO snapshot_history (ticker, hist_date, doc)
                 VALUES (?1, ?2, ?3)",
            )?;
            for row in batch {
                let doc = serde_json::to_string(row).unwrap_or_default();
                stmt.execute(params![row.ticker(), row.date().to_string(), doc])?;
            }
        }
        tx.commit()?;
        debug!("Archived {} snapshots", batch.len());
        Ok(())
    }

    /// Load all archived snapshots (startup rehydration).
    pub fn load_snapshots(&self) -> Vec<ScoredSnapshot> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = match conn
            .prepare("SELECT doc FROM snapshot_history ORDER BY ticker, hist_date")
        {
            Ok(stmt) => stmt,
            Err(e) => {
                error!("Error preparing snapshot load: {}", e);
                return Vec::new();
            }
        };

        let rows = stmt.query_map([], |row| {
            let doc: String = row.get(0)?;
            Ok(doc)
        });

        match rows {
            Ok(rows) => rows
                .filter_map(|r| r.ok())
                .filter_map(|doc| serde_json::from_str(&doc).ok())
                .collect(),
            Err(e) => {
                error!("Error loading snapshots: {}", e);
                Vec::new()
            }
        }
    }

    // ========== Pick Methods ==========

    /// Save or replace a pick.
    pub fn save_pick(&self, pick: &GuaranteedPick) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let doc = serde_json::to_string(pick).unwrap_or_default();

        conn.execute(
            "INSERT OR REPLACE INTO picks (id, pick_date, ticker, tracked, outcome, doc)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                pick.id.to_string(),
                pick.pick_date.to_string(),
                pick.ticker,
                pick.tracked as i64,
                pick.outcome.label(),
                doc,
            ],
        )?;

        debug!("Saved pick {} ({})", pick.ticker, pick.id);
        Ok(())
    }

    /// Delete every pick made on the given date. Returns the removed count.
    pub fn delete_picks_for_date(&self, date: NaiveDate) -> Result<usize, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM picks WHERE pick_date = ?1",
            params![date.to_string()],
        )
    }

    /// Load all archived picks (startup rehydration).
    pub fn load_picks(&self) -> Vec<GuaranteedPick> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = match conn.prepare("SELECT doc FROM picks ORDER BY pick_date, ticker") {
            Ok(stmt) => stmt,
            Err(e) => {
                error!("Error preparing pick load: {}", e);
                return Vec::new();
            }
        };

        let rows = stmt.query_map([], |row| {
            let doc: String = row.get(0)?;
            Ok(doc)
        });

        match rows {
            Ok(rows) => rows
                .filter_map(|r| r.ok())
                .filter_map(|doc| serde_json::from_str(&doc).ok())
                .collect(),
            Err(e) => {
                error!("Error loading picks: {}", e);
                Vec::new()
            }
        }
    }
}
