//! In-memory snapshot store with SQLite write-through.
//!
//! `current` holds the latest scored row per ticker (the working set the
//! pipeline iterates); `history` holds every stored ticker-day ordered by
//! date. SQLite, when connected, is the durable copy reloaded on startup.

use crate::error::{AppError, Result};
use crate::services::sqlite_store::SqliteStore;
use crate::types::{IndicatorSnapshot, ScoredSnapshot};
use chrono::{Days, NaiveDate};
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub struct SnapshotStore {
    current: DashMap<String, ScoredSnapshot>,
    history: DashMap<String, BTreeMap<NaiveDate, ScoredSnapshot>>,
    sqlite: RwLock<Option<Arc<SqliteStore>>>,
}

impl SnapshotStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            current: DashMap::new(),
            history: DashMap::new(),
            sqlite: RwLock::new(None),
        })
    }

    /// Attach the durable store. Call before `load_from_sqlite`.
    pub async fn connect_sqlite(&self, store: Arc<SqliteStore>) {
        *self.sqlite.write().await = Some(store);
        info!("Snapshot store connected to SQLite");
    }

    /// Rehydrate memory from SQLite. The latest stored day per ticker
    /// becomes the current row.
    pub async fn load_from_sqlite(&self) {
        let sqlite = self.sqlite.read().await;
        let Some(store) = sqlite.as_ref() else {
            warn!("load_from_sqlite called with no SQLite store connected");
            return;
        };

        let rows = store.load_snapshots();
        let count = rows.len();
        for row in rows {
            self.insert_in_memory(row);
        }
        info!(
            "Loaded {} snapshot rows across {} tickers from SQLite",
            count,
            self.current.len()
        );
    }

    fn insert_in_memory(&self, row: ScoredSnapshot) {
        let ticker = row.ticker().to_string();

        // The read guard must drop before inserting into the same shard.
        let keep_current = self
            .current
            .get(&ticker)
            .is_some_and(|existing| existing.date() > row.date());
        if !keep_current {
            self.current.insert(ticker.clone(), row.clone());
        }

        self.history
            .entry(ticker)
            .or_default()
            .insert(row.date(), row);
    }

    /// Insert or replace one ticker-day, writing through to SQLite when
    /// connected. Ingestion uses this to seed new days.
    pub async fn upsert(&self, row: ScoredSnapshot) -> Result<()> {
        if let Some(store) = self.sqlite.read().await.as_ref() {
            store.archive_snapshots(std::slice::from_ref(&row))?;
        }
        self.insert_in_memory(row);
        Ok(())
    }

    /// All current rows, unordered.
    pub fn list(&self) -> Vec<ScoredSnapshot> {
        self.current.iter().map(|e| e.value().clone()).collect()
    }

    pub fn get(&self, ticker: &str) -> Option<ScoredSnapshot> {
        self.current.get(ticker).map(|e| e.value().clone())
    }

    pub fn count(&self) -> usize {
        self.current.len()
    }

    /// Stored days for one ticker within `from..=to`, ascending by date.
    pub fn history(&self, ticker: &str, from: NaiveDate, to: NaiveDate) -> Vec<ScoredSnapshot> {
        self.history
            .get(ticker)
            .map(|days| days.range(from..=to).map(|(_, row)| row.clone()).collect())
            .unwrap_or_default()
    }

    /// Build the previous-day lookup for a pipeline run. For each ticker
    /// the nearest stored day within three calendar days before `today`
    /// wins, bridging weekends and single-day data gaps.
    pub fn prev_day_map(&self, today: NaiveDate) -> HashMap<String, IndicatorSnapshot> {
        let mut map = HashMap::new();
        for entry in self.history.iter() {
            for offset in 1..=3u64 {
                let date = today - Days::new(offset);
                if let Some(row) = entry.value().get(&date) {
                    map.insert(entry.key().clone(), row.snapshot.clone());
                    break;
                }
            }
        }
        map
    }

    /// Replace the whole working set after a pipeline run. SQLite is
    /// written first, in one transaction, so a storage failure leaves
    /// memory untouched.
    pub async fn replace_all(&self, batch: Vec<ScoredSnapshot>) -> Result<()> {
        if let Some(store) = self.sqlite.read().await.as_ref() {
            store
                .archive_snapshots(&batch)
                .map_err(AppError::Storage)?;
        }

        self.current.clear();
        for row in batch {
            self.insert_in_memory(row);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(ticker: &str, d: u32, price: f64) -> ScoredSnapshot {
        ScoredSnapshot::new(IndicatorSnapshot {
            ticker: ticker.to_string(),
            hist_date: NaiveDate::from_ymd_opt(2025, 6, d).unwrap(),
            price,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = SnapshotStore::new();
        store.upsert(scored("AAAA", 10, 10.0)).await.unwrap();
        assert_eq!(store.count(), 1);
        assert_eq!(store.get("AAAA").unwrap().snapshot.price, 10.0);
        assert!(store.get("BBBB").is_none());
    }

    #[tokio::test]
    async fn test_ascending_upserts_advance_current() {
        // Day-over-day ingestion for one ticker: each newer day must
        // replace the current row, not contend with its own read lock.
        let store = SnapshotStore::new();
        for d in 9..=12 {
            store.upsert(scored("AAAA", d, d as f64)).await.unwrap();
        }
        assert_eq!(store.count(), 1);
        assert_eq!(store.get("AAAA").unwrap().snapshot.price, 12.0);
        let history = store.history(
            "AAAA",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        );
        assert_eq!(history.len(), 4);
    }

    #[tokio::test]
    async fn test_current_tracks_latest_date() {
        let store = SnapshotStore::new();
        store.upsert(scored("AAAA", 10, 10.0)).await.unwrap();
        store.upsert(scored("AAAA", 9, 9.0)).await.unwrap();
        // Older day lands in history but does not displace current.
        assert_eq!(store.get("AAAA").unwrap().snapshot.price, 10.0);
        let history = store.history(
            "AAAA",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        );
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].snapshot.price, 9.0);
    }

    #[tokio::test]
    async fn test_prev_day_map_falls_back_three_days() {
        let store = SnapshotStore::new();
        store.upsert(scored("AAAA", 9, 9.0)).await.unwrap();
        store.upsert(scored("BBBB", 7, 7.0)).await.unwrap();
        store.upsert(scored("CCCC", 5, 5.0)).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let map = store.prev_day_map(today);
        assert_eq!(map.get("AAAA").unwrap().price, 9.0);
        assert_eq!(map.get("BBBB").unwrap().price, 7.0);
        // Four days back is beyond the fallback window.
        assert!(!map.contains_key("CCCC"));
    }

    #[tokio::test]
    async fn test_replace_all_swaps_working_set() {
        let store = SnapshotStore::new();
        store.upsert(scored("AAAA", 9, 9.0)).await.unwrap();
        store.upsert(scored("GONE", 9, 1.0)).await.unwrap();

        store
            .replace_all(vec![scored("AAAA", 10, 10.5), scored("BBBB", 10, 20.0)])
            .await
            .unwrap();

        assert_eq!(store.count(), 2);
        assert_eq!(store.get("AAAA").unwrap().snapshot.price, 10.5);
        assert!(store.get("GONE").is_none());
        // History keeps the replaced ticker's past days.
        let history = store.history(
            "GONE",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        );
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_roundtrip() {
        let sqlite = Arc::new(SqliteStore::new_in_memory().unwrap());
        let store = SnapshotStore::new();
        store.connect_sqlite(sqlite.clone()).await;
        store.upsert(scored("AAAA", 9, 9.0)).await.unwrap();
        store.replace_all(vec![scored("AAAA", 10, 10.0)]).await.unwrap();

        let reloaded = SnapshotStore::new();
        reloaded.connect_sqlite(sqlite).await;
        reloaded.load_from_sqlite().await;
        assert_eq!(reloaded.count(), 1);
        assert_eq!(reloaded.get("AAAA").unwrap().date(), NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        let history = reloaded.history(
            "AAAA",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        );
        assert_eq!(history.len(), 2);
    }
}
