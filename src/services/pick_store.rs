//! In-memory pick store with SQLite write-through.

use crate::error::Result;
use crate::services::sqlite_store::SqliteStore;
use crate::types::{GuaranteedPick, PerformanceStats, PickOutcome};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

pub struct PickStore {
    picks: DashMap<Uuid, GuaranteedPick>,
    sqlite: RwLock<Option<Arc<SqliteStore>>>,
}

impl PickStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            picks: DashMap::new(),
            sqlite: RwLock::new(None),
        })
    }

    pub async fn connect_sqlite(&self, store: Arc<SqliteStore>) {
        *self.sqlite.write().await = Some(store);
        info!("Pick store connected to SQLite");
    }

    pub async fn load_from_sqlite(&self) {
        let sqlite = self.sqlite.read().await;
        let Some(store) = sqlite.as_ref() else {
            warn!("load_from_sqlite called with no SQLite store connected");
            return;
        };

        for pick in store.load_picks() {
            self.picks.insert(pick.id, pick);
        }
        info!("Loaded {} picks from SQLite", self.picks.len());
    }

    /// Save a batch of picks, writing through to SQLite when connected.
    pub async fn save_all(&self, picks: Vec<GuaranteedPick>) -> Result<()> {
        if let Some(store) = self.sqlite.read().await.as_ref() {
            for pick in &picks {
                store.save_pick(pick)?;
            }
        }
        for pick in picks {
            self.picks.insert(pick.id, pick);
        }
        Ok(())
    }

    /// Update one pick in place (outcome tracking).
    pub async fn update(&self, pick: GuaranteedPick) -> Result<()> {
        if let Some(store) = self.sqlite.read().await.as_ref() {
            store.save_pick(&pick)?;
        }
        self.picks.insert(pick.id, pick);
        Ok(())
    }

    /// Remove every pick made on `date`. Returns the removed count.
    pub async fn delete_for_date(&self, date: NaiveDate) -> Result<usize> {
        if let Some(store) = self.sqlite.read().await.as_ref() {
            store.delete_picks_for_date(date)?;
        }
        let doomed: Vec<Uuid> = self
            .picks
            .iter()
            .filter(|e| e.value().pick_date == date)
            .map(|e| *e.key())
            .collect();
        let count = doomed.len();
        for id in doomed {
            self.picks.remove(&id);
        }
        Ok(count)
    }

    /// Picks made on exactly `date`, ordered by rank.
    pub fn for_date(&self, date: NaiveDate) -> Vec<GuaranteedPick> {
        let mut picks: Vec<GuaranteedPick> = self
            .picks
            .iter()
            .filter(|e| e.value().pick_date == date)
            .map(|e| e.value().clone())
            .collect();
        picks.sort_by_key(|p| p.rank);
        picks
    }

    pub fn has_picks_for(&self, date: NaiveDate) -> bool {
        self.picks.iter().any(|e| e.value().pick_date == date)
    }

    /// Untracked picks whose tracking date has arrived.
    pub fn due_for_tracking(&self, today: NaiveDate) -> Vec<GuaranteedPick> {
        self.picks
            .iter()
            .filter(|e| !e.value().tracked && e.value().tracking_date <= today)
            .map(|e| e.value().clone())
            .collect()
    }

    /// All picks, newest pick date first, rank ascending within a day.
    pub fn all(&self) -> Vec<GuaranteedPick> {
        let mut picks: Vec<GuaranteedPick> =
            self.picks.iter().map(|e| e.value().clone()).collect();
        picks.sort_by(|a, b| b.pick_date.cmp(&a.pick_date).then(a.rank.cmp(&b.rank)));
        picks
    }

    /// Aggregate performance across all tracked picks.
    pub fn performance_stats(&self) -> PerformanceStats {
        let all = self.all();
        let tracked: Vec<&GuaranteedPick> = all.iter().filter(|p| p.tracked).collect();

        let count_outcome = |o: PickOutcome| tracked.iter().filter(|p| p.outcome == o).count();
        let success = count_outcome(PickOutcome::Success);
        let partial = count_outcome(PickOutcome::Partial);
        let fail = count_outcome(PickOutcome::Fail);

        let mean = |values: Vec<f64>| {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        };

        let pct = |n: usize| {
            if tracked.is_empty() {
                0.0
            } else {
                (n as f64 / tracked.len() as f64) * 100.0
            }
        };

        PerformanceStats {
            total_picks: all.len(),
            tracked_picks: tracked.len(),
            success_count: success,
            partial_count: partial,
            fail_count: fail,
            success_rate_pct: pct(success),
            partial_or_better_rate_pct: pct(success + partial),
            avg_max_gain_pct: mean(tracked.iter().filter_map(|p| p.max_gain_pct).collect()),
            avg_final_gain_pct: mean(tracked.iter().filter_map(|p| p.final_gain_pct).collect()),
            avg_days_to_move: mean(
                tracked
                    .iter()
                    .filter(|p| p.outcome == PickOutcome::Success)
                    .filter_map(|p| p.days_to_move)
                    .filter(|d| *d > 0)
                    .map(|d| d as f64)
                    .collect(),
            ),
        }
    }
}
