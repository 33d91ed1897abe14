//! Daily scoring pipeline.
//!
//! One run scores every ticker in the working set: the previous-day lookup
//! is built once up front, each ticker is scored on its own task, and the
//! store is swapped in a single bulk replace only after every ticker has
//! finished. A failed ticker never aborts the batch; it lands in the run
//! report instead.

use crate::error::Result;
use crate::services::scoring;
use crate::services::snapshot_store::SnapshotStore;
use crate::types::{PipelineReport, ScoredSnapshot, TickerError};
use chrono::{Days, Utc};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

pub struct Pipeline {
    snapshots: Arc<SnapshotStore>,
    /// Trailing history window (days) handed to the scorers.
    history_days: u64,
}

impl Pipeline {
    pub fn new(snapshots: Arc<SnapshotStore>, history_days: u64) -> Arc<Self> {
        Arc::new(Self {
            snapshots,
            history_days,
        })
    }

    /// Score the entire working set and swap it in. Per-ticker failures are
    /// collected; only a storage failure on the final bulk write aborts.
    pub async fn run(&self) -> Result<PipelineReport> {
        let today = Utc::now().date_naive();
        let universe = self.snapshots.list();
        info!("Pipeline run starting for {} tickers", universe.len());

        let prev_map = Arc::new(self.snapshots.prev_day_map(today));
        let history_from = today - Days::new(self.history_days);

        let mut tasks: JoinSet<std::result::Result<ScoredSnapshot, TickerError>> = JoinSet::new();
        for row in universe {
            let snapshots = Arc::clone(&self.snapshots);
            let prev_map = Arc::clone(&prev_map);
            tasks.spawn(async move {
                let ticker = row.ticker().to_string();
                if ticker.is_empty() {
                    return Err(TickerError {
                        ticker,
                        message: "snapshot has no ticker symbol".to_string(),
                    });
                }
                let history = snapshots.history(&ticker, history_from, today);
                let prev = prev_map.get(&ticker);
                let scored = scoring::score_ticker(row.snapshot, prev, &history);
                debug!(
                    "Scored {}: overall {} {}",
                    ticker,
                    scored.scores.as_ref().map(|s| s.overall_score).unwrap_or(0),
                    scored
                        .scores
                        .as_ref()
                        .map(|s| s.signal.label())
                        .unwrap_or("-")
                );
                Ok(scored)
            });
        }

        let mut scored = Vec::new();
        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(row)) => scored.push(row),
                Ok(Err(e)) => {
                    error!("Ticker {} failed: {}", e.ticker, e.message);
                    errors.push(e);
                }
                Err(e) => {
                    error!("Scoring task panicked: {}", e);
                    errors.push(TickerError {
                        ticker: String::new(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let processed = scored.len();
        self.snapshots.replace_all(scored).await?;
        info!(
            "Pipeline run finished: {} scored, {} failed",
            processed,
            errors.len()
        );

        Ok(PipelineReport { processed, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndicatorSnapshot;
    use chrono::NaiveDate;

    fn seeded(ticker: &str, date: NaiveDate, price: f64) -> ScoredSnapshot {
        ScoredSnapshot::new(IndicatorSnapshot {
            ticker: ticker.to_string(),
            hist_date: date,
            price,
            high: price * 1.02,
            low: price * 0.98,
            open: price,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_run_scores_every_ticker() {
        let store = SnapshotStore::new();
        let today = Utc::now().date_naive();
        for ticker in ["AAAA", "BBBB", "CCCC"] {
            store.upsert(seeded(ticker, today, 10.0)).await.unwrap();
        }

        let pipeline = Pipeline::new(Arc::clone(&store), 30);
        let report = pipeline.run().await.unwrap();
        assert_eq!(report.processed, 3);
        assert!(report.errors.is_empty());
        for ticker in ["AAAA", "BBBB", "CCCC"] {
            assert!(store.get(ticker).unwrap().scores.is_some());
        }
    }

    #[tokio::test]
    async fn test_bad_ticker_reported_not_fatal() {
        let store = SnapshotStore::new();
        let today = Utc::now().date_naive();
        store.upsert(seeded("GOOD", today, 10.0)).await.unwrap();
        store.upsert(seeded("", today, 5.0)).await.unwrap();

        let pipeline = Pipeline::new(Arc::clone(&store), 30);
        let report = pipeline.run().await.unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(store.get("GOOD").unwrap().scores.is_some());
    }

    #[tokio::test]
    async fn test_run_uses_previous_day() {
        let store = SnapshotStore::new();
        let today = Utc::now().date_naive();
        let yesterday = today - Days::new(1);
        store.upsert(seeded("AAAA", yesterday, 9.0)).await.unwrap();
        store.upsert(seeded("AAAA", today, 10.0)).await.unwrap();

        let pipeline = Pipeline::new(Arc::clone(&store), 30);
        pipeline.run().await.unwrap();

        // With a prior day available the detectors produce real output.
        let scored = store.get("AAAA").unwrap();
        let detectors = scored.detectors.unwrap();
        assert!(scored.snapshot.price > 9.0);
        assert!(!detectors.spike.reasons.is_empty() || detectors.spike.spike_score == 0);
    }
}
