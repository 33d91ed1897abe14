//! Pick outcome verification.
//!
//! Once a pick's tracking date arrives, the price path since entry decides
//! the outcome: the peak gain against the entry price is banded into
//! SUCCESS, PARTIAL, or FAIL. A pick missing from the current working set
//! is skipped and stays pending for the next sweep.

use crate::config::TrackingConfig;
use crate::error::Result;
use crate::services::pick_store::PickStore;
use crate::services::snapshot_store::SnapshotStore;
use crate::types::{GuaranteedPick, OutcomeCounts, PickOutcome, ScoredSnapshot};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub struct OutcomeTracker {
    snapshots: Arc<SnapshotStore>,
    picks: Arc<PickStore>,
    thresholds: TrackingConfig,
}

impl OutcomeTracker {
    pub fn new(
        snapshots: Arc<SnapshotStore>,
        picks: Arc<PickStore>,
        thresholds: TrackingConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            snapshots,
            picks,
            thresholds,
        })
    }

    /// Verify every pick whose tracking window has closed.
    pub async fn track_pending(&self) -> Result<OutcomeCounts> {
        let today = Utc::now().date_naive();
        let due = self.picks.due_for_tracking(today);
        info!("Tracking sweep: {} picks due", due.len());

        let mut counts = OutcomeCounts::default();
        for mut pick in due {
            let Some(current) = self.snapshots.get(&pick.ticker) else {
                warn!("Pick {} has no current snapshot, skipping", pick.ticker);
                counts.skipped += 1;
                continue;
            };

            let history =
                self.snapshots
                    .history(&pick.ticker, pick.pick_date, today);
            self.evaluate(&mut pick, current.snapshot.price, &history);

            match pick.outcome {
                PickOutcome::Success => counts.success += 1,
                PickOutcome::Partial => counts.partial += 1,
                _ => counts.fail += 1,
            }
            info!(
                "Tracked {}: {} (max gain {:.1}%)",
                pick.ticker,
                pick.outcome.label(),
                pick.max_gain_pct.unwrap_or(0.0)
            );
            self.picks.update(pick).await?;
        }

        Ok(counts)
    }

    /// Fill in the outcome fields from the price path since entry.
    fn evaluate(&self, pick: &mut GuaranteedPick, current_price: f64, history: &[ScoredSnapshot]) {
        let entry = pick.entry_price;

        let max_price = history
            .iter()
            .map(|h| h.snapshot.high)
            .fold(0.0_f64, f64::max);
        // No stored path at all: fall back to the current price.
        let max_price = if max_price > 0.0 { max_price } else { current_price };

        let max_gain_pct = if entry > 0.0 {
            ((max_price - entry) / entry) * 100.0
        } else {
            0.0
        };
        let final_gain_pct = if entry > 0.0 {
            ((current_price - entry) / entry) * 100.0
        } else {
            0.0
        };

        let threshold_price = entry * (1.0 + self.thresholds.success_pct / 100.0);
        let days_to_move = history
            .iter()
            .position(|h| h.snapshot.high >= threshold_price)
            .map(|i| i as i32 + 1)
            .unwrap_or(-1);

        let outcome = if max_gain_pct >= self.thresholds.success_pct {
            PickOutcome::Success
        } else if max_gain_pct >= self.thresholds.partial_pct {
            PickOutcome::Partial
        } else {
            PickOutcome::Fail
        };

        pick.max_price_reached = Some(max_price);
        pick.max_gain_pct = Some(max_gain_pct);
        pick.final_price = Some(current_price);
        pick.final_gain_pct = Some(final_gain_pct);
        pick.moved_threshold = Some(outcome == PickOutcome::Success);
        pick.days_to_move = Some(days_to_move);
        pick.outcome = outcome;
        pick.tracked = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConvergenceCandidate, IndicatorSnapshot};
    use chrono::{Days, NaiveDate};

    fn tracker_under_test(
        snapshots: &Arc<SnapshotStore>,
        picks: &Arc<PickStore>,
    ) -> Arc<OutcomeTracker> {
        OutcomeTracker::new(
            Arc::clone(snapshots),
            Arc::clone(picks),
            TrackingConfig::default(),
        )
    }

    fn pick_at(ticker: &str, date: NaiveDate, entry: f64) -> GuaranteedPick {
        let candidate = ConvergenceCandidate {
            ticker: ticker.to_string(),
            price: entry,
            ..Default::default()
        };
        GuaranteedPick::new(date, &candidate, 1, date + Days::new(5))
    }

    fn day(ticker: &str, date: NaiveDate, high: f64, close: f64) -> ScoredSnapshot {
        ScoredSnapshot::new(IndicatorSnapshot {
            ticker: ticker.to_string(),
            hist_date: date,
            price: close,
            high,
            low: close * 0.97,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_success_outcome_and_days_to_move() {
        let snapshots = SnapshotStore::new();
        let picks = PickStore::new();
        let today = Utc::now().date_naive();
        let entry_date = today - Days::new(7);

        // Entry at 10; day 3 of the path touches 11.6 (+16%).
        for (i, high) in [10.2, 10.8, 11.6, 11.1].iter().enumerate() {
            snapshots
                .upsert(day("WINR", entry_date + Days::new(i as u64), *high, high - 0.1))
                .await
                .unwrap();
        }
        snapshots.upsert(day("WINR", today, 11.0, 10.9)).await.unwrap();
        picks.save_all(vec![pick_at("WINR", entry_date, 10.0)]).await.unwrap();

        let counts = tracker_under_test(&snapshots, &picks).track_pending().await.unwrap();
        assert_eq!(counts.success, 1);

        let tracked = &picks.all()[0];
        assert!(tracked.tracked);
        assert_eq!(tracked.outcome, PickOutcome::Success);
        assert_eq!(tracked.max_price_reached, Some(11.6));
        assert!((tracked.max_gain_pct.unwrap() - 16.0).abs() < 1e-9);
        assert_eq!(tracked.days_to_move, Some(3));
        assert_eq!(tracked.moved_threshold, Some(true));
    }

    #[tokio::test]
    async fn test_partial_and_fail_bands() {
        let snapshots = SnapshotStore::new();
        let picks = PickStore::new();
        let today = Utc::now().date_naive();
        let entry_date = today - Days::new(6);

        snapshots.upsert(day("PART", today, 10.8, 10.5)).await.unwrap();
        snapshots.upsert(day("FAIL", today, 10.1, 9.8)).await.unwrap();
        picks
            .save_all(vec![
                pick_at("PART", entry_date, 10.0),
                pick_at("FAIL", entry_date, 10.0),
            ])
            .await
            .unwrap();

        let counts = tracker_under_test(&snapshots, &picks).track_pending().await.unwrap();
        assert_eq!(counts.partial, 1);
        assert_eq!(counts.fail, 1);

        let part = picks.all().into_iter().find(|p| p.ticker == "PART").unwrap();
        assert_eq!(part.outcome, PickOutcome::Partial);
        assert_eq!(part.days_to_move, Some(-1));
    }

    #[tokio::test]
    async fn test_missing_ticker_skipped_and_stays_pending() {
        let snapshots = SnapshotStore::new();
        let picks = PickStore::new();
        let today = Utc::now().date_naive();
        picks
            .save_all(vec![pick_at("GONE", today - Days::new(6), 10.0)])
            .await
            .unwrap();

        let counts = tracker_under_test(&snapshots, &picks).track_pending().await.unwrap();
        assert_eq!(counts.skipped, 1);
        let pick = &picks.all()[0];
        assert!(!pick.tracked);
        assert_eq!(pick.outcome, PickOutcome::Pending);
    }

    #[tokio::test]
    async fn test_not_yet_due_is_untouched() {
        let snapshots = SnapshotStore::new();
        let picks = PickStore::new();
        let today = Utc::now().date_naive();
        snapshots.upsert(day("FRSH", today, 12.0, 11.8)).await.unwrap();
        picks.save_all(vec![pick_at("FRSH", today, 10.0)]).await.unwrap();

        let counts = tracker_under_test(&snapshots, &picks).track_pending().await.unwrap();
        assert_eq!(counts.success + counts.partial + counts.fail + counts.skipped, 0);
        assert!(!picks.all()[0].tracked);
    }
}
