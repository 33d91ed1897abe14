//! Ten-factor convergence scorer and daily pick selection.
//!
//! Candidates come from a liquidity-bounded universe. Each factor group
//! awards points and passes or fails as a group; a pick needs many groups
//! agreeing at once, not one loud signal. Selection is strict first
//! (score and factor floor), with a score-only fallback so a quiet day
//! still produces a short list.

use crate::config::ConvergenceConfig;
use crate::error::Result;
use crate::services::pick_store::PickStore;
use crate::services::snapshot_store::SnapshotStore;
use crate::types::{ConvergenceCandidate, GuaranteedPick, ScoredSnapshot, Signal};
use chrono::{Days, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a persist request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistReport {
    /// False when today's picks already existed and force was off.
    pub persisted: bool,
    pub picks: Vec<GuaranteedPick>,
}

pub struct ConvergenceScorer {
    snapshots: Arc<SnapshotStore>,
    picks: Arc<PickStore>,
    config: ConvergenceConfig,
}

impl ConvergenceScorer {
    pub fn new(
        snapshots: Arc<SnapshotStore>,
        picks: Arc<PickStore>,
        config: ConvergenceConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            snapshots,
            picks,
            config,
        })
    }

    fn in_universe(&self, row: &ScoredSnapshot) -> bool {
        let snap = &row.snapshot;
        snap.price >= self.config.min_price
            && snap.price <= self.config.max_price
            && snap.volume >= self.config.min_volume
    }

    /// Run the ten factor groups against one scored ticker.
    pub fn analyze(&self, row: &ScoredSnapshot) -> ConvergenceCandidate {
        let history = self
            .snapshots
            .history(row.ticker(), row.date() - Days::new(10), row.date());
        analyze_with_history(row, &history, &self.config)
    }

    /// Convergence analysis for the whole filtered universe, strongest first.
    pub fn score_universe(&self) -> Vec<ConvergenceCandidate> {
        let mut grid: Vec<ConvergenceCandidate> = self
            .snapshots
            .list()
            .iter()
            .filter(|row| self.in_universe(row))
            .map(|row| self.analyze(row))
            .collect();
        grid.sort_by(|a, b| {
            (b.factors_passed, b.convergence_score).cmp(&(a.factors_passed, a.convergence_score))
        });
        grid
    }

    /// Today's top picks: strict gate first; when fewer than the wanted
    /// count qualify, the rest come from the score-only fallback pool.
    /// `limit` overrides the configured pick count.
    pub fn top_candidates(&self, limit: Option<usize>) -> Vec<ConvergenceCandidate> {
        let n = limit.unwrap_or(self.config.top_n);
        let analyzed: Vec<ConvergenceCandidate> = self
            .snapshots
            .list()
            .iter()
            .filter(|row| self.in_universe(row))
            .map(|row| self.analyze(row))
            .collect();

        let mut selected: Vec<ConvergenceCandidate> = analyzed
            .iter()
            .filter(|c| {
                c.convergence_score >= self.config.strict_score
                    && c.factors_passed >= self.config.strict_factors
            })
            .cloned()
            .collect();
        selected.sort_by(|a, b| {
            (b.factors_passed, b.convergence_score).cmp(&(a.factors_passed, a.convergence_score))
        });
        selected.truncate(n);

        // A short day still fills out from the score-only pool.
        if selected.len() < n {
            debug!(
                "{} strict qualifiers, topping up from the fallback pool",
                selected.len()
            );
            let mut fallback: Vec<ConvergenceCandidate> = analyzed
                .into_iter()
                .filter(|c| c.convergence_score >= self.config.fallback_score)
                .filter(|c| !selected.iter().any(|s| s.ticker == c.ticker))
                .collect();
            fallback.sort_by(|a, b| b.convergence_score.cmp(&a.convergence_score));
            fallback.truncate(n - selected.len());
            selected.extend(fallback);
        }
        selected
    }

    /// Persist today's top picks. Idempotent per day: a second call is a
    /// no-op unless `force`, which replaces today's picks.
    pub async fn persist_top(&self, force: bool) -> Result<PersistReport> {
        let today = Utc::now().date_naive();

        if self.picks.has_picks_for(today) && !force {
            info!("Picks for {} already exist, skipping persist", today);
            return Ok(PersistReport {
                persisted: false,
                picks: self.picks.for_date(today),
            });
        }

        let candidates = self.top_candidates(None);
        if candidates.is_empty() {
            info!("No candidates qualified for {}; nothing persisted", today);
            return Ok(PersistReport {
                persisted: false,
                picks: Vec::new(),
            });
        }

        if self.picks.has_picks_for(today) {
            let removed = self.picks.delete_for_date(today).await?;
            info!("Force refresh: removed {} existing picks for {}", removed, today);
        }

        let tracking_date = today + Days::new(self.config.tracking_days);
        let picks: Vec<GuaranteedPick> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| GuaranteedPick::new(today, c, i as u32 + 1, tracking_date))
            .collect();

        info!("Persisting {} picks for {}", picks.len(), today);
        self.picks.save_all(picks.clone()).await?;
        Ok(PersistReport {
            persisted: true,
            picks,
        })
    }
}

/// The factor-group evaluation itself, pure over the snapshot and its
/// trailing history (ascending, today included when stored).
pub fn analyze_with_history(
    row: &ScoredSnapshot,
    history: &[ScoredSnapshot],
    config: &ConvergenceConfig,
) -> ConvergenceCandidate {
    let snap = &row.snapshot;
    let overall = row.scores.as_ref().map(|s| s.overall_score).unwrap_or(0);
    let signal = row.scores.as_ref().map(|s| s.signal);
    let spike_score = row
        .detectors
        .as_ref()
        .map(|d| d.spike.spike_score)
        .unwrap_or(0);
    let bottom_conditions = row
        .detectors
        .as_ref()
        .map(|d| d.bottom.conditions_met)
        .unwrap_or(0);
    let change_pct = snap.change_pct();

    // Prior trading days only; today may or may not be stored yet.
    let prior: Vec<&ScoredSnapshot> =
        history.iter().filter(|h| h.date() < row.date()).collect();

    let mut score: u32 = 0;
    let mut factors_passed: u32 = 0;
    let mut passed = Vec::new();
    let mut failed = Vec::new();

    let mut grade = |points: u32, pass: bool, name: &str, detail: String| {
        score += points;
        if pass {
            factors_passed += 1;
            passed.push(format!("{}: {}", name, detail));
        } else {
            failed.push(format!("{}: {}", name, detail));
        }
    };

    // 1. Price action: already moving, not just promising.
    {
        let mut points = 0;
        if prior.len() >= 2 {
            let base = prior[prior.len() - 2].snapshot.price;
            if base > 0.0 && ((snap.price - base) / base) * 100.0 >= 5.0 {
                points += 10;
            }
        }
        if prior.len() >= 5 {
            let recent_high = prior[prior.len() - 5..]
                .iter()
                .map(|h| h.snapshot.high)
                .fold(f64::MIN, f64::max);
            if snap.price > recent_high * 1.02 {
                points += 10;
            }
        }
        if row.streaks.up_days >= 2 {
            points += 10;
        }
        grade(points, points >= 20, "Price action", format!("{} pts", points));
    }

    // 2. Volume: sustained expansion, not a one-day blip.
    {
        let mut points = 0;
        if prior.len() >= 5 {
            let recent = &prior[prior.len() - 5..];
            let avg5 =
                recent.iter().map(|h| h.snapshot.volume).sum::<f64>() / recent.len() as f64;
            if avg5 > 0.0 {
                let ratio = snap.volume / avg5;
                if ratio >= 3.0 {
                    points += 10;
                } else if ratio >= 2.0 {
                    points += 5;
                }
            }
        }
        if prior.len() >= 2 {
            let v1 = prior[prior.len() - 1].snapshot.volume;
            let v2 = prior[prior.len() - 2].snapshot.volume;
            if snap.volume > v1 && v1 > v2 {
                points += 10;
            }
        }
        grade(points, points >= 10, "Volume surge", format!("{} pts", points));
    }

    // 3. Chart patterns.
    {
        let mut points = 0;
        if snap.no_of_long_patterns >= 2 {
            points += 10;
        }
        if snap.no_of_short_patterns == 0 {
            points += 5;
        }
        grade(
            points,
            points >= 8,
            "Patterns",
            format!(
                "{} long / {} short",
                snap.no_of_long_patterns, snap.no_of_short_patterns
            ),
        );
    }

    // 4. Technical strength.
    {
        let mut points = 0;
        if overall >= 70 {
            points += 10;
        }
        if change_pct > 0.0 && change_pct < 15.0 {
            points += 5;
        }
        grade(points, points >= 8, "Technicals", format!("overall {}", overall));
    }

    // 5. Structure: a confirmed base under the move.
    {
        let mut points = 0;
        if bottom_conditions >= 5 {
            points += 10;
        }
        if row.streaks.up_days >= 2 {
            points += 5;
        }
        grade(
            points,
            points >= 8,
            "Structure",
            format!("{} bottom conditions", bottom_conditions),
        );
    }

    // 6. Detector scores.
    {
        let mut points = 0;
        if spike_score >= 60 {
            points += 10;
        }
        if overall >= 70 {
            points += 5;
        }
        grade(points, points >= 8, "Scoring", format!("spike {}", spike_score));
    }

    // 7. Trade signal.
    {
        let points = match signal {
            Some(Signal::Buy) => 10,
            Some(Signal::Hold) => 5,
            _ => 0,
        };
        grade(
            points,
            points >= 8,
            "Signal",
            signal.map(|s| s.label().to_string()).unwrap_or_else(|| "-".to_string()),
        );
    }

    // 8. Liquidity in the sweet spot.
    {
        let points = if snap.price >= config.min_price
            && snap.price <= config.max_price
            && snap.volume >= 1_000_000.0
        {
            5
        } else {
            0
        };
        grade(
            points,
            points >= 5,
            "Liquidity",
            format!("price {:.2}, volume {:.0}", snap.price, snap.volume),
        );
    }

    // 9. Today's momentum: moving but not already exhausted.
    {
        let points = if (3.0..=12.0).contains(&change_pct) {
            10
        } else if change_pct > 0.0 {
            5
        } else {
            0
        };
        grade(points, points >= 5, "Momentum today", format!("{:.1}%", change_pct));
    }

    // 10. Strong-convergence bonus counts as its own factor.
    if factors_passed >= 6 {
        score += 10;
        factors_passed += 1;
        passed.push("STRONG CONVERGENCE: multiple factor groups aligned".to_string());
    }

    let convergence_score = score.min(100);
    let (confidence_level, confidence_text) =
        ConvergenceCandidate::confidence_for(factors_passed);

    ConvergenceCandidate {
        ticker: snap.ticker.clone(),
        price: snap.price,
        change: snap.change,
        volume: snap.volume,
        up_days: row.streaks.up_days,
        no_of_long_patterns: snap.no_of_long_patterns,
        no_of_short_patterns: snap.no_of_short_patterns,
        spike_score,
        overall_score: overall,
        signal,
        factors_passed,
        convergence_score,
        passed_factors: passed,
        failed_factors: failed,
        confidence_level,
        confidence_text: confidence_text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        BottomSignal, DetectorBundle, IndicatorSnapshot, ScoreBundle, SpikeSignal, StrategyScores,
        StreakState,
    };
    use chrono::NaiveDate;

    fn scored(price: f64, volume: f64, overall: i64, spike: u32) -> ScoredSnapshot {
        let mut row = ScoredSnapshot::new(IndicatorSnapshot {
            ticker: "TEST".to_string(),
            hist_date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            price,
            change: price * 0.05,
            volume,
            no_of_long_patterns: 2,
            ..Default::default()
        });
        row.streaks = StreakState {
            up_days: 2,
            up_high: price * 1.01,
            ..Default::default()
        };
        row.scores = Some(ScoreBundle {
            strategies: StrategyScores::default(),
            overall_score: overall,
            overall_reason: String::new(),
            signal: Signal::from_score(overall),
            signal_reason: String::new(),
            signal_days: 1,
        });
        row.detectors = Some(DetectorBundle {
            bottom: BottomSignal {
                conditions_met: 5,
                ..Default::default()
            },
            spike: SpikeSignal {
                spike_score: spike,
                ..Default::default()
            },
            ..Default::default()
        });
        row
    }

    fn rising_history(days: u32) -> Vec<ScoredSnapshot> {
        (0..days)
            .map(|i| {
                let price = 8.0 + i as f64 * 0.4;
                ScoredSnapshot::new(IndicatorSnapshot {
                    ticker: "TEST".to_string(),
                    hist_date: NaiveDate::from_ymd_opt(2025, 6, 10 + i).unwrap(),
                    price,
                    high: price * 1.01,
                    volume: 1_000_000.0 + i as f64 * 400_000.0,
                    ..Default::default()
                })
            })
            .collect()
    }

    #[test]
    fn test_bonus_counts_as_extra_factor() {
        // Six groups pass on their own; the bonus lifts the count to 7.
        let row = scored(10.0, 4_000_000.0, 75, 70);
        let candidate = analyze_with_history(&row, &rising_history(8), &ConvergenceConfig::default());

        assert!(candidate.factors_passed >= 7);
        assert!(candidate
            .passed_factors
            .iter()
            .any(|f| f.starts_with("STRONG CONVERGENCE")));
        assert!(candidate.convergence_score >= 80);
        assert!(candidate.confidence_level >= 4);
    }

    #[test]
    fn test_quiet_ticker_fails_most_factors() {
        let mut row = scored(10.0, 600_000.0, 30, 0);
        row.snapshot.change = -0.2;
        row.snapshot.no_of_long_patterns = 0;
        row.snapshot.no_of_short_patterns = 3;
        row.streaks = StreakState::default();
        row.detectors = None;

        let candidate = analyze_with_history(&row, &[], &ConvergenceConfig::default());
        assert_eq!(candidate.factors_passed, 0);
        assert_eq!(candidate.confidence_level, 2);
        assert!(candidate.failed_factors.len() >= 8);
    }

    #[test]
    fn test_score_capped_at_100() {
        let row = scored(10.0, 5_000_000.0, 90, 95);
        let candidate = analyze_with_history(&row, &rising_history(8), &ConvergenceConfig::default());
        assert!(candidate.convergence_score <= 100);
    }

    #[tokio::test]
    async fn test_persist_is_idempotent_per_day() {
        let snapshots = SnapshotStore::new();
        let picks = PickStore::new();
        let mut row = scored(10.0, 4_000_000.0, 75, 70);
        row.snapshot.hist_date = Utc::now().date_naive();
        snapshots.upsert(row).await.unwrap();

        let scorer = ConvergenceScorer::new(
            Arc::clone(&snapshots),
            Arc::clone(&picks),
            ConvergenceConfig::default(),
        );

        let first = scorer.persist_top(false).await.unwrap();
        assert!(first.persisted);
        assert_eq!(first.picks.len(), 1);
        let first_id = first.picks[0].id;

        let second = scorer.persist_top(false).await.unwrap();
        assert!(!second.persisted);
        assert_eq!(second.picks[0].id, first_id);

        let forced = scorer.persist_top(true).await.unwrap();
        assert!(forced.persisted);
        assert_ne!(forced.picks[0].id, first_id);
        assert_eq!(picks.all().len(), 1);
    }

    #[tokio::test]
    async fn test_short_strict_list_tops_up_from_fallback() {
        let snapshots = SnapshotStore::new();
        let picks = PickStore::new();
        // Two strict qualifiers and one score-only candidate
        // (score 70, 5 factors).
        for ticker in ["AAAA", "BBBB"] {
            let mut row = scored(10.0, 4_000_000.0, 75, 70);
            row.snapshot.ticker = ticker.to_string();
            snapshots.upsert(row).await.unwrap();
        }
        let mut soft = scored(10.0, 2_000_000.0, 65, 50);
        soft.snapshot.ticker = "CCCC".to_string();
        snapshots.upsert(soft).await.unwrap();

        let scorer = ConvergenceScorer::new(
            Arc::clone(&snapshots),
            Arc::clone(&picks),
            ConvergenceConfig::default(),
        );

        let top = scorer.top_candidates(None);
        assert_eq!(top.len(), 3);
        // Strict qualifiers lead; the fallback pool fills the last slot.
        assert!(top[0].factors_passed >= 7);
        assert!(top[1].factors_passed >= 7);
        assert_eq!(top[2].ticker, "CCCC");
        assert!(top[2].convergence_score >= 70);
        assert!(top[2].factors_passed < 7);
    }

    #[tokio::test]
    async fn test_empty_day_persists_nothing() {
        let snapshots = SnapshotStore::new();
        let picks = PickStore::new();
        let mut quiet = scored(10.0, 600_000.0, 30, 0);
        quiet.snapshot.hist_date = Utc::now().date_naive();
        snapshots.upsert(quiet).await.unwrap();

        let scorer = ConvergenceScorer::new(
            Arc::clone(&snapshots),
            Arc::clone(&picks),
            ConvergenceConfig::default(),
        );

        let report = scorer.persist_top(false).await.unwrap();
        assert!(!report.persisted);
        assert!(report.picks.is_empty());
        assert!(picks.all().is_empty());
    }

    #[tokio::test]
    async fn test_universe_filter_excludes_out_of_band() {
        let snapshots = SnapshotStore::new();
        let picks = PickStore::new();
        let mut pricey = scored(120.0, 4_000_000.0, 80, 70);
        pricey.snapshot.ticker = "RICH".to_string();
        pricey.snapshot.hist_date = Utc::now().date_naive();
        snapshots.upsert(pricey).await.unwrap();

        let scorer = ConvergenceScorer::new(
            Arc::clone(&snapshots),
            Arc::clone(&picks),
            ConvergenceConfig::default(),
        );
        assert!(scorer.top_candidates(None).is_empty());
        assert!(scorer.score_universe().is_empty());
    }
}
