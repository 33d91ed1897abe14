//! Per-ticker, per-day snapshot records.

use crate::types::{DailyRank, DetectorBundle, FilterCategory, ScoreBundle};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// External analyst ratings attached to a snapshot by upstream ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalystRating {
    /// Long-term rating text (e.g. "Strong Buy", "Hold").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_term: Option<String>,
    /// Short-term rating text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_term: Option<String>,
}

impl AnalystRating {
    /// True when the long-term rating reads as a buy.
    pub fn is_long_buy(&self) -> bool {
        self.long_term
            .as_deref()
            .map(|r| r.to_lowercase().contains("buy"))
            .unwrap_or(false)
    }
}

/// One ticker's indicator/price record for a single trading day.
///
/// Created by upstream ingestion and read-only to the scoring pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndicatorSnapshot {
    pub ticker: String,
    pub hist_date: NaiveDate,

    /// Closing price.
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    /// Absolute day change (close - previous close).
    pub change: f64,
    pub prev_close: f64,

    pub volume: f64,
    /// Trailing 10-day average volume.
    pub avg_volume_10d: f64,
    pub vwap: f64,
    pub momentum: f64,

    pub macd_12_26: f64,
    pub rsi_14: f64,
    pub atr_14: f64,

    pub sma_9: f64,
    pub sma_20: f64,
    pub sma_21: f64,
    pub sma_50: f64,
    pub sma_100: f64,
    pub sma_200: f64,

    pub ema_9: f64,
    pub ema_20: f64,
    pub ema_21: f64,
    pub ema_50: f64,
    pub ema_100: f64,
    pub ema_200: f64,

    /// Intraday bullish chart-pattern count (supplied upstream).
    pub no_of_long_patterns: u32,
    /// Intraday bearish chart-pattern count (supplied upstream).
    pub no_of_short_patterns: u32,

    pub rating: AnalystRating,
}

impl IndicatorSnapshot {
    /// Day change as a percentage of today's price.
    pub fn change_pct(&self) -> f64 {
        if self.price > 0.0 {
            (self.change / self.price) * 100.0
        } else {
            0.0
        }
    }

    /// Day change as a percentage of the previous close.
    pub fn day_change_pct(&self) -> f64 {
        if self.prev_close > 0.0 {
            ((self.price - self.prev_close) / self.prev_close) * 100.0
        } else {
            0.0
        }
    }

    /// Volume surge over the 10-day average, as a percentage.
    pub fn volume_surge_pct(&self) -> f64 {
        if self.avg_volume_10d > 0.0 {
            ((self.volume - self.avg_volume_10d) / self.avg_volume_10d) * 100.0
        } else {
            0.0
        }
    }
}

/// Consecutive same-direction day counts and their price extremes.
///
/// Recomputed daily from trailing history; all-zero when no streak is active
/// or no history exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub up_days: u32,
    pub down_days: u32,
    /// Max high during the current up-streak (0 when not in an up-streak).
    pub up_high: f64,
    /// Min low during the current down-streak (0 when not in a down-streak).
    pub down_low: f64,
}

/// A snapshot together with everything the pipeline computed for it.
///
/// This is the persisted per-ticker, per-day record. History rows that
/// predate scoring carry `None` for the computed parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSnapshot {
    pub snapshot: IndicatorSnapshot,
    #[serde(default)]
    pub streaks: StreakState,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scores: Option<ScoreBundle>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detectors: Option<DetectorBundle>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<FilterCategory>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rank: Option<DailyRank>,
}

impl ScoredSnapshot {
    /// Wrap a raw snapshot with no computed results yet.
    pub fn new(snapshot: IndicatorSnapshot) -> Self {
        Self {
            snapshot,
            streaks: StreakState::default(),
            scores: None,
            detectors: None,
            category: None,
            rank: None,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.snapshot.ticker
    }

    pub fn date(&self) -> NaiveDate {
        self.snapshot.hist_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_pct_guards_zero_price() {
        let snap = IndicatorSnapshot::default();
        assert_eq!(snap.change_pct(), 0.0);
        assert_eq!(snap.day_change_pct(), 0.0);
        assert_eq!(snap.volume_surge_pct(), 0.0);
    }

    #[test]
    fn test_change_pct() {
        let snap = IndicatorSnapshot {
            price: 10.0,
            change: 0.5,
            prev_close: 9.5,
            ..Default::default()
        };
        assert!((snap.change_pct() - 5.0).abs() < 1e-9);
        assert!((snap.day_change_pct() - 5.263157894736842).abs() < 1e-9);
    }

    #[test]
    fn test_analyst_rating_long_buy() {
        let rating = AnalystRating {
            long_term: Some("Strong Buy".to_string()),
            short_term: None,
        };
        assert!(rating.is_long_buy());

        let rating = AnalystRating {
            long_term: Some("Hold".to_string()),
            short_term: None,
        };
        assert!(!rating.is_long_buy());
        assert!(!AnalystRating::default().is_long_buy());
    }

    #[test]
    fn test_scored_snapshot_roundtrip() {
        let snap = IndicatorSnapshot {
            ticker: "ABCD".to_string(),
            price: 12.34,
            ..Default::default()
        };
        let scored = ScoredSnapshot::new(snap);
        let json = serde_json::to_string(&scored).unwrap();
        let back: ScoredSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ticker(), "ABCD");
        assert!(back.scores.is_none());
    }
}
