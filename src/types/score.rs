//! Strategy scoring and trade-signal types.

use serde::{Deserialize, Serialize};

/// Trade signal derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Hold,
    Sell,
}

impl Signal {
    /// Band the overall score: >= 60 buy, <= 40 sell, hold between.
    pub fn from_score(overall: i64) -> Self {
        if overall >= 60 {
            Signal::Buy
        } else if overall <= 40 {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Hold => "HOLD",
            Signal::Sell => "SELL",
        }
    }
}

/// One strategy lens's score and its explanation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyScore {
    pub score: i64,
    pub reason: String,
}

impl StrategyScore {
    pub fn new(score: i64, reason: String) -> Self {
        Self { score, reason }
    }
}

/// The five per-strategy scores for one ticker-day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyScores {
    pub day_trading: StrategyScore,
    pub swing_trading: StrategyScore,
    pub reversal: StrategyScore,
    pub breakout: StrategyScore,
    pub chart_pattern: StrategyScore,
}

/// Aggregated scoring output for one ticker-day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBundle {
    pub strategies: StrategyScores,
    /// Mean of the five strategy scores, each capped at 100 first.
    pub overall_score: i64,
    pub overall_reason: String,
    pub signal: Signal,
    pub signal_reason: String,
    /// Consecutive trading days (including today) with this same signal.
    pub signal_days: u32,
}
