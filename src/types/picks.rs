//! Convergence candidates, persisted picks, and pipeline/tracking reports.

use crate::types::Signal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of a pick after its tracking window closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickOutcome {
    #[default]
    Pending,
    Success,
    Partial,
    Fail,
}

impl PickOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PickOutcome::Pending => "PENDING",
            PickOutcome::Success => "SUCCESS",
            PickOutcome::Partial => "PARTIAL",
            PickOutcome::Fail => "FAIL",
        }
    }
}

/// Ten-factor convergence analysis for one ticker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvergenceCandidate {
    pub ticker: String,
    pub price: f64,
    pub change: f64,
    pub volume: f64,
    pub up_days: u32,
    pub no_of_long_patterns: u32,
    pub no_of_short_patterns: u32,
    pub spike_score: u32,
    pub overall_score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<Signal>,
    /// Factor groups passed, 0..=10 (the strong-convergence bonus counts).
    pub factors_passed: u32,
    /// Total points, capped at 100.
    pub convergence_score: u32,
    pub passed_factors: Vec<String>,
    pub failed_factors: Vec<String>,
    /// 1..=5 conviction stars.
    pub confidence_level: u8,
    pub confidence_text: String,
}

impl ConvergenceCandidate {
    /// Map passed-factor count to a conviction band.
    pub fn confidence_for(factors_passed: u32) -> (u8, &'static str) {
        if factors_passed >= 9 {
            (5, "EXTREMELY HIGH - Near Guaranteed")
        } else if factors_passed >= 8 {
            (5, "VERY HIGH - High Probability")
        } else if factors_passed >= 7 {
            (4, "HIGH - Strong Conviction")
        } else if factors_passed >= 6 {
            (4, "GOOD - Likely to Move")
        } else if factors_passed >= 5 {
            (3, "MODERATE - Watch Closely")
        } else {
            (2, "LOW - Speculative")
        }
    }
}

/// A persisted daily pick plus its tracked outcome fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuaranteedPick {
    pub id: Uuid,
    /// Trading day the pick was made.
    pub pick_date: NaiveDate,
    pub ticker: String,
    /// 1-based position within the day's picks.
    pub rank: u32,
    pub entry_price: f64,
    pub factors_passed: u32,
    pub convergence_score: u32,
    pub confidence_level: u8,
    pub confidence_text: String,
    pub passed_factors: Vec<String>,
    pub failed_factors: Vec<String>,
    /// First day the pick becomes due for outcome verification.
    pub tracking_date: NaiveDate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price_reached: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_gain_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_gain_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_threshold: Option<bool>,
    /// 1-based day index when the success threshold was first hit, -1 if never.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_move: Option<i32>,
    pub outcome: PickOutcome,
    pub tracked: bool,
}

impl GuaranteedPick {
    pub fn new(
        pick_date: NaiveDate,
        candidate: &ConvergenceCandidate,
        rank: u32,
        tracking_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pick_date,
            ticker: candidate.ticker.clone(),
            rank,
            entry_price: candidate.price,
            factors_passed: candidate.factors_passed,
            convergence_score: candidate.convergence_score,
            confidence_level: candidate.confidence_level,
            confidence_text: candidate.confidence_text.clone(),
            passed_factors: candidate.passed_factors.clone(),
            failed_factors: candidate.failed_factors.clone(),
            tracking_date,
            max_price_reached: None,
            max_gain_pct: None,
            final_price: None,
            final_gain_pct: None,
            moved_threshold: None,
            days_to_move: None,
            outcome: PickOutcome::Pending,
            tracked: false,
        }
    }
}

/// One ticker's failure inside a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerError {
    pub ticker: String,
    pub message: String,
}

/// Result of a full scoring run: every ticker is either scored or reported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub processed: usize,
    pub errors: Vec<TickerError>,
}

/// Counts from one outcome-tracking sweep.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeCounts {
    pub success: usize,
    pub partial: usize,
    pub fail: usize,
    /// Picks due but missing from the current snapshot set.
    pub skipped: usize,
}

/// Aggregate pick performance across all tracked picks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub total_picks: usize,
    pub tracked_picks: usize,
    pub success_count: usize,
    pub partial_count: usize,
    pub fail_count: usize,
    pub success_rate_pct: f64,
    pub partial_or_better_rate_pct: f64,
    pub avg_max_gain_pct: f64,
    pub avg_final_gain_pct: f64,
    /// Mean days-to-threshold across successful picks only.
    pub avg_days_to_move: f64,
}
