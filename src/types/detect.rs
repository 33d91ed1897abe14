//! Pattern detector outputs, setup categories, and daily ranking types.

use serde::{Deserialize, Serialize};

/// Strength band for the bottom/reversal detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BottomStrength {
    #[serde(rename = "Mega Bounce")]
    MegaBounce,
    #[serde(rename = "Strong Reversal")]
    StrongReversal,
    #[serde(rename = "Weak Signal")]
    WeakSignal,
    #[default]
    None,
}

impl BottomStrength {
    /// Band conditions-met counts: >= 8 mega, >= 5 strong, >= 3 weak.
    pub fn from_conditions(met: u32) -> Self {
        if met >= 8 {
            BottomStrength::MegaBounce
        } else if met >= 5 {
            BottomStrength::StrongReversal
        } else if met >= 3 {
            BottomStrength::WeakSignal
        } else {
            BottomStrength::None
        }
    }
}

/// Bottom/capitulation-reversal detector output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BottomSignal {
    pub is_bottom: bool,
    /// Count of satisfied reversal conditions.
    pub conditions_met: u32,
    pub strength: BottomStrength,
    pub reasons: Vec<String>,
}

/// Urgency band for the pre-spike detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpikeType {
    Explosive,
    High,
    Medium,
    #[default]
    Low,
}

impl SpikeType {
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            SpikeType::Explosive
        } else if score >= 60 {
            SpikeType::High
        } else if score >= 40 {
            SpikeType::Medium
        } else {
            SpikeType::Low
        }
    }
}

/// Pre-spike accumulation detector output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpikeSignal {
    /// 0..=100.
    pub spike_score: u32,
    pub spike_likely: bool,
    pub spike_type: SpikeType,
    pub reasons: Vec<String>,
}

/// Depth band for the oversold-bounce detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BounceType {
    #[serde(rename = "Explosive Bounce")]
    ExplosiveBounce,
    #[serde(rename = "Deep Oversold")]
    DeepOversold,
    Oversold,
    #[default]
    None,
}

impl BounceType {
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            BounceType::ExplosiveBounce
        } else if score >= 60 {
            BounceType::DeepOversold
        } else if score >= 40 {
            BounceType::Oversold
        } else {
            BounceType::None
        }
    }
}

/// Oversold-bounce detector output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OversoldBounceSignal {
    /// 0..=130 before banding (additive RSI tiers can exceed 100).
    pub bounce_score: u32,
    pub is_bounce: bool,
    pub bounce_type: BounceType,
    pub reasons: Vec<String>,
}

/// Shape label for the momentum-pop detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopType {
    #[serde(rename = "Squeeze Breakout")]
    SqueezeBreakout,
    #[serde(rename = "Trend Continuation")]
    TrendContinuation,
    #[serde(rename = "Momentum Pop")]
    MomentumPop,
    #[default]
    None,
}

impl PopType {
    pub fn label(&self) -> &'static str {
        match self {
            PopType::SqueezeBreakout => "Squeeze Breakout",
            PopType::TrendContinuation => "Trend Continuation",
            PopType::MomentumPop => "Momentum Pop",
            PopType::None => "None",
        }
    }
}

/// Momentum-pop detector output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumPopSignal {
    /// 0..=100.
    pub pop_score: u32,
    pub is_pop: bool,
    pub pop_type: PopType,
    pub reasons: Vec<String>,
}

/// All four detector outputs for one ticker-day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorBundle {
    pub bottom: BottomSignal,
    pub spike: SpikeSignal,
    pub bounce: OversoldBounceSignal,
    pub momentum: MomentumPopSignal,
}

/// The tradeable setup archetypes, in precedence order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupCategory {
    #[serde(rename = "Explosive Spike")]
    ExplosiveSpike,
    #[serde(rename = "Oversold Bounce")]
    OversoldBounce,
    #[serde(rename = "Downtrend Reversal")]
    DowntrendReversal,
    #[serde(rename = "Momentum Pop")]
    MomentumPop,
    #[serde(rename = "Breakout Watch")]
    BreakoutWatch,
    #[serde(rename = "Trend Continuation")]
    TrendContinuation,
    #[serde(rename = "Overextended Warning")]
    OverextendedWarning,
    #[default]
    #[serde(rename = "NO-SETUP")]
    NoSetup,
}

impl SetupCategory {
    /// Rule number; lower wins when several rules match.
    pub fn priority(&self) -> u8 {
        match self {
            SetupCategory::ExplosiveSpike => 1,
            SetupCategory::OversoldBounce => 2,
            SetupCategory::DowntrendReversal => 3,
            SetupCategory::MomentumPop => 4,
            SetupCategory::BreakoutWatch => 5,
            SetupCategory::TrendContinuation => 6,
            SetupCategory::OverextendedWarning => 7,
            SetupCategory::NoSetup => u8::MAX,
        }
    }
}

/// Categorizer output: all matched setups plus the highest-precedence one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCategory {
    pub primary: SetupCategory,
    pub matched: Vec<SetupCategory>,
    /// One human-readable criteria line per matched setup.
    pub criteria: Vec<String>,
}

/// Daily ranking output for setups that clear the eligibility gate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRank {
    /// Blended conviction score.
    pub final_rank: f64,
    /// 0..=100 downside-protection score.
    pub safety_rank: f64,
    /// Suggested position size, percent of capital, clamped to 3..=35.
    pub allocation_pct: f64,
    /// 0.60 final + 0.25 safety + 0.15 allocation, rounded to 2 decimals.
    pub pick_score: f64,
}
