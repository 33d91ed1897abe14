//! The five strategy-lens scorers.
//!
//! Each lens accumulates points for the conditions it cares about and keeps
//! a short explanation per satisfied condition. Points accumulate in floating
//! point and truncate once at the end. Scores are uncapped here; the
//! aggregator caps each at 100 before averaging.

use crate::types::{IndicatorSnapshot, StrategyScore, StrategyScores};

fn finish(score: f64, reasons: Vec<String>, fallback: &str) -> StrategyScore {
    let reason = if reasons.is_empty() {
        fallback.to_string()
    } else {
        reasons.join("; ")
    };
    StrategyScore::new(score as i64, reason)
}

/// Intraday lens: momentum, volume surge, VWAP position, MACD.
pub fn day_trading(snap: &IndicatorSnapshot) -> StrategyScore {
    let mut score: f64 = 0.0;
    let mut reasons = Vec::new();

    if snap.momentum > 0.0 {
        score += snap.momentum * 2.0;
        reasons.push(format!("Positive momentum ({:.2})", snap.momentum));
    }

    let surge = snap.volume_surge_pct();
    if surge > 0.0 {
        score += surge.min(50.0);
        reasons.push(format!("Volume {:.0}% above 10-day average", surge));
    }

    if snap.price > snap.vwap {
        score += 10.0;
        reasons.push("Trading above VWAP".to_string());
    }

    if snap.macd_12_26 > 0.0 {
        score += snap.macd_12_26 * 3.0;
        reasons.push(format!("MACD positive ({:.2})", snap.macd_12_26));
    }

    finish(score, reasons, "No strong intraday signals")
}

/// Multi-day lens: EMA stack, MACD, analyst rating.
pub fn swing_trading(snap: &IndicatorSnapshot) -> StrategyScore {
    let mut score: f64 = 0.0;
    let mut reasons = Vec::new();

    if snap.ema_9 > snap.ema_21 && snap.ema_21 > snap.ema_50 {
        score += 25.0;
        reasons.push("Bullish EMA alignment (9 > 21 > 50)".to_string());
    }

    if snap.macd_12_26 > 0.0 {
        score += snap.macd_12_26 * 5.0;
        reasons.push(format!("MACD positive ({:.2})", snap.macd_12_26));
    }

    if snap.rating.is_long_buy() {
        score += 20.0;
        reasons.push("Analyst long-term buy rating".to_string());
    }

    finish(score, reasons, "No swing setup")
}

/// Mean-reversion lens: oversold RSI, MACD turn, EMA9 reclaim.
pub fn reversal(snap: &IndicatorSnapshot) -> StrategyScore {
    let mut score: f64 = 0.0;
    let mut reasons = Vec::new();

    if snap.rsi_14 < 35.0 {
        score += 20.0;
        reasons.push(format!("RSI oversold ({:.1})", snap.rsi_14));
    }

    if snap.macd_12_26 > 0.0 {
        score += snap.macd_12_26 * 5.0;
        reasons.push(format!("MACD positive ({:.2})", snap.macd_12_26));
    }

    if snap.price > snap.ema_9 {
        score += 10.0;
        reasons.push("Price reclaimed EMA9".to_string());
    }

    finish(score, reasons, "No reversal setup")
}

/// Breakout lens: EMA50 position, volume surge, MACD.
pub fn breakout(snap: &IndicatorSnapshot) -> StrategyScore {
    let mut score: f64 = 0.0;
    let mut reasons = Vec::new();

    if snap.price > snap.ema_50 {
        score += 20.0;
        reasons.push("Price above EMA50".to_string());
    }

    let surge = snap.volume_surge_pct();
    if surge > 0.0 {
        score += surge.min(50.0);
        reasons.push(format!("Volume {:.0}% above 10-day average", surge));
    }

    if snap.macd_12_26 > 0.0 {
        score += snap.macd_12_26 * 5.0;
        reasons.push(format!("MACD positive ({:.2})", snap.macd_12_26));
    }

    finish(score, reasons, "No breakout setup")
}

/// Chart-pattern lens built from the intraday pattern counts.
pub fn chart_pattern(snap: &IndicatorSnapshot) -> StrategyScore {
    let mut score: f64 = 0.0;
    let mut reasons = Vec::new();

    if snap.no_of_long_patterns >= 1 {
        score += (snap.no_of_long_patterns as f64 * 20.0).min(60.0);
        reasons.push(format!(
            "{} bullish pattern(s) detected",
            snap.no_of_long_patterns
        ));
    }

    if snap.no_of_short_patterns == 0 {
        score += 20.0;
        reasons.push("No bearish patterns".to_string());
    }

    if snap.no_of_long_patterns > snap.no_of_short_patterns {
        score += 20.0;
        reasons.push("Bullish patterns outnumber bearish".to_string());
    }

    finish(score, reasons, "No pattern edge")
}

/// Run all five lenses against one snapshot.
pub fn score_all(snap: &IndicatorSnapshot) -> StrategyScores {
    StrategyScores {
        day_trading: day_trading(snap),
        swing_trading: swing_trading(snap),
        reversal: reversal(snap),
        breakout: breakout(snap),
        chart_pattern: chart_pattern(snap),
    }
}
