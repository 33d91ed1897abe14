//! Momentum-pop detector.
//!
//! Finds orderly uptrends coiling for continuation: stacked moving
//! averages, controlled range, healthy (not euphoric) volume and RSI.

use crate::types::{IndicatorSnapshot, MomentumPopSignal, PopType, SpikeSignal};

pub fn detect(
    snap: &IndicatorSnapshot,
    prev: Option<&IndicatorSnapshot>,
    spike: &SpikeSignal,
) -> MomentumPopSignal {
    if prev.is_none() {
        return MomentumPopSignal::default();
    }

    let mut score: u32 = 0;
    let mut reasons = Vec::new();

    if snap.price > snap.ema_9 && snap.ema_9 > snap.ema_21 && snap.ema_21 > snap.ema_50 {
        score += 20;
        reasons.push("Full EMA stack (price > 9 > 21 > 50)".to_string());
    }

    if snap.price > snap.sma_20 && snap.sma_20 > snap.sma_50 {
        score += 15;
        reasons.push("Above rising SMAs".to_string());
    }

    if snap.price > snap.ema_21 {
        score += 10;
        reasons.push("Holding EMA21".to_string());
    }

    let range_pct = if snap.price > 0.0 {
        ((snap.high - snap.low) / snap.price) * 100.0
    } else {
        0.0
    };
    if snap.price > 0.0 && range_pct < 3.0 {
        score += 10;
        reasons.push(format!("Controlled range ({:.1}%)", range_pct));
    }

    if snap.ema_20 > 0.0 && ((snap.ema_20 - snap.ema_50).abs() / snap.ema_20) < 0.02 {
        score += 10;
        reasons.push("EMA20/EMA50 squeeze".to_string());
    }

    if snap.avg_volume_10d > 0.0 {
        let vol_ratio = snap.volume / snap.avg_volume_10d;
        if vol_ratio > 1.2 && vol_ratio < 3.0 {
            score += 10;
            reasons.push("Building volume".to_string());
        }
    }

    if (30..=60).contains(&spike.spike_score) {
        score += 15;
        reasons.push("Moderate accumulation".to_string());
    }

    if snap.no_of_long_patterns >= 1 {
        score += 10;
        reasons.push("Bullish chart pattern present".to_string());
    }

    if (50.0..=65.0).contains(&snap.rsi_14) {
        score += 10;
        reasons.push("RSI in the power zone".to_string());
    }

    let score = score.min(100);
    let is_pop = score >= 60;
    let pop_type = if !is_pop {
        PopType::None
    } else if snap.price > 0.0 && range_pct < 2.0 {
        PopType::SqueezeBreakout
    } else if snap.price > snap.sma_20 {
        PopType::TrendContinuation
    } else {
        PopType::MomentumPop
    };

    MomentumPopSignal {
        pop_score: score,
        is_pop,
        pop_type,
        reasons,
    }
}
