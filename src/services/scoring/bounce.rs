//! Oversold-bounce detector.
//!
//! Runs after the bottom and spike detectors and reads their output: a deep
//! discount to EMA50 plus confirmed bottoming conditions is the core of the
//! setup.

use crate::types::{BottomSignal, BounceType, IndicatorSnapshot, OversoldBounceSignal, SpikeSignal};

pub fn detect(
    snap: &IndicatorSnapshot,
    prev: Option<&IndicatorSnapshot>,
    bottom: &BottomSignal,
    spike: &SpikeSignal,
) -> OversoldBounceSignal {
    if prev.is_none() {
        return OversoldBounceSignal::default();
    }

    let mut score: u32 = 0;
    let mut reasons = Vec::new();

    if snap.ema_50 > 0.0 {
        let gap = ((snap.ema_50 - snap.price) / snap.ema_50) * 100.0;
        if (20.0..=60.0).contains(&gap) {
            score += 30;
            reasons.push(format!("Price {:.1}% below EMA50", gap));
        }
    }

    if snap.rsi_14 < 30.0 {
        score += 20;
        reasons.push(format!("RSI oversold ({:.1})", snap.rsi_14));
    }
    if snap.rsi_14 < 25.0 {
        score += 30;
        reasons.push("RSI deeply oversold".to_string());
    }

    if bottom.conditions_met >= 5 {
        score += 30;
        reasons.push(format!(
            "Bottom confirmation ({} conditions)",
            bottom.conditions_met
        ));
    }

    if spike.spike_score >= 20 {
        score += 10;
        reasons.push("Early accumulation signs".to_string());
    }

    let bounce_type = BounceType::from_score(score);
    OversoldBounceSignal {
        bounce_score: score,
        is_bounce: score >= 60,
        bounce_type,
        reasons,
    }
}
