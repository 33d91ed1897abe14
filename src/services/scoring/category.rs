//! Setup categorizer.
//!
//! Seven ordered rules over the combined pipeline outputs. Every matching
//! rule is recorded; the lowest-numbered match becomes the primary setup.

use crate::types::{
    BottomStrength, DetectorBundle, FilterCategory, IndicatorSnapshot, ScoreBundle, SetupCategory,
    Signal, StreakState,
};

pub fn classify(
    snap: &IndicatorSnapshot,
    prev: Option<&IndicatorSnapshot>,
    streaks: &StreakState,
    scores: &ScoreBundle,
    detectors: &DetectorBundle,
) -> FilterCategory {
    let prev = match prev {
        Some(p) => p,
        None => return FilterCategory::default(),
    };

    let bottom = &detectors.bottom;
    let spike = &detectors.spike;
    let bounce = &detectors.bounce;
    let pop = &detectors.momentum;

    let mut matched = Vec::new();
    let mut criteria = Vec::new();

    // 1. Washed-out bottom already reigniting on heavy accumulation.
    if bottom.is_bottom
        && bottom.strength == BottomStrength::StrongReversal
        && bounce.bounce_score >= 40
        && streaks.down_days >= 3
        && spike.spike_score >= 60
        && spike.spike_likely
        && snap.no_of_long_patterns >= 1
    {
        matched.push(SetupCategory::ExplosiveSpike);
        criteria.push(format!(
            "Strong reversal after {} down days with spike score {}",
            streaks.down_days, spike.spike_score
        ));
    }

    // 2. Deep oversold turning, before any spike shows up.
    if bounce.is_bounce
        && bounce.bounce_score >= 40
        && bottom.is_bottom
        && streaks.down_days >= 4
        && spike.spike_score < 40
        && snap.no_of_long_patterns >= 1
        && scores.signal != Signal::Sell
    {
        matched.push(SetupCategory::OversoldBounce);
        criteria.push(format!(
            "Bounce score {} after {} down days, no spike yet",
            bounce.bounce_score, streaks.down_days
        ));
    }

    // 3. Long slide stabilizing right at the streak low.
    if streaks.down_days >= 5
        && (snap.price - streaks.down_low).abs() <= 0.02 * snap.price
        && bottom.strength == BottomStrength::StrongReversal
        && bounce.bounce_score >= 30
        && snap.no_of_long_patterns >= 1
    {
        matched.push(SetupCategory::DowntrendReversal);
        criteria.push(format!(
            "{} down days holding the low at {:.2}",
            streaks.down_days, streaks.down_low
        ));
    }

    // 4. Orderly uptrend coiled for continuation.
    if pop.is_pop && pop.pop_score >= 60 {
        matched.push(SetupCategory::MomentumPop);
        criteria.push(format!("{} (score {})", pop.pop_type.label(), pop.pop_score));
    }

    // 5. Fresh strength clearing yesterday's high with moderate accumulation.
    if (1..=2).contains(&streaks.up_days)
        && streaks.up_high > prev.high
        && snap.no_of_long_patterns >= 1
        && (20..60).contains(&spike.spike_score)
        && scores.overall_score >= 40
    {
        matched.push(SetupCategory::BreakoutWatch);
        criteria.push(format!(
            "Day {} of new strength above prior high",
            streaks.up_days
        ));
    }

    // 6. Established run still near its highs, technicals agreeing.
    if streaks.up_days >= 3
        && streaks.up_high >= 0.98 * snap.price
        && snap.no_of_long_patterns >= 2
        && spike.spike_score < 40
        && scores.overall_score >= 60
        && matches!(scores.signal, Signal::Buy | Signal::Hold)
    {
        matched.push(SetupCategory::TrendContinuation);
        criteria.push(format!(
            "{} up days, overall {}",
            streaks.up_days, scores.overall_score
        ));
    }

    // 7. Stretched run with the signal already flipped.
    if streaks.up_days >= 4
        && streaks.up_high >= 1.05 * snap.price
        && snap.day_change_pct() > 3.0
        && spike.spike_score < 20
        && scores.signal == Signal::Sell
    {
        matched.push(SetupCategory::OverextendedWarning);
        criteria.push(format!(
            "{} up days extended {:.1}% off the high",
            streaks.up_days,
            snap.day_change_pct()
        ));
    }

    let primary = matched
        .iter()
        .copied()
        .min_by_key(|c| c.priority())
        .unwrap_or(SetupCategory::NoSetup);

    FilterCategory {
        primary,
        matched,
        criteria,
    }
}
