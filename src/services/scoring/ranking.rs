//! Daily ranking: conviction, safety, and position sizing for setups that
//! clear the eligibility gate.

use crate::types::{DailyRank, DetectorBundle, FilterCategory, IndicatorSnapshot, ScoreBundle, SetupCategory};

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Blend the dominant detector with its supporting evidence. Branch order
/// favors momentum over spike over bottom when several fired; the spike and
/// bottom branches lean on the reversal strategy lens for confirmation.
fn final_rank(scores: &ScoreBundle, detectors: &DetectorBundle) -> f64 {
    let reversal = scores.strategies.reversal.score as f64;
    if detectors.momentum.is_pop {
        detectors.momentum.pop_score as f64 * 0.70 + scores.overall_score as f64 * 0.30
    } else if detectors.spike.spike_likely {
        detectors.spike.spike_score as f64 * 0.70 + reversal * 0.30
    } else if detectors.bottom.conditions_met >= 4 {
        detectors.bottom.conditions_met as f64 * 12.0 + reversal * 0.50
    } else {
        0.0
    }
}

/// Downside-protection score, 0..=100.
fn safety_rank(snap: &IndicatorSnapshot, detectors: &DetectorBundle) -> f64 {
    let mut safety = detectors.bottom.conditions_met as f64 * 10.0;
    if snap.volume > snap.avg_volume_10d {
        safety += 10.0;
    }
    if (45.0..=60.0).contains(&snap.rsi_14) {
        safety += 10.0;
    }
    if snap.no_of_short_patterns == 0 {
        safety += 10.0;
    }
    safety.min(100.0)
}

/// Suggested allocation, percent of capital, clamped to 3..=35.
fn allocation_pct(snap: &IndicatorSnapshot, final_rank: f64, safety: f64) -> f64 {
    if snap.price == 0.0 {
        return 5.0;
    }

    let volatility = (snap.atr_14 / snap.price) * 100.0;
    let base = if volatility < 3.0 {
        30.0
    } else if volatility < 6.0 {
        20.0
    } else {
        10.0
    };

    let mut alloc = base + (safety - 50.0) / 20.0;
    alloc += if final_rank >= 80.0 {
        5.0
    } else if final_rank >= 60.0 {
        3.0
    } else if final_rank >= 40.0 {
        1.0
    } else {
        -5.0
    };

    // Small caps sized conservatively regardless of conviction.
    if snap.price < 20.0 {
        alloc = alloc.min(12.0);
    }

    alloc.clamp(3.0, 35.0)
}

/// Rank an already-categorized ticker-day. Returns `None` when the setup
/// does not clear the eligibility gate (a real primary setup plus at least
/// one detector firing).
pub fn rank(
    snap: &IndicatorSnapshot,
    scores: &ScoreBundle,
    detectors: &DetectorBundle,
    category: &FilterCategory,
) -> Option<DailyRank> {
    let eligible = category.primary != SetupCategory::NoSetup
        && (detectors.momentum.is_pop
            || detectors.spike.spike_likely
            || detectors.bottom.is_bottom);
    if !eligible {
        return None;
    }

    let final_rank = final_rank(scores, detectors);
    let safety = safety_rank(snap, detectors);
    let alloc = allocation_pct(snap, final_rank, safety);
    let pick_score = round2(0.60 * final_rank + 0.25 * safety + 0.15 * alloc);

    Some(DailyRank {
        final_rank: round2(final_rank),
        safety_rank: safety,
        allocation_pct: alloc,
        pick_score,
    })
}
