//! Per-ticker scoring chain.
//!
//! Stages run in a fixed order, each taking the prior outputs it needs as
//! explicit arguments: streaks, the five strategy lenses, aggregation, the
//! four detectors, the categorizer, then the ranker. The chain is pure; the
//! pipeline owns all store access.

pub mod aggregate;
pub mod bottom;
pub mod bounce;
pub mod category;
pub mod momentum;
pub mod ranking;
pub mod spike;
pub mod streaks;
pub mod strategies;

use crate::types::{DetectorBundle, IndicatorSnapshot, ScoreBundle, ScoredSnapshot};

/// Score one ticker-day. `prev` is the prior trading day's snapshot (the
/// detectors stay neutral without it) and `history` is the trailing window
/// of stored days for this ticker, ascending by date.
pub fn score_ticker(
    snapshot: IndicatorSnapshot,
    prev: Option<&IndicatorSnapshot>,
    history: &[ScoredSnapshot],
) -> ScoredSnapshot {
    let streak_state = streaks::compute(&snapshot, history);

    let strategy_scores = strategies::score_all(&snapshot);
    let (overall_score, overall_reason) = aggregate::overall(&strategy_scores);
    let (signal, signal_reason) = aggregate::signal(overall_score);

    // The run length scan starts from the last trading day before today.
    let boundary = aggregate::prev_trading_day(snapshot.hist_date);
    let prior_desc: Vec<&ScoredSnapshot> = history
        .iter()
        .rev()
        .filter(|row| row.date() <= boundary)
        .collect();
    let signal_days = aggregate::signal_days(signal, &prior_desc);

    let scores = ScoreBundle {
        strategies: strategy_scores,
        overall_score,
        overall_reason,
        signal,
        signal_reason,
        signal_days,
    };

    let bottom = bottom::detect(&snapshot, prev);
    let spike = spike::detect(&snapshot, prev);
    let bounce = bounce::detect(&snapshot, prev, &bottom, &spike);
    let momentum = momentum::detect(&snapshot, prev, &spike);
    let detectors = DetectorBundle {
        bottom,
        spike,
        bounce,
        momentum,
    };

    let category = category::classify(&snapshot, prev, &streak_state, &scores, &detectors);
    let rank = ranking::rank(&snapshot, &scores, &detectors, &category);

    ScoredSnapshot {
        snapshot,
        streaks: streak_state,
        scores: Some(scores),
        detectors: Some(detectors),
        category: Some(category),
        rank,
    }
}
