//! Overall score, trade signal, and signal-run length.

use crate::types::{ScoredSnapshot, Signal, StrategyScores};
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Average the five lens scores, capping each at 100 first.
pub fn overall(strategies: &StrategyScores) -> (i64, String) {
    let parts = [
        strategies.day_trading.score,
        strategies.swing_trading.score,
        strategies.reversal.score,
        strategies.breakout.score,
        strategies.chart_pattern.score,
    ];
    let sum: i64 = parts.iter().map(|s| (*s).min(100)).sum();
    let score = (sum as f64 / parts.len() as f64) as i64;

    let reason = format!(
        "Day {}, Swing {}, Reversal {}, Breakout {}, Patterns {}",
        parts[0], parts[1], parts[2], parts[3], parts[4]
    );
    (score, reason)
}

/// Band the overall score into a trade signal with an explanation.
pub fn signal(overall: i64) -> (Signal, String) {
    let signal = Signal::from_score(overall);
    let reason = match signal {
        Signal::Buy => format!("Strong technical alignment; overall score high ({})", overall),
        Signal::Sell => format!("Weak technicals; overall score low ({})", overall),
        Signal::Hold => format!("Mixed signals; overall score neutral ({})", overall),
    };
    (signal, reason)
}

/// Last trading day before `today` (weekends skipped).
pub fn prev_trading_day(today: NaiveDate) -> NaiveDate {
    let mut day = today - Days::new(1);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day = day - Days::new(1);
    }
    day
}

/// Count how many consecutive trading days (today included) have carried
/// `signal`. `history_desc` is prior scored days, most recent first, already
/// bounded to the scan window. The run stops at the first day with a
/// different signal or with no scoring at all.
pub fn signal_days(signal: Signal, history_desc: &[&ScoredSnapshot]) -> u32 {
    let mut days = 1;
    for row in history_desc {
        match &row.scores {
            Some(bundle) if bundle.signal == signal => days += 1,
            _ => break,
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IndicatorSnapshot, ScoreBundle};

    fn strategies(scores: [i64; 5]) -> StrategyScores {
        let mk = |s: i64| crate::types::StrategyScore::new(s, String::new());
        StrategyScores {
            day_trading: mk(scores[0]),
            swing_trading: mk(scores[1]),
            reversal: mk(scores[2]),
            breakout: mk(scores[3]),
            chart_pattern: mk(scores[4]),
        }
    }

    fn scored_with_signal(d: u32, sig: Signal) -> ScoredSnapshot {
        let mut row = ScoredSnapshot::new(IndicatorSnapshot {
            hist_date: NaiveDate::from_ymd_opt(2025, 6, d).unwrap(),
            ..Default::default()
        });
        row.scores = Some(ScoreBundle {
            strategies: StrategyScores::default(),
            overall_score: 65,
            overall_reason: String::new(),
            signal: sig,
            signal_reason: String::new(),
            signal_days: 1,
        });
        row
    }

    #[test]
    fn test_overall_is_truncated_mean() {
        let (score, _) = overall(&strategies([10, 20, 30, 40, 50]));
        assert_eq!(score, 30);
        let (score, _) = overall(&strategies([1, 1, 1, 0, 0]));
        assert_eq!(score, 0);
    }

    #[test]
    fn test_overall_caps_each_lens_at_100() {
        let (score, _) = overall(&strategies([250, 0, 0, 0, 0]));
        assert_eq!(score, 20);
    }

    #[test]
    fn test_overall_stays_in_band() {
        let (score, _) = overall(&strategies([300, 300, 300, 300, 300]));
        assert_eq!(score, 100);
    }

    #[test]
    fn test_signal_reasons() {
        assert_eq!(signal(60).0, Signal::Buy);
        assert_eq!(signal(59).0, Signal::Hold);
        assert_eq!(signal(41).0, Signal::Hold);
        assert_eq!(signal(40).0, Signal::Sell);
        assert!(signal(72).1.contains("72"));
    }

    #[test]
    fn test_prev_trading_day_skips_weekend() {
        // 2025-06-09 is a Monday.
        let monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        assert_eq!(
            prev_trading_day(monday),
            NaiveDate::from_ymd_opt(2025, 6, 6).unwrap()
        );
        let wednesday = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        assert_eq!(
            prev_trading_day(wednesday),
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
        );
    }

    #[test]
    fn test_signal_days_defaults_to_one() {
        assert_eq!(signal_days(Signal::Buy, &[]), 1);
    }

    #[test]
    fn test_signal_days_counts_matching_run() {
        let rows = vec![
            scored_with_signal(11, Signal::Buy),
            scored_with_signal(10, Signal::Buy),
            scored_with_signal(9, Signal::Hold),
            scored_with_signal(6, Signal::Buy),
        ];
        let refs: Vec<&ScoredSnapshot> = rows.iter().collect();
        assert_eq!(signal_days(Signal::Buy, &refs), 3);
    }

    #[test]
    fn test_signal_days_stops_at_unscored_row() {
        let unscored = ScoredSnapshot::new(IndicatorSnapshot::default());
        let scored = scored_with_signal(10, Signal::Buy);
        let rows = vec![&unscored, &scored];
        assert_eq!(signal_days(Signal::Buy, &rows), 1);
    }
}
