//! Consecutive up/down day streak scan.

use crate::types::{IndicatorSnapshot, ScoredSnapshot, StreakState};

/// Compute the current streak for `snapshot` from trailing `history`
/// (ascending by date). Today's row is appended unless history already
/// ends on today's date. No history at all yields the zero state.
pub fn compute(snapshot: &IndicatorSnapshot, history: &[ScoredSnapshot]) -> StreakState {
    if history.is_empty() {
        return StreakState::default();
    }

    let mut days: Vec<&IndicatorSnapshot> = history.iter().map(|s| &s.snapshot).collect();
    match days.last() {
        Some(last) if last.hist_date == snapshot.hist_date => {}
        _ => days.push(snapshot),
    }

    let mut state = StreakState::default();
    let mut direction: Option<bool> = None; // Some(true) = up-streak

    for day in days.iter().rev() {
        if day.change > 0.0 {
            match direction {
                None => {
                    direction = Some(true);
                    state.up_days = 1;
                    state.up_high = day.high;
                }
                Some(true) => {
                    state.up_days += 1;
                    if day.high > state.up_high {
                        state.up_high = day.high;
                    }
                }
                Some(false) => break,
            }
        } else if day.change < 0.0 {
            match direction {
                None => {
                    direction = Some(false);
                    state.down_days = 1;
                    state.down_low = day.low;
                }
                Some(false) => {
                    state.down_days += 1;
                    if day.low < state.down_low {
                        state.down_low = day.low;
                    }
                }
                Some(true) => break,
            }
        } else {
            // Flat day ends any streak.
            break;
        }
    }

    state
}
