//! Capitulation-bottom / reversal detector.

use crate::types::{BottomSignal, BottomStrength, IndicatorSnapshot};

/// Check today against yesterday for signs of a washed-out bottom turning
/// up. Each satisfied condition adds one to `conditions_met`; the count is
/// then banded into a strength. With no prior day available the detector
/// stays neutral.
pub fn detect(snap: &IndicatorSnapshot, prev: Option<&IndicatorSnapshot>) -> BottomSignal {
    let prev = match prev {
        Some(p) => p,
        None => return BottomSignal::default(),
    };

    let mut met: u32 = 0;
    let mut reasons = Vec::new();

    if snap.rsi_14 < 25.0 {
        met += 1;
        reasons.push(format!("Capitulation RSI ({:.1})", snap.rsi_14));
    }

    if snap.ema_20 > 0.0 {
        let dev20 = ((snap.ema_20 - snap.price) / snap.ema_20) * 100.0;
        if dev20 > 10.0 {
            met += 1;
            reasons.push(format!("Price {:.1}% below EMA20", dev20));
        }
    }

    if snap.ema_50 > 0.0 {
        let dev50 = ((snap.ema_50 - snap.price) / snap.ema_50) * 100.0;
        if dev50 > 20.0 {
            met += 1;
            reasons.push(format!("Price {:.1}% below EMA50", dev50));
        }
    }

    if snap.avg_volume_10d > 0.0 {
        let vol_spike = snap.volume / snap.avg_volume_10d;
        if vol_spike >= 2.0 {
            met += 1;
            reasons.push(format!("Volume spike {:.1}x average", vol_spike));
        }
        if vol_spike >= 4.0 {
            met += 1;
            reasons.push("Extreme capitulation volume".to_string());
        }
    }

    if snap.macd_12_26 > 0.0 || snap.macd_12_26 > prev.macd_12_26 {
        met += 1;
        reasons.push("MACD turning up".to_string());
    }

    if snap.low > prev.low {
        met += 1;
        reasons.push("Higher low than yesterday".to_string());
    }

    if snap.price > prev.high {
        met += 1;
        reasons.push("Recovered above yesterday's high".to_string());
    }

    if snap.ema_9 > snap.ema_21 {
        met += 1;
        reasons.push("EMA9 crossed above EMA21".to_string());
    }

    let range = snap.high - snap.low;
    if range > 0.0 {
        let lower_wick = snap.price.min(snap.open) - snap.low;
        if lower_wick / range > 0.40 && snap.price > snap.open {
            met += 1;
            reasons.push("Hammer candle (long lower wick)".to_string());
        }
    }

    if snap.price > prev.price && snap.open < prev.open {
        met += 1;
        reasons.push("Bullish engulfing shape".to_string());
    }

    // Breakout confirmation weighs double with the recovery check above.
    if snap.price > prev.high {
        met += 1;
        reasons.push("Breakout close above prior high".to_string());
    }

    let strength = BottomStrength::from_conditions(met);
    BottomSignal {
        is_bottom: matches!(
            strength,
            BottomStrength::MegaBounce | BottomStrength::StrongReversal
        ),
        conditions_met: met,
        strength,
        reasons,
    }
}
