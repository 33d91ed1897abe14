//! Pre-spike accumulation detector.
//!
//! Looks for quiet accumulation: rising volume into a compressed range with
//! improving momentum. High scores mean conditions favor an imminent sharp
//! move, not that one has already happened.

use crate::types::{IndicatorSnapshot, SpikeSignal, SpikeType};

pub fn detect(snap: &IndicatorSnapshot, prev: Option<&IndicatorSnapshot>) -> SpikeSignal {
    let prev = match prev {
        Some(p) => p,
        None => return SpikeSignal::default(),
    };

    let mut score: u32 = 0;
    let mut reasons = Vec::new();

    let vol_spike = snap.volume / (snap.avg_volume_10d + 1.0);
    if vol_spike >= 2.0 {
        score += 15;
        reasons.push(format!("Volume {:.1}x average", vol_spike));
    }
    if vol_spike >= 4.0 {
        score += 15;
        reasons.push("Exceptional volume".to_string());
    }

    if snap.price > snap.vwap && snap.vwap > prev.vwap {
        score += 20;
        reasons.push("Above a rising VWAP".to_string());
    }

    // Tight range relative to ATR reads as coiling.
    let compression = (snap.high - snap.low) / (snap.atr_14 + 1.0);
    if compression < 0.5 {
        score += 10;
        reasons.push("Range compression".to_string());
    }
    if compression < 0.3 {
        score += 10;
        reasons.push("Tight coil".to_string());
    }
    if compression < 0.2 {
        score += 10;
        reasons.push("Extreme compression".to_string());
    }

    let range = snap.high - snap.low;
    if range > 0.0 {
        let lower_wick = snap.price.min(snap.open) - snap.low;
        if lower_wick / range > 0.40 {
            score += 10;
            reasons.push("Dip bought intraday".to_string());
        }
    }

    if snap.price > prev.high {
        score += 20;
        reasons.push("Close above yesterday's high".to_string());
    }

    if snap.macd_12_26 > prev.macd_12_26 && snap.macd_12_26 > 0.0 {
        score += 15;
        reasons.push("MACD rising and positive".to_string());
    }

    if snap.ema_9 > snap.ema_21 {
        score += 15;
        reasons.push("Short-term trend up".to_string());
    }

    let score = score.min(100);
    let spike_type = SpikeType::from_score(score);
    SpikeSignal {
        spike_score: score,
        spike_likely: score >= 60,
        spike_type,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_day() -> IndicatorSnapshot {
        IndicatorSnapshot {
            ticker: "TEST".to_string(),
            price: 10.0,
            open: 10.0,
            high: 11.0,
            low: 9.0,
            vwap: 10.5,
            atr_14: 1.0,
            volume: 1_000_000.0,
            avg_volume_10d: 1_000_000.0,
            ema_9: 10.0,
            ema_21: 10.1,
            macd_12_26: -0.1,
            ..Default::default()
        }
    }

    #[test]
    fn test_neutral_without_yesterday() {
        let result = detect(&flat_day(), None);
        assert_eq!(result.spike_score, 0);
        assert!(!result.spike_likely);
        assert_eq!(result.spike_type, SpikeType::Low);
    }

    #[test]
    fn test_flat_day_scores_low() {
        let snap = flat_day();
        let prev = flat_day();
        let result = detect(&snap, Some(&prev));
        assert!(result.spike_score < 40);
        assert_eq!(result.spike_type, SpikeType::Low);
    }

    #[test]
    fn test_coiled_accumulation_scores_high() {
        let snap = IndicatorSnapshot {
            ticker: "TEST".to_string(),
            price: 10.5,
            open: 10.3,
            high: 10.6,
            low: 10.25, // range 0.35 vs atr 1.0 -> heavy compression
            vwap: 10.4,
            atr_14: 1.0,
            volume: 4_500_000.0,
            avg_volume_10d: 1_000_000.0,
            ema_9: 10.4,
            ema_21: 10.2,
            macd_12_26: 0.3,
            ..Default::default()
        };
        let prev = IndicatorSnapshot {
            vwap: 10.2,
            high: 10.4,
            macd_12_26: 0.1,
            ..Default::default()
        };
        let result = detect(&snap, Some(&prev));
        // 30 volume + 20 vwap + 30 compression + 20 breakout + 15 macd + 15 ema, capped
        assert_eq!(result.spike_score, 100);
        assert!(result.spike_likely);
        assert_eq!(result.spike_type, SpikeType::Explosive);
    }

    #[test]
    fn test_score_capped_at_100() {
        let mut snap = flat_day();
        snap.volume = 10_000_000.0;
        snap.high = 10.05;
        snap.low = 10.0;
        snap.open = 10.04;
        snap.price = 10.05;
        snap.vwap = 10.0;
        snap.ema_9 = 10.2;
        snap.ema_21 = 10.0;
        snap.macd_12_26 = 0.5;
        let mut prev = flat_day();
        prev.vwap = 9.9;
        prev.high = 10.0;
        prev.macd_12_26 = 0.1;
        let result = detect(&snap, Some(&prev));
        assert_eq!(result.spike_score, 100);
    }
}
