//! Average True Range.

use governor_core::types::Candle;

/// Average True Range (ATR).
///
/// Simple mean of per-candle true range over the lookback period. The
/// window reaches one candle further back than the period so every
/// averaged true range has a previous close; when only `period` candles
/// exist, the oldest one falls back to plain high - low.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator. Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// The most recent ATR value, or None with fewer candles than the
    /// lookback period.
    pub fn latest(&self, candles: &[Candle]) -> Option<f64> {
        if candles.len() < self.period {
            return None;
        }

        let start = candles.len().saturating_sub(self.period + 1);
        let window = &candles[start..];

        let mut trs = Vec::with_capacity(window.len());
        let mut prev_close = None;
        for candle in window {
            trs.push(candle.true_range(prev_close));
            prev_close = Some(candle.close);
        }

        let tail = &trs[trs.len() - self.period..];
        Some(tail.iter().sum::<f64>() / self.period as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_candles(count: usize, close: f64, half_range: f64) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                Candle::new(
                    i as i64 * 300_000,
                    close,
                    close + half_range,
                    close - half_range,
                    close,
                    1000.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_insufficient_data() {
        let atr = Atr::new(14);
        let candles = flat_candles(13, 100.0, 5.0);
        assert!(atr.latest(&candles).is_none());
    }

    #[test]
    fn test_constant_range() {
        // Every candle spans exactly 10 with no gaps, so ATR is 10.
        let atr = Atr::new(14);
        let candles = flat_candles(20, 100.0, 5.0);
        let value = atr.latest(&candles).unwrap();
        assert!((value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_extends_true_range() {
        let atr = Atr::new(2);
        // Second candle gaps up: TR = max(2, |112-105|, |110-105|) = 7.
        // Third candle: TR = max(2, |112-111|, |110-111|) = 2.
        let candles = vec![
            Candle::new(0, 104.0, 106.0, 104.0, 105.0, 0.0),
            Candle::new(1, 111.0, 112.0, 110.0, 111.0, 0.0),
            Candle::new(2, 111.0, 112.0, 110.0, 111.0, 0.0),
        ];
        let value = atr.latest(&candles).unwrap();
        assert!((value - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_exactly_period_candles() {
        // With only `period` candles the first true range is high - low.
        let atr = Atr::new(3);
        let candles = flat_candles(3, 50.0, 2.0);
        let value = atr.latest(&candles).unwrap();
        assert!((value - 4.0).abs() < 1e-9);
    }
}
