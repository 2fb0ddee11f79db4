use serde::{Deserialize, Serialize};

/// OHLC sample for one fixed-width time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start, UNIX seconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }

    /// Checks `low <= min(open, close)` and `high >= max(open, close)`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }

    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close-to-open change as a fraction of the open.
    #[must_use]
    pub fn change_pct(&self) -> f64 {
        if self.open == 0.0 {
            return 0.0;
        }
        (self.close - self.open) / self.open
    }
}
