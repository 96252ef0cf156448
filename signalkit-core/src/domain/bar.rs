//! Bar — the fundamental market data unit.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// OHLC bar for a single symbol at minute resolution.
///
/// Bars arrive in timestamp order. The engine does not re-check ordering;
/// feed loaders do (see `feed`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(
        symbol: impl Into<String>,
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// Minute-of-hour of the bar timestamp (0..=59).
    pub fn minute(&self) -> u32 {
        self.timestamp.minute()
    }

    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// OHLC sanity check: high bounds the bar, low bounds it from below, and
    /// every price is strictly positive.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low > 0.0
            && self.open > 0.0
            && self.close > 0.0
    }
}
