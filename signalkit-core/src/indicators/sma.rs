//! Simple Moving Average (SMA).
//!
//! Mean of close prices over a window read from a most-recent-first series:
//! index 0 is the current bar, index 1 the bar before it, and so on.

use crate::error::EngineError;

/// Mean of `window` closes starting `lookback` bars back from the current one.
///
/// `lookback = 0` averages `series[0..window]`; `lookback = 1` averages the
/// same window one bar earlier. Fails with `InsufficientData` when
/// `lookback + window` exceeds the series length; a sum past `usize::MAX`
/// reports `required = usize::MAX`.
pub fn sma(series: &[f64], window: usize, lookback: usize) -> Result<f64, EngineError> {
    if window == 0 {
        return Err(EngineError::InvalidWindow(window));
    }
    let required = lookback
        .checked_add(window)
        .filter(|&n| n <= series.len())
        .ok_or(EngineError::InsufficientData {
            required: lookback.saturating_add(window),
            available: series.len(),
        })?;
    let sum: f64 = series[lookback..required].iter().sum();
    Ok(sum / window as f64)
}
