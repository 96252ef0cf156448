//! Moving average crossover — golden cross and death cross detection.
//!
//! Fires a long entry when the fast SMA crosses above the slow SMA (golden
//! cross) and a short entry when it crosses below (death cross). The
//! opposite leg's exit rides on the same bar.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RuleSwitches, SignalRule};
use crate::domain::{Bar, PeriodUnit, Periodicity, Signal, SignalResult};
use crate::error::EngineError;
use crate::indicators::{sma, CloseSeries};

/// Outcome of comparing two bars' worth of fast/slow averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crossover {
    pub crossed_above: bool,
    pub crossed_below: bool,
    /// Fast SMA on the current bar.
    pub fast: f64,
    /// Slow SMA on the current bar.
    pub slow: f64,
}

/// Detect a fast/slow SMA crossover on the head of a most-recent-first series.
///
/// A cross is recognised only on the bar where strict inequality first
/// appears after the averages were on (or at) the opposite side, so a tie
/// (`fast == slow`) fires nothing. Needs `slow_window + 1` samples.
pub fn detect(
    series: &[f64],
    fast_window: usize,
    slow_window: usize,
) -> Result<Crossover, EngineError> {
    let fast0 = sma(series, fast_window, 0)?;
    let slow0 = sma(series, slow_window, 0)?;
    let fast1 = sma(series, fast_window, 1)?;
    let slow1 = sma(series, slow_window, 1)?;

    Ok(Crossover {
        crossed_above: fast1 <= slow1 && fast0 > slow0,
        crossed_below: fast1 >= slow1 && fast0 < slow0,
        fast: fast0,
        slow: slow0,
    })
}

/// Averages carried from one bar to the next by a detector instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossoverState {
    pub fast_window: usize,
    pub slow_window: usize,
    /// Fast SMA as of the last evaluated bar (NaN before the first).
    pub previous_fast: f64,
    /// Slow SMA as of the last evaluated bar (NaN before the first).
    pub previous_slow: f64,
}

/// Stateful SMA crossover rule.
///
/// Owns a bounded close history and the previous bar's averages. One
/// instance per parameter set and instrument; instances never share state.
/// `fast_window < slow_window` is expected but not checked: swapping them
/// inverts the meaning of the signals without breaking the arithmetic.
#[derive(Debug, Clone)]
pub struct CrossoverDetector {
    pub switches: RuleSwitches,
    state: CrossoverState,
    series: CloseSeries,
}

impl CrossoverDetector {
    pub const DEFAULT_FAST: usize = 20;
    pub const DEFAULT_SLOW: usize = 50;
    /// Largest window a detector accepts; about a year of one-minute bars.
    pub const MAX_WINDOW: usize = 1 << 20;

    pub fn new(fast_window: usize, slow_window: usize, switches: RuleSwitches) -> Self {
        assert!(fast_window >= 1, "fast_window must be >= 1");
        assert!(slow_window >= 1, "slow_window must be >= 1");
        assert!(
            fast_window.max(slow_window) <= Self::MAX_WINDOW,
            "windows must be <= {}",
            Self::MAX_WINDOW
        );

        let depth = fast_window.max(slow_window) + 1;
        Self {
            switches,
            state: CrossoverState {
                fast_window,
                slow_window,
                previous_fast: f64::NAN,
                previous_slow: f64::NAN,
            },
            series: CloseSeries::with_capacity(depth),
        }
    }

    pub fn default_params() -> Self {
        Self::new(Self::DEFAULT_FAST, Self::DEFAULT_SLOW, RuleSwitches::default())
    }

    pub fn state(&self) -> &CrossoverState {
        &self.state
    }

    /// Map a detected cross onto entry/exit signals for the enabled legs.
    fn to_result(&self, cross: &Crossover, close: f64) -> SignalResult {
        let mut result = SignalResult::empty();
        let RuleSwitches {
            long_enabled,
            short_enabled,
        } = self.switches;

        if cross.crossed_above {
            if long_enabled {
                result.entry = Some(Signal::LongEntry);
            }
            if short_enabled {
                result.exit = Some(Signal::ShortExit);
            }
            result.reference_price = close;
        } else if cross.crossed_below {
            if short_enabled {
                result.entry = Some(Signal::ShortEntry);
            }
            if long_enabled {
                result.exit = Some(Signal::LongExit);
            }
            result.reference_price = close;
        }

        result
    }
}

impl SignalRule for CrossoverDetector {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn bars_required(&self) -> usize {
        self.state.fast_window.max(self.state.slow_window) + 1
    }

    /// Intraday, hourly and daily feeds; anything coarser is rejected.
    fn periodicity_is_valid(&self, periodicity: &Periodicity) -> bool {
        matches!(
            periodicity.unit,
            PeriodUnit::Minute | PeriodUnit::Hour | PeriodUnit::Day
        )
    }

    fn calculate(&mut self, bar: &Bar) -> Result<SignalResult, EngineError> {
        self.series.push(bar.close);
        let cross = detect(
            self.series.closes(),
            self.state.fast_window,
            self.state.slow_window,
        )?;

        self.state.previous_fast = cross.fast;
        self.state.previous_slow = cross.slow;

        if cross.crossed_above || cross.crossed_below {
            debug!(
                symbol = %bar.symbol,
                timestamp = %bar.timestamp,
                fast = cross.fast,
                slow = cross.slow,
                above = cross.crossed_above,
                "sma crossover"
            );
        }

        Ok(self.to_result(&cross, bar.close))
    }

    fn reset(&mut self) {
        self.series.clear();
        self.state.previous_fast = f64::NAN;
        self.state.previous_slow = f64::NAN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::make_bars;

    /// Most-recent-first series built from an oldest-first list.
    fn newest_first(oldest_first: &[f64]) -> Vec<f64> {
        oldest_first.iter().rev().copied().collect()
    }

    #[test]
    fn golden_cross_detected() {
        // fast(1) vs slow(3): 10,10,10 then 13 -> fast 13 > slow 11.
        let series = newest_first(&[10.0, 10.0, 10.0, 13.0]);
        let c = detect(&series, 1, 3).unwrap();
        assert!(c.crossed_above);
        assert!(!c.crossed_below);
        assert_eq!(c.fast, 13.0);
        assert_eq!(c.slow, 11.0);
    }

    #[test]
    fn death_cross_detected() {
        let series = newest_first(&[10.0, 10.0, 10.0, 7.0]);
        let c = detect(&series, 1, 3).unwrap();
        assert!(c.crossed_below);
        assert!(!c.crossed_above);
    }

    #[test]
    fn no_fire_when_trend_continues() {
        let series = newest_first(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        // Fast above slow on both bars.
        let c = detect(&series, 1, 3).unwrap();
        assert!(!c.crossed_above);
        assert!(!c.crossed_below);
    }

    #[test]
    fn tie_fires_nothing() {
        let series = newest_first(&[10.0, 10.0, 10.0, 10.0]);
        let c = detect(&series, 1, 3).unwrap();
        assert!(!c.crossed_above);
        assert!(!c.crossed_below);
    }

    #[test]
    fn cross_out_of_tie_fires_once() {
        // Previous bar tied, current bar strictly above.
        let series = newest_first(&[10.0, 10.0, 10.0, 10.0, 12.0]);
        let c = detect(&series, 1, 3).unwrap();
        assert!(c.crossed_above);
    }

    #[test]
    fn needs_slow_plus_one_samples() {
        let series = newest_first(&[10.0, 10.0, 10.0]);
        assert_eq!(
            detect(&series, 1, 3),
            Err(EngineError::InsufficientData {
                required: 4,
                available: 3
            })
        );
    }

    #[test]
    fn zero_window_rejected() {
        assert_eq!(
            detect(&[1.0, 2.0], 0, 1),
            Err(EngineError::InvalidWindow(0))
        );
    }

    #[test]
    fn detector_warms_up_then_fires() {
        let bars = make_bars(&[10.0, 10.0, 10.0, 13.0]);
        let mut det = CrossoverDetector::new(1, 3, RuleSwitches::default());
        assert_eq!(det.bars_required(), 4);

        for bar in &bars[..3] {
            let err = det.calculate(bar).unwrap_err();
            assert!(err.is_insufficient_data());
        }

        let r = det.calculate(&bars[3]).unwrap();
        assert_eq!(r.entry, Some(Signal::LongEntry));
        assert_eq!(r.exit, Some(Signal::ShortExit));
        assert_eq!(r.reference_price, 13.0);
        assert_eq!(det.state().previous_fast, 13.0);
        assert_eq!(det.state().previous_slow, 11.0);
    }

    #[test]
    fn detector_death_cross_maps_legs() {
        let bars = make_bars(&[10.0, 10.0, 10.0, 7.0]);
        let mut det = CrossoverDetector::new(1, 3, RuleSwitches::default());
        let r = bars
            .iter()
            .filter_map(|b| det.calculate(b).ok())
            .last()
            .unwrap();
        assert_eq!(r.entry, Some(Signal::ShortEntry));
        assert_eq!(r.exit, Some(Signal::LongExit));
    }

    #[test]
    fn long_only_switch_suppresses_short_leg() {
        let bars = make_bars(&[10.0, 10.0, 10.0, 7.0]);
        let mut det = CrossoverDetector::new(1, 3, RuleSwitches::new(true, false));
        let r = bars
            .iter()
            .filter_map(|b| det.calculate(b).ok())
            .last()
            .unwrap();
        assert_eq!(r.entry, None);
        assert_eq!(r.exit, Some(Signal::LongExit));
    }

    #[test]
    fn quiet_bar_has_zero_reference_price() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let mut det = CrossoverDetector::new(1, 3, RuleSwitches::default());
        let r = bars
            .iter()
            .filter_map(|b| det.calculate(b).ok())
            .last()
            .unwrap();
        assert!(!r.has_signal());
        assert_eq!(r.reference_price, 0.0);
    }

    #[test]
    fn reset_drops_history() {
        let bars = make_bars(&[10.0, 10.0, 10.0, 13.0]);
        let mut det = CrossoverDetector::new(1, 3, RuleSwitches::default());
        for bar in &bars {
            let _ = det.calculate(bar);
        }
        det.reset();
        assert!(det.state().previous_fast.is_nan());
        assert!(det.calculate(&bars[0]).is_err());
    }

    #[test]
    fn periodicity_accepts_intraday_to_daily() {
        let det = CrossoverDetector::default_params();
        assert!(det.periodicity_is_valid(&Periodicity::minutes(5)));
        assert!(det.periodicity_is_valid(&Periodicity::hours(1)));
        assert!(det.periodicity_is_valid(&Periodicity::days(1)));
        assert!(!det.periodicity_is_valid(&Periodicity::new(PeriodUnit::Week, 1)));
    }

    #[test]
    fn default_params_are_20_50() {
        let det = CrossoverDetector::default_params();
        assert_eq!(det.state().fast_window, 20);
        assert_eq!(det.state().slow_window, 50);
        assert_eq!(det.bars_required(), 51);
        assert_eq!(det.name(), "sma_crossover");
    }

    #[test]
    #[should_panic(expected = "fast_window must be >= 1")]
    fn rejects_zero_fast_window() {
        CrossoverDetector::new(0, 10, RuleSwitches::default());
    }

    #[test]
    #[should_panic(expected = "windows must be <=")]
    fn rejects_oversized_slow_window() {
        CrossoverDetector::new(20, usize::MAX, RuleSwitches::default());
    }

    #[test]
    fn evaluate_flags_warmup_as_error_without_signals() {
        let bars = make_bars(&[10.0, 10.0, 10.0, 13.0]);
        let mut det = CrossoverDetector::new(1, 3, RuleSwitches::default());
        for bar in &bars[..3] {
            let r = det.evaluate(bar);
            assert!(r.error_occurred);
            assert!(!r.has_signal());
        }
        let r = det.evaluate(&bars[3]);
        assert!(!r.error_occurred);
        assert_eq!(r.entry, Some(Signal::LongEntry));
    }
}
