//! Minute-parity timer — a deterministic toy rule.
//!
//! Even minutes: long entry / short exit. Odd minutes: short entry / long exit.

use chrono::{NaiveDateTime, Timelike};

use super::{RuleSwitches, SignalRule};
use crate::domain::{Bar, PeriodUnit, Periodicity, Signal, SignalResult};
use crate::error::EngineError;

/// Evaluate the parity rule for a timestamp.
///
/// Each enabled leg writes independently, so with both legs on an even
/// minute yields `entry = LongEntry` and `exit = ShortExit` together.
/// `reference_price` is left at 0.0; `ParityTimer` fills it from the bar.
pub fn evaluate_parity(
    timestamp: NaiveDateTime,
    long_enabled: bool,
    short_enabled: bool,
) -> SignalResult {
    parity_for_minute(timestamp.minute(), long_enabled, short_enabled)
}

fn parity_for_minute(minute: u32, long_enabled: bool, short_enabled: bool) -> SignalResult {
    let is_even = minute % 2 == 0;
    let mut result = SignalResult::empty();

    if long_enabled {
        if is_even {
            result.entry = Some(Signal::LongEntry);
        } else {
            result.exit = Some(Signal::LongExit);
        }
    }

    if short_enabled {
        if is_even {
            result.exit = Some(Signal::ShortExit);
        } else {
            result.entry = Some(Signal::ShortEntry);
        }
    }

    result
}

/// Parity rule bound to a bar feed.
#[derive(Debug, Clone)]
pub struct ParityTimer {
    pub switches: RuleSwitches,
}

impl ParityTimer {
    pub fn new(switches: RuleSwitches) -> Self {
        Self { switches }
    }
}

impl SignalRule for ParityTimer {
    fn name(&self) -> &str {
        "parity_timer"
    }

    fn bars_required(&self) -> usize {
        1
    }

    /// Only a one-minute feed makes minute parity meaningful.
    fn periodicity_is_valid(&self, periodicity: &Periodicity) -> bool {
        periodicity.unit == PeriodUnit::Minute && periodicity.value == 1
    }

    fn calculate(&mut self, bar: &Bar) -> Result<SignalResult, EngineError> {
        let result = parity_for_minute(
            bar.minute(),
            self.switches.long_enabled,
            self.switches.short_enabled,
        );
        Ok(result.with_reference_price(bar.close))
    }
}
