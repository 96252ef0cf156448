//! Condition consumer — an "occurred" alert channel plus an entry-price channel.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::SignalConsumer;
use crate::domain::{Bar, Signal, SignalResult};

/// Condition channels for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionPoint {
    pub timestamp: NaiveDateTime,
    /// +1 long entry, -1 short entry, 0 otherwise.
    pub occurred: f64,
    /// Reference price of the entry; NaN when no entry fired.
    pub entry_price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ConditionConsumer {
    points: Vec<ConditionPoint>,
}

impl ConditionConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[ConditionPoint] {
        &self.points
    }

    pub fn last_point(&self) -> Option<&ConditionPoint> {
        self.points.last()
    }

    /// Number of bars on which the condition fired.
    pub fn occurrences(&self) -> usize {
        self.points.iter().filter(|p| p.occurred != 0.0).count()
    }
}

impl SignalConsumer for ConditionConsumer {
    fn name(&self) -> &str {
        "condition"
    }

    fn consume(&mut self, bar: &Bar, result: &SignalResult) {
        let occurred = match result.entry {
            Some(Signal::LongEntry) => 1.0,
            Some(Signal::ShortEntry) => -1.0,
            _ => 0.0,
        };
        let entry_price = if occurred != 0.0 {
            result.reference_price
        } else {
            f64::NAN
        };
        self.points.push(ConditionPoint {
            timestamp: bar.timestamp,
            occurred,
            entry_price,
        });
    }
}
