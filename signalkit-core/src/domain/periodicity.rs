//! Periodicity — the time resolution of a bar feed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit of a bar feed's time resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PeriodUnit::Minute => "minute",
            PeriodUnit::Hour => "hour",
            PeriodUnit::Day => "day",
            PeriodUnit::Week => "week",
            PeriodUnit::Month => "month",
        };
        f.write_str(s)
    }
}

/// Feed resolution, e.g. `5 × minute` or `1 × day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Periodicity {
    pub unit: PeriodUnit,
    pub value: u32,
}

impl Periodicity {
    pub fn new(unit: PeriodUnit, value: u32) -> Self {
        Self { unit, value }
    }

    pub fn minutes(value: u32) -> Self {
        Self::new(PeriodUnit::Minute, value)
    }

    pub fn hours(value: u32) -> Self {
        Self::new(PeriodUnit::Hour, value)
    }

    pub fn days(value: u32) -> Self {
        Self::new(PeriodUnit::Day, value)
    }
}

impl Default for Periodicity {
    fn default() -> Self {
        Self::minutes(1)
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
