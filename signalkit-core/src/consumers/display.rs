//! Display consumer — maps results onto two plot channels.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::SignalConsumer;
use crate::domain::{Bar, Signal, SignalResult};

/// Sign given to exit markers on the exit curve.
///
/// Chart layouts differ on which exit plots above zero,
/// so the convention is chosen per display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPlotConvention {
    /// LongExit -0.5, ShortExit +0.5.
    #[default]
    LongExitNegative,
    /// LongExit +0.5, ShortExit -0.5.
    LongExitPositive,
}

/// Plot values for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub timestamp: NaiveDateTime,
    pub entry: f64,
    pub exit: f64,
}

/// Entry curve value: +1 long, -1 short, 0 otherwise.
pub fn entry_value(signal: Signal) -> f64 {
    match signal {
        Signal::LongEntry => 1.0,
        Signal::ShortEntry => -1.0,
        _ => 0.0,
    }
}

/// Exit curve value: ±0.5 per `convention`, 0 otherwise.
pub fn exit_value(signal: Signal, convention: ExitPlotConvention) -> f64 {
    let long_exit = match convention {
        ExitPlotConvention::LongExitNegative => -0.5,
        ExitPlotConvention::LongExitPositive => 0.5,
    };
    match signal {
        Signal::LongExit => long_exit,
        Signal::ShortExit => -long_exit,
        _ => 0.0,
    }
}

/// Accumulates entry and exit curves, one point per consumed bar.
#[derive(Debug, Clone, Default)]
pub struct DisplayConsumer {
    convention: ExitPlotConvention,
    points: Vec<PlotPoint>,
}

impl DisplayConsumer {
    pub fn new(convention: ExitPlotConvention) -> Self {
        Self {
            convention,
            points: Vec::new(),
        }
    }

    pub fn points(&self) -> &[PlotPoint] {
        &self.points
    }

    pub fn last_point(&self) -> Option<&PlotPoint> {
        self.points.last()
    }

    pub fn entry_curve(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.entry).collect()
    }

    pub fn exit_curve(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.exit).collect()
    }
}

impl SignalConsumer for DisplayConsumer {
    fn name(&self) -> &str {
        "display"
    }

    fn consume(&mut self, bar: &Bar, result: &SignalResult) {
        self.points.push(PlotPoint {
            timestamp: bar.timestamp,
            entry: entry_value(result.entry_or_none()),
            exit: exit_value(result.exit_or_none(), self.convention),
        });
    }
}
