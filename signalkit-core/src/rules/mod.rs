//! Signal rules — per-bar decision logic.
//!
//! Rules are portfolio-agnostic: they see bars only, never positions or
//! orders. A rule is evaluated once per bar and its `SignalResult` is shared
//! by every consumer of that bar.

pub mod crossover;
pub mod parity;

pub use crossover::{detect, Crossover, CrossoverDetector, CrossoverState};
pub use parity::{evaluate_parity, ParityTimer};

use crate::domain::{Bar, Periodicity, SignalResult};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Which legs a rule may emit signals for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSwitches {
    pub long_enabled: bool,
    pub short_enabled: bool,
}

impl RuleSwitches {
    pub fn new(long_enabled: bool, short_enabled: bool) -> Self {
        Self {
            long_enabled,
            short_enabled,
        }
    }
}

impl Default for RuleSwitches {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// Trait for per-bar signal rules.
///
/// # Invariants
/// - `calculate` is called exactly once per bar, in bar order.
/// - Parameters are fixed at construction; a different parameter set is a
///   different instance.
pub trait SignalRule: Send {
    /// Human-readable name (e.g., "sma_crossover").
    fn name(&self) -> &str;

    /// Bars needed before `calculate` can produce a result.
    fn bars_required(&self) -> usize;

    /// Whether this rule is meaningful on a feed of the given resolution.
    fn periodicity_is_valid(&self, periodicity: &Periodicity) -> bool;

    /// Evaluate the rule on the newest bar.
    fn calculate(&mut self, bar: &Bar) -> Result<SignalResult, EngineError>;

    /// Like `calculate`, but any failure (including warmup) comes back as
    /// `error_occurred` with no signals.
    fn evaluate(&mut self, bar: &Bar) -> SignalResult {
        self.calculate(bar).unwrap_or_else(|_| SignalResult::failed())
    }

    /// Drop any accumulated history.
    fn reset(&mut self) {}
}
