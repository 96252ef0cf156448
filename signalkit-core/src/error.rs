//! Engine error taxonomy.
//!
//! None of these are fatal: a session turns each one into "no signal this
//! bar" plus a one-time diagnostic.

use crate::domain::Periodicity;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Not enough history for the requested window. Recoverable by waiting
    /// for more bars.
    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    /// The feed resolution does not suit the rule. Caller-side precondition.
    #[error("periodicity {0} is not supported by this rule")]
    InvalidPeriodicity(Periodicity),

    /// Moving-average window must be at least one bar.
    #[error("invalid window length: {0}")]
    InvalidWindow(usize),
}

impl EngineError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
