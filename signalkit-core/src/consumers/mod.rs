//! Consumers of a bar's `SignalResult`.
//!
//! Each consumer translates the same shared result into its own output
//! channel. Consumers never re-run a rule and never modify the result.

pub mod bracket;
pub mod condition;
pub mod display;
pub mod orders;

pub use bracket::{Bracket, BracketLevels};
pub use condition::{ConditionConsumer, ConditionPoint};
pub use display::{DisplayConsumer, ExitPlotConvention, PlotPoint};
pub use orders::{
    EntryOrder, ExitOrder, GatewayError, OrderEvent, OrderGateway, OrderManager, PaperBook,
    PaperGateway,
};

use crate::domain::{Bar, SignalResult};

/// Trait for result consumers.
///
/// `consume` is called once per successfully evaluated bar, after the rule
/// and before the next bar arrives.
pub trait SignalConsumer: Send {
    /// Human-readable name (e.g., "display").
    fn name(&self) -> &str;

    fn consume(&mut self, bar: &Bar, result: &SignalResult);
}
