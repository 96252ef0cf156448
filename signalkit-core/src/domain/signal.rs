//! Signals and the per-bar result record shared by every consumer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

/// Entry/exit instruction emitted by a rule.
///
/// `None` is the neutral value used by plot channels; rules express "no
/// signal" by leaving `SignalResult::entry`/`exit` empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    None,
    LongEntry,
    LongExit,
    ShortEntry,
    ShortExit,
}

impl Signal {
    pub fn is_entry(&self) -> bool {
        matches!(self, Signal::LongEntry | Signal::ShortEntry)
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Signal::LongExit | Signal::ShortExit)
    }

    /// Direction of the position this signal opens or closes.
    pub fn side(&self) -> Option<Side> {
        match self {
            Signal::LongEntry | Signal::LongExit => Some(Side::Long),
            Signal::ShortEntry | Signal::ShortExit => Some(Side::Short),
            Signal::None => None,
        }
    }

    /// Broker-side action that carries out this signal.
    pub fn order_action(&self) -> Option<OrderAction> {
        match self {
            Signal::LongEntry => Some(OrderAction::Buy),
            Signal::LongExit => Some(OrderAction::Sell),
            Signal::ShortEntry => Some(OrderAction::SellShort),
            Signal::ShortExit => Some(OrderAction::BuyToCover),
            Signal::None => None,
        }
    }
}

/// Order action as a broker understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderAction {
    Buy,
    Sell,
    SellShort,
    BuyToCover,
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderAction::Buy => "Buy",
            OrderAction::Sell => "Sell",
            OrderAction::SellShort => "SellShort",
            OrderAction::BuyToCover => "BuyToCover",
        };
        f.write_str(s)
    }
}

/// Outcome of one rule evaluation on one bar.
///
/// Built fresh per bar, never mutated after it leaves the rule, and
/// discarded once every consumer has seen it. Entry and exit are
/// independent: a single bar may carry both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub error_occurred: bool,
    pub entry: Option<Signal>,
    pub exit: Option<Signal>,
    /// Close of the bar that produced a signal; 0.0 when nothing fired.
    pub reference_price: f64,
}

impl SignalResult {
    /// A result with no signals.
    pub fn empty() -> Self {
        Self {
            error_occurred: false,
            entry: None,
            exit: None,
            reference_price: 0.0,
        }
    }

    /// A result marking a failed calculation.
    pub fn failed() -> Self {
        Self {
            error_occurred: true,
            ..Self::empty()
        }
    }

    pub fn with_reference_price(mut self, price: f64) -> Self {
        self.reference_price = price;
        self
    }

    pub fn has_signal(&self) -> bool {
        self.entry.is_some() || self.exit.is_some()
    }

    pub fn entry_or_none(&self) -> Signal {
        self.entry.unwrap_or(Signal::None)
    }

    pub fn exit_or_none(&self) -> Signal {
        self.exit.unwrap_or(Signal::None)
    }
}

impl Default for SignalResult {
    fn default() -> Self {
        Self::empty()
    }
}
