//! Constant-size orders for the order manager.

use crate::domain::Bar;
use crate::sizers::Sizer;

/// Quantity attached to every entry the order manager submits.
///
/// `Shares` sends the same count on each signal. `Notional` divides a cash
/// amount by the close of the bar that fired the signal, so the quantity
/// floats with price. The default is one share.
#[derive(Debug, Clone, PartialEq)]
pub enum FixedSizer {
    /// Share count per entry.
    Shares { quantity: f64 },

    /// Cash committed per entry, converted at the signal bar's close.
    Notional { amount: f64 },
}

impl FixedSizer {
    /// Panics unless `quantity` is positive.
    pub fn shares(quantity: f64) -> Self {
        assert!(quantity > 0.0, "quantity must be > 0");
        Self::Shares { quantity }
    }

    /// Panics unless `amount` is positive.
    pub fn notional(amount: f64) -> Self {
        assert!(amount > 0.0, "amount must be > 0");
        Self::Notional { amount }
    }
}

impl Default for FixedSizer {
    fn default() -> Self {
        Self::Shares { quantity: 1.0 }
    }
}

impl Sizer for FixedSizer {
    fn size(&self, bar: &Bar) -> f64 {
        match self {
            Self::Shares { quantity } => *quantity,
            Self::Notional { amount } => {
                let price = bar.close;
                if price.is_nan() || price <= 0.0 {
                    return 0.0;
                }
                amount / price
            }
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Shares { .. } => "FixedShares",
            Self::Notional { .. } => "FixedNotional",
        }
    }
}
