//! Protective stop-loss / profit-target levels attached to entry orders.

use serde::{Deserialize, Serialize};

use crate::domain::Side;

/// Percent distances of the protective orders from the entry price.
///
/// `0.01` means 1%. The levels travel with the entry order; working them is
/// the gateway's business.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub stop_loss_pct: f64,
    pub profit_target_pct: f64,
}

/// Absolute protective prices for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BracketLevels {
    pub stop_loss: f64,
    pub profit_target: f64,
}

impl Bracket {
    pub fn new(stop_loss_pct: f64, profit_target_pct: f64) -> Self {
        assert!(stop_loss_pct >= 0.0, "stop_loss_pct must be >= 0");
        assert!(profit_target_pct >= 0.0, "profit_target_pct must be >= 0");
        Self {
            stop_loss_pct,
            profit_target_pct,
        }
    }

    /// Stop below / target above for longs; mirrored for shorts.
    pub fn levels(&self, side: Side, entry_price: f64) -> BracketLevels {
        match side {
            Side::Long => BracketLevels {
                stop_loss: entry_price * (1.0 - self.stop_loss_pct),
                profit_target: entry_price * (1.0 + self.profit_target_pct),
            },
            Side::Short => BracketLevels {
                stop_loss: entry_price * (1.0 + self.stop_loss_pct),
                profit_target: entry_price * (1.0 - self.profit_target_pct),
            },
        }
    }
}

impl Default for Bracket {
    fn default() -> Self {
        Self::new(0.01, 0.01)
    }
}
