use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::signal::OrderAction;

/// Unique name attached to an entry order.
///
/// Exits reference the entry by this tag. Built from the session name, the
/// entry action, the symbol, the bar timestamp and a per-manager sequence
/// number, so two entries never share a tag even on the same bar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderTag(pub String);

impl OrderTag {
    pub fn new(
        name: &str,
        action: OrderAction,
        symbol: &str,
        timestamp: NaiveDateTime,
        sequence: u64,
    ) -> Self {
        let millis = timestamp.and_utc().timestamp_millis();
        Self(format!("{name}_{action}_{symbol}_{millis}_{sequence}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
