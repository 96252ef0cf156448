//! Position Sizers — determine trade quantity
//!
//! Sizers translate a fixed share count or a dollar amount into the quantity
//! of an entry order. They see the signal bar only, never the signal itself.

pub mod fixed;

pub use fixed::FixedSizer;

use crate::domain::Bar;

/// Position sizing logic
///
/// # Responsibilities
/// - Convert bar price context → trade quantity
///
/// # Non-Responsibilities
/// - Sizers do NOT decide entry/exit (that's the rule's job)
/// - Sizers do NOT submit orders (that's the order manager's job)
pub trait Sizer: Send + Sync {
    /// Quantity (shares/contracts) for an entry on `bar`.
    ///
    /// Returns 0.0 when no sensible size exists (e.g. non-positive price).
    fn size(&self, bar: &Bar) -> f64;

    /// Sizer name for logging
    fn name(&self) -> &str;
}
