//! Domain types for SignalKit

pub mod bar;
pub mod ids;
pub mod periodicity;
pub mod signal;

pub use bar::Bar;
pub use ids::OrderTag;
pub use periodicity::{PeriodUnit, Periodicity};
pub use signal::{OrderAction, Side, Signal, SignalResult};
