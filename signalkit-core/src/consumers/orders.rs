//! Order-management consumer.
//!
//! Turns entry/exit signals into orders against an `OrderGateway`, keeping at
//! most one open position per side. A second entry for a side that is
//! already open is ignored; an exit closes the open position by its tag and
//! frees the side for the next entry.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::bracket::{Bracket, BracketLevels};
use super::SignalConsumer;
use crate::domain::{Bar, OrderAction, OrderTag, Side, Signal, SignalResult};
use crate::sizers::{FixedSizer, Sizer};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("order {tag} rejected: {reason}")]
    Rejected { tag: OrderTag, reason: String },
}

/// Order opening a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOrder {
    pub tag: OrderTag,
    pub side: Side,
    pub action: OrderAction,
    pub symbol: String,
    pub quantity: f64,
    /// Close of the signal bar.
    pub price: f64,
    pub timestamp: NaiveDateTime,
    pub bracket: Option<BracketLevels>,
}

/// Order closing the position opened under `tag`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitOrder {
    pub tag: OrderTag,
    pub side: Side,
    pub action: OrderAction,
    pub symbol: String,
    pub price: f64,
    pub timestamp: NaiveDateTime,
}

/// Audit trail entry for an accepted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderEvent {
    Entered(EntryOrder),
    Exited(ExitOrder),
}

/// Broker seam. Routing and fills live behind it.
pub trait OrderGateway: Send {
    fn submit_entry(&mut self, order: &EntryOrder) -> Result<(), GatewayError>;

    fn submit_exit(&mut self, order: &ExitOrder) -> Result<(), GatewayError>;
}

/// Orders a `PaperGateway` has accepted, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaperBook {
    pub entries: Vec<EntryOrder>,
    pub exits: Vec<ExitOrder>,
}

/// Gateway that accepts every order and records it without routing it
/// anywhere.
///
/// Clones share one book, so a caller can keep a handle while the manager
/// owns the boxed gateway.
#[derive(Debug, Clone, Default)]
pub struct PaperGateway {
    book: Arc<Mutex<PaperBook>>,
}

impl PaperGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything accepted so far.
    pub fn book(&self) -> PaperBook {
        self.lock().clone()
    }

    /// Entries plus exits accepted so far.
    pub fn submitted(&self) -> usize {
        let book = self.lock();
        book.entries.len() + book.exits.len()
    }

    fn lock(&self) -> MutexGuard<'_, PaperBook> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OrderGateway for PaperGateway {
    fn submit_entry(&mut self, order: &EntryOrder) -> Result<(), GatewayError> {
        self.lock().entries.push(order.clone());
        Ok(())
    }

    fn submit_exit(&mut self, order: &ExitOrder) -> Result<(), GatewayError> {
        self.lock().exits.push(order.clone());
        Ok(())
    }
}

/// Order-management consumer with idempotent entries.
pub struct OrderManager {
    name: String,
    autopilot: bool,
    sizer: Box<dyn Sizer>,
    bracket: Option<Bracket>,
    gateway: Box<dyn OrderGateway>,
    open_long: Option<OrderTag>,
    open_short: Option<OrderTag>,
    sequence: u64,
    ledger: Vec<OrderEvent>,
}

impl OrderManager {
    /// Manager with a one-share sizer, no bracket and autopilot on.
    pub fn new(name: impl Into<String>, gateway: Box<dyn OrderGateway>) -> Self {
        Self {
            name: name.into(),
            autopilot: true,
            sizer: Box::new(FixedSizer::default()),
            bracket: None,
            gateway,
            open_long: None,
            open_short: None,
            sequence: 0,
            ledger: Vec::new(),
        }
    }

    pub fn with_sizer(mut self, sizer: Box<dyn Sizer>) -> Self {
        self.sizer = sizer;
        self
    }

    pub fn with_bracket(mut self, bracket: Bracket) -> Self {
        self.bracket = Some(bracket);
        self
    }

    /// With autopilot off, would-be orders are logged and nothing is submitted.
    pub fn with_autopilot(mut self, autopilot: bool) -> Self {
        self.autopilot = autopilot;
        self
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    /// Tag of the open position on `side`, if any.
    pub fn open_tag(&self, side: Side) -> Option<&OrderTag> {
        match side {
            Side::Long => self.open_long.as_ref(),
            Side::Short => self.open_short.as_ref(),
        }
    }

    pub fn is_open(&self, side: Side) -> bool {
        self.open_tag(side).is_some()
    }

    /// Every order the gateway accepted, oldest first.
    pub fn ledger(&self) -> &[OrderEvent] {
        &self.ledger
    }

    fn slot_mut(&mut self, side: Side) -> &mut Option<OrderTag> {
        match side {
            Side::Long => &mut self.open_long,
            Side::Short => &mut self.open_short,
        }
    }

    fn enter(&mut self, signal: Signal, bar: &Bar) {
        let (Some(side), Some(action)) = (signal.side(), signal.order_action()) else {
            return;
        };
        if let Some(open) = self.open_tag(side) {
            debug!(tag = %open, ?side, "position already open, entry ignored");
            return;
        }

        let quantity = self.sizer.size(bar);
        if quantity.is_nan() || quantity <= 0.0 {
            warn!(
                sizer = self.sizer.name(),
                quantity,
                ?side,
                "sizer returned no quantity, entry skipped"
            );
            return;
        }

        self.sequence += 1;
        let order = EntryOrder {
            tag: OrderTag::new(
                &self.name,
                action,
                &bar.symbol,
                bar.timestamp,
                self.sequence,
            ),
            side,
            action,
            symbol: bar.symbol.clone(),
            quantity,
            price: bar.close,
            timestamp: bar.timestamp,
            bracket: self.bracket.map(|b| b.levels(side, bar.close)),
        };

        if !self.autopilot {
            info!(tag = %order.tag, %action, quantity, "autopilot off, entry not submitted");
            return;
        }

        match self.gateway.submit_entry(&order) {
            Ok(()) => {
                info!(tag = %order.tag, %action, quantity, price = order.price, "entry submitted");
                *self.slot_mut(side) = Some(order.tag.clone());
                self.ledger.push(OrderEvent::Entered(order));
            }
            Err(err) => warn!(error = %err, "entry rejected"),
        }
    }

    fn exit(&mut self, signal: Signal, bar: &Bar) {
        let (Some(side), Some(action)) = (signal.side(), signal.order_action()) else {
            return;
        };
        let Some(tag) = self.slot_mut(side).take() else {
            debug!(?side, "no open position, exit ignored");
            return;
        };

        let order = ExitOrder {
            tag,
            side,
            action,
            symbol: bar.symbol.clone(),
            price: bar.close,
            timestamp: bar.timestamp,
        };

        match self.gateway.submit_exit(&order) {
            Ok(()) => {
                info!(tag = %order.tag, %action, price = order.price, "exit submitted");
                self.ledger.push(OrderEvent::Exited(order));
            }
            Err(err) => {
                warn!(error = %err, "exit rejected, position stays open");
                *self.slot_mut(side) = Some(order.tag);
            }
        }
    }
}

impl SignalConsumer for OrderManager {
    fn name(&self) -> &str {
        "orders"
    }

    /// Entries first, then exits.
    fn consume(&mut self, bar: &Bar, result: &SignalResult) {
        if let Some(signal) = result.entry.filter(Signal::is_entry) {
            self.enter(signal, bar);
        }
        if let Some(signal) = result.exit.filter(Signal::is_exit) {
            self.exit(signal, bar);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::make_bars;

    fn entry(signal: Signal) -> SignalResult {
        SignalResult {
            entry: Some(signal),
            ..SignalResult::empty()
        }
    }

    fn exit(signal: Signal) -> SignalResult {
        SignalResult {
            exit: Some(signal),
            ..SignalResult::empty()
        }
    }

    fn paper(name: &str) -> OrderManager {
        OrderManager::new(name, Box::new(PaperGateway::new()))
    }

    struct RejectingGateway;

    impl OrderGateway for RejectingGateway {
        fn submit_entry(&mut self, order: &EntryOrder) -> Result<(), GatewayError> {
            Err(GatewayError::Rejected {
                tag: order.tag.clone(),
                reason: "closed".into(),
            })
        }

        fn submit_exit(&mut self, order: &ExitOrder) -> Result<(), GatewayError> {
            Err(GatewayError::Rejected {
                tag: order.tag.clone(),
                reason: "closed".into(),
            })
        }
    }

    #[test]
    fn second_long_entry_is_ignored() {
        let bars = make_bars(&[100.0, 101.0]);
        let mut om = paper("t");
        om.consume(&bars[0], &entry(Signal::LongEntry));
        let first = om.open_tag(Side::Long).cloned().unwrap();
        om.consume(&bars[1], &entry(Signal::LongEntry));

        assert_eq!(om.ledger().len(), 1);
        assert_eq!(om.open_tag(Side::Long), Some(&first));
    }

    #[test]
    fn exit_then_reentry_uses_new_tag() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);
        let mut om = paper("t");
        om.consume(&bars[0], &entry(Signal::LongEntry));
        let first = om.open_tag(Side::Long).cloned().unwrap();

        om.consume(&bars[1], &exit(Signal::LongExit));
        assert!(!om.is_open(Side::Long));

        om.consume(&bars[2], &entry(Signal::LongEntry));
        let second = om.open_tag(Side::Long).cloned().unwrap();
        assert_ne!(first, second);
        assert_eq!(om.ledger().len(), 3);

        match &om.ledger()[1] {
            OrderEvent::Exited(x) => {
                assert_eq!(x.tag, first);
                assert_eq!(x.action, OrderAction::Sell);
            }
            other => panic!("expected exit, got {other:?}"),
        }
    }

    #[test]
    fn exit_without_position_is_noop() {
        let bars = make_bars(&[100.0]);
        let mut om = paper("t");
        om.consume(&bars[0], &exit(Signal::ShortExit));
        assert!(om.ledger().is_empty());
    }

    #[test]
    fn short_side_is_symmetric() {
        let bars = make_bars(&[100.0, 99.0]);
        let mut om = paper("t");
        om.consume(&bars[0], &entry(Signal::ShortEntry));
        assert!(om.is_open(Side::Short));
        assert!(!om.is_open(Side::Long));
        om.consume(&bars[1], &exit(Signal::ShortExit));
        assert!(!om.is_open(Side::Short));

        match &om.ledger()[0] {
            OrderEvent::Entered(e) => assert_eq!(e.action, OrderAction::SellShort),
            other => panic!("expected entry, got {other:?}"),
        }
        match &om.ledger()[1] {
            OrderEvent::Exited(x) => assert_eq!(x.action, OrderAction::BuyToCover),
            other => panic!("expected exit, got {other:?}"),
        }
    }

    #[test]
    fn entry_then_exit_on_same_bar() {
        let bars = make_bars(&[100.0, 101.0]);
        let mut om = paper("t");
        om.consume(&bars[0], &entry(Signal::ShortEntry));

        // Even-minute parity bar with both legs: open long, cover short.
        let both = SignalResult {
            entry: Some(Signal::LongEntry),
            exit: Some(Signal::ShortExit),
            ..SignalResult::empty()
        };
        om.consume(&bars[1], &both);
        assert!(om.is_open(Side::Long));
        assert!(!om.is_open(Side::Short));
        assert_eq!(om.ledger().len(), 3);
    }

    #[test]
    fn autopilot_off_submits_nothing() {
        let bars = make_bars(&[100.0]);
        let mut om = paper("t").with_autopilot(false);
        om.consume(&bars[0], &entry(Signal::LongEntry));
        assert!(!om.autopilot());
        assert!(!om.is_open(Side::Long));
        assert!(om.ledger().is_empty());
    }

    #[test]
    fn rejected_entry_leaves_side_free() {
        let bars = make_bars(&[100.0]);
        let mut om = OrderManager::new("t", Box::new(RejectingGateway));
        om.consume(&bars[0], &entry(Signal::LongEntry));
        assert!(!om.is_open(Side::Long));
        assert!(om.ledger().is_empty());
    }

    #[test]
    fn bracket_and_sizer_flow_into_entry() {
        let bars = make_bars(&[200.0]);
        let mut om = paper("t")
            .with_sizer(Box::new(FixedSizer::notional(1_000.0)))
            .with_bracket(Bracket::default());
        om.consume(&bars[0], &entry(Signal::LongEntry));

        match &om.ledger()[0] {
            OrderEvent::Entered(e) => {
                assert_eq!(e.quantity, 5.0);
                let levels = e.bracket.unwrap();
                assert!((levels.stop_loss - 198.0).abs() < 1e-9);
                assert!((levels.profit_target - 202.0).abs() < 1e-9);
            }
            other => panic!("expected entry, got {other:?}"),
        }
    }

    #[test]
    fn tag_carries_name_action_symbol() {
        let bars = make_bars(&[100.0]);
        let mut om = paper("parity");
        om.consume(&bars[0], &entry(Signal::LongEntry));
        let tag = om.open_tag(Side::Long).unwrap();
        assert!(tag.as_str().starts_with("parity_Buy_TEST_"));
    }

    #[test]
    fn paper_gateway_records_what_it_accepts() {
        let bars = make_bars(&[100.0, 101.0]);
        let gateway = PaperGateway::new();
        let mut om = OrderManager::new("t", Box::new(gateway.clone()));
        om.consume(&bars[0], &entry(Signal::LongEntry));
        om.consume(&bars[1], &exit(Signal::LongExit));

        let book = gateway.book();
        assert_eq!(gateway.submitted(), 2);
        assert_eq!(book.entries.len(), 1);
        assert_eq!(book.exits.len(), 1);
        assert_eq!(book.entries[0].action, OrderAction::Buy);
        assert_eq!(book.exits[0].action, OrderAction::Sell);
        assert_eq!(book.exits[0].tag, book.entries[0].tag);
    }

    #[test]
    fn signals_in_the_wrong_slot_are_ignored() {
        let bars = make_bars(&[100.0]);
        let gateway = PaperGateway::new();
        let mut om = OrderManager::new("t", Box::new(gateway.clone()));
        let swapped = SignalResult {
            entry: Some(Signal::LongExit),
            exit: Some(Signal::ShortEntry),
            ..SignalResult::empty()
        };
        om.consume(&bars[0], &swapped);
        om.consume(&bars[0], &entry(Signal::None));

        assert!(!om.is_open(Side::Long));
        assert!(!om.is_open(Side::Short));
        assert_eq!(gateway.submitted(), 0);
    }
}
