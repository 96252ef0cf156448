//! Signal session — one rule, its consumers, and per-session diagnostics.
//!
//! Per bar:
//! 1. Periodicity guard (skip the bar while the feed resolution is unsuitable)
//! 2. Rule evaluation (exactly once)
//! 3. Fan-out of the shared result to display, condition and orders
//!
//! Every failure degrades to "no signal this bar". Warnings and alerts are
//! logged on first occurrence only; later repeats go to `debug!`.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::consumers::{ConditionConsumer, DisplayConsumer, OrderManager, SignalConsumer};
use crate::domain::{Bar, Periodicity, SignalResult};
use crate::error::EngineError;
use crate::rules::SignalRule;

/// What happened to one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BarOutcome {
    /// Rule ran and every consumer saw the result.
    Evaluated { result: SignalResult },
    /// Rule is still accumulating history.
    WarmingUp { required: usize, available: usize },
    /// Feed resolution unsuitable for the rule; evaluation skipped.
    InvalidPeriodicity { periodicity: Periodicity },
    /// Rule failed after warmup; no consumer ran.
    Failed { reason: String },
}

impl BarOutcome {
    pub fn result(&self) -> Option<&SignalResult> {
        match self {
            BarOutcome::Evaluated { result } => Some(result),
            _ => None,
        }
    }
}

/// One-time diagnostic flags, cleared by `SignalSession::reset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub warning_occurred: bool,
    pub error_occurred: bool,
}

/// Running counters for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub bars: usize,
    pub evaluated: usize,
    pub skipped: usize,
    pub entries: usize,
    pub exits: usize,
}

pub struct SignalSession {
    name: String,
    rule: Box<dyn SignalRule>,
    periodicity: Periodicity,
    display: Option<DisplayConsumer>,
    condition: Option<ConditionConsumer>,
    orders: Option<OrderManager>,
    diagnostics: Diagnostics,
    stats: SessionStats,
    /// Bars handed to the rule since the last reset.
    fed: usize,
}

impl SignalSession {
    pub fn new(name: impl Into<String>, rule: Box<dyn SignalRule>, periodicity: Periodicity) -> Self {
        Self {
            name: name.into(),
            rule,
            periodicity,
            display: None,
            condition: None,
            orders: None,
            diagnostics: Diagnostics::default(),
            stats: SessionStats::default(),
            fed: 0,
        }
    }

    pub fn with_display(mut self, display: DisplayConsumer) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_condition(mut self, condition: ConditionConsumer) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_orders(mut self, orders: OrderManager) -> Self {
        self.orders = Some(orders);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule(&self) -> &dyn SignalRule {
        self.rule.as_ref()
    }

    pub fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    /// The host may switch feed resolution mid-session.
    pub fn set_periodicity(&mut self, periodicity: Periodicity) {
        self.periodicity = periodicity;
    }

    pub fn display(&self) -> Option<&DisplayConsumer> {
        self.display.as_ref()
    }

    pub fn condition(&self) -> Option<&ConditionConsumer> {
        self.condition.as_ref()
    }

    pub fn orders(&self) -> Option<&OrderManager> {
        self.orders.as_ref()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Start a new session: clear rule history, diagnostics and counters.
    /// Consumers keep their output and open positions.
    pub fn reset(&mut self) {
        self.rule.reset();
        self.diagnostics = Diagnostics::default();
        self.stats = SessionStats::default();
        self.fed = 0;
    }

    /// Process one bar.
    pub fn on_bar(&mut self, bar: &Bar) -> BarOutcome {
        self.stats.bars += 1;

        if !self.rule.periodicity_is_valid(&self.periodicity) {
            self.stats.skipped += 1;
            let err = EngineError::InvalidPeriodicity(self.periodicity);
            self.warn_once(&err);
            return BarOutcome::InvalidPeriodicity {
                periodicity: self.periodicity,
            };
        }

        self.fed += 1;
        let result = match self.rule.calculate(bar) {
            Ok(result) => result,
            Err(EngineError::InsufficientData { .. }) if self.fed < self.rule.bars_required() => {
                self.stats.skipped += 1;
                let required = self.rule.bars_required();
                let available = self.fed;
                debug!(session = %self.name, required, available, "warming up");
                return BarOutcome::WarmingUp {
                    required,
                    available,
                };
            }
            Err(err) => {
                self.stats.skipped += 1;
                self.alert_once(&err);
                return BarOutcome::Failed {
                    reason: err.to_string(),
                };
            }
        };

        self.stats.evaluated += 1;
        if result.entry.is_some() {
            self.stats.entries += 1;
        }
        if result.exit.is_some() {
            self.stats.exits += 1;
        }

        for consumer in self.consumers_mut() {
            consumer.consume(bar, &result);
        }

        BarOutcome::Evaluated { result }
    }

    fn consumers_mut(&mut self) -> Vec<&mut dyn SignalConsumer> {
        let mut out: Vec<&mut dyn SignalConsumer> = Vec::with_capacity(3);
        if let Some(display) = self.display.as_mut() {
            out.push(display);
        }
        if let Some(condition) = self.condition.as_mut() {
            out.push(condition);
        }
        if let Some(orders) = self.orders.as_mut() {
            out.push(orders);
        }
        out
    }

    fn warn_once(&mut self, err: &EngineError) {
        if self.diagnostics.warning_occurred {
            debug!(session = %self.name, error = %err, "repeat warning suppressed");
            return;
        }
        self.diagnostics.warning_occurred = true;
        warn!(
            session = %self.name,
            rule = self.rule.name(),
            error = %err,
            "periodicity of the data feed is unsuitable for this rule"
        );
    }

    fn alert_once(&mut self, err: &EngineError) {
        if self.diagnostics.error_occurred {
            debug!(session = %self.name, error = %err, "repeat alert suppressed");
            return;
        }
        self.diagnostics.error_occurred = true;
        error!(
            session = %self.name,
            rule = self.rule.name(),
            error = %err,
            "a problem occurred during the calculation"
        );
    }
}
