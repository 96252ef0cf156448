//! Session configuration (TOML).
//!
//! One `SessionConfig` describes one rule instance with its parameters and
//! the consumers fed from it. Parameters are fixed for the life of the
//! session; a different parameter set means a different session.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::consumers::{
    Bracket, ConditionConsumer, DisplayConsumer, ExitPlotConvention, OrderGateway, OrderManager,
};
use crate::domain::Periodicity;
use crate::rules::{CrossoverDetector, ParityTimer, RuleSwitches, SignalRule};
use crate::session::SignalSession;
use crate::sizers::FixedSizer;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

fn yes() -> bool {
    true
}

fn default_fast() -> usize {
    CrossoverDetector::DEFAULT_FAST
}

fn default_slow() -> usize {
    CrossoverDetector::DEFAULT_SLOW
}

/// Which rule a session runs, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleConfig {
    SmaCrossover {
        #[serde(default = "default_fast")]
        fast_window: usize,
        #[serde(default = "default_slow")]
        slow_window: usize,
        #[serde(default = "yes")]
        long_enabled: bool,
        #[serde(default = "yes")]
        short_enabled: bool,
    },
    Parity {
        #[serde(default = "yes")]
        long_enabled: bool,
        #[serde(default = "yes")]
        short_enabled: bool,
    },
}

impl RuleConfig {
    pub fn build(&self) -> Box<dyn SignalRule> {
        match *self {
            RuleConfig::SmaCrossover {
                fast_window,
                slow_window,
                long_enabled,
                short_enabled,
            } => Box::new(CrossoverDetector::new(
                fast_window,
                slow_window,
                RuleSwitches::new(long_enabled, short_enabled),
            )),
            RuleConfig::Parity {
                long_enabled,
                short_enabled,
            } => Box::new(ParityTimer::new(RuleSwitches::new(
                long_enabled,
                short_enabled,
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default)]
    pub exit_convention: ExitPlotConvention,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exit_convention: ExitPlotConvention::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionConfig {
    #[serde(default = "yes")]
    pub enabled: bool,
}

impl Default for ConditionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Position sizer configuration (serializable enum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SizerConfig {
    /// Fixed number of shares per position.
    Shares { quantity: f64 },

    /// Fixed dollar amount per position.
    Notional { amount: f64 },
}

impl Default for SizerConfig {
    fn default() -> Self {
        Self::Shares { quantity: 1.0 }
    }
}

impl SizerConfig {
    pub fn build(&self) -> FixedSizer {
        match *self {
            SizerConfig::Shares { quantity } => FixedSizer::shares(quantity),
            SizerConfig::Notional { amount } => FixedSizer::notional(amount),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdersConfig {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "yes")]
    pub autopilot: bool,
    #[serde(default)]
    pub sizer: SizerConfig,
    #[serde(default)]
    pub bracket: Option<Bracket>,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            autopilot: true,
            sizer: SizerConfig::default(),
            bracket: None,
        }
    }
}

/// Full session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub name: String,
    pub rule: RuleConfig,
    #[serde(default)]
    pub periodicity: Periodicity,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub condition: ConditionConfig,
    #[serde(default)]
    pub orders: OrdersConfig,
}

impl SessionConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Reject parameter sets that cannot build a session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".into()));
        }

        if let RuleConfig::SmaCrossover {
            fast_window,
            slow_window,
            ..
        } = self.rule
        {
            if fast_window == 0 || slow_window == 0 {
                return Err(ConfigError::Invalid(format!(
                    "windows must be >= 1 (fast {fast_window}, slow {slow_window})"
                )));
            }
            if fast_window.max(slow_window) > CrossoverDetector::MAX_WINDOW {
                return Err(ConfigError::Invalid(format!(
                    "windows must be <= {} (fast {fast_window}, slow {slow_window})",
                    CrossoverDetector::MAX_WINDOW
                )));
            }
            if fast_window >= slow_window {
                warn!(
                    fast_window,
                    slow_window, "fast window is not shorter than slow window; signals are inverted"
                );
            }
        }

        if self.periodicity.value == 0 {
            return Err(ConfigError::Invalid("periodicity value must be >= 1".into()));
        }

        match self.orders.sizer {
            SizerConfig::Shares { quantity } if quantity.is_nan() || quantity <= 0.0 => {
                return Err(ConfigError::Invalid(format!(
                    "sizer quantity must be > 0, got {quantity}"
                )));
            }
            SizerConfig::Notional { amount } if amount.is_nan() || amount <= 0.0 => {
                return Err(ConfigError::Invalid(format!(
                    "sizer amount must be > 0, got {amount}"
                )));
            }
            _ => {}
        }

        if let Some(b) = self.orders.bracket {
            let valid = |pct: f64| pct.is_finite() && pct >= 0.0;
            if !valid(b.stop_loss_pct) || !valid(b.profit_target_pct) {
                return Err(ConfigError::Invalid(
                    "bracket percentages must be >= 0".into(),
                ));
            }
        }

        Ok(())
    }

    /// Build a session with the configured rule and consumers.
    pub fn build_session(
        &self,
        gateway: Box<dyn OrderGateway>,
    ) -> Result<SignalSession, ConfigError> {
        self.validate()?;

        let mut session = SignalSession::new(&self.name, self.rule.build(), self.periodicity);

        if self.display.enabled {
            session = session.with_display(DisplayConsumer::new(self.display.exit_convention));
        }
        if self.condition.enabled {
            session = session.with_condition(ConditionConsumer::new());
        }
        if self.orders.enabled {
            let mut orders = OrderManager::new(&self.name, gateway)
                .with_sizer(Box::new(self.orders.sizer.build()))
                .with_autopilot(self.orders.autopilot);
            if let Some(bracket) = self.orders.bracket {
                orders = orders.with_bracket(bracket);
            }
            session = session.with_orders(orders);
        }

        Ok(session)
    }
}
