//! Controller configuration and builder.

use super::Controller;
use crate::providers::{CardSource, CashUnit, LedgerService};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Re-credit attempts made when a dispense fails after a debit.
pub const DEFAULT_COMPENSATION_ATTEMPTS: usize = 5;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid controller configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunable controller behaviour.
///
/// # Example
///
/// ```rust
/// use atm_controller::ControllerConfig;
///
/// let config = ControllerConfig::from_json(r#"{ "compensation_attempts": 3 }"#).unwrap();
/// assert_eq!(config.compensation_attempts(), 3);
///
/// let config = ControllerConfig::from_json("{}").unwrap();
/// assert_eq!(config.compensation_attempts(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    compensation_attempts: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            compensation_attempts: DEFAULT_COMPENSATION_ATTEMPTS,
        }
    }
}

impl ControllerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Re-credit attempt bound, never less than one.
    pub fn compensation_attempts(&self) -> usize {
        self.compensation_attempts.max(1)
    }

    pub fn with_compensation_attempts(mut self, attempts: usize) -> Self {
        self.compensation_attempts = attempts;
        self
    }
}

/// Builder for a [`Controller`].
///
/// The card source and ledger are required up front; a cash unit and
/// configuration are optional.
pub struct ControllerBuilder {
    card_source: Box<dyn CardSource>,
    ledger: Box<dyn LedgerService>,
    cash_unit: Option<Box<dyn CashUnit>>,
    config: ControllerConfig,
}

impl ControllerBuilder {
    pub fn new(
        card_source: impl CardSource + 'static,
        ledger: impl LedgerService + 'static,
    ) -> Self {
        Self {
            card_source: Box::new(card_source),
            ledger: Box::new(ledger),
            cash_unit: None,
            config: ControllerConfig::default(),
        }
    }

    /// Route deposits and withdrawals through a physical cash unit
    pub fn cash_unit(mut self, unit: impl CashUnit + 'static) -> Self {
        self.cash_unit = Some(Box::new(unit));
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the re-credit attempt bound
    pub fn compensation_attempts(mut self, attempts: usize) -> Self {
        self.config = self.config.with_compensation_attempts(attempts);
        self
    }

    /// Build the controller with a fresh, empty session
    pub fn build(self) -> Controller {
        Controller::from_parts(self.card_source, self.ledger, self.cash_unit, self.config)
    }
}
