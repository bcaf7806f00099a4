//! Instrumentation options.
//!
//! Options deserialize from the camelCase JSON hosts already use
//! (`{"routeChangeTimeoutMs": 1000}`); every field has a default. Validation
//! uses Stillwater's `Validation` so every problem is reported at once.

use crate::core::{DEFAULT_INSTRUMENTATION_NAME, DEFAULT_LEDGER_CAPACITY};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Default wait between a dispatch and discarding its transaction.
pub const DEFAULT_ROUTE_CHANGE_TIMEOUT_MS: u64 = 1000;

/// A single invalid option.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("routeChangeTimeoutMs must be greater than zero")]
    ZeroTimeout,

    #[error("ledgerCapacity must be greater than zero")]
    ZeroLedgerCapacity,

    #[error("decorationBudgetMs must be greater than zero when set")]
    ZeroDecorationBudget,

    #[error("instrumentationName must not be empty")]
    EmptyInstrumentationName,
}

/// Errors loading options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse instrumentation options: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid instrumentation options: {}", format_violations(.0))]
    Invalid(Vec<ConfigViolation>),
}

fn format_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Options recognized by the instrumentation.
///
/// # Example
///
/// ```rust
/// use navspan::config::InstrumentationOptions;
/// use std::time::Duration;
///
/// let options = InstrumentationOptions::from_json(r#"{"routeChangeTimeoutMs": 250}"#).unwrap();
/// assert_eq!(options.route_change_timeout(), Duration::from_millis(250));
/// assert_eq!(options.ledger_capacity, 200);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentationOptions {
    /// How long a dispatched transaction waits for its route
    pub route_change_timeout_ms: u64,

    /// Number of route keys remembered for `hasBeenSeen`
    pub ledger_capacity: usize,

    /// Log a warning when the decoration hook runs longer than this
    pub decoration_budget_ms: Option<u64>,

    /// Value of the `routing.instrumentation` tag
    pub instrumentation_name: String,
}

impl Default for InstrumentationOptions {
    fn default() -> Self {
        Self {
            route_change_timeout_ms: DEFAULT_ROUTE_CHANGE_TIMEOUT_MS,
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
            decoration_budget_ms: None,
            instrumentation_name: DEFAULT_INSTRUMENTATION_NAME.to_string(),
        }
    }
}

impl InstrumentationOptions {
    /// Parse and validate options from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validated()
    }

    pub fn route_change_timeout(&self) -> Duration {
        Duration::from_millis(self.route_change_timeout_ms)
    }

    pub fn decoration_budget(&self) -> Option<Duration> {
        self.decoration_budget_ms.map(Duration::from_millis)
    }

    /// Check every option, accumulating all violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        let checks: Vec<Validation<(), NonEmptyVec<ConfigViolation>>> = vec![
            check(self.route_change_timeout_ms > 0, ConfigViolation::ZeroTimeout),
            check(self.ledger_capacity > 0, ConfigViolation::ZeroLedgerCapacity),
            check(
                self.decoration_budget_ms != Some(0),
                ConfigViolation::ZeroDecorationBudget,
            ),
            check(
                !self.instrumentation_name.is_empty(),
                ConfigViolation::EmptyInstrumentationName,
            ),
        ];

        Validation::all_vec(checks).map(|_| ())
    }

    /// `validate` as a `Result`, returning the options on success.
    pub fn validated(self) -> Result<Self, ConfigError> {
        match self.validate() {
            Validation::Success(_) => Ok(self),
            Validation::Failure(violations) => Err(ConfigError::Invalid(
                violations.iter().cloned().collect(),
            )),
        }
    }
}

fn check(
    passes: bool,
    violation: ConfigViolation,
) -> Validation<(), NonEmptyVec<ConfigViolation>> {
    if passes {
        Validation::success(())
    } else {
        Validation::fail(violation)
    }
}
