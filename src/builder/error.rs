//! Build errors for navigation instrumentation.

use crate::config::ConfigViolation;
use thiserror::Error;

/// Errors that can occur when building the instrumentation.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Transaction factory not specified. Call .tracer(factory) before .build()")]
    MissingTransactionFactory,

    #[error("Scheduler not specified. Call .scheduler(scheduler) before .build()")]
    MissingScheduler,

    #[error("Invalid instrumentation options: {0:?}")]
    InvalidOptions(Vec<ConfigViolation>),
}
