//! Builder for navigation instrumentation.

use crate::adapter::Registration;
use crate::builder::error::BuildError;
use crate::config::{ConfigError, InstrumentationOptions};
use crate::controller::NavigationController;
use crate::core::{RouteDecorator, TransactionContext};
use crate::instrumentation::NavigationInstrumentation;
use crate::timer::Scheduler;
use crate::transaction::TransactionFactory;
use std::sync::Arc;
use std::time::Duration;
use stillwater::validation::Validation;

/// Builder for [`NavigationInstrumentation`] with a fluent API.
pub struct InstrumentationBuilder<F: TransactionFactory> {
    factory: Option<F>,
    scheduler: Option<Arc<dyn Scheduler>>,
    decorator: Option<RouteDecorator>,
    options: InstrumentationOptions,
    registration: Option<Arc<Registration>>,
}

impl<F: TransactionFactory> InstrumentationBuilder<F> {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            factory: None,
            scheduler: None,
            decorator: None,
            options: InstrumentationOptions::default(),
            registration: None,
        }
    }

    /// Set the tracing runtime that creates transactions (required).
    pub fn tracer(mut self, factory: F) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Set the scheduler driving discard timers (required).
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Set the decoration hook (optional, defaults to identity).
    pub fn decorator(mut self, decorator: RouteDecorator) -> Self {
        self.decorator = Some(decorator);
        self
    }

    /// Set the decoration hook using a closure (optional).
    pub fn decorate<H>(mut self, hook: H) -> Self
    where
        H: Fn(TransactionContext) -> Option<TransactionContext> + Send + Sync + 'static,
    {
        self.decorator = Some(RouteDecorator::new(hook));
        self
    }

    /// Replace all options.
    pub fn options(mut self, options: InstrumentationOptions) -> Self {
        self.options = options;
        self
    }

    /// Load options from JSON.
    pub fn options_json(mut self, json: &str) -> Result<Self, ConfigError> {
        self.options = InstrumentationOptions::from_json(json)?;
        Ok(self)
    }

    /// Set how long a dispatched transaction waits for its route.
    pub fn route_change_timeout(mut self, timeout: Duration) -> Self {
        self.options.route_change_timeout_ms =
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Share a registration token (optional, defaults to a fresh one).
    pub fn registration(mut self, registration: Arc<Registration>) -> Self {
        self.registration = Some(registration);
        self
    }

    /// Guard listener registration with the process-wide token.
    pub fn process_wide_registration(self) -> Self {
        self.registration(Registration::process_wide())
    }

    /// Build the instrumentation.
    /// Returns an error if required parts are missing or options are invalid.
    pub fn build(self) -> Result<NavigationInstrumentation<F>, BuildError> {
        let factory = self.factory.ok_or(BuildError::MissingTransactionFactory)?;
        let scheduler = self.scheduler.ok_or(BuildError::MissingScheduler)?;
        if let Validation::Failure(violations) = self.options.validate() {
            return Err(BuildError::InvalidOptions(
                violations.iter().cloned().collect(),
            ));
        }

        let controller = NavigationController::new(
            factory,
            scheduler,
            self.decorator.unwrap_or_default(),
            self.options,
        );
        let registration = self
            .registration
            .unwrap_or_else(|| Arc::new(Registration::new()));

        Ok(NavigationInstrumentation::new(controller, registration))
    }
}

impl<F: TransactionFactory> Default for InstrumentationBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}
