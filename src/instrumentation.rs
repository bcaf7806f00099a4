//! Entry point tying a controller to its registration token.

use crate::adapter::{register, ContainerRef, RegisterOutcome, Registration};
use crate::builder::InstrumentationBuilder;
use crate::controller::NavigationController;
use crate::transaction::TransactionFactory;
use std::sync::Arc;

/// Navigation instrumentation as handed to applications.
///
/// # Example
///
/// ```rust
/// use navspan::instrumentation::NavigationInstrumentation;
/// use navspan::timer::ManualScheduler;
/// use navspan::transaction::InMemoryTracer;
/// use std::sync::Arc;
///
/// let tracer = InMemoryTracer::new();
/// let instrumentation = NavigationInstrumentation::builder()
///     .tracer(tracer.clone())
///     .scheduler(Arc::new(ManualScheduler::new()))
///     .build()
///     .unwrap();
///
/// // A transaction exists before the first route mounts.
/// instrumentation.setup();
/// assert_eq!(tracer.len(), 1);
/// ```
pub struct NavigationInstrumentation<F: TransactionFactory> {
    controller: NavigationController<F>,
    registration: Arc<Registration>,
}

impl<F: TransactionFactory> Clone for NavigationInstrumentation<F> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            registration: Arc::clone(&self.registration),
        }
    }
}

impl<F: TransactionFactory> NavigationInstrumentation<F> {
    pub fn builder() -> InstrumentationBuilder<F> {
        InstrumentationBuilder::new()
    }

    pub(crate) fn new(controller: NavigationController<F>, registration: Arc<Registration>) -> Self {
        Self {
            controller,
            registration,
        }
    }

    /// Create the bootstrap transaction; see [`NavigationController::setup`].
    pub fn setup(&self) -> bool {
        self.controller.setup()
    }

    /// Attach to a navigation container, once per registration token.
    pub fn register_navigation_container(
        &self,
        container: impl Into<ContainerRef>,
    ) -> RegisterOutcome {
        register(&self.controller, &container.into(), &self.registration)
    }

    pub fn controller(&self) -> &NavigationController<F> {
        &self.controller
    }

    pub fn registration(&self) -> &Arc<Registration> {
        &self.registration
    }
}

impl<F: TransactionFactory> std::fmt::Debug for NavigationInstrumentation<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationInstrumentation")
            .field("controller", &self.controller)
            .field("registered", &self.registration.is_registered())
            .finish()
    }
}
