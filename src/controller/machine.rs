//! Navigation transaction controller.

use crate::adapter::NavigationContainer;
use crate::config::InstrumentationOptions;
use crate::controller::outcome::{DiscardOutcome, Phase, StateChangeOutcome};
use crate::core::{
    blank_transaction_context, route_change_context, Route, RouteDecorator, RouteHistoryLedger,
};
use crate::timer::{Scheduler, TimerId};
use crate::transaction::{Transaction, TransactionFactory};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// A dispatched transaction owned by the controller.
struct PendingTransaction<T> {
    /// Identity the discard timer is bound to
    generation: u64,
    transaction: T,
    timer: Option<TimerId>,
    /// Route context was applied but sampling was vetoed
    route_attached: bool,
}

struct ControllerState<T> {
    pending: Option<PendingTransaction<T>>,
    // Replaced by a newer dispatch while their timer was still armed.
    superseded: HashMap<u64, PendingTransaction<T>>,
    latest_route: Option<Route>,
    container: Option<Arc<dyn NavigationContainer>>,
    ledger: RouteHistoryLedger,
    next_generation: u64,
    bootstrapped: bool,
    initial_handled: bool,
}

struct Shared<F: TransactionFactory> {
    factory: F,
    scheduler: Arc<dyn Scheduler>,
    decorator: RouteDecorator,
    options: InstrumentationOptions,
    state: Mutex<ControllerState<F::Transaction>>,
}

/// State machine turning dispatch and state-change events into
/// route-annotated transactions.
///
/// Every handler locks the controller's state and runs to completion, so
/// handlers, timer callbacks and queries are serialized no matter which
/// thread delivers them. Cloning yields another handle to the same
/// controller.
///
/// # Example
///
/// ```rust
/// use navspan::config::InstrumentationOptions;
/// use navspan::controller::{NavigationController, Phase};
/// use navspan::core::RouteDecorator;
/// use navspan::timer::ManualScheduler;
/// use navspan::transaction::InMemoryTracer;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let tracer = InMemoryTracer::new();
/// let scheduler = Arc::new(ManualScheduler::new());
/// let controller = NavigationController::new(
///     tracer.clone(),
///     scheduler.clone(),
///     RouteDecorator::identity(),
///     InstrumentationOptions::default(),
/// );
///
/// controller.on_dispatch();
/// assert_eq!(controller.phase(), Phase::AwaitingRoute);
///
/// // No state change arrives in time.
/// scheduler.advance(Duration::from_millis(1000));
/// assert_eq!(controller.phase(), Phase::Idle);
/// assert!(tracer.last().unwrap().is_unsampled());
/// ```
pub struct NavigationController<F: TransactionFactory> {
    shared: Arc<Shared<F>>,
}

impl<F: TransactionFactory> Clone for NavigationController<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: TransactionFactory> NavigationController<F> {
    /// Create an idle controller.
    pub fn new(
        factory: F,
        scheduler: Arc<dyn Scheduler>,
        decorator: RouteDecorator,
        options: InstrumentationOptions,
    ) -> Self {
        let state = ControllerState {
            pending: None,
            superseded: HashMap::new(),
            latest_route: None,
            container: None,
            ledger: RouteHistoryLedger::with_capacity(options.ledger_capacity),
            next_generation: 0,
            bootstrapped: false,
            initial_handled: false,
        };

        Self {
            shared: Arc::new(Shared {
                factory,
                scheduler,
                decorator,
                options,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn options(&self) -> &InstrumentationOptions {
        &self.shared.options
    }

    /// Start a new transaction and arm its discard timer.
    ///
    /// A transaction still pending from an earlier dispatch is replaced, not
    /// closed; its own timer later discards it.
    pub fn on_dispatch(&self) {
        let mut state = self.shared.state.lock();
        self.dispatch_locked(&mut state);
    }

    /// Attach the container's current route to the pending transaction.
    pub fn on_state_change(&self) -> StateChangeOutcome {
        let mut state = self.shared.state.lock();
        self.state_change_locked(&mut state)
    }

    /// Mark the pending transaction unsampled and finish it.
    ///
    /// Calling this with nothing pending has no effect.
    pub fn discard(&self) -> DiscardOutcome {
        let mut state = self.shared.state.lock();
        match state.pending.take() {
            Some(mut pending) => {
                if let Some(timer) = pending.timer.take() {
                    self.shared.scheduler.cancel(timer);
                }
                close_unsampled(pending);
                DiscardOutcome::Discarded
            }
            None => DiscardOutcome::Nothing,
        }
    }

    /// Make sure a transaction exists before the first route mounts.
    ///
    /// Dispatches once; when a container is already registered the initial
    /// route is attached right away. Returns `false` if setup already ran.
    pub fn setup(&self) -> bool {
        let mut state = self.shared.state.lock();
        if state.bootstrapped {
            debug!("navigation instrumentation already set up");
            return false;
        }
        state.bootstrapped = true;

        self.dispatch_locked(&mut state);
        if state.container.is_some() {
            self.state_change_locked(&mut state);
            state.initial_handled = true;
        }
        true
    }

    /// Use `container` to look up the current route.
    pub fn set_container(&self, container: Arc<dyn NavigationContainer>) {
        self.shared.state.lock().container = Some(container);
    }

    pub fn has_container(&self) -> bool {
        self.shared.state.lock().container.is_some()
    }

    /// Attach the initial route to the bootstrap transaction if setup ran
    /// before a container was available.
    pub(crate) fn handle_initial_state(&self) -> Option<StateChangeOutcome> {
        let mut state = self.shared.state.lock();
        if !state.bootstrapped || state.initial_handled || state.pending.is_none() {
            return None;
        }

        let outcome = self.state_change_locked(&mut state);
        state.initial_handled = true;
        Some(outcome)
    }

    pub fn phase(&self) -> Phase {
        match &self.shared.state.lock().pending {
            None => Phase::Idle,
            Some(pending) if pending.route_attached => Phase::AwaitingDiscard,
            Some(_) => Phase::AwaitingRoute,
        }
    }

    /// Whether the pending transaction has an armed discard timer.
    pub fn has_pending_timer(&self) -> bool {
        self.shared
            .state
            .lock()
            .pending
            .as_ref()
            .is_some_and(|pending| pending.timer.is_some())
    }

    /// Replaced transactions still waiting for their own discard timer.
    pub fn superseded_count(&self) -> usize {
        self.shared.state.lock().superseded.len()
    }

    pub fn latest_route(&self) -> Option<Route> {
        self.shared.state.lock().latest_route.clone()
    }

    /// Whether `key` is among the recently seen route keys.
    pub fn has_seen(&self, key: &str) -> bool {
        self.shared.state.lock().ledger.seen(key)
    }

    pub fn initial_handled(&self) -> bool {
        self.shared.state.lock().initial_handled
    }

    fn dispatch_locked(&self, state: &mut ControllerState<F::Transaction>) {
        let context = blank_transaction_context(&self.shared.options.instrumentation_name);
        let transaction = self.shared.factory.start_transaction(context);

        let generation = state.next_generation;
        state.next_generation += 1;

        if let Some(previous) = state.pending.take() {
            if previous.timer.is_some() {
                debug!(
                    superseded = previous.generation,
                    generation, "pending navigation transaction superseded"
                );
                state.superseded.insert(previous.generation, previous);
            }
        }

        let timer = self.arm_discard_timer(generation);
        state.pending = Some(PendingTransaction {
            generation,
            transaction,
            timer: Some(timer),
            route_attached: false,
        });
        debug!(generation, "navigation transaction started");
    }

    fn state_change_locked(&self, state: &mut ControllerState<F::Transaction>) -> StateChangeOutcome {
        let Some(container) = state.container.clone() else {
            warn!("state change ignored: no navigation container registered");
            return StateChangeOutcome::NoContainer;
        };
        let Some(route) = container.current_route() else {
            debug!("state change ignored: container has no current route");
            return StateChangeOutcome::NoRoute;
        };

        let route_changed = state
            .latest_route
            .as_ref()
            .is_none_or(|previous| route.differs_from(previous));
        let has_been_seen = state.ledger.seen(&route.key);

        let outcome = match state.pending.as_mut() {
            None => StateChangeOutcome::NoPendingTransaction,
            Some(_) if !route_changed => StateChangeOutcome::RouteUnchanged,
            Some(pending) if pending.route_attached => StateChangeOutcome::RouteAlreadyAttached,
            Some(pending) => {
                self.decorate(pending, &route, state.latest_route.as_ref(), has_been_seen)
            }
        };

        if let StateChangeOutcome::Finalized(_) = outcome {
            // Handed over to the tracing runtime, which finishes it.
            state.pending = None;
        }

        state.ledger.record(route.key.clone());
        state.latest_route = Some(route);
        outcome
    }

    fn decorate(
        &self,
        pending: &mut PendingTransaction<F::Transaction>,
        route: &Route,
        previous: Option<&Route>,
        has_been_seen: bool,
    ) -> StateChangeOutcome {
        let updated = route_change_context(
            pending.transaction.context(),
            route,
            previous,
            has_been_seen,
        );

        let started = Instant::now();
        let decorated = panic::catch_unwind(AssertUnwindSafe(|| {
            self.shared.decorator.apply(updated.clone())
        }))
        .unwrap_or_else(|_| {
            error!(route = %route.name, "route decoration hook panicked");
            None
        });
        let elapsed = started.elapsed();
        if let Some(budget) = self.shared.options.decoration_budget() {
            if elapsed > budget {
                warn!(
                    route = %route.name,
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                    "route decoration hook exceeded its time budget"
                );
            }
        }

        let (context, hook_returned) = match decorated {
            Some(context) => (context, true),
            None => {
                error!(
                    route = %route.name,
                    "route decoration hook returned no context; transaction will not be sent"
                );
                (updated.unsampled(), false)
            }
        };

        pending.route_attached = true;
        let vetoed = context.is_vetoed();
        if vetoed {
            info!(
                route = %route.name,
                generation = pending.generation,
                "navigation transaction will not be sampled"
            );
        } else if let Some(timer) = pending.timer.take() {
            self.shared.scheduler.cancel(timer);
        }

        pending.transaction.update_with_context(context.clone());
        debug!(
            route = %route.name,
            key = %route.key,
            has_been_seen,
            "route context applied to navigation transaction"
        );

        match (hook_returned, vetoed) {
            (false, _) => StateChangeOutcome::HookReturnedNothing(context),
            (true, true) => StateChangeOutcome::Vetoed(context),
            (true, false) => StateChangeOutcome::Finalized(context),
        }
    }

    fn arm_discard_timer(&self, generation: u64) -> TimerId {
        let shared: Weak<Shared<F>> = Arc::downgrade(&self.shared);
        self.shared.scheduler.schedule(
            self.shared.options.route_change_timeout(),
            Box::new(move || {
                if let Some(shared) = shared.upgrade() {
                    NavigationController { shared }.discard_expired(generation);
                }
            }),
        )
    }

    /// Timer callback: discard the transaction this timer was armed for.
    fn discard_expired(&self, generation: u64) -> DiscardOutcome {
        let mut state = self.shared.state.lock();
        let is_current = state
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == generation);

        let expired = if is_current {
            state.pending.take()
        } else {
            state.superseded.remove(&generation)
        };

        match expired {
            Some(mut pending) => {
                pending.timer = None;
                debug!(generation, "navigation transaction timed out");
                close_unsampled(pending);
                DiscardOutcome::Discarded
            }
            None => DiscardOutcome::Nothing,
        }
    }
}

fn close_unsampled<T: Transaction>(mut pending: PendingTransaction<T>) {
    pending.transaction.set_sampled(false);
    pending.transaction.finish();
    debug!(
        generation = pending.generation,
        "navigation transaction discarded"
    );
}

impl<F: TransactionFactory> std::fmt::Debug for NavigationController<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("NavigationController")
            .field("pending", &state.pending.as_ref().map(|p| p.generation))
            .field("superseded", &state.superseded.len())
            .field("latest_route", &state.latest_route)
            .field("has_container", &state.container.is_some())
            .finish()
    }
}
