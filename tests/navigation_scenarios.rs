//! End-to-end navigation scenarios driven through a container's listeners.

use navspan::adapter::{
    ContainerRef, CurrentRef, Listener, NavigationContainer, NavigationEvent, RegisterOutcome,
    Registration,
};
use navspan::controller::Phase;
use navspan::core::{Route, ROUTE_NAME_TAG};
use navspan::instrumentation::NavigationInstrumentation;
use navspan::timer::ManualScheduler;
use navspan::transaction::InMemoryTracer;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct FakeRouter {
    listeners: Mutex<HashMap<NavigationEvent, Vec<Arc<dyn Fn() + Send + Sync>>>>,
    route: Mutex<Option<Route>>,
}

impl FakeRouter {
    fn emit(&self, event: NavigationEvent) {
        // Clone out so listeners run without the map locked.
        let listeners = self.listeners.lock().get(&event).cloned().unwrap_or_default();
        for listener in listeners {
            listener();
        }
    }

    fn navigate(&self, route: Route) {
        self.emit(NavigationEvent::Action);
        *self.route.lock() = Some(route);
        self.emit(NavigationEvent::State);
    }

    fn listener_count(&self) -> usize {
        self.listeners.lock().values().map(Vec::len).sum()
    }
}

impl NavigationContainer for FakeRouter {
    fn add_listener(&self, event: NavigationEvent, listener: Listener) {
        self.listeners
            .lock()
            .entry(event)
            .or_default()
            .push(Arc::from(listener));
    }

    fn current_route(&self) -> Option<Route> {
        self.route.lock().clone()
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` and return the log lines it emitted on this thread.
fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let lines = String::from_utf8_lossy(&buffer.0.lock())
        .lines()
        .map(str::to_string)
        .collect();
    (result, lines)
}

struct Harness {
    tracer: InMemoryTracer,
    scheduler: Arc<ManualScheduler>,
    router: Arc<FakeRouter>,
    instrumentation: NavigationInstrumentation<InMemoryTracer>,
}

fn harness() -> Harness {
    harness_with(|builder| builder)
}

fn harness_with(
    configure: impl FnOnce(
        navspan::InstrumentationBuilder<InMemoryTracer>,
    ) -> navspan::InstrumentationBuilder<InMemoryTracer>,
) -> Harness {
    let tracer = InMemoryTracer::new();
    let scheduler = Arc::new(ManualScheduler::new());
    let builder = NavigationInstrumentation::builder()
        .tracer(tracer.clone())
        .scheduler(scheduler.clone());
    let instrumentation = configure(builder).build().unwrap();

    let router = Arc::new(FakeRouter::default());
    let outcome = instrumentation
        .register_navigation_container(ContainerRef::Direct(router.clone()));
    assert_eq!(outcome, RegisterOutcome::Registered);

    Harness {
        tracer,
        scheduler,
        router,
        instrumentation,
    }
}

#[test]
fn dispatch_then_state_change_names_transaction() {
    let h = harness();

    h.router.navigate(Route::new("A", "k1"));

    let record = h.tracer.last().unwrap();
    assert_eq!(record.context.name, "A");
    assert_eq!(record.context.tags[ROUTE_NAME_TAG], "A");
    assert_eq!(record.context.data["route"]["key"], "k1");
    assert_eq!(record.context.data["route"]["hasBeenSeen"], false);
    assert_eq!(record.context.data["previousRoute"], json!(null));
    assert_eq!(h.scheduler.pending_timers(), 0);
    assert_eq!(h.instrumentation.controller().phase(), Phase::Idle);
}

#[test]
fn repeated_navigation_to_same_key_is_context_noop() {
    let h = harness();

    h.router.navigate(Route::new("A", "k1"));
    h.router.navigate(Route::new("A", "k1"));

    let records = h.tracer.transactions();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].updates, 0);
    assert_eq!(records[1].context.name, "Route Change");
    assert!(h.instrumentation.controller().has_seen("k1"));

    // The untouched second transaction is eventually discarded.
    h.scheduler.advance(Duration::from_millis(1000));
    let second = &h.tracer.transactions()[1];
    assert!(second.is_finished());
    assert!(second.is_unsampled());
}

#[test]
fn dispatch_without_state_change_times_out() {
    let h = harness();

    h.router.emit(NavigationEvent::Action);
    h.scheduler.advance(Duration::from_millis(999));
    assert!(!h.tracer.last().unwrap().is_finished());

    h.scheduler.advance(Duration::from_millis(1));
    let record = h.tracer.last().unwrap();
    assert!(record.is_finished());
    assert_eq!(record.sampled, Some(false));
}

#[test]
fn custom_timeout_is_honoured() {
    let h = harness_with(|builder| builder.route_change_timeout(Duration::from_millis(300)));

    h.router.emit(NavigationEvent::Action);
    h.scheduler.advance(Duration::from_millis(300));

    assert!(h.tracer.last().unwrap().is_finished());
}

#[test]
fn hook_returning_nothing_sends_nothing() {
    let h = harness_with(|builder| builder.decorate(|_| None));

    let ((), logs) = capture_logs(|| h.router.navigate(Route::new("A", "k1")));

    assert!(logs
        .iter()
        .any(|line| line.contains("ERROR") && line.contains("returned no context")));
    let record = h.tracer.last().unwrap();
    assert_eq!(record.sampled, Some(false));
    assert_eq!(record.context.name, "A");
    assert_eq!(h.scheduler.pending_timers(), 1);

    h.scheduler.advance(Duration::from_millis(1000));
    assert!(h.tracer.last().unwrap().is_finished());
}

#[test]
fn hook_can_rename_and_veto() {
    let h = harness_with(|builder| {
        builder.decorate(|mut context| {
            if context.name == "Secret" {
                context.sampled = Some(false);
            } else {
                context.name = format!("screen/{}", context.name);
            }
            Some(context)
        })
    });

    h.router.navigate(Route::new("Feed", "Feed-1"));
    assert_eq!(h.tracer.last().unwrap().context.name, "screen/Feed");
    assert_eq!(h.scheduler.pending_timers(), 0);

    h.router.navigate(Route::new("Secret", "Secret-1"));
    assert_eq!(h.scheduler.pending_timers(), 1);
    assert_eq!(
        h.instrumentation.controller().phase(),
        Phase::AwaitingDiscard
    );
}

#[test]
fn route_params_and_previous_route_are_recorded() {
    let h = harness();
    let params = json!({ "id": 42 }).as_object().cloned().unwrap();

    h.router.navigate(Route::new("List", "List-1"));
    h.router
        .navigate(Route::new("Item", "Item-42").with_params(params));
    h.router.navigate(Route::new("List", "List-1"));

    let records = h.tracer.transactions();
    assert_eq!(records[1].context.data["route"]["params"], json!({ "id": 42 }));
    assert_eq!(
        records[1].context.data["previousRoute"],
        json!({ "name": "List", "key": "List-1", "params": {} })
    );
    assert_eq!(records[2].context.data["route"]["hasBeenSeen"], true);
    assert_eq!(
        records[2].context.data["previousRoute"]["params"],
        json!({ "id": 42 })
    );
}

#[test]
fn rapid_dispatches_do_not_discard_newest_early() {
    let h = harness();

    h.router.emit(NavigationEvent::Action);
    h.scheduler.advance(Duration::from_millis(900));
    h.router.emit(NavigationEvent::Action);
    h.scheduler.advance(Duration::from_millis(200));

    // The first timer fired; the newest transaction is still waiting.
    *h.router.route.lock() = Some(Route::new("A", "k1"));
    h.router.emit(NavigationEvent::State);

    let records = h.tracer.transactions();
    assert!(records[0].is_finished() && records[0].is_unsampled());
    assert_eq!(records[1].context.name, "A");
    assert!(!records[1].is_finished());
}

#[test]
fn setup_with_registered_container_attaches_initial_route() {
    let h = harness();
    *h.router.route.lock() = Some(Route::new("Home", "Home-1"));

    assert!(h.instrumentation.setup());
    assert!(!h.instrumentation.setup());

    assert_eq!(h.tracer.len(), 1);
    assert_eq!(h.tracer.last().unwrap().context.name, "Home");
}

#[test]
fn second_registration_is_ignored() {
    let h = harness();

    let (outcome, logs) = capture_logs(|| {
        h.instrumentation
            .register_navigation_container(ContainerRef::Direct(h.router.clone()))
    });

    assert_eq!(outcome, RegisterOutcome::AlreadyRegistered);
    assert!(logs
        .iter()
        .any(|line| line.contains("INFO") && line.contains("already registered")));
    assert_eq!(h.router.listener_count(), 2);
}

#[test]
fn late_bound_container_registers_once_available() {
    let tracer = InMemoryTracer::new();
    let token = Arc::new(Registration::new());
    let instrumentation = NavigationInstrumentation::builder()
        .tracer(tracer.clone())
        .scheduler(Arc::new(ManualScheduler::new()))
        .registration(Arc::clone(&token))
        .build()
        .unwrap();
    instrumentation.setup();

    let slot = CurrentRef::new();
    assert_eq!(
        instrumentation.register_navigation_container(slot.clone()),
        RegisterOutcome::ContainerUnavailable
    );
    assert!(!token.is_registered());

    let router = Arc::new(FakeRouter::default());
    *router.route.lock() = Some(Route::new("Home", "Home-1"));
    slot.set(router.clone());

    assert_eq!(
        instrumentation.register_navigation_container(slot),
        RegisterOutcome::Registered
    );
    assert_eq!(tracer.len(), 1);
    assert_eq!(tracer.last().unwrap().context.name, "Home");
}

#[test]
fn shared_token_prevents_second_instrumentation_wiring() {
    let token = Arc::new(Registration::new());
    let router = Arc::new(FakeRouter::default());

    for expected in [RegisterOutcome::Registered, RegisterOutcome::AlreadyRegistered] {
        let instrumentation = NavigationInstrumentation::builder()
            .tracer(InMemoryTracer::new())
            .scheduler(Arc::new(ManualScheduler::new()))
            .registration(Arc::clone(&token))
            .build()
            .unwrap();

        assert_eq!(
            instrumentation.register_navigation_container(ContainerRef::Direct(router.clone())),
            expected
        );
    }

    assert_eq!(router.listener_count(), 2);
}

#[cfg(feature = "tokio")]
mod tokio_timers {
    use super::*;
    use navspan::timer::TokioScheduler;

    #[tokio::test]
    async fn tokio_timer_discards_unsettled_navigation() {
        let tracer = InMemoryTracer::new();
        let instrumentation = NavigationInstrumentation::builder()
            .tracer(tracer.clone())
            .scheduler(Arc::new(TokioScheduler::current()))
            .route_change_timeout(Duration::from_millis(20))
            .build()
            .unwrap();
        let router = Arc::new(FakeRouter::default());
        instrumentation.register_navigation_container(ContainerRef::Direct(router.clone()));

        router.emit(NavigationEvent::Action);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let record = tracer.last().unwrap();
        assert!(record.is_finished());
        assert!(record.is_unsampled());
    }

    #[tokio::test]
    async fn tokio_timer_is_cancelled_by_state_change() {
        let tracer = InMemoryTracer::new();
        let instrumentation = NavigationInstrumentation::builder()
            .tracer(tracer.clone())
            .scheduler(Arc::new(TokioScheduler::current()))
            .route_change_timeout(Duration::from_millis(20))
            .build()
            .unwrap();
        let router = Arc::new(FakeRouter::default());
        instrumentation.register_navigation_container(ContainerRef::Direct(router.clone()));

        router.navigate(Route::new("A", "k1"));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let record = tracer.last().unwrap();
        assert_eq!(record.context.name, "A");
        assert!(!record.is_finished());
    }
}
