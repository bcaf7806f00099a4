//! Route Change Transactions
//!
//! This example drives a tiny in-process router through a few navigations
//! and prints the transactions produced.
//!
//! Key concepts:
//! - Registering a navigation container once
//! - Bootstrapping the first transaction with `setup`
//! - Vetoing a route from the decoration hook
//! - Discarding navigations that never settle
//!
//! Run with: cargo run --example route_changes

use navspan::adapter::{ContainerRef, Listener, NavigationContainer, NavigationEvent};
use navspan::core::Route;
use navspan::instrumentation::NavigationInstrumentation;
use navspan::timer::ManualScheduler;
use navspan::transaction::InMemoryTracer;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Router {
    listeners: Mutex<Vec<(NavigationEvent, Arc<dyn Fn() + Send + Sync>)>>,
    route: Mutex<Option<Route>>,
}

impl Router {
    fn emit(&self, event: NavigationEvent) {
        let listeners: Vec<_> = self
            .listeners
            .lock()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn navigate(&self, name: &str, key: &str) {
        self.emit(NavigationEvent::Action);
        *self.route.lock() = Some(Route::new(name, key));
        self.emit(NavigationEvent::State);
    }
}

impl NavigationContainer for Router {
    fn add_listener(&self, event: NavigationEvent, listener: Listener) {
        self.listeners.lock().push((event, Arc::from(listener)));
    }

    fn current_route(&self) -> Option<Route> {
        self.route.lock().clone()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Route Change Transactions ===\n");

    let tracer = InMemoryTracer::new();
    let scheduler = Arc::new(ManualScheduler::new());
    let instrumentation = NavigationInstrumentation::builder()
        .tracer(tracer.clone())
        .scheduler(scheduler.clone())
        .decorate(|mut context| {
            if context.name == "DebugMenu" {
                context.sampled = Some(false);
            }
            Some(context)
        })
        .build()
        .unwrap();

    let router = Arc::new(Router::default());
    *router.route.lock() = Some(Route::new("Home", "Home-1"));
    instrumentation.register_navigation_container(ContainerRef::Direct(router.clone()));
    instrumentation.setup();

    router.navigate("Feed", "Feed-1");
    router.navigate("DebugMenu", "DebugMenu-1");
    router.navigate("Home", "Home-1");

    // A navigation that never settles.
    router.emit(NavigationEvent::Action);
    scheduler.advance(Duration::from_secs(2));

    for record in tracer.transactions() {
        println!(
            "{:<12} sampled={:<12} finished={:<5} seen={}",
            record.context.name,
            format!("{:?}", record.sampled),
            record.is_finished(),
            record.context.data.get("route").map_or(
                "-".to_string(),
                |route| route["hasBeenSeen"].to_string()
            ),
        );
    }

    let exported = tracer.drain_finished();
    println!("\nExported {} finished transactions", exported.len());

    println!("\n=== Example Complete ===");
}
