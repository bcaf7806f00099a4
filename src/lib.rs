//! Navspan: navigation events in, route-annotated transactions out
//!
//! Navspan turns two loosely-ordered event streams from a navigation
//! container ("an action was dispatched", "navigation state settled") into
//! tracing transactions named after the route the user ended up on. It
//! follows a "pure core, imperative shell" layout: route decoration and the
//! route ledger are pure, while the controller owns timers and the
//! transaction handed out by the tracing runtime.
//!
//! # Core Concepts
//!
//! - **Controller**: at most one pending transaction, a discard timer per
//!   dispatch, and the dispatch → state-change → finalize/discard protocol
//! - **Ledger**: bounded memory of recently seen route keys
//! - **Decoration hook**: caller-supplied amend-or-veto function
//! - **Adapter**: attaches the controller to a container exactly once
//!
//! # Example
//!
//! ```rust
//! use navspan::adapter::{Listener, NavigationContainer, NavigationEvent};
//! use navspan::core::Route;
//! use navspan::instrumentation::NavigationInstrumentation;
//! use navspan::timer::ManualScheduler;
//! use navspan::transaction::InMemoryTracer;
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Router {
//!     listeners: Mutex<Vec<(NavigationEvent, Listener)>>,
//!     route: Mutex<Option<Route>>,
//! }
//!
//! impl NavigationContainer for Router {
//!     fn add_listener(&self, event: NavigationEvent, listener: Listener) {
//!         self.listeners.lock().unwrap().push((event, listener));
//!     }
//!
//!     fn current_route(&self) -> Option<Route> {
//!         self.route.lock().unwrap().clone()
//!     }
//! }
//!
//! let tracer = InMemoryTracer::new();
//! let instrumentation = NavigationInstrumentation::builder()
//!     .tracer(tracer.clone())
//!     .scheduler(Arc::new(ManualScheduler::new()))
//!     .build()
//!     .unwrap();
//!
//! let router = Arc::new(Router::default());
//! *router.route.lock().unwrap() = Some(Route::new("Home", "Home-1"));
//! instrumentation.register_navigation_container(router.clone() as Arc<dyn NavigationContainer>);
//! instrumentation.setup();
//!
//! assert_eq!(tracer.last().unwrap().context.name, "Home");
//! ```

pub mod adapter;
pub mod builder;
pub mod config;
pub mod controller;
pub mod core;
pub mod instrumentation;
pub mod timer;
pub mod transaction;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use adapter::{ContainerRef, NavigationContainer, NavigationEvent, Registration};
pub use builder::{BuildError, InstrumentationBuilder};
pub use config::InstrumentationOptions;
pub use controller::{NavigationController, Phase, StateChangeOutcome};
pub use core::{Route, RouteDecorator, RouteHistoryLedger, TransactionContext};
pub use instrumentation::NavigationInstrumentation;
pub use transaction::{Transaction, TransactionFactory};
