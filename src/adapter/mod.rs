//! Wiring between a navigation container and the controller.
//!
//! [`register`] resolves the container reference, attaches the controller's
//! dispatch handler to [`NavigationEvent::Action`] and its state-change
//! handler to [`NavigationEvent::State`], exactly once per
//! [`Registration`] token.

mod container;
mod registration;

pub use container::{ContainerRef, CurrentRef, Listener, NavigationContainer, NavigationEvent};
pub use registration::{RegisterOutcome, Registration};

use crate::controller::NavigationController;
use crate::transaction::TransactionFactory;
use tracing::{debug, info, warn};

/// Attach `controller` to the container behind `container`.
///
/// Duplicate registration and an unresolvable reference are logged and
/// reported through [`RegisterOutcome`]; neither is an error. After the
/// listeners are attached, a bootstrap transaction created before the
/// container existed receives the initial route.
pub fn register<F: TransactionFactory>(
    controller: &NavigationController<F>,
    container: &ContainerRef,
    registration: &Registration,
) -> RegisterOutcome {
    if registration.is_registered() {
        info!("navigation container already registered; listeners not attached again");
        return RegisterOutcome::AlreadyRegistered;
    }

    let Some(resolved) = container.resolve() else {
        warn!("navigation container reference did not resolve; instrumentation inactive");
        return RegisterOutcome::ContainerUnavailable;
    };

    if !registration.claim() {
        info!("navigation container already registered; listeners not attached again");
        return RegisterOutcome::AlreadyRegistered;
    }

    controller.set_container(resolved.clone());

    let on_action = controller.clone();
    resolved.add_listener(
        NavigationEvent::Action,
        Box::new(move || on_action.on_dispatch()),
    );
    let on_state = controller.clone();
    resolved.add_listener(
        NavigationEvent::State,
        Box::new(move || {
            on_state.on_state_change();
        }),
    );
    debug!(
        action = NavigationEvent::Action.as_str(),
        state = NavigationEvent::State.as_str(),
        "navigation listeners attached"
    );

    if let Some(outcome) = controller.handle_initial_state() {
        debug!(?outcome, "initial route attached to bootstrap transaction");
    }

    RegisterOutcome::Registered
}
