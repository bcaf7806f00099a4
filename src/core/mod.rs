//! Pure types and logic of navigation instrumentation.
//!
//! - Routes as reported by the navigation container
//! - Transaction contexts and the pure route-change decoration
//! - The bounded route history ledger
//! - The caller-supplied decoration hook
//!
//! Nothing in this module performs I/O, touches timers or talks to the
//! tracing runtime.

mod context;
mod hook;
mod ledger;
mod route;

pub use context::{
    blank_transaction_context, route_change_context, TransactionContext,
    DEFAULT_INSTRUMENTATION_NAME, INSTRUMENTATION_TAG, NAVIGATION_OP, ROUTE_CHANGE_NAME,
    ROUTE_NAME_TAG,
};
pub use hook::RouteDecorator;
pub use ledger::{RouteHistoryLedger, DEFAULT_LEDGER_CAPACITY};
pub use route::Route;
