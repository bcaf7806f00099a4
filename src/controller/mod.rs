//! The navigation transaction controller.
//!
//! This is the imperative shell around the pure core: it owns the pending
//! transaction, arms and cancels discard timers, consults the route ledger
//! and runs the decoration hook.
//!
//! # Phases
//!
//! - **Idle**: no pending transaction
//! - **AwaitingRoute**: dispatched, discard timer armed
//! - **AwaitingDiscard**: route attached but vetoed, timer still armed
//!
//! A matching state change moves AwaitingRoute back to Idle (finalized); the
//! discard timer moves either waiting phase back to Idle (discarded).

mod machine;
mod outcome;

pub use machine::NavigationController;
pub use outcome::{DiscardOutcome, Phase, StateChangeOutcome};
