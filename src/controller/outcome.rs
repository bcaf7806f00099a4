//! Observable results of controller operations.

use crate::core::TransactionContext;
use serde::{Deserialize, Serialize};

/// Phase of the controller, derived from its pending slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No pending transaction.
    Idle,
    /// A transaction was dispatched and waits for its route.
    AwaitingRoute,
    /// The route was attached but sampling was vetoed; the transaction waits
    /// for its discard timer.
    AwaitingDiscard,
}

impl Phase {
    pub fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::AwaitingRoute => "AwaitingRoute",
            Self::AwaitingDiscard => "AwaitingDiscard",
        }
    }

    /// Whether a transaction is currently owned by the controller.
    pub fn has_pending(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a state-change event did.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChangeOutcome {
    /// No navigation container is registered.
    NoContainer,

    /// The container reported no current route.
    NoRoute,

    /// The route was recorded; no transaction was waiting for it.
    NoPendingTransaction,

    /// Same route key as the latest route; context left untouched.
    RouteUnchanged,

    /// The pending transaction already carries a vetoed route context and
    /// only waits for its discard timer.
    RouteAlreadyAttached,

    /// Context applied and discard timer cancelled.
    Finalized(TransactionContext),

    /// The hook forced sampling off; context applied, timer left armed.
    Vetoed(TransactionContext),

    /// The hook returned nothing; an unsampled context was applied and the
    /// timer left armed.
    HookReturnedNothing(TransactionContext),
}

impl StateChangeOutcome {
    /// Context applied to the transaction, if any.
    pub fn applied_context(&self) -> Option<&TransactionContext> {
        match self {
            Self::Finalized(context) | Self::Vetoed(context) | Self::HookReturnedNothing(context) => {
                Some(context)
            }
            _ => None,
        }
    }

    /// Whether the decoration hook ran.
    pub fn decorated(&self) -> bool {
        self.applied_context().is_some()
    }
}

/// What a discard did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscardOutcome {
    /// A transaction was marked unsampled and finished.
    Discarded,
    /// Nothing to discard.
    Nothing,
}
