//! Guard against attaching the navigation listeners twice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// One-shot registration token.
///
/// The token is owned by the caller, who decides how widely it is shared:
/// one per controller, or [`Registration::process_wide`] when re-running
/// initialization (for example after a hot reload) must never attach a
/// second set of listeners.
#[derive(Debug, Default)]
pub struct Registration {
    registered: AtomicBool,
}

static PROCESS_WIDE: OnceLock<Arc<Registration>> = OnceLock::new();

impl Registration {
    pub const fn new() -> Self {
        Self {
            registered: AtomicBool::new(false),
        }
    }

    /// Token shared by the whole process.
    pub fn process_wide() -> Arc<Registration> {
        Arc::clone(PROCESS_WIDE.get_or_init(|| Arc::new(Registration::new())))
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    /// Flip the flag; `false` if someone else already did.
    pub(crate) fn claim(&self) -> bool {
        self.registered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// What a registration attempt did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Listeners attached.
    Registered,
    /// The token was already used; nothing attached.
    AlreadyRegistered,
    /// The reference did not resolve to a container; the token stays unused.
    ContainerUnavailable,
}
