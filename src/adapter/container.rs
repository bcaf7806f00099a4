//! Navigation container seam.

use crate::core::Route;
use parking_lot::RwLock;
use std::sync::Arc;

/// Callback attached to a navigation event.
pub type Listener = Box<dyn Fn() + Send + Sync + 'static>;

/// The two container events the instrumentation listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavigationEvent {
    /// A navigation action is about to be handled.
    Action,
    /// Navigation state has settled.
    State,
}

impl NavigationEvent {
    /// Event name as used by the container's listener API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Action => "__unsafe_action__",
            Self::State => "state",
        }
    }
}

/// Navigation container the instrumentation attaches to.
pub trait NavigationContainer: Send + Sync {
    fn add_listener(&self, event: NavigationEvent, listener: Listener);

    /// Route currently shown, if the container has one.
    fn current_route(&self) -> Option<Route>;
}

/// Late-bound container slot, filled once the container is mounted.
#[derive(Clone, Default)]
pub struct CurrentRef {
    current: Arc<RwLock<Option<Arc<dyn NavigationContainer>>>>,
}

impl CurrentRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, container: Arc<dyn NavigationContainer>) {
        *self.current.write() = Some(container);
    }

    pub fn clear(&self) {
        *self.current.write() = None;
    }

    pub fn get(&self) -> Option<Arc<dyn NavigationContainer>> {
        self.current.read().clone()
    }
}

impl std::fmt::Debug for CurrentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentRef")
            .field("set", &self.current.read().is_some())
            .finish()
    }
}

/// Reference handed to registration: the container itself or a slot that
/// may hold it.
#[derive(Clone)]
pub enum ContainerRef {
    Direct(Arc<dyn NavigationContainer>),
    Current(CurrentRef),
}

impl ContainerRef {
    /// Resolve to a concrete container.
    pub fn resolve(&self) -> Option<Arc<dyn NavigationContainer>> {
        match self {
            Self::Direct(container) => Some(Arc::clone(container)),
            Self::Current(slot) => slot.get(),
        }
    }
}

impl From<Arc<dyn NavigationContainer>> for ContainerRef {
    fn from(container: Arc<dyn NavigationContainer>) -> Self {
        Self::Direct(container)
    }
}

impl From<CurrentRef> for ContainerRef {
    fn from(slot: CurrentRef) -> Self {
        Self::Current(slot)
    }
}

impl std::fmt::Debug for ContainerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("ContainerRef::Direct"),
            Self::Current(slot) => f.debug_tuple("ContainerRef::Current").field(slot).finish(),
        }
    }
}
