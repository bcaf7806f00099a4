//! Route decoration hook.
//!
//! The hook lets callers amend or veto the context derived for a route
//! change. It is invoked synchronously, at most once per route change, while
//! the controller's state is locked. A hook that blocks stalls every other
//! navigation handler, and a hook that calls back into the controller
//! deadlocks.

use super::context::TransactionContext;

/// Caller-supplied `(context) -> context?` function.
///
/// Returning `None` is a contract violation; the controller recovers by
/// sending nothing (sampling forced off). A hook that panics is handled the
/// same way, and the route is still recorded.
///
/// # Example
///
/// ```rust
/// use navspan::core::{blank_transaction_context, RouteDecorator};
///
/// // Veto every route whose name starts with "Debug".
/// let decorator = RouteDecorator::new(|mut context| {
///     if context.name.starts_with("Debug") {
///         context.sampled = Some(false);
///     }
///     Some(context)
/// });
///
/// let mut context = blank_transaction_context("router");
/// context.name = "DebugMenu".to_string();
/// let decorated = decorator.apply(context).unwrap();
/// assert!(decorated.is_vetoed());
/// ```
pub struct RouteDecorator {
    hook: Box<dyn Fn(TransactionContext) -> Option<TransactionContext> + Send + Sync>,
}

impl RouteDecorator {
    /// Wrap a decoration function.
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(TransactionContext) -> Option<TransactionContext> + Send + Sync + 'static,
    {
        Self {
            hook: Box::new(hook),
        }
    }

    /// Decorator returning the context unmodified.
    pub fn identity() -> Self {
        Self::new(Some)
    }

    /// Run the hook once.
    pub fn apply(&self, context: TransactionContext) -> Option<TransactionContext> {
        (self.hook)(context)
    }
}

impl Default for RouteDecorator {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::fmt::Debug for RouteDecorator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDecorator").finish_non_exhaustive()
    }
}
