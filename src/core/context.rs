//! Transaction context: the mutable description of a navigation span.
//!
//! Contexts always start from the blank template and are only ever
//! extended. `route_change_context` is the pure function that decorates a
//! snapshot with route metadata.

use super::route::Route;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Name given to every transaction before a route is known.
pub const ROUTE_CHANGE_NAME: &str = "Route Change";

/// Operation tag of navigation transactions.
pub const NAVIGATION_OP: &str = "navigation";

/// Default value of the `routing.instrumentation` tag.
pub const DEFAULT_INSTRUMENTATION_NAME: &str = "navigation-container";

/// Tag naming the instrumentation that produced the transaction.
pub const INSTRUMENTATION_TAG: &str = "routing.instrumentation";

/// Tag carrying the name of the route navigated to.
pub const ROUTE_NAME_TAG: &str = "routing.route.name";

/// Description of a transaction as seen by the tracing runtime.
///
/// # Example
///
/// ```rust
/// use navspan::core::{blank_transaction_context, NAVIGATION_OP, ROUTE_CHANGE_NAME};
///
/// let context = blank_transaction_context("my-router");
/// assert_eq!(context.name, ROUTE_CHANGE_NAME);
/// assert_eq!(context.op, NAVIGATION_OP);
/// assert_eq!(context.tags["routing.instrumentation"], "my-router");
/// assert!(context.data.is_empty());
/// assert_eq!(context.sampled, None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionContext {
    pub name: String,
    pub op: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Explicit sampling decision; `None` leaves it to the tracing runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampled: Option<bool>,
}

impl TransactionContext {
    /// Whether sampling has been explicitly forced off.
    pub fn is_vetoed(&self) -> bool {
        self.sampled == Some(false)
    }

    /// Copy of this context with sampling forced off.
    pub fn unsampled(&self) -> Self {
        Self {
            sampled: Some(false),
            ..self.clone()
        }
    }
}

/// The blank template every navigation transaction starts from.
pub fn blank_transaction_context(instrumentation_name: &str) -> TransactionContext {
    let mut tags = BTreeMap::new();
    tags.insert(
        INSTRUMENTATION_TAG.to_string(),
        instrumentation_name.to_string(),
    );

    TransactionContext {
        name: ROUTE_CHANGE_NAME.to_string(),
        op: NAVIGATION_OP.to_string(),
        tags,
        data: Map::new(),
        sampled: None,
    }
}

/// Extend `snapshot` with the metadata of a route change.
///
/// Everything already present in the snapshot is kept; only `name`, the
/// route name tag and the `route` / `previousRoute` data entries are written.
///
/// ```rust
/// use navspan::core::{blank_transaction_context, route_change_context, Route};
///
/// let context = route_change_context(
///     blank_transaction_context("router"),
///     &Route::new("Settings", "Settings-1"),
///     None,
///     false,
/// );
/// assert_eq!(context.name, "Settings");
/// assert_eq!(context.data["route"]["key"], "Settings-1");
/// assert!(context.data["previousRoute"].is_null());
/// ```
pub fn route_change_context(
    snapshot: TransactionContext,
    route: &Route,
    previous: Option<&Route>,
    has_been_seen: bool,
) -> TransactionContext {
    let mut context = snapshot;
    context.name = route.name.clone();
    context
        .tags
        .insert(ROUTE_NAME_TAG.to_string(), route.name.clone());

    context.data.insert(
        "route".to_string(),
        json!({
            "name": route.name,
            "key": route.key,
            "params": route.params_or_empty(),
            "hasBeenSeen": has_been_seen,
        }),
    );

    let previous_route = previous.map_or(Value::Null, |prev| {
        json!({
            "name": prev.name,
            "key": prev.key,
            "params": prev.params_or_empty(),
        })
    });
    context
        .data
        .insert("previousRoute".to_string(), previous_route);

    context
}
