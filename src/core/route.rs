//! Route identity as reported by the navigation container.
//!
//! Routes are plain values: the core reads them and never mutates them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity of a navigation destination.
///
/// `name` is human readable and may repeat across routes; `key` uniquely
/// identifies one route instance.
///
/// # Example
///
/// ```rust
/// use navspan::core::Route;
///
/// let route = Route::new("Profile", "Profile-123");
/// assert_eq!(route.name, "Profile");
/// assert!(route.params_or_empty().is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Human-readable route name
    pub name: String,
    /// Stable unique identifier for this route instance
    pub key: String,
    /// Opaque route parameters, absent when the route was pushed without any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl Route {
    /// Create a route without params.
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            params: None,
        }
    }

    /// Attach params to the route.
    ///
    /// ```rust
    /// use navspan::core::Route;
    /// use serde_json::json;
    ///
    /// let params = json!({ "id": 7 }).as_object().cloned().unwrap();
    /// let route = Route::new("Item", "Item-1").with_params(params);
    /// assert_eq!(route.params_or_empty()["id"], 7);
    /// ```
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = Some(params);
        self
    }

    /// Params normalized so an absent map reads as empty.
    pub fn params_or_empty(&self) -> Map<String, Value> {
        self.params.clone().unwrap_or_default()
    }

    /// Whether `other` is a different route instance (key inequality).
    pub fn differs_from(&self, other: &Route) -> bool {
        self.key != other.key
    }
}
