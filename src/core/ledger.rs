//! Bounded history of recently seen route keys.
//!
//! The ledger only answers "has this route been visited before". Keys are
//! kept in insertion order and the oldest are evicted once the capacity is
//! exceeded.

use std::collections::{HashMap, VecDeque};

/// Default number of route keys remembered.
pub const DEFAULT_LEDGER_CAPACITY: usize = 200;

/// Insertion-ordered, capacity-bounded record of route keys.
///
/// Membership checks are O(1): alongside the ordered queue the ledger keeps
/// an occurrence count per key, so a key recorded several times stays
/// "seen" until its last occurrence is evicted.
///
/// # Example
///
/// ```rust
/// use navspan::core::RouteHistoryLedger;
///
/// let mut ledger = RouteHistoryLedger::with_capacity(2);
/// ledger.record("a");
/// ledger.record("b");
/// ledger.record("c");
///
/// assert!(!ledger.seen("a"));
/// assert!(ledger.seen("b"));
/// assert!(ledger.seen("c"));
/// assert_eq!(ledger.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct RouteHistoryLedger {
    keys: VecDeque<String>,
    occurrences: HashMap<String, usize>,
    capacity: usize,
}

impl Default for RouteHistoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteHistoryLedger {
    /// Create an empty ledger with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LEDGER_CAPACITY)
    }

    /// Create an empty ledger holding at most `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: VecDeque::with_capacity(capacity),
            occurrences: HashMap::new(),
            capacity,
        }
    }

    /// Append a key, evicting from the front until the capacity holds.
    pub fn record(&mut self, key: impl Into<String>) {
        let key = key.into();
        *self.occurrences.entry(key.clone()).or_insert(0) += 1;
        self.keys.push_back(key);

        while self.keys.len() > self.capacity {
            let Some(evicted) = self.keys.pop_front() else {
                break;
            };
            self.forget_one(&evicted);
        }
    }

    /// True iff `key` currently occurs anywhere in the ledger.
    pub fn seen(&self, key: &str) -> bool {
        self.occurrences.contains_key(key)
    }

    /// Number of recorded entries (duplicates included).
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Recorded keys, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    fn forget_one(&mut self, key: &str) {
        if let Some(count) = self.occurrences.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                self.occurrences.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ledger_is_empty() {
        let ledger = RouteHistoryLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.capacity(), DEFAULT_LEDGER_CAPACITY);
        assert!(!ledger.seen("anything"));
    }

    #[test]
    fn record_makes_key_seen() {
        let mut ledger = RouteHistoryLedger::new();
        ledger.record("Home-1");

        assert!(ledger.seen("Home-1"));
        assert!(!ledger.seen("Home-2"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn eviction_keeps_most_recent_in_order() {
        let mut ledger = RouteHistoryLedger::new();
        for i in 0..250 {
            ledger.record(format!("key-{i}"));
        }

        assert_eq!(ledger.len(), DEFAULT_LEDGER_CAPACITY);
        let keys: Vec<&str> = ledger.keys().collect();
        assert_eq!(keys.first(), Some(&"key-50"));
        assert_eq!(keys.last(), Some(&"key-249"));
        assert!(!ledger.seen("key-49"));
        assert!(ledger.seen("key-50"));
    }

    #[test]
    fn duplicate_key_survives_eviction_of_older_copy() {
        let mut ledger = RouteHistoryLedger::with_capacity(3);
        ledger.record("a");
        ledger.record("b");
        ledger.record("a");
        ledger.record("c");

        // First "a" evicted, second one remains.
        assert!(ledger.seen("a"));
        assert_eq!(ledger.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);

        ledger.record("d");
        ledger.record("e");
        assert!(!ledger.seen("a"));
    }

    #[test]
    fn zero_capacity_remembers_nothing() {
        let mut ledger = RouteHistoryLedger::with_capacity(0);
        ledger.record("a");
        assert!(ledger.is_empty());
        assert!(!ledger.seen("a"));
    }
}
