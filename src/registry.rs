//! Test registry
//!
//! Maps locators to test entities and keeps the FIFO worklist of tests
//! awaiting load. Deduplicates repeated references to the same locator
//! across pages; the registry is mutated only during setup and the load
//! phase, and is read-only thereafter.

use std::collections::{HashMap, VecDeque};
use tracing::debug;

use crate::models::{Test, TestBody, TestLocator};

/// Registry of all referenced tests plus the load worklist.
#[derive(Debug, Default)]
pub struct TestRegistry {
    tests: HashMap<TestLocator, Test>,
    to_load: VecDeque<TestLocator>,
    loading: Option<TestLocator>,
}

impl TestRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a test for `locator` and enqueue it for loading, replacing
    /// any previous entry under the same locator.
    pub fn add(&mut self, locator: TestLocator) -> &Test {
        debug!("Registering test '{locator}'");
        self.tests.insert(locator.clone(), Test::new(locator.clone()));
        self.to_load.push_back(locator.clone());
        &self.tests[&locator]
    }

    /// Return the test for `locator`, creating and enqueueing one on
    /// first reference. Repeated references resolve to the same entity
    /// and load only once.
    pub fn get_or_create(&mut self, locator: &TestLocator) -> &Test {
        if !self.tests.contains_key(locator) {
            return self.add(locator.clone());
        }
        &self.tests[locator]
    }

    /// Look up a test by locator.
    pub fn get(&self, locator: &TestLocator) -> Option<&Test> {
        self.tests.get(locator)
    }

    /// Number of distinct tests known to the registry.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Whether no tests have been referenced yet.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Number of tests still awaiting load.
    pub fn pending_loads(&self) -> usize {
        self.to_load.len()
    }

    /// Pop the front of the load worklist and mark it loading.
    pub(crate) fn next_unloaded(&mut self) -> Option<TestLocator> {
        let locator = self.to_load.pop_front()?;
        if let Some(test) = self.tests.get_mut(&locator) {
            test.begin_loading();
        }
        self.loading = Some(locator.clone());
        Some(locator)
    }

    /// Bind a registered name and body onto the test currently loading.
    /// Returns the bound locator, or `None` if no load is in flight.
    pub(crate) fn bind_loading(&mut self, name: String, body: TestBody) -> Option<TestLocator> {
        let locator = self.loading.take()?;
        if let Some(test) = self.tests.get_mut(&locator) {
            test.bind(name, body);
        }
        Some(locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_or_create_dedups() {
        let mut registry = TestRegistry::new();
        registry.get_or_create(&TestLocator::new("a"));
        registry.get_or_create(&TestLocator::new("b"));
        registry.get_or_create(&TestLocator::new("a"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.pending_loads(), 2);
    }

    #[test]
    fn test_load_worklist_is_first_occurrence_order() {
        let mut registry = TestRegistry::new();
        for locator in ["global", "b", "global", "a", "b"] {
            registry.get_or_create(&TestLocator::new(locator));
        }

        let mut order = Vec::new();
        while let Some(locator) = registry.next_unloaded() {
            order.push(locator.to_string());
        }
        assert_eq!(order, ["global", "b", "a"]);
    }

    #[test]
    fn test_bind_loading_targets_popped_test() {
        let mut registry = TestRegistry::new();
        registry.get_or_create(&TestLocator::new("a"));

        let popped = registry.next_unloaded().unwrap();
        assert!(!registry.get(&popped).unwrap().is_loaded());

        let bound = registry
            .bind_loading("test a".to_string(), Arc::new(|ctx| ctx.done()))
            .unwrap();
        assert_eq!(bound, popped);

        let test = registry.get(&popped).unwrap();
        assert!(test.is_loaded());
        assert_eq!(test.name(), Some("test a"));
    }

    #[test]
    fn test_bind_without_load_in_flight() {
        let mut registry = TestRegistry::new();
        let bound = registry.bind_loading("orphan".to_string(), Arc::new(|ctx| ctx.done()));
        assert!(bound.is_none());
    }
}
