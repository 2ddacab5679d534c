//! The set of adapters currently receiving per-tick refreshes.

use std::sync::Arc;

use crate::core::adapter::NetworkAdapter;

/// Ordered, duplicate-free collection of monitored adapters, keyed by name.
#[derive(Debug, Default)]
pub struct MonitoredSet {
    adapters: Vec<Arc<NetworkAdapter>>,
}

impl MonitoredSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.iter().any(|a| a.name() == name)
    }

    /// Add `adapter` unless an adapter with the same name is already present.
    /// Returns true if it was added.
    pub fn insert(&mut self, adapter: Arc<NetworkAdapter>) -> bool {
        if self.contains(adapter.name()) {
            return false;
        }
        self.adapters.push(adapter);
        true
    }

    /// Remove the adapter named `name`. Returns true if it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.adapters.len();
        self.adapters.retain(|a| a.name() != name);
        self.adapters.len() != before
    }

    pub fn clear(&mut self) {
        self.adapters.clear();
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<NetworkAdapter>> {
        self.adapters.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }
}
