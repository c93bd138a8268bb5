//! Local key-value store of a node.
use std::collections::HashMap;

use crate::dht::Did;

/// In-memory map from ring keys to values, owned and mutated exclusively
/// by the node actor the ring state belongs to.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    table: HashMap<Did, String>,
}

impl MemStore {
    /// builder
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// getter
    pub fn get(&self, key: &Did) -> Option<String> {
        self.table.get(key).cloned()
    }

    /// setter, returns the displaced value if any
    pub fn put(&mut self, key: Did, value: String) -> Option<String> {
        self.table.insert(key, value)
    }

    /// remove a key
    pub fn remove(&mut self, key: &Did) -> Option<String> {
        self.table.remove(key)
    }

    /// number of stored keys
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Snapshot of all entries, for inspection.
    pub fn entries(&self) -> Vec<(Did, String)> {
        self.table
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect()
    }
}
