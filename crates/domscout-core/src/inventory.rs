//! The accumulating locator → descriptor map.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// One discovered element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    /// Selector valid in the document or frame the element was found in.
    pub locator: String,
    /// Human-readable label.
    pub name: String,
    /// Live matches for `locator` at validation time; at least 1.
    pub count: usize,
}

/// Shared, cloneable inventory handle.
///
/// Clones share the same map. Snapshots copy under the read lock; a reader
/// running alongside a pass may observe that pass half-applied.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    entries: Arc<RwLock<HashMap<String, ElementDescriptor>>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry keyed by `descriptor.locator`.
    pub fn upsert(&self, descriptor: ElementDescriptor) {
        self.entries
            .write()
            .insert(descriptor.locator.clone(), descriptor);
    }

    /// Remove an entry, returning it if it was present.
    pub fn remove(&self, locator: &str) -> Option<ElementDescriptor> {
        self.entries.write().remove(locator)
    }

    pub fn contains(&self, locator: &str) -> bool {
        self.entries.read().contains_key(locator)
    }

    pub fn get(&self, locator: &str) -> Option<ElementDescriptor> {
        self.entries.read().get(locator).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All current descriptors, in no particular order.
    pub fn snapshot(&self) -> Vec<ElementDescriptor> {
        self.entries.read().values().cloned().collect()
    }

    /// All current descriptors sorted by locator.
    pub fn sorted_snapshot(&self) -> Vec<ElementDescriptor> {
        let mut items = self.snapshot();
        items.sort_by(|a, b| a.locator.cmp(&b.locator));
        items
    }
}
