use std::cell::RefCell;
use std::collections::HashMap;

use super::{Store, StoreKind};

/// In-process store, used by tests and by embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<StoreKind, serde_json::Value>>,
    writes: RefCell<HashMap<StoreKind, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls seen for `kind`.
    pub fn write_count(&self, kind: StoreKind) -> usize {
        self.writes.borrow().get(&kind).copied().unwrap_or(0)
    }
}

impl Store for MemoryStore {
    fn get(&self, kind: StoreKind) -> Option<serde_json::Value> {
        self.entries.borrow().get(&kind).cloned()
    }

    fn set(&self, kind: StoreKind, value: serde_json::Value) {
        self.entries.borrow_mut().insert(kind, value);
        *self.writes.borrow_mut().entry(kind).or_insert(0) += 1;
    }

    fn remove(&self, kind: StoreKind) {
        self.entries.borrow_mut().remove(&kind);
    }
}
