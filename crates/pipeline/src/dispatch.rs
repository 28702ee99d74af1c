//! Dispatch table - message id to handler registry
//!
//! The input loop looks handlers up by wire id while the pipeline
//! builder resolves new reader entries concurrently. `lookup` and
//! `merge` are atomic with respect to each other; handlers are cloned
//! out so the lock is never held while one runs.

use std::collections::HashMap;
use std::sync::RwLock;

/// Thread-safe mapping from message id to handler
pub struct DispatchTable<H> {
    inner: RwLock<HashMap<u16, H>>,
}

impl<H: Clone> DispatchTable<H> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Register a single handler
    pub fn insert(&self, id: u16, handler: H) {
        self.inner.write().expect("dispatch table lock").insert(id, handler);
    }

    /// Clone out the handler for `id`, if registered
    pub fn lookup(&self, id: u16) -> Option<H> {
        self.inner.read().expect("dispatch table lock").get(&id).cloned()
    }

    /// Merge new entries into the table
    ///
    /// Existing ids are kept; configuration validation has already
    /// ruled out genuine collisions by the time entries arrive here.
    pub fn merge(&self, entries: impl IntoIterator<Item = (u16, H)>) {
        let mut table = self.inner.write().expect("dispatch table lock");
        for (id, handler) in entries {
            table.entry(id).or_insert(handler);
        }
    }

    /// All registered ids, sorted
    pub fn ids(&self) -> Vec<u16> {
        let mut ids: Vec<u16> = self
            .inner
            .read()
            .expect("dispatch table lock")
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.inner.read().expect("dispatch table lock").len()
    }

    /// True if no handlers are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<H: Clone> Default for DispatchTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> std::fmt::Debug for DispatchTable<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.inner.read().map(|t| t.len()).unwrap_or(0);
        f.debug_struct("DispatchTable").field("len", &len).finish()
    }
}
