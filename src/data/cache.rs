//! Read-through cache for fetched datasets.
//!
//! The network fetch runs at most once per key until the entry is
//! invalidated (refresh key in the TUI, or explicitly in tests). Entries are
//! handed out as `Rc` so consumers share the series without being able to
//! mutate it.

use std::collections::HashMap;
use std::rc::Rc;

use crate::domain::FetchResult;

/// Key for the climate series (the fetch takes no arguments).
pub const CLIMATE_KEY: &str = "climate";

#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<&'static str, Rc<FetchResult>>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached entry for `key`, running `load` only on a miss.
    pub fn get_or_load(&mut self, key: &'static str, load: impl FnOnce() -> FetchResult) -> Rc<FetchResult> {
        if let Some(hit) = self.entries.get(key) {
            return Rc::clone(hit);
        }
        self.loads += 1;
        let entry = Rc::new(load());
        self.entries.insert(key, Rc::clone(&entry));
        entry
    }

    pub fn get(&self, key: &str) -> Option<Rc<FetchResult>> {
        self.entries.get(key).cloned()
    }

    /// Drop the entry for `key`; the next `get_or_load` fetches again.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of loader invocations so far.
    pub fn loads(&self) -> usize {
        self.loads
    }
}
