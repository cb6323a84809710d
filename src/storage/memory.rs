use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::{EntryStore, StoredEntry};
use crate::Result;

/// In-process store, used for standalone mode and tests.
#[derive(Debug)]
pub struct MemoryStore<T> {
    entries: RwLock<BTreeMap<String, T>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T> MemoryStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: StoredEntry> EntryStore<T> for MemoryStore<T> {
    fn load(&self, name: &str) -> Result<Option<T>> {
        Ok(self.entries.read().get(name).cloned())
    }

    fn save(&self, entry: &T) -> Result<()> {
        self.entries
            .write()
            .insert(entry.entry_name().to_string(), entry.clone());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.entries.write().remove(name).is_some())
    }

    fn list_names(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}
