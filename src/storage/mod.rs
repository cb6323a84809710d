//! Persistence contract for principals on the authority side.

mod file;
mod memory;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::Result;
use crate::types::{Principal, Role, User};

/// A value that can be stored under its own name.
pub trait StoredEntry: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn entry_name(&self) -> &str;
}

impl StoredEntry for User {
    fn entry_name(&self) -> &str {
        self.name()
    }
}

impl StoredEntry for Role {
    fn entry_name(&self) -> &str {
        self.name()
    }
}

/// Name-keyed store of users or roles.
///
/// Callers serialize access per name; stores only need to make a single
/// `save` atomic with respect to concurrent `load`s.
pub trait EntryStore<T: StoredEntry>: Send + Sync {
    fn load(&self, name: &str) -> Result<Option<T>>;

    fn save(&self, entry: &T) -> Result<()>;

    /// Returns whether an entry was removed.
    fn delete(&self, name: &str) -> Result<bool>;

    /// All stored names, sorted.
    fn list_names(&self) -> Result<Vec<String>>;
}
