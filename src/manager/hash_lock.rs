use std::hash::{DefaultHasher, Hash, Hasher};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::constants::HASH_LOCK_STRIPES;

/// Striped reader/writer locks keyed by principal name.
///
/// Two names may share a stripe, so a caller must never hold a guard while
/// acquiring another guard from the same table.
#[derive(Debug)]
pub struct HashLock {
    stripes: Box<[RwLock<()>]>,
}

impl Default for HashLock {
    fn default() -> Self {
        Self::new(HASH_LOCK_STRIPES)
    }
}

impl HashLock {
    #[must_use]
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| RwLock::new(())).collect(),
        }
    }

    pub fn read(&self, name: &str) -> RwLockReadGuard<'_, ()> {
        self.stripe(name).read()
    }

    pub fn write(&self, name: &str) -> RwLockWriteGuard<'_, ()> {
        self.stripe(name).write()
    }

    fn stripe(&self, name: &str) -> &RwLock<()> {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        let idx = (hasher.finish() % self.stripes.len() as u64) as usize;
        &self.stripes[idx]
    }
}
