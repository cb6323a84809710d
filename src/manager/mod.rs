//! Authority-side principal management.

mod hash_lock;
mod local;

pub use hash_lock::HashLock;
pub use local::LocalAuthority;
