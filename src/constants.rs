//! Constants shared across the crate.

/// First segment of every legal path.
pub const PATH_ROOT: &str = "root";
pub const PATH_SEPARATOR: char = '.';
/// Matches exactly one path level.
pub const ONE_LEVEL_WILDCARD: &str = "*";
/// Matches any number of trailing path levels, including none.
pub const MULTI_LEVEL_WILDCARD: &str = "**";

pub const DEFAULT_ADMIN_NAME: &str = "root";
pub const DEFAULT_ADMIN_PASSWORD: &str = "root";

pub const DEFAULT_HEARTBEAT_TIMEOUT_MS: u64 = 20_000;
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RPC_WORKERS: usize = 4;
/// Pending remote calls allowed per worker before new calls are refused.
pub const RPC_QUEUE_DEPTH_PER_WORKER: usize = 4;

pub const DEFAULT_MIN_NAME_LEN: usize = 4;
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 4;
pub const MAX_NAME_LEN: usize = 64;
pub const MAX_PASSWORD_LEN: usize = 64;

/// Stripes in the per-principal lock table.
pub const HASH_LOCK_STRIPES: usize = 100;

/// Prefix tagging the digest algorithm of a stored password.
pub const PASSWORD_HASH_PREFIX: &str = "SHA-256:";

/// Extension of one serialized principal in a file store.
pub const ENTRY_FILE_EXTENSION: &str = "json";

pub const NO_PERMISSION_PROMPT: &str = "No permissions for this operation, please add privilege ";
pub const AUTHENTICATION_FAILED: &str = "Authentication failed.";
