//! Runtime configuration for the authorization core.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_PASSWORD, DEFAULT_HEARTBEAT_TIMEOUT_MS,
    DEFAULT_MIN_NAME_LEN, DEFAULT_MIN_PASSWORD_LEN, DEFAULT_RPC_TIMEOUT_MS, DEFAULT_RPC_WORKERS,
    MAX_NAME_LEN, MAX_PASSWORD_LEN,
};
use crate::{AuthorityError, Result};

fn default_true() -> bool {
    true
}

fn default_admin_name() -> String {
    DEFAULT_ADMIN_NAME.to_string()
}

fn default_admin_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}

fn default_heartbeat_timeout_ms() -> u64 {
    DEFAULT_HEARTBEAT_TIMEOUT_MS
}

fn default_rpc_timeout_ms() -> u64 {
    DEFAULT_RPC_TIMEOUT_MS
}

fn default_rpc_workers() -> usize {
    DEFAULT_RPC_WORKERS
}

fn default_min_name_len() -> usize {
    DEFAULT_MIN_NAME_LEN
}

fn default_min_password_len() -> usize {
    DEFAULT_MIN_PASSWORD_LEN
}

/// Settings for the checker, fetcher and local authority.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityConfig {
    /// Name of the super user; every privilege check for it is granted.
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    /// Initial password of the super user, used only when it is first created.
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    /// Heartbeats further apart than this mark the node cache stale.
    #[serde(default = "default_heartbeat_timeout_ms")]
    pub heartbeat_timeout_ms: u64,
    /// Per-call deadline for remote authority requests.
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,
    #[serde(default = "default_rpc_workers")]
    pub rpc_workers: usize,
    /// Whether snapshots bundled in authority responses are cached.
    #[serde(default = "default_true")]
    pub accept_cache: bool,
    #[serde(default = "default_min_name_len")]
    pub min_name_len: usize,
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            admin_name: default_admin_name(),
            admin_password: default_admin_password(),
            heartbeat_timeout_ms: DEFAULT_HEARTBEAT_TIMEOUT_MS,
            rpc_timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
            rpc_workers: DEFAULT_RPC_WORKERS,
            accept_cache: true,
            min_name_len: DEFAULT_MIN_NAME_LEN,
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

impl AuthorityConfig {
    #[must_use]
    pub fn builder() -> AuthorityConfigBuilder {
        AuthorityConfigBuilder::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs_err::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    #[must_use]
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.heartbeat_timeout_ms)
    }

    #[must_use]
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(AuthorityError::InvalidConfig { reason });
        if self.admin_name.is_empty() {
            return invalid("admin_name must not be empty".to_string());
        }
        if self.heartbeat_timeout_ms == 0 {
            return invalid("heartbeat_timeout_ms must be positive".to_string());
        }
        if self.rpc_timeout_ms == 0 {
            return invalid("rpc_timeout_ms must be positive".to_string());
        }
        if self.rpc_workers == 0 {
            return invalid("rpc_workers must be at least 1".to_string());
        }
        if self.min_name_len == 0 || self.min_name_len > MAX_NAME_LEN {
            return invalid(format!("min_name_len must be within 1..={MAX_NAME_LEN}"));
        }
        if self.min_password_len == 0 || self.min_password_len > MAX_PASSWORD_LEN {
            return invalid(format!(
                "min_password_len must be within 1..={MAX_PASSWORD_LEN}"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorityConfigBuilder {
    inner: AuthorityConfig,
}

impl AuthorityConfigBuilder {
    #[must_use]
    pub fn admin(mut self, name: impl Into<String>, password: impl Into<String>) -> Self {
        self.inner.admin_name = name.into();
        self.inner.admin_password = password.into();
        self
    }

    #[must_use]
    pub fn heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.inner.heartbeat_timeout_ms = duration_ms(timeout);
        self
    }

    #[must_use]
    pub fn rpc_timeout(mut self, timeout: Duration) -> Self {
        self.inner.rpc_timeout_ms = duration_ms(timeout);
        self
    }

    #[must_use]
    pub fn rpc_workers(mut self, workers: usize) -> Self {
        self.inner.rpc_workers = workers;
        self
    }

    #[must_use]
    pub fn accept_cache(mut self, accept: bool) -> Self {
        self.inner.accept_cache = accept;
        self
    }

    #[must_use]
    pub fn min_name_len(mut self, len: usize) -> Self {
        self.inner.min_name_len = len;
        self
    }

    #[must_use]
    pub fn min_password_len(mut self, len: usize) -> Self {
        self.inner.min_password_len = len;
        self
    }

    pub fn build(self) -> Result<AuthorityConfig> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
