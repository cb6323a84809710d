//! Entry point used by the query layer for every authorization decision.

use std::sync::Arc;
use std::time::Instant;

use prometheus::Registry;

use super::client::AuthorityClient;
use super::deadline::DeadlineClient;
use super::fetcher::AuthorityFetcher;
use super::metrics::AuthMetrics;
use crate::config::AuthorityConfig;
use crate::constants::NO_PERMISSION_PROMPT;
use crate::types::object::object_name;
use crate::types::{
    AuthStatus, BatchOutcome, CheckOutcome, CheckRequest, CheckTarget, PathPattern, PatternTree,
    PermissionOperation, PermissionQuery, PrivilegeScope, PrivilegeType, RoleMembership,
    StatusCode,
};
use crate::Result;

/// Result of checking a list of paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsCheckResult {
    pub status: AuthStatus,
    /// Zero-based positions of the denied paths, in request order.
    pub failed_positions: Vec<usize>,
}

/// Authorization facade.
///
/// The configured super user is granted every privilege and grant option
/// without consulting the cache. Everything else goes through the
/// [`AuthorityFetcher`], and the verdict is shaped into an [`AuthStatus`].
pub struct AuthorityChecker {
    admin_name: String,
    fetcher: AuthorityFetcher,
    metrics: AuthMetrics,
}

impl AuthorityChecker {
    /// Builds a checker whose metrics live on a private registry.
    pub fn new(config: &AuthorityConfig, client: Arc<dyn AuthorityClient>) -> Result<Self> {
        Self::with_registry(config, client, &Registry::new())
    }

    /// Builds a checker that registers its metrics on `registry`.
    pub fn with_registry(
        config: &AuthorityConfig,
        client: Arc<dyn AuthorityClient>,
        registry: &Registry,
    ) -> Result<Self> {
        Ok(Self {
            admin_name: config.admin_name.clone(),
            fetcher: AuthorityFetcher::new(config, client),
            metrics: AuthMetrics::new(registry)?,
        })
    }

    /// Wraps `client` so every remote call is bounded by the configured RPC timeout.
    pub fn with_deadline<C: AuthorityClient + 'static>(
        config: &AuthorityConfig,
        client: C,
    ) -> Result<Self> {
        config.validate()?;
        let client = DeadlineClient::new(client, config.rpc_workers, config.rpc_timeout())?;
        Self::new(config, Arc::new(client))
    }

    #[must_use]
    pub fn is_super_user(&self, username: &str) -> bool {
        self.admin_name == username
    }

    #[must_use]
    pub fn fetcher(&self) -> &AuthorityFetcher {
        &self.fetcher
    }

    #[must_use]
    pub fn metrics(&self) -> &AuthMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        self.metrics.registry()
    }

    pub fn invalidate_cache(&self, username: &str, rolename: &str) -> bool {
        self.fetcher.invalidate_cache(username, rolename)
    }

    pub fn refresh_heartbeat(&self) {
        self.fetcher.refresh_heartbeat();
    }

    pub fn set_accept_cache(&self, accept: bool) {
        self.fetcher.set_accept_cache(accept);
    }

    /// Login is never short-circuited, not even for the super user.
    pub fn check_user(&self, username: &str, password: &str) -> AuthStatus {
        self.fetcher.check_user(username, password)
    }

    pub fn check_role(&self, username: &str, rolename: &str) -> RoleMembership {
        self.fetcher.check_role(username, rolename)
    }

    pub fn operate_permission(&self, operation: &PermissionOperation) -> AuthStatus {
        self.fetcher.operate_permission(operation)
    }

    pub fn query_permission(&self, query: &PermissionQuery) -> Result<Vec<String>> {
        self.fetcher.query_permission(query)
    }

    pub fn authorized_path_tree(
        &self,
        username: &str,
        privilege: PrivilegeType,
    ) -> Result<PatternTree> {
        if self.is_super_user(username) {
            privilege.validate(PrivilegeScope::Path)?;
            return Ok(PatternTree::all());
        }
        self.fetcher.authorized_pattern_tree(username, privilege)
    }

    pub fn check_system_privilege(&self, username: &str, privilege: PrivilegeType) -> AuthStatus {
        self.check_target(username, privilege, &CheckTarget::System, false)
    }

    pub fn check_system_grant_option(
        &self,
        username: &str,
        privilege: PrivilegeType,
    ) -> AuthStatus {
        self.check_target(username, privilege, &CheckTarget::System, true)
    }

    pub fn check_path_privilege(
        &self,
        username: &str,
        path: &PathPattern,
        privilege: PrivilegeType,
    ) -> AuthStatus {
        self.check_target(username, privilege, &CheckTarget::Path(path.clone()), false)
    }

    pub fn check_object_privilege(
        &self,
        username: &str,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
    ) -> AuthStatus {
        let target = CheckTarget::Object {
            database: database.to_string(),
            table: table.map(str::to_string),
        };
        self.check_target(username, privilege, &target, false)
    }

    pub fn check_object_grant_option(
        &self,
        username: &str,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
    ) -> AuthStatus {
        let target = CheckTarget::Object {
            database: database.to_string(),
            table: table.map(str::to_string),
        };
        self.check_target(username, privilege, &target, true)
    }

    /// Checks `privilege` on each path and reports which ones are denied.
    pub fn check_paths(
        &self,
        username: &str,
        paths: &[PathPattern],
        privilege: PrivilegeType,
    ) -> PathsCheckResult {
        self.timed(privilege, || {
            if let Some(status) = scope_mismatch(privilege, PrivilegeScope::Path) {
                return PathsCheckResult {
                    status,
                    failed_positions: Vec::new(),
                };
            }
            if self.is_super_user(username) {
                return PathsCheckResult {
                    status: AuthStatus::success(),
                    failed_positions: Vec::new(),
                };
            }
            match self.fetcher.check_paths(username, paths, privilege, false) {
                BatchOutcome::Checked(failed) if failed.is_empty() => PathsCheckResult {
                    status: AuthStatus::success(),
                    failed_positions: failed,
                },
                BatchOutcome::Checked(failed) => PathsCheckResult {
                    status: denial(privilege, Some(&path_list(paths, &failed))),
                    failed_positions: failed,
                },
                BatchOutcome::ExecutionError(message) => PathsCheckResult {
                    status: AuthStatus::with_message(StatusCode::ExecuteStatementError, message),
                    failed_positions: Vec::new(),
                },
            }
        })
    }

    /// Grant-option check over a list of paths; every path must pass.
    pub fn check_paths_grant_option(
        &self,
        username: &str,
        paths: &[PathPattern],
        privilege: PrivilegeType,
    ) -> AuthStatus {
        self.timed(privilege, || {
            if let Some(status) = scope_mismatch(privilege, PrivilegeScope::Path) {
                return status;
            }
            if self.is_super_user(username) {
                return AuthStatus::success();
            }
            match self.fetcher.check_paths(username, paths, privilege, true) {
                BatchOutcome::Checked(failed) if failed.is_empty() => AuthStatus::success(),
                BatchOutcome::Checked(failed) => {
                    denial(privilege, Some(&path_list(paths, &failed)))
                }
                BatchOutcome::ExecutionError(message) => {
                    AuthStatus::with_message(StatusCode::ExecuteStatementError, message)
                }
            }
        })
    }

    /// Generic entry point for a fully described request.
    pub fn check(&self, request: &CheckRequest) -> AuthStatus {
        self.check_target(
            &request.principal,
            request.privilege,
            &request.target,
            request.grant_option,
        )
    }

    fn check_target(
        &self,
        username: &str,
        privilege: PrivilegeType,
        target: &CheckTarget,
        grant_option: bool,
    ) -> AuthStatus {
        self.timed(privilege, || {
            if let Some(status) = scope_mismatch(privilege, target.scope()) {
                return status;
            }
            if self.is_super_user(username) {
                return AuthStatus::success();
            }
            match self
                .fetcher
                .check_privilege(username, privilege, target, grant_option)
            {
                CheckOutcome::Granted => AuthStatus::success(),
                CheckOutcome::Denied => {
                    let on = match target {
                        CheckTarget::System => None,
                        CheckTarget::Path(path) => Some(path.to_string()),
                        CheckTarget::Object { database, table } => {
                            Some(object_name(database, table.as_deref()))
                        }
                    };
                    denial(privilege, on.as_deref())
                }
                CheckOutcome::ExecutionError(message) => {
                    AuthStatus::with_message(StatusCode::ExecuteStatementError, message)
                }
            }
        })
    }

    fn timed<T>(&self, privilege: PrivilegeType, check: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let result = check();
        let elapsed = started.elapsed();
        self.metrics.record(elapsed);
        tracing::trace!(
            target = "authority::checker",
            %privilege,
            elapsed_us = elapsed.as_micros() as u64,
            "privilege check finished"
        );
        result
    }
}

/// Rejects a privilege outside `scope` before any cache or remote lookup.
fn scope_mismatch(privilege: PrivilegeType, scope: PrivilegeScope) -> Option<AuthStatus> {
    privilege
        .validate(scope)
        .err()
        .map(|err| AuthStatus::with_message(err.status_code(), err.to_string()))
}

fn path_list(paths: &[PathPattern], positions: &[usize]) -> String {
    let names: Vec<String> = positions
        .iter()
        .filter_map(|idx| paths.get(*idx))
        .map(ToString::to_string)
        .collect();
    format!("[{}]", names.join(", "))
}

fn denial(privilege: PrivilegeType, on: Option<&str>) -> AuthStatus {
    let message = match on {
        Some(on) => format!("{NO_PERMISSION_PROMPT}{privilege} on {on}"),
        None => format!("{NO_PERMISSION_PROMPT}{privilege}"),
    };
    AuthStatus::with_message(StatusCode::NoPermission, message)
}
