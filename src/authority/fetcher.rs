//! Cache-first privilege resolution with fallback to the remote authority.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::cache::AuthorityCache;
use super::client::AuthorityClient;
use crate::config::AuthorityConfig;
use crate::constants::AUTHENTICATION_FAILED;
use crate::password::validate_password;
use crate::types::{
    AuthStatus, BatchOutcome, CheckOutcome, CheckTarget, LoginRequest, PathPattern, PatternTree,
    PermissionOperation, PermissionQuery, PrivilegeCheckRequest, PrivilegeScope, PrivilegeType,
    Principal, Role, RoleMembership, RoleMembershipRequest, StatusCode, User,
};
use crate::{AuthorityError, Result};

/// Resolves privilege questions from the node cache, asking the authority
/// only when the cache cannot decide.
///
/// A cached user whose direct grants and cached roles all fail a check is
/// denied locally. A user missing from the cache, or a role of the user
/// missing from the cache, sends the whole request to the authority, and a
/// successful answer is cached before it is returned.
///
/// Heartbeats drive staleness: once two consecutive heartbeats are further
/// apart than the configured timeout, the next check flushes the cache.
pub struct AuthorityFetcher {
    cache: AuthorityCache,
    client: Arc<dyn AuthorityClient>,
    heartbeat_timeout: Duration,
    stale: AtomicBool,
    last_heartbeat: Mutex<Option<Instant>>,
    accept_cache: AtomicBool,
}

impl AuthorityFetcher {
    pub fn new(config: &AuthorityConfig, client: Arc<dyn AuthorityClient>) -> Self {
        Self {
            cache: AuthorityCache::new(),
            client,
            heartbeat_timeout: config.heartbeat_timeout(),
            stale: AtomicBool::new(false),
            last_heartbeat: Mutex::new(None),
            accept_cache: AtomicBool::new(config.accept_cache),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &AuthorityCache {
        &self.cache
    }

    #[must_use]
    pub fn accept_cache(&self) -> bool {
        self.accept_cache.load(Ordering::Acquire)
    }

    /// When disabled, authority answers are still honored but not cached.
    pub fn set_accept_cache(&self, accept: bool) {
        self.accept_cache.store(accept, Ordering::Release);
    }

    pub fn refresh_heartbeat(&self) {
        self.refresh_heartbeat_at(Instant::now());
    }

    /// Records a heartbeat observed at `now`.
    ///
    /// The first heartbeat only seeds the timestamp.
    pub fn refresh_heartbeat_at(&self, now: Instant) {
        let mut last = self.last_heartbeat.lock();
        if let Some(previous) = *last {
            let gap = now.saturating_duration_since(previous);
            if gap > self.heartbeat_timeout {
                self.stale.store(true, Ordering::Release);
                tracing::warn!(
                    target = "authority::fetcher",
                    gap_ms = gap.as_millis() as u64,
                    timeout_ms = self.heartbeat_timeout.as_millis() as u64,
                    "heartbeat gap exceeded timeout; cache marked stale"
                );
            }
        }
        *last = Some(now);
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    /// Flushes the cache if it was marked stale. Returns whether a flush happened.
    pub fn check_cache_available(&self) -> bool {
        if !self.stale.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.cache.invalidate_all();
        tracing::warn!(target = "authority::fetcher", "flushed stale authority cache");
        true
    }

    pub fn invalidate_cache(&self, username: &str, rolename: &str) -> bool {
        let removed = self.cache.invalidate(username, rolename);
        tracing::debug!(
            target = "authority::fetcher",
            username,
            rolename,
            removed,
            "invalidated cached principals"
        );
        removed
    }

    /// Checks one privilege, or its grant option, on a single target.
    pub fn check_privilege(
        &self,
        username: &str,
        privilege: PrivilegeType,
        target: &CheckTarget,
        grant_option: bool,
    ) -> CheckOutcome {
        self.check_cache_available();
        if let Some(granted) = self.resolve_locally(username, |principal| {
            principal.check(privilege, target, grant_option)
        }) {
            return CheckOutcome::from_bool(granted);
        }
        let request = PrivilegeCheckRequest::for_target(username, privilege, target, grant_option);
        self.check_remotely(&request)
    }

    /// Checks `privilege` on every path, reporting the denied positions.
    ///
    /// For a grant-option check the batch is authorized only when every path passes.
    pub fn check_paths(
        &self,
        username: &str,
        paths: &[PathPattern],
        privilege: PrivilegeType,
        grant_option: bool,
    ) -> BatchOutcome {
        if paths.is_empty() {
            return BatchOutcome::Checked(Vec::new());
        }
        self.check_cache_available();
        if let Some(user) = self.cache.get_user(username) {
            let mut failed = Vec::new();
            let mut resolved = true;
            for (idx, path) in paths.iter().enumerate() {
                let target = CheckTarget::Path(path.clone());
                match self.local_verdict(&user, |principal| {
                    principal.check(privilege, &target, grant_option)
                }) {
                    Some(true) => {}
                    Some(false) => failed.push(idx),
                    None => {
                        resolved = false;
                        break;
                    }
                }
            }
            if resolved {
                return BatchOutcome::Checked(failed);
            }
        }
        let request =
            PrivilegeCheckRequest::paths(username, privilege, paths.to_vec(), grant_option);
        self.check_paths_remotely(&request)
    }

    /// Union of every pattern on which `username` holds `privilege`.
    pub fn authorized_pattern_tree(
        &self,
        username: &str,
        privilege: PrivilegeType,
    ) -> Result<PatternTree> {
        privilege.validate(PrivilegeScope::Path)?;
        self.check_cache_available();
        if let Some(tree) = self.local_pattern_tree(username, privilege) {
            return Ok(tree);
        }

        tracing::debug!(
            target = "authority::fetcher",
            username,
            %privilege,
            "pattern tree not resolvable from cache; asking authority"
        );
        let request = PrivilegeCheckRequest::paths(username, privilege, Vec::new(), false);
        let info = self
            .client
            .fetch_authorized_pattern_tree(&request)
            .inspect_err(|err| {
                tracing::error!(
                    target = "authority::fetcher",
                    username,
                    error = %err,
                    "failed to fetch authorized pattern tree"
                );
            })?;
        match info.status.code {
            StatusCode::Success => {
                let tree = PatternTree::from_bytes(&info.pattern_tree)?;
                self.cache_snapshot(info.user, info.roles);
                Ok(tree)
            }
            StatusCode::UserNotExist | StatusCode::NoPermission => Ok(PatternTree::new()),
            code => Err(AuthorityError::Remote {
                code,
                message: info.status.message.unwrap_or_default(),
            }),
        }
    }

    /// Verifies a login.
    pub fn check_user(&self, username: &str, password: &str) -> AuthStatus {
        self.check_cache_available();
        if let Some(user) = self.cache.get_user(username) {
            if user.is_open_id() {
                return AuthStatus::success();
            }
            let verified = user
                .password_hash()
                .is_some_and(|stored| validate_password(username, password, stored));
            return if verified {
                AuthStatus::success()
            } else {
                AuthStatus::with_message(StatusCode::WrongLoginPassword, AUTHENTICATION_FAILED)
            };
        }

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        match self.client.login(&request) {
            Ok(info) => match info.status.code {
                StatusCode::Success => {
                    self.cache_snapshot(info.user, info.roles);
                    AuthStatus::success()
                }
                StatusCode::UserNotExist | StatusCode::WrongLoginPassword => {
                    AuthStatus::with_message(StatusCode::WrongLoginPassword, AUTHENTICATION_FAILED)
                }
                _ => info.status,
            },
            Err(err) => {
                tracing::error!(
                    target = "authority::fetcher",
                    username,
                    error = %err,
                    "login request to authority failed"
                );
                AuthStatus::with_message(StatusCode::ExecuteStatementError, err.to_string())
            }
        }
    }

    pub fn check_role(&self, username: &str, rolename: &str) -> RoleMembership {
        self.check_cache_available();
        if let Some(user) = self.cache.get_user(username) {
            return if user.is_open_id() || user.has_role(rolename) {
                RoleMembership::HasRole
            } else {
                RoleMembership::NotGranted
            };
        }

        let request = RoleMembershipRequest {
            username: username.to_string(),
            rolename: rolename.to_string(),
        };
        match self.client.check_role_membership(&request) {
            Ok(info) => match info.status.code {
                StatusCode::Success => {
                    self.cache_snapshot(info.user, info.roles);
                    RoleMembership::HasRole
                }
                StatusCode::UserNotHasRole => {
                    self.cache_snapshot(info.user, info.roles);
                    RoleMembership::NotGranted
                }
                _ => RoleMembership::ExecutionError(info.status.to_string()),
            },
            Err(err) => {
                tracing::error!(
                    target = "authority::fetcher",
                    username,
                    rolename,
                    error = %err,
                    "role membership request to authority failed"
                );
                RoleMembership::ExecutionError(err.to_string())
            }
        }
    }

    /// Forwards a management operation to the authority. On success the
    /// cached snapshots of the user and role it touched are dropped.
    pub fn operate_permission(&self, operation: &PermissionOperation) -> AuthStatus {
        match self.client.operate_permission(operation) {
            Ok(status) => {
                if status.is_success() {
                    let (username, rolename) = operation.affected();
                    self.invalidate_cache(username, rolename);
                } else {
                    tracing::info!(
                        target = "authority::fetcher",
                        operation = operation.name(),
                        status = %status,
                        "authority refused management operation"
                    );
                }
                status
            }
            Err(err) => {
                tracing::error!(
                    target = "authority::fetcher",
                    operation = operation.name(),
                    error = %err,
                    "management request to authority failed"
                );
                AuthStatus::with_message(StatusCode::ExecuteStatementError, err.to_string())
            }
        }
    }

    /// Asks the authority for a listing. A refusal comes back as
    /// [`AuthorityError::Remote`].
    pub fn query_permission(&self, query: &PermissionQuery) -> Result<Vec<String>> {
        let response = self.client.query_permission(query).inspect_err(|err| {
            tracing::error!(
                target = "authority::fetcher",
                ?query,
                error = %err,
                "permission query to authority failed"
            );
        })?;
        if response.status.is_success() {
            return Ok(response.names);
        }
        Err(AuthorityError::Remote {
            code: response.status.code,
            message: response.status.message.unwrap_or_default(),
        })
    }

    /// `None` when the cache cannot decide for `username`.
    fn resolve_locally<F>(&self, username: &str, check: F) -> Option<bool>
    where
        F: Fn(&dyn Principal) -> bool,
    {
        let user = self.cache.get_user(username)?;
        self.local_verdict(&user, check)
    }

    /// Direct grants first, then roles in order; a role missing from the
    /// cache makes the verdict unknown.
    fn local_verdict<F>(&self, user: &User, check: F) -> Option<bool>
    where
        F: Fn(&dyn Principal) -> bool,
    {
        if check(user) {
            return Some(true);
        }
        for name in user.roles() {
            let role = self.cache.get_role(name)?;
            if check(role.as_ref()) {
                return Some(true);
            }
        }
        Some(false)
    }

    fn local_pattern_tree(&self, username: &str, privilege: PrivilegeType) -> Option<PatternTree> {
        let user = self.cache.get_user(username)?;
        if user.is_open_id() {
            return Some(PatternTree::all());
        }
        let mut tree = PatternTree::new();
        tree.extend(user.grants().patterns_granting(privilege));
        for name in user.roles() {
            let role = self.cache.get_role(name)?;
            tree.extend(role.grants().patterns_granting(privilege));
        }
        Some(tree)
    }

    fn check_remotely(&self, request: &PrivilegeCheckRequest) -> CheckOutcome {
        tracing::debug!(
            target = "authority::fetcher",
            username = %request.username,
            privilege = %request.privilege,
            scope = %request.scope,
            "cache cannot decide; asking authority"
        );
        let info = match self.client.check_privilege(request) {
            Ok(info) => info,
            Err(err) => {
                log_remote_failure(request, &err);
                return CheckOutcome::ExecutionError(err.to_string());
            }
        };
        let mut outcome = CheckOutcome::from_status(&info.status);
        if outcome.is_granted() && !info.failed_positions.is_empty() {
            outcome = CheckOutcome::Denied;
        }
        if info.status.is_success() {
            self.cache_snapshot(info.user, info.roles);
        }
        outcome
    }

    fn check_paths_remotely(&self, request: &PrivilegeCheckRequest) -> BatchOutcome {
        tracing::debug!(
            target = "authority::fetcher",
            username = %request.username,
            privilege = %request.privilege,
            paths = request.paths.len(),
            "path batch escalated to authority"
        );
        let info = match self.client.check_privilege(request) {
            Ok(info) => info,
            Err(err) => {
                log_remote_failure(request, &err);
                return BatchOutcome::ExecutionError(err.to_string());
            }
        };
        let total = request.paths.len();
        let mut failed: Vec<usize> = info
            .failed_positions
            .iter()
            .copied()
            .filter(|idx| *idx < total)
            .collect();
        failed.sort_unstable();
        failed.dedup();
        let outcome = match CheckOutcome::from_status(&info.status) {
            CheckOutcome::Granted => BatchOutcome::Checked(failed),
            CheckOutcome::Denied if failed.is_empty() => {
                BatchOutcome::Checked((0..total).collect())
            }
            CheckOutcome::Denied => BatchOutcome::Checked(failed),
            CheckOutcome::ExecutionError(message) => BatchOutcome::ExecutionError(message),
        };
        if info.status.is_success() {
            self.cache_snapshot(info.user, info.roles);
        }
        outcome
    }

    /// Roles are published before the user so a reader that finds the user
    /// also finds its roles.
    fn cache_snapshot(&self, user: Option<User>, roles: Vec<Role>) {
        if !self.accept_cache() {
            return;
        }
        let role_count = roles.len();
        for role in roles {
            self.cache.put_role(role);
        }
        if let Some(user) = user {
            tracing::debug!(
                target = "authority::fetcher",
                username = user.name(),
                roles = role_count,
                "cached authority snapshot"
            );
            self.cache.put_user(user);
        }
    }
}

fn log_remote_failure(request: &PrivilegeCheckRequest, err: &AuthorityError) {
    tracing::error!(
        target = "authority::fetcher",
        username = %request.username,
        privilege = %request.privilege,
        error = %err,
        "privilege request to authority failed"
    );
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::types::{PatternTreeInfo, PermissionInfo};

    #[derive(Default)]
    struct FixedClient {
        calls: AtomicUsize,
    }

    impl AuthorityClient for FixedClient {
        fn check_privilege(&self, _request: &PrivilegeCheckRequest) -> Result<PermissionInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PermissionInfo::failure(StatusCode::NoPermission, "denied"))
        }

        fn login(&self, _request: &LoginRequest) -> Result<PermissionInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PermissionInfo::failure(StatusCode::UserNotExist, "no user"))
        }

        fn check_role_membership(
            &self,
            _request: &RoleMembershipRequest,
        ) -> Result<PermissionInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AuthorityError::Transport("down".into()))
        }

        fn fetch_authorized_pattern_tree(
            &self,
            _request: &PrivilegeCheckRequest,
        ) -> Result<PatternTreeInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PatternTreeInfo::new(AuthStatus::success()))
        }
    }

    fn fetcher() -> (AuthorityFetcher, Arc<FixedClient>) {
        let client = Arc::new(FixedClient::default());
        let config = AuthorityConfig::default();
        (AuthorityFetcher::new(&config, client.clone()), client)
    }

    #[test]
    fn first_heartbeat_only_seeds() {
        let (fetcher, _) = fetcher();
        let start = Instant::now();
        fetcher.refresh_heartbeat_at(start);
        assert!(!fetcher.is_stale());
        fetcher.refresh_heartbeat_at(start + Duration::from_secs(5));
        assert!(!fetcher.is_stale());
        fetcher.refresh_heartbeat_at(start + Duration::from_secs(60));
        assert!(fetcher.is_stale());
        assert!(fetcher.check_cache_available());
        assert!(!fetcher.check_cache_available());
    }

    #[test]
    fn cached_user_without_roles_is_denied_locally() {
        let (fetcher, client) = fetcher();
        fetcher.cache().put_user(User::new("user1", "hash"));
        let outcome =
            fetcher.check_privilege("user1", PrivilegeType::Maintain, &CheckTarget::System, false);
        assert_eq!(outcome, CheckOutcome::Denied);
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn open_id_user_gets_whole_tree_and_every_role() {
        let (fetcher, client) = fetcher();
        fetcher.cache().put_user(User::open_id("sso-user"));
        let tree = fetcher
            .authorized_pattern_tree("sso-user", PrivilegeType::ReadData)
            .expect("tree");
        assert_eq!(tree, PatternTree::all());
        assert!(fetcher.check_role("sso-user", "anything").has_role());
        assert_eq!(fetcher.check_user("sso-user", "whatever"), AuthStatus::success());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_login_reports_wrong_password() {
        let (fetcher, _) = fetcher();
        let status = fetcher.check_user("ghost", "pw");
        assert_eq!(status.code, StatusCode::WrongLoginPassword);
        assert_eq!(status.message.as_deref(), Some(AUTHENTICATION_FAILED));
    }

    #[test]
    fn role_transport_failure_is_an_error() {
        let (fetcher, _) = fetcher();
        assert!(matches!(
            fetcher.check_role("user1", "role1"),
            RoleMembership::ExecutionError(_)
        ));
    }

    #[test]
    fn pattern_tree_rejects_non_path_privileges() {
        let (fetcher, client) = fetcher();
        assert!(
            fetcher
                .authorized_pattern_tree("user1", PrivilegeType::Select)
                .is_err()
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }
}
