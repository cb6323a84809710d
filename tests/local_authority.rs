//! File-backed authority persistence and the deadline-bounded checker path.

use std::thread;
use std::time::Duration;

use authority_core::{
    AuthorityChecker, AuthorityClient, AuthorityConfig, CheckTarget, LocalAuthority, LoginRequest,
    PathPattern, PatternTreeInfo, PermissionInfo, PrivilegeCheckRequest, PrivilegeType, Result,
    RoleMembershipRequest, StatusCode,
};
use tempfile::TempDir;

fn target(raw: &str) -> CheckTarget {
    CheckTarget::path(raw).unwrap()
}

#[test]
fn grants_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let config = AuthorityConfig::default();
    {
        let authority = LocalAuthority::open(&config, dir.path()).unwrap();
        assert!(authority.create_user("alice", "secret1").unwrap());
        assert!(authority.create_role("readers").unwrap());
        authority
            .grant_role_privilege("readers", PrivilegeType::ReadData, &target("root.sg.**"), false)
            .unwrap();
        authority.grant_role_to_user("readers", "alice").unwrap();
        let table = CheckTarget::table("db", "t1");
        authority
            .grant_user_privilege("alice", PrivilegeType::Select, &table, true)
            .unwrap();
    }

    let reopened = LocalAuthority::open(&config, dir.path()).unwrap();
    assert_eq!(reopened.list_users().unwrap(), vec!["alice".to_string(), "root".to_string()]);
    assert_eq!(reopened.list_roles().unwrap(), vec!["readers".to_string()]);

    let alice = reopened.user("alice").unwrap().unwrap();
    assert!(alice.has_role("readers"));

    let request = PrivilegeCheckRequest::object(
        "alice",
        PrivilegeType::Select,
        "db",
        Some("t1".into()),
        true,
    );
    let info = reopened.check_privilege(&request).unwrap();
    assert!(info.status.is_success());

    let login = reopened
        .login(&LoginRequest {
            username: "alice".into(),
            password: "secret1".into(),
        })
        .unwrap();
    assert!(login.status.is_success());
    assert_eq!(login.roles.len(), 1);
}

#[test]
fn dropped_role_is_gone_after_reopen() {
    let dir = TempDir::new().unwrap();
    let config = AuthorityConfig::default();
    {
        let authority = LocalAuthority::open(&config, dir.path()).unwrap();
        authority.create_user("alice", "secret1").unwrap();
        authority.create_role("writers").unwrap();
        authority.grant_role_to_user("writers", "alice").unwrap();
        assert!(authority.drop_role("writers").unwrap());
    }
    let reopened = LocalAuthority::open(&config, dir.path()).unwrap();
    assert!(reopened.role("writers").unwrap().is_none());
    assert!(!reopened.user("alice").unwrap().unwrap().has_role("writers"));
}

#[test]
fn admin_is_not_reinitialized() {
    let dir = TempDir::new().unwrap();
    let config = AuthorityConfig::default();
    {
        let authority = LocalAuthority::open(&config, dir.path()).unwrap();
        authority.update_password("root", "changed-pw").unwrap();
    }
    let reopened = LocalAuthority::open(&config, dir.path()).unwrap();
    let login = |password: &str| {
        reopened
            .login(&LoginRequest {
                username: "root".into(),
                password: password.into(),
            })
            .unwrap()
            .status
            .code
    };
    assert_eq!(login("changed-pw"), StatusCode::Success);
    assert_eq!(login("root"), StatusCode::WrongLoginPassword);
}

#[test]
fn checker_over_deadline_client() {
    let dir = TempDir::new().unwrap();
    let config = AuthorityConfig::builder()
        .rpc_timeout(Duration::from_secs(5))
        .rpc_workers(2)
        .build()
        .unwrap();
    let authority = LocalAuthority::open(&config, dir.path()).unwrap();
    authority.create_user("alice", "secret1").unwrap();
    authority
        .grant_user_privilege("alice", PrivilegeType::WriteData, &target("root.sg.d1.**"), false)
        .unwrap();

    let checker = AuthorityChecker::with_deadline(&config, authority).unwrap();
    let paths: Vec<PathPattern> = ["root.sg.d1.s1", "root.sg.d2.s1"]
        .into_iter()
        .map(|raw| PathPattern::parse(raw).unwrap())
        .collect();
    let result = checker.check_paths("alice", &paths, PrivilegeType::WriteData);
    assert_eq!(result.failed_positions, vec![1]);
    assert!(checker.check_user("alice", "secret1").is_success());
    assert!(checker.fetcher().cache().get_user("alice").is_some());
}

/// Answers every call after `delay`.
struct Slow {
    delay: Duration,
}

impl Slow {
    fn wait(&self) {
        thread::sleep(self.delay);
    }
}

impl AuthorityClient for Slow {
    fn check_privilege(&self, _request: &PrivilegeCheckRequest) -> Result<PermissionInfo> {
        self.wait();
        Ok(PermissionInfo::success())
    }

    fn login(&self, _request: &LoginRequest) -> Result<PermissionInfo> {
        self.wait();
        Ok(PermissionInfo::success())
    }

    fn check_role_membership(&self, _request: &RoleMembershipRequest) -> Result<PermissionInfo> {
        self.wait();
        Ok(PermissionInfo::success())
    }

    fn fetch_authorized_pattern_tree(
        &self,
        _request: &PrivilegeCheckRequest,
    ) -> Result<PatternTreeInfo> {
        self.wait();
        Ok(PatternTreeInfo::new(PermissionInfo::success().status))
    }
}

#[test]
fn late_answer_is_an_execution_error() {
    let config = AuthorityConfig::builder()
        .rpc_timeout(Duration::from_millis(20))
        .rpc_workers(1)
        .build()
        .unwrap();
    let checker = AuthorityChecker::with_deadline(
        &config,
        Slow {
            delay: Duration::from_millis(500),
        },
    )
    .unwrap();

    let status = checker.check_system_privilege("alice", PrivilegeType::UseCq);
    assert_eq!(status.code, StatusCode::ExecuteStatementError);
    assert!(checker.fetcher().cache().get_user("alice").is_none());
}
