//! Integration tests for grant-option checks resolved purely from the cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use authority_core::{
    AuthorityChecker, AuthorityClient, AuthorityConfig, AuthorityError, CheckRequest, CheckTarget,
    LoginRequest, PathPattern, PatternTreeInfo, PermissionInfo, PrivilegeCheckRequest,
    PrivilegeType, Result, Role, RoleMembershipRequest, User,
};

/// Fails every call and counts how often it was asked.
#[derive(Default)]
struct Offline {
    calls: AtomicUsize,
}

impl Offline {
    fn fail<T>(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AuthorityError::Transport("offline".into()))
    }
}

impl AuthorityClient for Offline {
    fn check_privilege(&self, _request: &PrivilegeCheckRequest) -> Result<PermissionInfo> {
        self.fail()
    }

    fn login(&self, _request: &LoginRequest) -> Result<PermissionInfo> {
        self.fail()
    }

    fn check_role_membership(&self, _request: &RoleMembershipRequest) -> Result<PermissionInfo> {
        self.fail()
    }

    fn fetch_authorized_pattern_tree(
        &self,
        _request: &PrivilegeCheckRequest,
    ) -> Result<PatternTreeInfo> {
        self.fail()
    }
}

fn path(raw: &str) -> CheckTarget {
    CheckTarget::path(raw).unwrap()
}

fn scenario() -> (AuthorityChecker, Arc<Offline>) {
    let client = Arc::new(Offline::default());
    let checker = AuthorityChecker::new(&AuthorityConfig::default(), client.clone()).unwrap();

    let mut role = Role::new("role1");
    role.grants_mut()
        .grant(PrivilegeType::ReadData, &path("root.t.**"), true)
        .unwrap();

    let mut user = User::new("user1", "hash");
    user.add_role("role1");
    let grants = user.grants_mut();
    grants
        .grant(PrivilegeType::UsePipe, &CheckTarget::System, true)
        .unwrap();
    grants
        .grant(PrivilegeType::WriteSchema, &path("root.d1.**"), true)
        .unwrap();

    checker.fetcher().cache().put_role(role);
    checker.fetcher().cache().put_user(user);
    (checker, client)
}

fn grant_option(checker: &AuthorityChecker, privilege: PrivilegeType, target: CheckTarget) -> bool {
    checker
        .check(&CheckRequest::new("user1", privilege, target).with_grant_option())
        .is_success()
}

#[test]
fn grant_option_scenario() {
    let (checker, client) = scenario();

    assert!(grant_option(&checker, PrivilegeType::WriteSchema, path("root.d1.**")));
    assert!(!grant_option(&checker, PrivilegeType::WriteSchema, path("root.**")));
    assert!(grant_option(&checker, PrivilegeType::WriteSchema, path("root.d1.d1.**")));
    assert!(grant_option(&checker, PrivilegeType::ReadData, path("root.t.t1")));
    assert!(!grant_option(&checker, PrivilegeType::UseTrigger, CheckTarget::System));
    assert!(grant_option(&checker, PrivilegeType::UsePipe, CheckTarget::System));

    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn privilege_without_option_is_not_enough() {
    let (checker, client) = scenario();
    checker
        .fetcher()
        .cache()
        .put_role({
            let mut role = Role::new("role1");
            role.grants_mut()
                .grant(PrivilegeType::ReadData, &path("root.t.**"), false)
                .unwrap();
            role
        });

    let path_t1 = PathPattern::parse("root.t.t1").unwrap();
    assert!(
        checker
            .check_path_privilege("user1", &path_t1, PrivilegeType::ReadData)
            .is_success()
    );
    assert!(!grant_option(&checker, PrivilegeType::ReadData, path("root.t.t1")));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn batch_grant_option_requires_every_path() {
    let (checker, _) = scenario();
    let paths: Vec<PathPattern> = ["root.d1.a", "root.d1.b.c"]
        .into_iter()
        .map(|raw| PathPattern::parse(raw).unwrap())
        .collect();
    assert!(
        checker
            .check_paths_grant_option("user1", &paths, PrivilegeType::WriteSchema)
            .is_success()
    );

    let mut mixed = paths.clone();
    mixed.push(PathPattern::parse("root.d2").unwrap());
    let status = checker.check_paths_grant_option("user1", &mixed, PrivilegeType::WriteSchema);
    assert!(status.is_denied());
    assert_eq!(
        status.message.as_deref(),
        Some("No permissions for this operation, please add privilege WRITE_SCHEMA on [root.d2]")
    );
}

#[test]
fn open_id_user_passes_every_grant_option_check() {
    let (checker, client) = scenario();
    checker.fetcher().cache().put_user(User::open_id("sso1"));
    for privilege in PrivilegeType::ALL {
        let target = match privilege.scopes()[0] {
            authority_core::PrivilegeScope::System => CheckTarget::System,
            authority_core::PrivilegeScope::Path => path("root.anything.**"),
            authority_core::PrivilegeScope::Object => CheckTarget::table("db", "tbl"),
        };
        let request = CheckRequest::new("sso1", *privilege, target).with_grant_option();
        assert!(checker.check(&request).is_success(), "{privilege}");
    }
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}
