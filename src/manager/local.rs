//! The authority's source of truth for users and roles.

use std::path::Path;

use super::hash_lock::HashLock;
use crate::authority::AuthorityClient;
use crate::config::AuthorityConfig;
use crate::constants::{AUTHENTICATION_FAILED, MAX_NAME_LEN, MAX_PASSWORD_LEN};
use crate::password::{encrypt_password, validate_password};
use crate::storage::{EntryStore, FileStore, MemoryStore};
use crate::types::{
    AuthStatus, CheckTarget, LoginRequest, PatternTree, PatternTreeInfo, PermissionInfo,
    PermissionOperation, PermissionQuery, PermissionQueryResponse, Principal,
    PrivilegeCheckRequest, PrivilegeScope, PrivilegeType, Role, RoleMembershipRequest,
    StatusCode, User,
};
use crate::{AuthorityError, Result};

/// Manages users and roles on top of two [`EntryStore`]s and answers the
/// node-facing [`AuthorityClient`] contract from them.
///
/// Every operation locks the affected name in a per-name lock table; no
/// operation holds two guards at once.
pub struct LocalAuthority<U, R> {
    admin_name: String,
    min_name_len: usize,
    min_password_len: usize,
    users: U,
    roles: R,
    user_locks: HashLock,
    role_locks: HashLock,
}

impl LocalAuthority<MemoryStore<User>, MemoryStore<Role>> {
    pub fn in_memory(config: &AuthorityConfig) -> Result<Self> {
        Self::new(config, MemoryStore::new(), MemoryStore::new())
    }
}

impl LocalAuthority<FileStore<User>, FileStore<Role>> {
    /// Opens `dir/users` and `dir/roles`, creating them if needed.
    pub fn open(config: &AuthorityConfig, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let users = FileStore::open(dir.join("users"))?;
        let roles = FileStore::open(dir.join("roles"))?;
        Self::new(config, users, roles)
    }
}

impl<U, R> LocalAuthority<U, R>
where
    U: EntryStore<User>,
    R: EntryStore<Role>,
{
    pub fn new(config: &AuthorityConfig, users: U, roles: R) -> Result<Self> {
        config.validate()?;
        let authority = Self {
            admin_name: config.admin_name.clone(),
            min_name_len: config.min_name_len,
            min_password_len: config.min_password_len,
            users,
            roles,
            user_locks: HashLock::default(),
            role_locks: HashLock::default(),
        };
        authority.init_admin(&config.admin_password)?;
        Ok(authority)
    }

    /// Creates the administrator unless it is already stored. Returns whether it was created.
    ///
    /// The administrator's name and password skip the usual validation.
    pub fn init_admin(&self, password: &str) -> Result<bool> {
        let _guard = self.user_locks.write(&self.admin_name);
        if self.users.load(&self.admin_name)?.is_some() {
            return Ok(false);
        }
        let admin = User::new(
            self.admin_name.clone(),
            encrypt_password(&self.admin_name, password),
        );
        self.users.save(&admin)?;
        tracing::info!(
            target = "authority::manager",
            admin = %self.admin_name,
            "administrator initialized"
        );
        Ok(true)
    }

    #[must_use]
    pub fn is_admin(&self, username: &str) -> bool {
        self.admin_name == username
    }

    pub fn user(&self, username: &str) -> Result<Option<User>> {
        let _guard = self.user_locks.read(username);
        self.users.load(username)
    }

    pub fn role(&self, rolename: &str) -> Result<Option<Role>> {
        let _guard = self.role_locks.read(rolename);
        self.roles.load(rolename)
    }

    pub fn list_users(&self) -> Result<Vec<String>> {
        self.users.list_names()
    }

    pub fn list_roles(&self) -> Result<Vec<String>> {
        self.roles.list_names()
    }

    /// Returns `false` when the user already exists.
    pub fn create_user(&self, username: &str, password: &str) -> Result<bool> {
        self.validate_name("user name", username)?;
        self.validate_password(password)?;
        let _guard = self.user_locks.write(username);
        if self.users.load(username)?.is_some() {
            return Ok(false);
        }
        self.users
            .save(&User::new(username, encrypt_password(username, password)))?;
        tracing::info!(target = "authority::manager", username, "user created");
        Ok(true)
    }

    /// Creates a user authenticated by an external identity provider.
    pub fn create_open_id_user(&self, username: &str) -> Result<bool> {
        self.validate_name("user name", username)?;
        let _guard = self.user_locks.write(username);
        if self.users.load(username)?.is_some() {
            return Ok(false);
        }
        self.users.save(&User::open_id(username))?;
        tracing::info!(target = "authority::manager", username, "open-id user created");
        Ok(true)
    }

    pub fn drop_user(&self, username: &str) -> Result<bool> {
        if self.is_admin(username) {
            return Err(AuthorityError::InvalidName {
                kind: "user name",
                value: username.to_string(),
                reason: "the administrator cannot be dropped".to_string(),
            });
        }
        let _guard = self.user_locks.write(username);
        let removed = self.users.delete(username)?;
        if removed {
            tracing::info!(target = "authority::manager", username, "user dropped");
        }
        Ok(removed)
    }

    pub fn update_password(&self, username: &str, new_password: &str) -> Result<()> {
        self.validate_password(new_password)?;
        self.update_user(username, |user| {
            user.set_password_hash(encrypt_password(username, new_password));
            Ok(true)
        })
        .map(|_| ())
    }

    /// Returns `false` when the role already exists.
    pub fn create_role(&self, rolename: &str) -> Result<bool> {
        self.validate_name("role name", rolename)?;
        let _guard = self.role_locks.write(rolename);
        if self.roles.load(rolename)?.is_some() {
            return Ok(false);
        }
        self.roles.save(&Role::new(rolename))?;
        tracing::info!(target = "authority::manager", rolename, "role created");
        Ok(true)
    }

    /// Drops the role and strips it from every user holding it.
    pub fn drop_role(&self, rolename: &str) -> Result<bool> {
        let removed = {
            let _guard = self.role_locks.write(rolename);
            self.roles.delete(rolename)?
        };
        if !removed {
            return Ok(false);
        }
        for username in self.users.list_names()? {
            let _guard = self.user_locks.write(&username);
            if let Some(mut user) = self.users.load(&username)? {
                if user.remove_role(rolename) {
                    self.users.save(&user)?;
                }
            }
        }
        tracing::info!(target = "authority::manager", rolename, "role dropped");
        Ok(true)
    }

    pub fn grant_role_to_user(&self, rolename: &str, username: &str) -> Result<bool> {
        if self.role(rolename)?.is_none() {
            return Err(AuthorityError::RoleNotExist(rolename.to_string()));
        }
        self.update_user(username, |user| Ok(user.add_role(rolename)))
    }

    pub fn revoke_role_from_user(&self, rolename: &str, username: &str) -> Result<bool> {
        self.update_user(username, |user| Ok(user.remove_role(rolename)))
    }

    pub fn grant_user_privilege(
        &self,
        username: &str,
        privilege: PrivilegeType,
        target: &CheckTarget,
        grant_option: bool,
    ) -> Result<bool> {
        self.update_user(username, |user| {
            user.grants_mut().grant(privilege, target, grant_option)
        })
    }

    pub fn revoke_user_privilege(
        &self,
        username: &str,
        privilege: PrivilegeType,
        target: &CheckTarget,
    ) -> Result<bool> {
        self.update_user(username, |user| user.grants_mut().revoke(privilege, target))
    }

    pub fn revoke_user_grant_option(
        &self,
        username: &str,
        privilege: PrivilegeType,
        target: &CheckTarget,
    ) -> Result<bool> {
        self.update_user(username, |user| {
            user.grants_mut().revoke_grant_option(privilege, target)
        })
    }

    pub fn grant_role_privilege(
        &self,
        rolename: &str,
        privilege: PrivilegeType,
        target: &CheckTarget,
        grant_option: bool,
    ) -> Result<bool> {
        self.update_role(rolename, |role| {
            role.grants_mut().grant(privilege, target, grant_option)
        })
    }

    pub fn revoke_role_privilege(
        &self,
        rolename: &str,
        privilege: PrivilegeType,
        target: &CheckTarget,
    ) -> Result<bool> {
        self.update_role(rolename, |role| role.grants_mut().revoke(privilege, target))
    }

    pub fn revoke_role_grant_option(
        &self,
        rolename: &str,
        privilege: PrivilegeType,
        target: &CheckTarget,
    ) -> Result<bool> {
        self.update_role(rolename, |role| {
            role.grants_mut().revoke_grant_option(privilege, target)
        })
    }

    /// Runs one management operation. Creating a name that exists and
    /// dropping one that does not are errors here.
    pub fn apply(&self, operation: &PermissionOperation) -> Result<()> {
        match operation {
            PermissionOperation::CreateUser { username, password } => {
                if !self.create_user(username, password)? {
                    return Err(AuthorityError::UserAlreadyExists(username.clone()));
                }
            }
            PermissionOperation::DropUser { username } => {
                if !self.drop_user(username)? {
                    return Err(AuthorityError::UserNotExist(username.clone()));
                }
            }
            PermissionOperation::UpdatePassword { username, password } => {
                self.update_password(username, password)?;
            }
            PermissionOperation::CreateRole { rolename } => {
                if !self.create_role(rolename)? {
                    return Err(AuthorityError::RoleAlreadyExists(rolename.clone()));
                }
            }
            PermissionOperation::DropRole { rolename } => {
                if !self.drop_role(rolename)? {
                    return Err(AuthorityError::RoleNotExist(rolename.clone()));
                }
            }
            PermissionOperation::GrantRoleToUser { rolename, username } => {
                self.grant_role_to_user(rolename, username)?;
            }
            PermissionOperation::RevokeRoleFromUser { rolename, username } => {
                self.revoke_role_from_user(rolename, username)?;
            }
            PermissionOperation::GrantUser {
                username,
                privilege,
                target,
                grant_option,
            } => {
                self.grant_user_privilege(username, *privilege, target, *grant_option)?;
            }
            PermissionOperation::RevokeUser {
                username,
                privilege,
                target,
            } => {
                self.revoke_user_privilege(username, *privilege, target)?;
            }
            PermissionOperation::RevokeUserGrantOption {
                username,
                privilege,
                target,
            } => {
                self.revoke_user_grant_option(username, *privilege, target)?;
            }
            PermissionOperation::GrantRole {
                rolename,
                privilege,
                target,
                grant_option,
            } => {
                self.grant_role_privilege(rolename, *privilege, target, *grant_option)?;
            }
            PermissionOperation::RevokeRole {
                rolename,
                privilege,
                target,
            } => {
                self.revoke_role_privilege(rolename, *privilege, target)?;
            }
            PermissionOperation::RevokeRoleGrantOption {
                rolename,
                privilege,
                target,
            } => {
                self.revoke_role_grant_option(rolename, *privilege, target)?;
            }
        }
        Ok(())
    }

    /// Answers a listing with sorted names.
    pub fn query(&self, query: &PermissionQuery) -> Result<Vec<String>> {
        let mut names = match query {
            PermissionQuery::ListUsers => self.list_users()?,
            PermissionQuery::ListRoles => self.list_roles()?,
            PermissionQuery::ListRolesOfUser { username } => self
                .user(username)?
                .ok_or_else(|| AuthorityError::UserNotExist(username.clone()))?
                .roles()
                .map(str::to_string)
                .collect(),
            PermissionQuery::ListUsersOfRole { rolename } => {
                if self.role(rolename)?.is_none() {
                    return Err(AuthorityError::RoleNotExist(rolename.clone()));
                }
                let mut holders = Vec::new();
                for username in self.list_users()? {
                    if self.user(&username)?.is_some_and(|user| user.has_role(rolename)) {
                        holders.push(username);
                    }
                }
                holders
            }
        };
        names.sort_unstable();
        Ok(names)
    }

    /// Loads, mutates and stores one user under its write lock. Nothing is
    /// written when `mutate` fails or reports no change.
    fn update_user<F>(&self, username: &str, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut User) -> Result<bool>,
    {
        let _guard = self.user_locks.write(username);
        let mut user = self
            .users
            .load(username)?
            .ok_or_else(|| AuthorityError::UserNotExist(username.to_string()))?;
        let changed = mutate(&mut user)?;
        if changed {
            self.users.save(&user)?;
        }
        Ok(changed)
    }

    fn update_role<F>(&self, rolename: &str, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut Role) -> Result<bool>,
    {
        let _guard = self.role_locks.write(rolename);
        let mut role = self
            .roles
            .load(rolename)?
            .ok_or_else(|| AuthorityError::RoleNotExist(rolename.to_string()))?;
        let changed = mutate(&mut role)?;
        if changed {
            self.roles.save(&role)?;
        }
        Ok(changed)
    }

    /// The user plus every role it holds that still exists.
    fn snapshot(&self, username: &str) -> Result<Option<(User, Vec<Role>)>> {
        let Some(user) = self.user(username)? else {
            return Ok(None);
        };
        let mut roles = Vec::with_capacity(user.roles().len());
        for rolename in user.roles() {
            match self.role(rolename)? {
                Some(role) => roles.push(role),
                None => tracing::warn!(
                    target = "authority::manager",
                    username,
                    rolename,
                    "user references a missing role; skipping"
                ),
            }
        }
        Ok(Some((user, roles)))
    }

    fn validate_name(&self, kind: &'static str, name: &str) -> Result<()> {
        let len = name.chars().count();
        let reason = if len < self.min_name_len || len > MAX_NAME_LEN {
            Some(format!(
                "length must be within {}..={MAX_NAME_LEN}",
                self.min_name_len
            ))
        } else if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Some("only letters, digits and underscores are allowed".to_string())
        } else {
            None
        };
        match reason {
            Some(reason) => Err(AuthorityError::InvalidName {
                kind,
                value: name.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn validate_password(&self, password: &str) -> Result<()> {
        let len = password.chars().count();
        let reason = if len < self.min_password_len || len > MAX_PASSWORD_LEN {
            Some(format!(
                "length must be within {}..={MAX_PASSWORD_LEN}",
                self.min_password_len
            ))
        } else if password.chars().any(char::is_whitespace) {
            Some("whitespace is not allowed".to_string())
        } else {
            None
        };
        match reason {
            Some(reason) => Err(AuthorityError::InvalidName {
                kind: "password",
                value: "<hidden>".to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

fn user_not_exist(username: &str) -> PermissionInfo {
    PermissionInfo::failure(
        StatusCode::UserNotExist,
        format!("user {username} does not exist"),
    )
}

impl<U, R> AuthorityClient for LocalAuthority<U, R>
where
    U: EntryStore<User>,
    R: EntryStore<Role>,
{
    fn check_privilege(&self, request: &PrivilegeCheckRequest) -> Result<PermissionInfo> {
        if let Err(err) = request.privilege.validate(request.scope) {
            return Ok(PermissionInfo::failure(err.status_code(), err.to_string()));
        }
        if request.scope == PrivilegeScope::Object && request.database.is_none() {
            return Ok(PermissionInfo::failure(
                StatusCode::IllegalParameter,
                "object check without a database",
            ));
        }
        let Some((user, roles)) = self.snapshot(&request.username)? else {
            return Ok(user_not_exist(&request.username));
        };
        let admin = self.is_admin(&request.username);
        let failed: Vec<usize> = request
            .targets()
            .iter()
            .enumerate()
            .filter(|(_, target)| {
                let passes = admin
                    || user.check(request.privilege, target, request.grant_option)
                    || roles
                        .iter()
                        .any(|role| role.check(request.privilege, target, request.grant_option));
                !passes
            })
            .map(|(idx, _)| idx)
            .collect();
        let status = if failed.is_empty() {
            AuthStatus::success()
        } else {
            AuthStatus::new(StatusCode::NoPermission)
        };
        let positions = if request.scope == PrivilegeScope::Path {
            failed
        } else {
            Vec::new()
        };
        Ok(PermissionInfo::new(status)
            .with_snapshot(user, roles)
            .with_failed_positions(positions))
    }

    fn login(&self, request: &LoginRequest) -> Result<PermissionInfo> {
        let Some((user, roles)) = self.snapshot(&request.username)? else {
            return Ok(user_not_exist(&request.username));
        };
        let verified = user.is_open_id()
            || user.password_hash().is_some_and(|stored| {
                validate_password(&request.username, &request.password, stored)
            });
        if !verified {
            return Ok(PermissionInfo::failure(
                StatusCode::WrongLoginPassword,
                AUTHENTICATION_FAILED,
            ));
        }
        Ok(PermissionInfo::success().with_snapshot(user, roles))
    }

    fn check_role_membership(&self, request: &RoleMembershipRequest) -> Result<PermissionInfo> {
        let Some((user, roles)) = self.snapshot(&request.username)? else {
            return Ok(user_not_exist(&request.username));
        };
        let status = if user.is_open_id() || user.has_role(&request.rolename) {
            AuthStatus::success()
        } else {
            AuthStatus::with_message(
                StatusCode::UserNotHasRole,
                format!(
                    "user {} does not have role {}",
                    request.username, request.rolename
                ),
            )
        };
        Ok(PermissionInfo::new(status).with_snapshot(user, roles))
    }

    fn fetch_authorized_pattern_tree(
        &self,
        request: &PrivilegeCheckRequest,
    ) -> Result<PatternTreeInfo> {
        if let Err(err) = request.privilege.validate(PrivilegeScope::Path) {
            return Ok(PatternTreeInfo::new(AuthStatus::with_message(
                err.status_code(),
                err.to_string(),
            )));
        }
        let Some((user, roles)) = self.snapshot(&request.username)? else {
            let info = user_not_exist(&request.username);
            return Ok(PatternTreeInfo::new(info.status));
        };
        let tree = if self.is_admin(&request.username) || user.is_open_id() {
            PatternTree::all()
        } else {
            let mut tree = PatternTree::new();
            tree.extend(user.grants().patterns_granting(request.privilege));
            for role in &roles {
                tree.extend(role.grants().patterns_granting(request.privilege));
            }
            tree
        };
        Ok(PatternTreeInfo {
            status: AuthStatus::success(),
            pattern_tree: tree.to_bytes()?,
            user: Some(user),
            roles,
        })
    }

    fn operate_permission(&self, operation: &PermissionOperation) -> Result<AuthStatus> {
        Ok(match self.apply(operation) {
            Ok(()) => AuthStatus::success(),
            Err(err) => AuthStatus::with_message(err.status_code(), err.to_string()),
        })
    }

    fn query_permission(&self, query: &PermissionQuery) -> Result<PermissionQueryResponse> {
        Ok(match self.query(query) {
            Ok(names) => PermissionQueryResponse::new(AuthStatus::success(), names),
            Err(err) => PermissionQueryResponse::new(
                AuthStatus::with_message(err.status_code(), err.to_string()),
                Vec::new(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> LocalAuthority<MemoryStore<User>, MemoryStore<Role>> {
        LocalAuthority::in_memory(&AuthorityConfig::default()).expect("authority")
    }

    #[test]
    fn admin_is_created_once() {
        let authority = authority();
        assert_eq!(authority.list_users().expect("list"), vec!["root".to_string()]);
        assert!(!authority.init_admin("other").expect("init again"));
        let admin = authority.user("root").expect("load").expect("admin");
        assert!(validate_password("root", "root", admin.password_hash().expect("hash")));
    }

    #[test]
    fn names_and_passwords_are_validated() {
        let authority = authority();
        for bad in ["ab", "bad name", "x".repeat(MAX_NAME_LEN + 1).as_str()] {
            let err = authority.create_user(bad, "password").expect_err(bad);
            assert!(matches!(err, AuthorityError::InvalidName { .. }));
        }
        let err = authority.create_user("user1", "pw").expect_err("short password");
        assert!(matches!(err, AuthorityError::InvalidName { kind: "password", .. }));
        assert!(authority.create_user("user1", "password").expect("create"));
        assert!(!authority.create_user("user1", "password").expect("duplicate"));
    }

    #[test]
    fn drop_role_strips_memberships() {
        let authority = authority();
        authority.create_user("user1", "password").expect("user");
        authority.create_role("role1").expect("role");
        assert!(authority.grant_role_to_user("role1", "user1").expect("grant role"));
        assert!(authority.drop_role("role1").expect("drop"));
        let user = authority.user("user1").expect("load").expect("user");
        assert!(!user.has_role("role1"));
        assert!(matches!(
            authority.grant_role_to_user("role1", "user1"),
            Err(AuthorityError::RoleNotExist(_))
        ));
    }

    #[test]
    fn admin_cannot_be_dropped() {
        let authority = authority();
        assert!(authority.drop_user("root").is_err());
        assert!(!authority.drop_user("ghost").expect("missing user"));
    }

    #[test]
    fn batch_check_reports_positions() {
        let authority = authority();
        authority.create_user("user1", "password").expect("user");
        authority
            .grant_user_privilege(
                "user1",
                PrivilegeType::ReadData,
                &CheckTarget::path("root.sg.**").expect("path"),
                false,
            )
            .expect("grant");
        let paths = ["root.sg.a", "root.other.b", "root.sg.c.d"]
            .into_iter()
            .map(|raw| crate::types::PathPattern::parse(raw).expect("path"))
            .collect();
        let request = PrivilegeCheckRequest::paths("user1", PrivilegeType::ReadData, paths, false);
        let info = authority.check_privilege(&request).expect("check");
        assert_eq!(info.status.code, StatusCode::NoPermission);
        assert_eq!(info.failed_positions, vec![1]);
        assert!(info.user.is_some());
    }

    #[test]
    fn login_checks_password() {
        let authority = authority();
        authority.create_user("user1", "password").expect("user");
        let ok = authority
            .login(&LoginRequest {
                username: "user1".into(),
                password: "password".into(),
            })
            .expect("login");
        assert!(ok.status.is_success());
        let bad = authority
            .login(&LoginRequest {
                username: "user1".into(),
                password: "nope1".into(),
            })
            .expect("login");
        assert_eq!(bad.status.code, StatusCode::WrongLoginPassword);
    }

    #[test]
    fn operations_report_existing_and_missing_names() {
        let authority = authority();
        let create = PermissionOperation::CreateUser {
            username: "user1".into(),
            password: "password".into(),
        };
        assert!(authority.operate_permission(&create).expect("create").is_success());
        let again = authority.operate_permission(&create).expect("create again");
        assert_eq!(again.code, StatusCode::UserAlreadyExist);
        assert!(matches!(
            authority.apply(&create),
            Err(AuthorityError::UserAlreadyExists(name)) if name == "user1"
        ));

        let role = PermissionOperation::CreateRole {
            rolename: "role1".into(),
        };
        authority.apply(&role).expect("role");
        assert!(matches!(
            authority.apply(&role),
            Err(AuthorityError::RoleAlreadyExists(_))
        ));

        let drop_missing = PermissionOperation::DropRole {
            rolename: "role2".into(),
        };
        let status = authority.operate_permission(&drop_missing).expect("drop");
        assert_eq!(status.code, StatusCode::RoleNotExist);

        let grant_missing = PermissionOperation::GrantUser {
            username: "nobody".into(),
            privilege: PrivilegeType::UseUdf,
            target: CheckTarget::System,
            grant_option: false,
        };
        let status = authority.operate_permission(&grant_missing).expect("grant");
        assert_eq!(status.code, StatusCode::UserNotExist);
    }

    #[test]
    fn queries_list_sorted_names() {
        let authority = authority();
        for name in ["user2", "user1"] {
            authority.create_user(name, "password").expect("user");
        }
        authority.create_role("role1").expect("role");
        authority.create_role("role0").expect("role");
        authority.grant_role_to_user("role1", "user2").expect("grant");
        authority.grant_role_to_user("role0", "user2").expect("grant");

        let names = |query: PermissionQuery| authority.query(&query).expect("query");
        assert_eq!(names(PermissionQuery::ListUsers), vec!["root", "user1", "user2"]);
        assert_eq!(names(PermissionQuery::ListRoles), vec!["role0", "role1"]);
        assert_eq!(
            names(PermissionQuery::ListRolesOfUser {
                username: "user2".into()
            }),
            vec!["role0", "role1"]
        );
        assert_eq!(
            names(PermissionQuery::ListUsersOfRole {
                rolename: "role1".into()
            }),
            vec!["user2"]
        );

        let response = authority
            .query_permission(&PermissionQuery::ListUsersOfRole {
                rolename: "ghost".into(),
            })
            .expect("query");
        assert_eq!(response.status.code, StatusCode::RoleNotExist);
        assert!(response.names.is_empty());
    }
}
