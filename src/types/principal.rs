//! Users, roles, and the privilege grants they carry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::object::{GrantedSet, ObjectPrivileges};
use super::path::{PathPattern, PathPrivilege};
use super::privilege::PrivilegeType;
use super::target::CheckTarget;
use crate::Result;

/// Everything a principal has been granted, across the three scopes.
///
/// Every mutator keeps `grant option ⊆ privileges` for each scope; a request
/// that would break it is rejected and leaves the grants untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grants {
    #[serde(default)]
    system: GrantedSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    path_privileges: Vec<PathPrivilege>,
    #[serde(default, skip_serializing_if = "ObjectPrivileges::is_empty")]
    object_privileges: ObjectPrivileges,
}

impl Grants {
    #[must_use]
    pub fn system(&self) -> &GrantedSet {
        &self.system
    }

    #[must_use]
    pub fn path_privileges(&self) -> &[PathPrivilege] {
        &self.path_privileges
    }

    #[must_use]
    pub fn object_privileges(&self) -> &ObjectPrivileges {
        &self.object_privileges
    }

    #[must_use]
    pub fn has_system(&self, privilege: PrivilegeType) -> bool {
        self.system.has(privilege)
    }

    #[must_use]
    pub fn has_system_grant_option(&self, privilege: PrivilegeType) -> bool {
        self.system.has_grant_option(privilege)
    }

    #[must_use]
    pub fn has_path(&self, path: &PathPattern, privilege: PrivilegeType) -> bool {
        self.path_privileges
            .iter()
            .any(|entry| entry.covers(path, privilege))
    }

    #[must_use]
    pub fn has_path_grant_option(&self, path: &PathPattern, privilege: PrivilegeType) -> bool {
        self.path_privileges
            .iter()
            .any(|entry| entry.covers_with_grant_option(path, privilege))
    }

    #[must_use]
    pub fn has_object(
        &self,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
    ) -> bool {
        self.object_privileges
            .has_privilege(database, table, privilege)
    }

    #[must_use]
    pub fn has_object_grant_option(
        &self,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
    ) -> bool {
        self.object_privileges
            .has_grant_option(database, table, privilege)
    }

    #[must_use]
    pub fn check(
        &self,
        privilege: PrivilegeType,
        target: &CheckTarget,
        grant_option: bool,
    ) -> bool {
        match (target, grant_option) {
            (CheckTarget::System, false) => self.has_system(privilege),
            (CheckTarget::System, true) => self.has_system_grant_option(privilege),
            (CheckTarget::Path(path), false) => self.has_path(path, privilege),
            (CheckTarget::Path(path), true) => self.has_path_grant_option(path, privilege),
            (CheckTarget::Object { database, table }, false) => {
                self.has_object(database, table.as_deref(), privilege)
            }
            (CheckTarget::Object { database, table }, true) => {
                self.has_object_grant_option(database, table.as_deref(), privilege)
            }
        }
    }

    /// Patterns on which `privilege` is held.
    pub fn patterns_granting(
        &self,
        privilege: PrivilegeType,
    ) -> impl Iterator<Item = &PathPattern> {
        self.path_privileges
            .iter()
            .filter(move |entry| entry.has_privilege(privilege))
            .map(PathPrivilege::pattern)
    }

    /// Grants `privilege` on `target`; with `grant_option` the option is granted too.
    /// Returns whether anything changed.
    pub fn grant(
        &mut self,
        privilege: PrivilegeType,
        target: &CheckTarget,
        grant_option: bool,
    ) -> Result<bool> {
        privilege.validate(target.scope())?;
        match target {
            CheckTarget::System => Ok(self.system.grant(privilege, grant_option)),
            CheckTarget::Path(path) => {
                let idx = match self
                    .path_privileges
                    .iter()
                    .position(|entry| entry.pattern() == path)
                {
                    Some(idx) => idx,
                    None => {
                        self.path_privileges.push(PathPrivilege::new(path.clone()));
                        self.path_privileges.len() - 1
                    }
                };
                Ok(self.path_privileges[idx].grant(privilege, grant_option))
            }
            CheckTarget::Object { database, table } => {
                self.object_privileges
                    .grant(database, table.as_deref(), privilege, grant_option)
            }
        }
    }

    /// Adds the grant option on a privilege that is already held.
    pub fn grant_grant_option(
        &mut self,
        privilege: PrivilegeType,
        target: &CheckTarget,
    ) -> Result<bool> {
        privilege.validate(target.scope())?;
        match target {
            CheckTarget::System => self.system.grant_grant_option(privilege),
            CheckTarget::Path(path) => match self.path_entry_mut(path) {
                Some(entry) => entry.grant_grant_option(privilege),
                None => Err(crate::AuthorityError::invariant(format!(
                    "cannot grant option for {privilege} on {path} without the privilege itself"
                ))),
            },
            CheckTarget::Object { database, table } => {
                self.object_privileges
                    .grant_grant_option(database, table.as_deref(), privilege)
            }
        }
    }

    /// Revokes `privilege` on `target` together with its grant option.
    pub fn revoke(&mut self, privilege: PrivilegeType, target: &CheckTarget) -> Result<bool> {
        privilege.validate(target.scope())?;
        match target {
            CheckTarget::System => Ok(self.system.revoke(privilege)),
            CheckTarget::Path(path) => {
                let changed = self
                    .path_entry_mut(path)
                    .is_some_and(|entry| entry.revoke(privilege));
                self.path_privileges.retain(|entry| !entry.is_empty());
                Ok(changed)
            }
            CheckTarget::Object { database, table } => {
                self.object_privileges
                    .revoke(database, table.as_deref(), privilege)
            }
        }
    }

    /// Revokes only the grant option, keeping the privilege.
    pub fn revoke_grant_option(
        &mut self,
        privilege: PrivilegeType,
        target: &CheckTarget,
    ) -> Result<bool> {
        privilege.validate(target.scope())?;
        match target {
            CheckTarget::System => Ok(self.system.revoke_grant_option(privilege)),
            CheckTarget::Path(path) => Ok(self
                .path_entry_mut(path)
                .is_some_and(|entry| entry.revoke_grant_option(privilege))),
            CheckTarget::Object { database, table } => {
                self.object_privileges
                    .revoke_grant_option(database, table.as_deref(), privilege)
            }
        }
    }

    fn path_entry_mut(&mut self, path: &PathPattern) -> Option<&mut PathPrivilege> {
        self.path_privileges
            .iter_mut()
            .find(|entry| entry.pattern() == path)
    }
}

/// Read access shared by users and roles.
///
/// The provided checks short-circuit to `true` when [`Principal::is_open_id`]
/// holds: externally authenticated users are authorized for everything.
pub trait Principal {
    fn name(&self) -> &str;

    fn grants(&self) -> &Grants;

    fn is_open_id(&self) -> bool {
        false
    }

    fn check_system_privilege(&self, privilege: PrivilegeType) -> bool {
        self.is_open_id() || self.grants().has_system(privilege)
    }

    fn check_system_grant_option(&self, privilege: PrivilegeType) -> bool {
        self.is_open_id() || self.grants().has_system_grant_option(privilege)
    }

    fn check_path_privilege(&self, path: &PathPattern, privilege: PrivilegeType) -> bool {
        self.is_open_id() || self.grants().has_path(path, privilege)
    }

    fn check_path_grant_option(&self, path: &PathPattern, privilege: PrivilegeType) -> bool {
        self.is_open_id() || self.grants().has_path_grant_option(path, privilege)
    }

    fn check_object_privilege(
        &self,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
    ) -> bool {
        self.is_open_id() || self.grants().has_object(database, table, privilege)
    }

    fn check_object_grant_option(
        &self,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
    ) -> bool {
        self.is_open_id()
            || self
                .grants()
                .has_object_grant_option(database, table, privilege)
    }

    fn check(&self, privilege: PrivilegeType, target: &CheckTarget, grant_option: bool) -> bool {
        self.is_open_id() || self.grants().check(privilege, target, grant_option)
    }
}

/// A named bundle of grants that users can be assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    name: String,
    #[serde(flatten)]
    grants: Grants,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            grants: Grants::default(),
        }
    }

    pub fn grants_mut(&mut self) -> &mut Grants {
        &mut self.grants
    }
}

impl Principal for Role {
    fn name(&self) -> &str {
        &self.name
    }

    fn grants(&self) -> &Grants {
        &self.grants
    }
}

/// A login principal: grants of its own plus the roles it is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
    #[serde(default)]
    open_id: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    roles: BTreeSet<String>,
    #[serde(flatten)]
    grants: Grants,
}

impl User {
    pub fn new(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password_hash: Some(password_hash.into()),
            open_id: false,
            roles: BTreeSet::new(),
            grants: Grants::default(),
        }
    }

    /// A user authenticated by an external identity provider.
    pub fn open_id(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password_hash: None,
            open_id: true,
            roles: BTreeSet::new(),
            grants: Grants::default(),
        }
    }

    #[must_use]
    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn set_password_hash(&mut self, hash: impl Into<String>) {
        self.password_hash = Some(hash.into());
    }

    pub fn set_open_id(&mut self, open_id: bool) {
        self.open_id = open_id;
    }

    pub fn roles(&self) -> impl ExactSizeIterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn add_role(&mut self, role: impl Into<String>) -> bool {
        self.roles.insert(role.into())
    }

    pub fn remove_role(&mut self, role: &str) -> bool {
        self.roles.remove(role)
    }

    pub fn grants_mut(&mut self) -> &mut Grants {
        &mut self.grants
    }
}

impl Principal for User {
    fn name(&self) -> &str {
        &self.name
    }

    fn grants(&self) -> &Grants {
        &self.grants
    }

    fn is_open_id(&self) -> bool {
        self.open_id
    }
}
