//! Request and response shapes exchanged with the remote authority.

use serde::{Deserialize, Serialize};

use super::path::PathPattern;
use super::principal::{Role, User};
use super::privilege::{PrivilegeScope, PrivilegeType};
use super::status::{AuthStatus, StatusCode};
use super::target::CheckTarget;

/// One privilege question sent to the authority.
///
/// Path requests may carry several paths; the authority answers with the
/// positions of those that were denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeCheckRequest {
    pub username: String,
    pub scope: PrivilegeScope,
    pub privilege: PrivilegeType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default)]
    pub grant_option: bool,
}

impl PrivilegeCheckRequest {
    pub fn system(
        username: impl Into<String>,
        privilege: PrivilegeType,
        grant_option: bool,
    ) -> Self {
        Self {
            username: username.into(),
            scope: PrivilegeScope::System,
            privilege,
            paths: Vec::new(),
            database: None,
            table: None,
            grant_option,
        }
    }

    pub fn paths(
        username: impl Into<String>,
        privilege: PrivilegeType,
        paths: Vec<PathPattern>,
        grant_option: bool,
    ) -> Self {
        Self {
            scope: PrivilegeScope::Path,
            paths,
            ..Self::system(username, privilege, grant_option)
        }
    }

    pub fn object(
        username: impl Into<String>,
        privilege: PrivilegeType,
        database: impl Into<String>,
        table: Option<String>,
        grant_option: bool,
    ) -> Self {
        Self {
            scope: PrivilegeScope::Object,
            database: Some(database.into()),
            table,
            ..Self::system(username, privilege, grant_option)
        }
    }

    /// Builds the request for a single-target check.
    pub fn for_target(
        username: impl Into<String>,
        privilege: PrivilegeType,
        target: &CheckTarget,
        grant_option: bool,
    ) -> Self {
        match target {
            CheckTarget::System => Self::system(username, privilege, grant_option),
            CheckTarget::Path(path) => {
                Self::paths(username, privilege, vec![path.clone()], grant_option)
            }
            CheckTarget::Object { database, table } => Self::object(
                username,
                privilege,
                database.clone(),
                table.clone(),
                grant_option,
            ),
        }
    }

    /// The targets this request asks about, one per path for path requests.
    #[must_use]
    pub fn targets(&self) -> Vec<CheckTarget> {
        match self.scope {
            PrivilegeScope::System => vec![CheckTarget::System],
            PrivilegeScope::Path => self.paths.iter().cloned().map(CheckTarget::Path).collect(),
            PrivilegeScope::Object => vec![CheckTarget::Object {
                database: self.database.clone().unwrap_or_default(),
                table: self.table.clone(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMembershipRequest {
    pub username: String,
    pub rolename: String,
}

/// The authority's answer to a check, login or membership request.
///
/// On success it bundles snapshots of the user and every role the user
/// holds, which the node may cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionInfo {
    pub status: AuthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
    /// Zero-based positions of denied paths in a path request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_positions: Vec<usize>,
}

impl PermissionInfo {
    #[must_use]
    pub fn new(status: AuthStatus) -> Self {
        Self {
            status,
            user: None,
            roles: Vec::new(),
            failed_positions: Vec::new(),
        }
    }

    #[must_use]
    pub fn success() -> Self {
        Self::new(AuthStatus::success())
    }

    pub fn failure(code: StatusCode, message: impl Into<String>) -> Self {
        Self::new(AuthStatus::with_message(code, message))
    }

    /// Attaches principal snapshots for the node to cache.
    #[must_use]
    pub fn with_snapshot(mut self, user: User, roles: Vec<Role>) -> Self {
        self.user = Some(user);
        self.roles = roles;
        self
    }

    #[must_use]
    pub fn with_failed_positions(mut self, positions: Vec<usize>) -> Self {
        self.failed_positions = positions;
        self
    }
}

/// The authority's answer to a pattern-tree request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternTreeInfo {
    pub status: AuthStatus,
    /// Serialized [`PatternTree`](super::PatternTree).
    #[serde(default)]
    pub pattern_tree: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
}

impl PatternTreeInfo {
    #[must_use]
    pub fn new(status: AuthStatus) -> Self {
        Self {
            status,
            pattern_tree: Vec::new(),
            user: None,
            roles: Vec::new(),
        }
    }
}
