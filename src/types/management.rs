//! User and role management requests forwarded to the authority.

use serde::{Deserialize, Serialize};

use super::privilege::PrivilegeType;
use super::status::AuthStatus;
use super::target::CheckTarget;

/// A change to users, roles or their grants.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PermissionOperation {
    CreateUser {
        username: String,
        password: String,
    },
    DropUser {
        username: String,
    },
    UpdatePassword {
        username: String,
        password: String,
    },
    CreateRole {
        rolename: String,
    },
    DropRole {
        rolename: String,
    },
    GrantRoleToUser {
        rolename: String,
        username: String,
    },
    RevokeRoleFromUser {
        rolename: String,
        username: String,
    },
    GrantUser {
        username: String,
        privilege: PrivilegeType,
        target: CheckTarget,
        #[serde(default)]
        grant_option: bool,
    },
    RevokeUser {
        username: String,
        privilege: PrivilegeType,
        target: CheckTarget,
    },
    RevokeUserGrantOption {
        username: String,
        privilege: PrivilegeType,
        target: CheckTarget,
    },
    GrantRole {
        rolename: String,
        privilege: PrivilegeType,
        target: CheckTarget,
        #[serde(default)]
        grant_option: bool,
    },
    RevokeRole {
        rolename: String,
        privilege: PrivilegeType,
        target: CheckTarget,
    },
    RevokeRoleGrantOption {
        rolename: String,
        privilege: PrivilegeType,
        target: CheckTarget,
    },
}

impl PermissionOperation {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateUser { .. } => "create_user",
            Self::DropUser { .. } => "drop_user",
            Self::UpdatePassword { .. } => "update_password",
            Self::CreateRole { .. } => "create_role",
            Self::DropRole { .. } => "drop_role",
            Self::GrantRoleToUser { .. } => "grant_role_to_user",
            Self::RevokeRoleFromUser { .. } => "revoke_role_from_user",
            Self::GrantUser { .. } => "grant_user",
            Self::RevokeUser { .. } => "revoke_user",
            Self::RevokeUserGrantOption { .. } => "revoke_user_grant_option",
            Self::GrantRole { .. } => "grant_role",
            Self::RevokeRole { .. } => "revoke_role",
            Self::RevokeRoleGrantOption { .. } => "revoke_role_grant_option",
        }
    }

    /// The user and role whose cached snapshots this operation makes stale.
    /// An empty string names nothing.
    #[must_use]
    pub fn affected(&self) -> (&str, &str) {
        match self {
            Self::CreateUser { username, .. }
            | Self::DropUser { username }
            | Self::UpdatePassword { username, .. }
            | Self::GrantUser { username, .. }
            | Self::RevokeUser { username, .. }
            | Self::RevokeUserGrantOption { username, .. } => (username, ""),
            Self::CreateRole { rolename }
            | Self::DropRole { rolename }
            | Self::GrantRole { rolename, .. }
            | Self::RevokeRole { rolename, .. }
            | Self::RevokeRoleGrantOption { rolename, .. } => ("", rolename),
            Self::GrantRoleToUser { rolename, username }
            | Self::RevokeRoleFromUser { rolename, username } => (username, rolename),
        }
    }
}

// Passwords stay out of logs.
impl std::fmt::Debug for PermissionOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (username, rolename) = self.affected();
        f.debug_struct("PermissionOperation")
            .field("op", &self.name())
            .field("username", &username)
            .field("rolename", &rolename)
            .finish_non_exhaustive()
    }
}

/// A read-only listing answered by the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum PermissionQuery {
    ListUsers,
    ListRoles,
    ListRolesOfUser { username: String },
    ListUsersOfRole { rolename: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionQueryResponse {
    pub status: AuthStatus,
    /// Sorted names; empty unless the status is a success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
}

impl PermissionQueryResponse {
    #[must_use]
    pub fn new(status: AuthStatus, names: Vec<String>) -> Self {
        Self { status, names }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_changes_touch_user_and_role() {
        let op = PermissionOperation::GrantRoleToUser {
            rolename: "role1".into(),
            username: "user1".into(),
        };
        assert_eq!(op.affected(), ("user1", "role1"));

        let op = PermissionOperation::RevokeRole {
            rolename: "role1".into(),
            privilege: PrivilegeType::ReadData,
            target: CheckTarget::path("root.sg.**").unwrap(),
        };
        assert_eq!(op.affected(), ("", "role1"));
    }

    #[test]
    fn debug_hides_password() {
        let op = PermissionOperation::CreateUser {
            username: "user1".into(),
            password: "hunter22".into(),
        };
        let rendered = format!("{op:?}");
        assert!(rendered.contains("create_user"));
        assert!(!rendered.contains("hunter22"));
    }

    #[test]
    fn wire_form_is_tagged() {
        let op: PermissionOperation =
            serde_json::from_str(r#"{"op":"drop_role","rolename":"role1"}"#).unwrap();
        assert_eq!(
            op,
            PermissionOperation::DropRole {
                rolename: "role1".into()
            }
        );
    }
}
