//! Status codes and the uniform `(code, message)` result handed back to callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome codes shared by the remote authority contract and the checker facade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Success,
    NoPermission,
    ExecuteStatementError,
    WrongLoginPassword,
    UserNotExist,
    RoleNotExist,
    UserAlreadyExist,
    RoleAlreadyExist,
    UserNotHasRole,
    IllegalPath,
    IllegalPrivilege,
    IllegalParameter,
    AuthIoError,
}

impl StatusCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::NoPermission => "NO_PERMISSION",
            Self::ExecuteStatementError => "EXECUTE_STATEMENT_ERROR",
            Self::WrongLoginPassword => "WRONG_LOGIN_PASSWORD",
            Self::UserNotExist => "USER_NOT_EXIST",
            Self::RoleNotExist => "ROLE_NOT_EXIST",
            Self::UserAlreadyExist => "USER_ALREADY_EXIST",
            Self::RoleAlreadyExist => "ROLE_ALREADY_EXIST",
            Self::UserNotHasRole => "USER_NOT_HAS_ROLE",
            Self::IllegalPath => "ILLEGAL_PATH",
            Self::IllegalPrivilege => "ILLEGAL_PRIVILEGE",
            Self::IllegalParameter => "ILLEGAL_PARAMETER",
            Self::AuthIoError => "AUTH_IO_ERROR",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status code with an optional human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthStatus {
    pub code: StatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthStatus {
    #[must_use]
    pub fn success() -> Self {
        Self {
            code: StatusCode::Success,
            message: None,
        }
    }

    #[must_use]
    pub fn new(code: StatusCode) -> Self {
        Self {
            code,
            message: None,
        }
    }

    pub fn with_message(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == StatusCode::Success
    }

    #[must_use]
    pub fn is_denied(&self) -> bool {
        self.code == StatusCode::NoPermission
    }

    #[must_use]
    pub fn is_execution_error(&self) -> bool {
        self.code == StatusCode::ExecuteStatementError
    }
}

impl Default for AuthStatus {
    fn default() -> Self {
        Self::success()
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

/// Three-way verdict produced by the fetcher for a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Granted,
    Denied,
    /// The authority could not be consulted; never treated as a grant.
    ExecutionError(String),
}

impl CheckOutcome {
    #[must_use]
    pub fn from_bool(granted: bool) -> Self {
        if granted { Self::Granted } else { Self::Denied }
    }

    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Maps a status returned by the authority onto a verdict.
    #[must_use]
    pub fn from_status(status: &AuthStatus) -> Self {
        match status.code {
            StatusCode::Success => Self::Granted,
            StatusCode::NoPermission | StatusCode::UserNotExist | StatusCode::RoleNotExist => {
                Self::Denied
            }
            _ => Self::ExecutionError(
                status
                    .message
                    .clone()
                    .unwrap_or_else(|| status.code.to_string()),
            ),
        }
    }
}

/// Result of a role-membership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleMembership {
    HasRole,
    /// The authority confirmed the user exists but does not hold the role.
    NotGranted,
    ExecutionError(String),
}

impl RoleMembership {
    #[must_use]
    pub fn has_role(&self) -> bool {
        matches!(self, Self::HasRole)
    }
}

/// Verdict for a list of paths checked together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Zero-based positions of the denied paths, ascending; empty when all pass.
    Checked(Vec<usize>),
    ExecutionError(String),
}

impl BatchOutcome {
    #[must_use]
    pub fn all_granted(&self) -> bool {
        matches!(self, Self::Checked(failed) if failed.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_principal_maps_to_denial() {
        let status = AuthStatus::with_message(StatusCode::UserNotExist, "no such user bob");
        assert_eq!(CheckOutcome::from_status(&status), CheckOutcome::Denied);
    }

    #[test]
    fn transport_status_is_never_a_grant() {
        let status =
            AuthStatus::with_message(StatusCode::ExecuteStatementError, "connection refused");
        assert_eq!(
            CheckOutcome::from_status(&status),
            CheckOutcome::ExecutionError("connection refused".to_string())
        );
    }

    #[test]
    fn status_display_includes_message() {
        let status = AuthStatus::with_message(StatusCode::NoPermission, "missing READ_DATA");
        assert_eq!(status.to_string(), "NO_PERMISSION: missing READ_DATA");
        assert_eq!(AuthStatus::success().to_string(), "SUCCESS");
    }
}
