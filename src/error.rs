use std::time::Duration;

use thiserror::Error;

use crate::types::StatusCode;

pub type Result<T> = std::result::Result<T, AuthorityError>;

#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("illegal path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("privilege {privilege} is not valid for {scope} scope")]
    InvalidPrivilege {
        privilege: String,
        scope: &'static str,
    },

    #[error("unknown privilege `{0}`")]
    UnknownPrivilege(String),

    #[error("grant option invariant violated: {reason}")]
    InvariantViolation { reason: String },

    #[error("no such user {0}")]
    UserNotExist(String),

    #[error("no such role {0}")]
    RoleNotExist(String),

    #[error("user {0} already exists")]
    UserAlreadyExists(String),

    #[error("role {0} already exists")]
    RoleAlreadyExists(String),

    #[error("illegal {kind} `{value}`: {reason}")]
    InvalidName {
        kind: &'static str,
        value: String,
        reason: String,
    },

    #[error("authority transport failure: {0}")]
    Transport(String),

    #[error("authority request timed out after {0:?}")]
    Timeout(Duration),

    #[error("authority rejected request: {message}")]
    Remote { code: StatusCode, message: String },

    #[error("storage failure: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl AuthorityError {
    /// Status code reported to callers when this error surfaces as a check outcome.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPath { .. } => StatusCode::IllegalPath,
            Self::InvalidPrivilege { .. } | Self::UnknownPrivilege(_) => {
                StatusCode::IllegalPrivilege
            }
            Self::InvariantViolation { .. } => StatusCode::IllegalPrivilege,
            Self::UserNotExist(_) => StatusCode::UserNotExist,
            Self::RoleNotExist(_) => StatusCode::RoleNotExist,
            Self::UserAlreadyExists(_) => StatusCode::UserAlreadyExist,
            Self::RoleAlreadyExists(_) => StatusCode::RoleAlreadyExist,
            Self::InvalidName { .. } => StatusCode::IllegalParameter,
            Self::Transport(_) | Self::Timeout(_) => StatusCode::ExecuteStatementError,
            Self::Remote { code, .. } => *code,
            Self::Storage(_) | Self::Serialization(_) => StatusCode::AuthIoError,
            Self::InvalidConfig { .. } | Self::Metrics(_) => StatusCode::IllegalParameter,
        }
    }

    pub(crate) fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }
}
