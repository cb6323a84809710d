//! What a privilege check is about.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::path::PathPattern;
use super::privilege::{PrivilegeScope, PrivilegeType};
use crate::Result;

/// The resource a privilege is checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CheckTarget {
    System,
    Path(PathPattern),
    Object {
        database: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table: Option<String>,
    },
}

impl CheckTarget {
    pub fn path(raw: &str) -> Result<Self> {
        Ok(Self::Path(PathPattern::parse(raw)?))
    }

    pub fn database(database: impl Into<String>) -> Self {
        Self::Object {
            database: database.into(),
            table: None,
        }
    }

    pub fn table(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self::Object {
            database: database.into(),
            table: Some(table.into()),
        }
    }

    #[must_use]
    pub fn scope(&self) -> PrivilegeScope {
        match self {
            Self::System => PrivilegeScope::System,
            Self::Path(_) => PrivilegeScope::Path,
            Self::Object { .. } => PrivilegeScope::Object,
        }
    }
}

impl fmt::Display for CheckTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::Path(path) => write!(f, "{path}"),
            Self::Object {
                database,
                table: Some(table),
            } => write!(f, "{database}.{table}"),
            Self::Object {
                database,
                table: None,
            } => f.write_str(database),
        }
    }
}

/// A caller's question: may `principal` use `privilege` on `target`?
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub principal: String,
    pub privilege: PrivilegeType,
    pub target: CheckTarget,
    #[serde(default)]
    pub grant_option: bool,
}

impl CheckRequest {
    pub fn new(
        principal: impl Into<String>,
        privilege: PrivilegeType,
        target: CheckTarget,
    ) -> Self {
        Self {
            principal: principal.into(),
            privilege,
            target,
            grant_option: false,
        }
    }

    /// Asks for the grant option instead of the privilege itself.
    #[must_use]
    pub fn with_grant_option(mut self) -> Self {
        self.grant_option = true;
        self
    }
}
