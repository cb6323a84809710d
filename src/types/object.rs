//! Relational privileges held on databases and tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::privilege::{PrivilegeScope, PrivilegeSet, PrivilegeType};
use crate::{AuthorityError, Result};

/// A privilege set together with the subset that may be re-granted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrantedSet")]
pub struct GrantedSet {
    privileges: PrivilegeSet,
    grant_option: PrivilegeSet,
}

#[derive(Deserialize)]
struct RawGrantedSet {
    #[serde(default)]
    privileges: PrivilegeSet,
    #[serde(default)]
    grant_option: PrivilegeSet,
}

impl TryFrom<RawGrantedSet> for GrantedSet {
    type Error = AuthorityError;

    fn try_from(raw: RawGrantedSet) -> Result<Self> {
        Self::from_parts(raw.privileges, raw.grant_option)
    }
}

impl GrantedSet {
    pub fn from_parts(privileges: PrivilegeSet, grant_option: PrivilegeSet) -> Result<Self> {
        if !grant_option.is_subset_of(privileges) {
            return Err(AuthorityError::invariant(format!(
                "grant option {grant_option:?} exceeds held privileges {privileges:?}"
            )));
        }
        Ok(Self {
            privileges,
            grant_option,
        })
    }

    #[must_use]
    pub fn privileges(&self) -> PrivilegeSet {
        self.privileges
    }

    #[must_use]
    pub fn grant_option(&self) -> PrivilegeSet {
        self.grant_option
    }

    #[must_use]
    pub fn has(&self, privilege: PrivilegeType) -> bool {
        self.privileges.contains(privilege)
    }

    #[must_use]
    pub fn has_grant_option(&self, privilege: PrivilegeType) -> bool {
        self.grant_option.contains(privilege)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.privileges.is_empty()
    }

    pub(crate) fn grant(&mut self, privilege: PrivilegeType, grant_option: bool) -> bool {
        let mut changed = self.privileges.insert(privilege);
        if grant_option {
            changed |= self.grant_option.insert(privilege);
        }
        changed
    }

    pub(crate) fn grant_grant_option(&mut self, privilege: PrivilegeType) -> Result<bool> {
        if !self.privileges.contains(privilege) {
            return Err(AuthorityError::invariant(format!(
                "cannot grant option for {privilege} without the privilege itself"
            )));
        }
        Ok(self.grant_option.insert(privilege))
    }

    pub(crate) fn revoke(&mut self, privilege: PrivilegeType) -> bool {
        self.grant_option.remove(privilege);
        self.privileges.remove(privilege)
    }

    pub(crate) fn revoke_grant_option(&mut self, privilege: PrivilegeType) -> bool {
        self.grant_option.remove(privilege)
    }
}

/// Privileges on one database plus its per-table overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabasePrivileges {
    #[serde(flatten)]
    database: GrantedSet,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    tables: BTreeMap<String, GrantedSet>,
}

impl DatabasePrivileges {
    #[must_use]
    pub fn database(&self) -> &GrantedSet {
        &self.database
    }

    #[must_use]
    pub fn table(&self, table: &str) -> Option<&GrantedSet> {
        self.tables.get(table)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &GrantedSet)> {
        self.tables.iter().map(|(name, set)| (name.as_str(), set))
    }

    fn is_empty(&self) -> bool {
        self.database.is_empty() && self.tables.is_empty()
    }
}

/// `database -> (database grants, table -> table grants)`.
///
/// Database-level grants cascade to every table in that database, both for
/// the privilege and for its grant option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectPrivileges {
    databases: BTreeMap<String, DatabasePrivileges>,
}

impl ObjectPrivileges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    #[must_use]
    pub fn database(&self, database: &str) -> Option<&DatabasePrivileges> {
        self.databases.get(database)
    }

    pub fn databases(&self) -> impl Iterator<Item = (&str, &DatabasePrivileges)> {
        self.databases.iter().map(|(name, db)| (name.as_str(), db))
    }

    /// With `table == None` only the database level is consulted.
    #[must_use]
    pub fn has_privilege(
        &self,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
    ) -> bool {
        self.resolve(database, table, privilege, GrantedSet::has)
    }

    #[must_use]
    pub fn has_grant_option(
        &self,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
    ) -> bool {
        self.resolve(database, table, privilege, GrantedSet::has_grant_option)
    }

    fn resolve(
        &self,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
        probe: fn(&GrantedSet, PrivilegeType) -> bool,
    ) -> bool {
        let Some(db) = self.databases.get(database) else {
            return false;
        };
        if probe(&db.database, privilege) {
            return true;
        }
        table
            .and_then(|table| db.tables.get(table))
            .is_some_and(|set| probe(set, privilege))
    }

    pub(crate) fn grant(
        &mut self,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
        grant_option: bool,
    ) -> Result<bool> {
        privilege.validate(PrivilegeScope::Object)?;
        let db = self.databases.entry(database.to_string()).or_default();
        let set = match table {
            Some(table) => db.tables.entry(table.to_string()).or_default(),
            None => &mut db.database,
        };
        Ok(set.grant(privilege, grant_option))
    }

    pub(crate) fn grant_grant_option(
        &mut self,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
    ) -> Result<bool> {
        privilege.validate(PrivilegeScope::Object)?;
        let set = self.set_mut(database, table).ok_or_else(|| {
            AuthorityError::invariant(format!(
                "cannot grant option for {privilege} on {} without the privilege itself",
                object_name(database, table)
            ))
        })?;
        set.grant_grant_option(privilege)
    }

    pub(crate) fn revoke(
        &mut self,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
    ) -> Result<bool> {
        privilege.validate(PrivilegeScope::Object)?;
        let changed = self
            .set_mut(database, table)
            .is_some_and(|set| set.revoke(privilege));
        self.prune(database, table);
        Ok(changed)
    }

    pub(crate) fn revoke_grant_option(
        &mut self,
        database: &str,
        table: Option<&str>,
        privilege: PrivilegeType,
    ) -> Result<bool> {
        privilege.validate(PrivilegeScope::Object)?;
        Ok(self
            .set_mut(database, table)
            .is_some_and(|set| set.revoke_grant_option(privilege)))
    }

    fn set_mut(&mut self, database: &str, table: Option<&str>) -> Option<&mut GrantedSet> {
        let db = self.databases.get_mut(database)?;
        match table {
            Some(table) => db.tables.get_mut(table),
            None => Some(&mut db.database),
        }
    }

    fn prune(&mut self, database: &str, table: Option<&str>) {
        let Some(db) = self.databases.get_mut(database) else {
            return;
        };
        if let Some(table) = table {
            if db.tables.get(table).is_some_and(GrantedSet::is_empty) {
                db.tables.remove(table);
            }
        }
        if db.is_empty() {
            self.databases.remove(database);
        }
    }
}

pub(crate) fn object_name(database: &str, table: Option<&str>) -> String {
    match table {
        Some(table) => format!("{database}.{table}"),
        None => database.to_string(),
    }
}
