//! Privilege identifiers, their scopes, and the compact set used to hold them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AuthorityError, Result};

/// The authorization universe a privilege belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivilegeScope {
    System,
    Path,
    Object,
}

impl PrivilegeScope {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Path => "PATH",
            Self::Object => "OBJECT",
        }
    }
}

impl fmt::Display for PrivilegeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! privilege_types {
    ($($variant:ident => ($name:literal, $scope:ident)),+ $(,)?) => {
        /// Every privilege the node knows about.
        ///
        /// The discriminant is the bit position used by [`PrivilegeSet`]; new
        /// variants must be appended.
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[repr(u8)]
        pub enum PrivilegeType {
            $($variant),+
        }

        impl PrivilegeType {
            pub const ALL: &'static [PrivilegeType] = &[$(PrivilegeType::$variant),+];

            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $(PrivilegeType::$variant => $name),+
                }
            }

            #[must_use]
            pub fn scopes(self) -> &'static [PrivilegeScope] {
                match self {
                    $(PrivilegeType::$variant => &[PrivilegeScope::$scope]),+
                }
            }
        }

        impl FromStr for PrivilegeType {
            type Err = AuthorityError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($name => Ok(PrivilegeType::$variant),)+
                    _ => Err(AuthorityError::UnknownPrivilege(s.to_string())),
                }
            }
        }
    };
}

privilege_types! {
    ManageUser => ("MANAGE_USER", System),
    ManageRole => ("MANAGE_ROLE", System),
    UseTrigger => ("USE_TRIGGER", System),
    UseUdf => ("USE_UDF", System),
    UseCq => ("USE_CQ", System),
    UsePipe => ("USE_PIPE", System),
    UseModel => ("USE_MODEL", System),
    ExtendTemplate => ("EXTEND_TEMPLATE", System),
    ManageDatabase => ("MANAGE_DATABASE", System),
    Maintain => ("MAINTAIN", System),
    Audit => ("AUDIT", System),
    ReadData => ("READ_DATA", Path),
    WriteData => ("WRITE_DATA", Path),
    ReadSchema => ("READ_SCHEMA", Path),
    WriteSchema => ("WRITE_SCHEMA", Path),
    Create => ("CREATE", Object),
    Drop => ("DROP", Object),
    Alter => ("ALTER", Object),
    Select => ("SELECT", Object),
    Insert => ("INSERT", Object),
    Update => ("UPDATE", Object),
    Delete => ("DELETE", Object),
}

impl PrivilegeType {
    #[must_use]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn is_valid_in(self, scope: PrivilegeScope) -> bool {
        self.scopes().contains(&scope)
    }

    /// Rejects the privilege when it cannot be granted or checked in `scope`.
    pub fn validate(self, scope: PrivilegeScope) -> Result<()> {
        if self.is_valid_in(scope) {
            Ok(())
        } else {
            Err(AuthorityError::InvalidPrivilege {
                privilege: self.name().to_string(),
                scope: scope.as_str(),
            })
        }
    }
}

impl fmt::Display for PrivilegeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitset over [`PrivilegeType`] ordinals.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<PrivilegeType>", into = "Vec<PrivilegeType>")]
pub struct PrivilegeSet(u32);

impl PrivilegeSet {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub fn contains(self, privilege: PrivilegeType) -> bool {
        self.0 & Self::bit(privilege) != 0
    }

    /// Returns `true` when the privilege was not already present.
    pub fn insert(&mut self, privilege: PrivilegeType) -> bool {
        let fresh = !self.contains(privilege);
        self.0 |= Self::bit(privilege);
        fresh
    }

    /// Returns `true` when the privilege was present.
    pub fn remove(&mut self, privilege: PrivilegeType) -> bool {
        let present = self.contains(privilege);
        self.0 &= !Self::bit(privilege);
        present
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub fn is_subset_of(self, other: PrivilegeSet) -> bool {
        self.0 & !other.0 == 0
    }

    #[must_use]
    pub fn union(self, other: PrivilegeSet) -> PrivilegeSet {
        Self(self.0 | other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = PrivilegeType> {
        PrivilegeType::ALL
            .iter()
            .copied()
            .filter(move |privilege| self.contains(*privilege))
    }

    fn bit(privilege: PrivilegeType) -> u32 {
        1 << privilege.ordinal()
    }
}

impl fmt::Debug for PrivilegeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<PrivilegeType> for PrivilegeSet {
    fn from_iter<I: IntoIterator<Item = PrivilegeType>>(iter: I) -> Self {
        let mut set = Self::empty();
        for privilege in iter {
            set.insert(privilege);
        }
        set
    }
}

impl From<Vec<PrivilegeType>> for PrivilegeSet {
    fn from(value: Vec<PrivilegeType>) -> Self {
        value.into_iter().collect()
    }
}

impl From<PrivilegeSet> for Vec<PrivilegeType> {
    fn from(value: PrivilegeSet) -> Self {
        value.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_privilege_fits_in_the_bitset() {
        assert!(PrivilegeType::ALL.len() <= 32);
        for (idx, privilege) in PrivilegeType::ALL.iter().enumerate() {
            assert_eq!(privilege.ordinal() as usize, idx);
        }
    }

    #[test]
    fn names_roundtrip_through_from_str() {
        for privilege in PrivilegeType::ALL {
            let parsed: PrivilegeType = privilege.name().parse().expect("parse");
            assert_eq!(parsed, *privilege);
        }
        assert!("read_data".parse::<PrivilegeType>().is_ok());
        assert!(matches!(
            "FLY".parse::<PrivilegeType>(),
            Err(AuthorityError::UnknownPrivilege(_))
        ));
    }

    #[test]
    fn scope_validation_rejects_wrong_universe() {
        assert!(PrivilegeType::UsePipe.validate(PrivilegeScope::System).is_ok());
        assert!(PrivilegeType::ReadData.validate(PrivilegeScope::Path).is_ok());
        assert!(PrivilegeType::Select.validate(PrivilegeScope::Object).is_ok());

        let err = PrivilegeType::ReadData
            .validate(PrivilegeScope::System)
            .expect_err("path privilege at system scope");
        assert!(matches!(err, AuthorityError::InvalidPrivilege { .. }));
        assert!(PrivilegeType::Maintain.validate(PrivilegeScope::Object).is_err());
    }

    #[test]
    fn set_operations() {
        let mut set = PrivilegeSet::empty();
        assert!(set.insert(PrivilegeType::ReadData));
        assert!(!set.insert(PrivilegeType::ReadData));
        set.insert(PrivilegeType::WriteSchema);
        assert_eq!(set.len(), 2);

        let subset: PrivilegeSet = [PrivilegeType::WriteSchema].into_iter().collect();
        assert!(subset.is_subset_of(set));
        assert!(!set.is_subset_of(subset));

        assert!(set.remove(PrivilegeType::ReadData));
        assert!(!set.remove(PrivilegeType::ReadData));
        assert_eq!(set, subset);
    }

    #[test]
    fn set_serializes_as_names() {
        let set: PrivilegeSet = [PrivilegeType::Select, PrivilegeType::UsePipe]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).expect("serialize");
        assert_eq!(json, "[\"USE_PIPE\",\"SELECT\"]");
        let back: PrivilegeSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, set);
    }
}
