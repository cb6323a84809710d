//! Hierarchical path patterns and the privileges attached to them.
//!
//! A pattern is a `.`-separated list of segments rooted at `root`. Besides
//! literal segments, `*` matches exactly one level and `**` matches any number
//! of trailing levels (including none). `**` is only legal as the last segment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::privilege::{PrivilegeScope, PrivilegeSet, PrivilegeType};
use crate::constants::{MULTI_LEVEL_WILDCARD, ONE_LEVEL_WILDCARD, PATH_ROOT, PATH_SEPARATOR};
use crate::{AuthorityError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    OneLevel,
    MultiLevel,
}

impl<'a> Segment<'a> {
    fn classify(raw: &'a str) -> Self {
        match raw {
            ONE_LEVEL_WILDCARD => Segment::OneLevel,
            MULTI_LEVEL_WILDCARD => Segment::MultiLevel,
            literal => Segment::Literal(literal),
        }
    }

    /// Whether every node matched by `other` is matched by `self`, at one level.
    fn covers(self, other: Segment<'_>) -> bool {
        match (self, other) {
            (Segment::MultiLevel, _) => true,
            (_, Segment::MultiLevel) => false,
            (Segment::OneLevel, _) => true,
            (Segment::Literal(_), Segment::OneLevel) => false,
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
        }
    }
}

/// A validated path or path pattern such as `root.sg.*.s1` or `root.sg.**`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathPattern {
    segments: SmallVec<[String; 6]>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason| AuthorityError::InvalidPath {
            path: raw.to_string(),
            reason,
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("path is empty"));
        }
        let segments: SmallVec<[String; 6]> = trimmed
            .split(PATH_SEPARATOR)
            .map(str::to_string)
            .collect();
        if segments[0] != PATH_ROOT {
            return Err(invalid("path must start with root"));
        }
        let last = segments.len() - 1;
        for (idx, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(invalid("path contains an empty segment"));
            }
            if segment == MULTI_LEVEL_WILDCARD && idx != last {
                return Err(invalid("** is only allowed as the last segment"));
            }
        }
        Ok(Self { segments })
    }

    /// The pattern matching every path in the tree, `root.**`.
    #[must_use]
    pub fn all() -> Self {
        Self {
            segments: SmallVec::from_iter([
                PATH_ROOT.to_string(),
                MULTI_LEVEL_WILDCARD.to_string(),
            ]),
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether every concrete path matched by `other` is also matched by `self`.
    ///
    /// `root.d1.**` covers `root.d1.x` and `root.d1.d1.**`, but not `root.**`.
    #[must_use]
    pub fn covers(&self, other: &PathPattern) -> bool {
        for (idx, raw) in self.segments.iter().enumerate() {
            let own = Segment::classify(raw);
            if own == Segment::MultiLevel {
                return true;
            }
            let Some(theirs) = other.segments.get(idx) else {
                return false;
            };
            if !own.covers(Segment::classify(theirs)) {
                return false;
            }
        }
        self.segments.len() == other.segments.len()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathPattern({self})")
    }
}

impl FromStr for PathPattern {
    type Err = AuthorityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PathPattern {
    type Error = AuthorityError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PathPattern> for String {
    fn from(value: PathPattern) -> Self {
        value.to_string()
    }
}

/// Privileges granted on one path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPathPrivilege")]
pub struct PathPrivilege {
    pattern: PathPattern,
    privileges: PrivilegeSet,
    grant_option: PrivilegeSet,
}

#[derive(Deserialize)]
struct RawPathPrivilege {
    pattern: PathPattern,
    privileges: PrivilegeSet,
    #[serde(default)]
    grant_option: PrivilegeSet,
}

impl TryFrom<RawPathPrivilege> for PathPrivilege {
    type Error = AuthorityError;

    fn try_from(raw: RawPathPrivilege) -> Result<Self> {
        Self::with_privileges(raw.pattern, raw.privileges, raw.grant_option)
    }
}

impl PathPrivilege {
    #[must_use]
    pub fn new(pattern: PathPattern) -> Self {
        Self {
            pattern,
            privileges: PrivilegeSet::empty(),
            grant_option: PrivilegeSet::empty(),
        }
    }

    /// Builds an entry from raw sets, enforcing scope and `grant_option ⊆ privileges`.
    pub fn with_privileges(
        pattern: PathPattern,
        privileges: PrivilegeSet,
        grant_option: PrivilegeSet,
    ) -> Result<Self> {
        for privilege in privileges.iter() {
            privilege.validate(PrivilegeScope::Path)?;
        }
        if !grant_option.is_subset_of(privileges) {
            return Err(AuthorityError::invariant(format!(
                "grant option {grant_option:?} on {pattern} exceeds held privileges {privileges:?}"
            )));
        }
        Ok(Self {
            pattern,
            privileges,
            grant_option,
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
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
    pub fn is_empty(&self) -> bool {
        self.privileges.is_empty()
    }

    #[must_use]
    pub fn has_privilege(&self, privilege: PrivilegeType) -> bool {
        self.privileges.contains(privilege)
    }

    #[must_use]
    pub fn covers(&self, path: &PathPattern, privilege: PrivilegeType) -> bool {
        self.privileges.contains(privilege) && self.pattern.covers(path)
    }

    #[must_use]
    pub fn covers_with_grant_option(&self, path: &PathPattern, privilege: PrivilegeType) -> bool {
        self.grant_option.contains(privilege) && self.pattern.covers(path)
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
                "cannot grant option for {privilege} on {} without the privilege itself",
                self.pattern
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

#[cfg(test)]
mod tests {
    use super::*;

    fn p(raw: &str) -> PathPattern {
        PathPattern::parse(raw).expect("valid pattern")
    }

    #[test]
    fn parse_rejects_malformed_paths() {
        for bad in ["", "sg.d1", "root..d1", "root.**.d1", "root.d1."] {
            let err = PathPattern::parse(bad).expect_err(bad);
            assert!(matches!(err, AuthorityError::InvalidPath { .. }), "{bad}");
        }
        assert_eq!(p("root.sg.*.s1").to_string(), "root.sg.*.s1");
    }

    #[test]
    fn multi_level_wildcard_covers_descendants() {
        assert!(p("root.d1.**").covers(&p("root.d1.d1.**")));
        assert!(p("root.d1.**").covers(&p("root.d1.x")));
        assert!(p("root.d1.**").covers(&p("root.d1")));
        assert!(!p("root.d1.**").covers(&p("root.**")));
        assert!(!p("root.d1.**").covers(&p("root.d2.x")));
        assert!(p("root.**").covers(&p("root.d1.**")));
    }

    #[test]
    fn single_level_wildcard_covers_one_level() {
        assert!(p("root.*.s1").covers(&p("root.d1.s1")));
        assert!(p("root.*.s1").covers(&p("root.*.s1")));
        assert!(!p("root.*.s1").covers(&p("root.d1.d2.s1")));
        assert!(!p("root.*.s1").covers(&p("root.**")));
        assert!(!p("root.d1.s1").covers(&p("root.*.s1")));
    }

    #[test]
    fn covering_is_transitive_on_random_patterns() {
        const SEGMENTS: [&str; 4] = ["a", "b", "*", "**"];
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let random_pattern = |rng: &mut fastrand::Rng| {
            let depth = rng.usize(1..5);
            let mut raw = String::from("root");
            for level in 0..depth {
                let pick = SEGMENTS[rng.usize(0..SEGMENTS.len())];
                if pick == "**" && level + 1 != depth {
                    raw.push_str(".a");
                } else {
                    raw.push('.');
                    raw.push_str(pick);
                }
            }
            p(&raw)
        };
        let patterns: Vec<PathPattern> = (0..60).map(|_| random_pattern(&mut rng)).collect();
        for a in &patterns {
            assert!(a.covers(a), "{a} must cover itself");
            for b in &patterns {
                if !a.covers(b) {
                    continue;
                }
                for c in &patterns {
                    if b.covers(c) {
                        assert!(a.covers(c), "{a} ⊒ {b} ⊒ {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn grant_option_must_be_subset() {
        let held: PrivilegeSet = [PrivilegeType::ReadData].into_iter().collect();
        let option: PrivilegeSet = [PrivilegeType::WriteData].into_iter().collect();
        let err = PathPrivilege::with_privileges(p("root.sg.**"), held, option)
            .expect_err("grant option outside held set");
        assert!(matches!(err, AuthorityError::InvariantViolation { .. }));

        let mut entry = PathPrivilege::new(p("root.sg.**"));
        assert!(entry.grant_grant_option(PrivilegeType::ReadData).is_err());
        entry.grant(PrivilegeType::ReadData, true);
        assert!(entry.covers_with_grant_option(&p("root.sg.d1"), PrivilegeType::ReadData));
        entry.revoke(PrivilegeType::ReadData);
        assert!(entry.grant_option().is_empty());
    }

    #[test]
    fn path_privilege_rejects_system_privileges() {
        let held: PrivilegeSet = [PrivilegeType::UsePipe].into_iter().collect();
        assert!(
            PathPrivilege::with_privileges(p("root.**"), held, PrivilegeSet::empty()).is_err()
        );
    }
}
