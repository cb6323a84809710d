//! A merged set of path patterns, used to answer "where may this user read?".

use serde::Serialize;

use super::path::PathPattern;
use crate::Result;

/// Covering-pruned union of path patterns.
///
/// No pattern in the tree is covered by another one, so the set is the
/// smallest list describing the same region of the path space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PatternTree {
    patterns: Vec<PathPattern>,
}

impl PatternTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The tree covering the whole path space.
    #[must_use]
    pub fn all() -> Self {
        Self {
            patterns: vec![PathPattern::all()],
        }
    }

    /// Adds `pattern` unless it is already covered. Returns whether the tree changed.
    pub fn insert(&mut self, pattern: PathPattern) -> bool {
        if self.covers(&pattern) {
            return false;
        }
        self.patterns.retain(|existing| !pattern.covers(existing));
        let idx = self.patterns.partition_point(|existing| existing < &pattern);
        self.patterns.insert(idx, pattern);
        true
    }

    pub fn extend<'a, I>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = &'a PathPattern>,
    {
        for pattern in patterns {
            self.insert(pattern.clone());
        }
    }

    /// Whether everything `pattern` matches lies inside the tree's region.
    ///
    /// Only single-pattern covering is considered; a pattern split across two
    /// entries is reported as not covered.
    #[must_use]
    pub fn covers(&self, pattern: &PathPattern) -> bool {
        self.patterns.iter().any(|existing| existing.covers(pattern))
    }

    pub fn contains_path(&self, raw: &str) -> Result<bool> {
        Ok(self.covers(&PathPattern::parse(raw)?))
    }

    #[must_use]
    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a blob produced by [`PatternTree::to_bytes`]. An empty blob is an empty tree.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::new());
        }
        let decoded: Vec<PathPattern> = serde_json::from_slice(bytes)?;
        let mut tree = Self::new();
        for pattern in decoded {
            tree.insert(pattern);
        }
        Ok(tree)
    }
}

impl FromIterator<PathPattern> for PatternTree {
    fn from_iter<I: IntoIterator<Item = PathPattern>>(iter: I) -> Self {
        let mut tree = Self::new();
        for pattern in iter {
            tree.insert(pattern);
        }
        tree
    }
}
