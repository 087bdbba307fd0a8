//! Incoming change notifications and the filters applied to them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property that pins a post-commit build to an exact git revision.
pub const GIT_REVISION_PROPERTY: &str = "git_revision";

/// A commit event delivered by the change feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub branch: Option<String>,
    pub files: Vec<String>,
    pub revision: Option<String>,
    pub properties: BTreeMap<String, String>,
}

impl Change {
    /// The revision to check out, preferring an explicit git revision property.
    pub fn effective_revision(&self) -> Option<&str> {
        self.properties
            .get(GIT_REVISION_PROPERTY)
            .map(String::as_str)
            .or(self.revision.as_deref())
    }

    /// The branch with any repository layout prefix removed.
    pub fn normalized_branch(&self) -> Option<&str> {
        self.branch.as_deref().map(normalize_branch)
    }
}

/// Strip `/` and `branches/` layout prefixes from a branch name.
///
/// `/branches/foo-1234` and `branches/foo-1234` both become `foo-1234`;
/// `trunk` is unchanged.
pub fn normalize_branch(branch: &str) -> &str {
    let branch = branch.strip_prefix('/').unwrap_or(branch);
    branch.strip_prefix("branches/").unwrap_or(branch)
}

/// Decides whether a change is worth building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeFilter {
    /// Changes touching only these path prefixes are ignored.
    pub ignored_prefixes: Vec<String>,
}

impl Default for ChangeFilter {
    fn default() -> Self {
        Self {
            ignored_prefixes: vec!["doc/fun/".to_string()],
        }
    }
}

impl ChangeFilter {
    pub fn accept_all() -> Self {
        Self {
            ignored_prefixes: Vec::new(),
        }
    }

    /// True if at least one changed file lies outside every ignored prefix.
    pub fn is_important(&self, change: &Change) -> bool {
        change.files.iter().any(|file| {
            !self
                .ignored_prefixes
                .iter()
                .any(|prefix| file.starts_with(prefix.as_str()))
        })
    }
}
