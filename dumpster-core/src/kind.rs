//! Resource kinds that can be synced

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A kind of repository record tracked independently with its own watermark
///
/// The declaration order is the order kinds are synced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Issues,
    PullRequests,
    Discussions,
}

impl ResourceKind {
    /// All kinds in sync order
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Issues,
        ResourceKind::PullRequests,
        ResourceKind::Discussions,
    ];

    /// Directory under the output root holding this kind's records
    pub fn dir_name(self) -> &'static str {
        match self {
            ResourceKind::Issues => "issues",
            ResourceKind::PullRequests => "pull_requests",
            ResourceKind::Discussions => "discussions",
        }
    }

    /// Singular noun used in per-record messages
    pub fn singular(self) -> &'static str {
        match self {
            ResourceKind::Issues => "issue",
            ResourceKind::PullRequests => "pull request",
            ResourceKind::Discussions => "discussion",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Issues => "issues",
            ResourceKind::PullRequests => "pull requests",
            ResourceKind::Discussions => "discussions",
        })
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    /// Accepts the short command-line names (`issue`, `pr`, `discussion`)
    /// as well as the plural directory names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "issue" | "issues" => Ok(ResourceKind::Issues),
            "pr" | "prs" | "pull_request" | "pull_requests" => Ok(ResourceKind::PullRequests),
            "discussion" | "discussions" => Ok(ResourceKind::Discussions),
            other => Err(Error::Config(format!(
                "unknown kind: {} (valid: issue, pr, discussion)",
                other
            ))),
        }
    }
}

/// Set of kinds requested for one invocation
///
/// Iteration always follows sync order regardless of how the set was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSet(BTreeSet<ResourceKind>);

impl KindSet {
    /// Every kind
    pub fn all() -> Self {
        Self(ResourceKind::ALL.into_iter().collect())
    }

    /// Build from an explicit selection; an empty selection means all kinds
    pub fn from_selection(kinds: impl IntoIterator<Item = ResourceKind>) -> Self {
        let set: BTreeSet<_> = kinds.into_iter().collect();
        if set.is_empty() {
            Self::all()
        } else {
            Self(set)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for KindSet {
    fn default() -> Self {
        Self::all()
    }
}
