//! Boundary between the tracker and the remote API

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::kind::ResourceKind;
use crate::model::Record;

/// Error returned by a record source, kept opaque to the tracker
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An owner/name pair identifying a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Something that can list a repository's records of one kind
///
/// Implementations return records newest-updated first and apply the
/// kind's cutoff policy for `since`. A failure on any page fails the
/// whole call; partial results are never returned.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(
        &self,
        kind: ResourceKind,
        repo: &Repository,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Record>, SourceError>;
}
