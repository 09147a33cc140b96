//! Dumpster GitHub - GraphQL access to a repository's history
//!
//! This crate pages through issues, pull requests and discussions,
//! applies each kind's cutoff policy, and normalizes timeline items into
//! the record model from `dumpster-core`.

mod client;
pub mod cutoff;
mod discussions;
mod error;
mod graphql;
mod issues;
mod pulls;
pub mod timeline;
mod transport;

#[cfg(test)]
mod testing;

pub use client::{parse_repository, GitHubClient};
pub use cutoff::{Cutoff, Filtered, Updated};
pub use discussions::DISCUSSION_CUTOFF;
pub use error::{Error, Result};
pub use issues::ISSUE_CUTOFF;
pub use pulls::PULL_REQUEST_CUTOFF;
pub use timeline::{IssueTimelineItem, PullRequestTimelineItem};
pub use transport::{HttpTransport, Transport};
