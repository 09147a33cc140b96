//! Record shapes persisted to disk
//!
//! Field names are stable across runs so that successive syncs of an
//! unchanged record produce byte-identical documents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kind::ResourceKind;

/// Login used for authors whose account no longer exists
pub const GHOST_LOGIN: &str = "ghost";

/// A GitHub user, bot or organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
}

impl Actor {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }

    /// Placeholder for deleted accounts
    pub fn ghost() -> Self {
        Self::new(GHOST_LOGIN)
    }
}

/// Label attached to an issue, pull request or discussion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// Hex color without the leading `#`
    pub color: String,
}

/// Top-level comment on an issue or pull request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: Actor,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kind tag of a normalized timeline event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "closed")]
    Closed,
    #[serde(rename = "reopened")]
    Reopened,
    #[serde(rename = "labeled")]
    Labeled,
    #[serde(rename = "unlabeled")]
    Unlabeled,
    #[serde(rename = "assigned")]
    Assigned,
    #[serde(rename = "unassigned")]
    Unassigned,
    #[serde(rename = "cross-referenced")]
    CrossReferenced,
    #[serde(rename = "merged")]
    Merged,
    #[serde(rename = "review_requested")]
    ReviewRequested,
    #[serde(rename = "commit")]
    Commit,
}

/// Uniform timeline entry
///
/// The tag decides which `details` keys are present:
///
/// | tag                | details                  |
/// |--------------------|--------------------------|
/// | `labeled`, `unlabeled` | `label`              |
/// | `assigned`, `unassigned` | `assignee`         |
/// | `cross-referenced` | `source` (when visible)  |
/// | `review_requested` | `reviewer`               |
/// | `commit`           | `sha`, `message`         |
///
/// Commits carry no timestamp; the actor is the commit author's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub actor: Actor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl Event {
    pub fn new(kind: EventKind, actor: Actor, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            kind,
            actor,
            created_at,
            details: BTreeMap::new(),
        }
    }

    /// Add a detail entry
    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: String,
    pub author: Actor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    pub labels: Vec<Label>,
    pub comments: Vec<Comment>,
    pub events: Vec<Event>,
}

/// Inline comment left as part of a review, anchored to a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewComment {
    pub author: Actor,
    pub body: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: Actor,
    pub body: String,
    /// APPROVED, CHANGES_REQUESTED, COMMENTED, DISMISSED or PENDING
    pub state: String,
    /// Absent for pending reviews
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<ReviewComment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: String,
    pub author: Actor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
    pub labels: Vec<Label>,
    pub comments: Vec<Comment>,
    pub reviews: Vec<Review>,
    pub events: Vec<Event>,
}

/// Reply to a discussion comment (the API allows a single level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionReply {
    pub author: Actor,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionComment {
    pub author: Actor,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<DiscussionReply>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub number: u64,
    pub title: String,
    pub body: String,
    /// OPEN or CLOSED
    pub state: String,
    pub author: Actor,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_chosen_at: Option<DateTime<Utc>>,
    pub labels: Vec<Label>,
    pub comments: Vec<DiscussionComment>,
}

/// Any record produced by a sync
///
/// Serializes as the inner document without a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Issue(Issue),
    PullRequest(PullRequest),
    Discussion(Discussion),
}

impl Record {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Record::Issue(_) => ResourceKind::Issues,
            Record::PullRequest(_) => ResourceKind::PullRequests,
            Record::Discussion(_) => ResourceKind::Discussions,
        }
    }

    pub fn number(&self) -> u64 {
        match self {
            Record::Issue(i) => i.number,
            Record::PullRequest(p) => p.number,
            Record::Discussion(d) => d.number,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Record::Issue(i) => i.updated_at,
            Record::PullRequest(p) => p.updated_at,
            Record::Discussion(d) => d.updated_at,
        }
    }
}

impl From<Issue> for Record {
    fn from(issue: Issue) -> Self {
        Record::Issue(issue)
    }
}

impl From<PullRequest> for Record {
    fn from(pr: PullRequest) -> Self {
        Record::PullRequest(pr)
    }
}

impl From<Discussion> for Record {
    fn from(discussion: Discussion) -> Self {
        Record::Discussion(discussion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_event_kind_tags() {
        let tags: Vec<String> = [
            EventKind::Closed,
            EventKind::CrossReferenced,
            EventKind::ReviewRequested,
            EventKind::Commit,
        ]
        .iter()
        .map(|k| serde_json::to_value(k).unwrap().as_str().unwrap().to_string())
        .collect();
        assert_eq!(
            tags,
            vec!["closed", "cross-referenced", "review_requested", "commit"]
        );
    }

    #[test]
    fn test_commit_event_omits_timestamp() {
        let event = Event::new(EventKind::Commit, Actor::new("Jane Doe"), None)
            .with_detail("sha", "abc123")
            .with_detail("message", "fix things");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "commit");
        assert!(value.get("created_at").is_none());
        assert_eq!(value["details"]["sha"], "abc123");
    }

    #[test]
    fn test_closed_event_omits_empty_details() {
        let event = Event::new(EventKind::Closed, Actor::new("octocat"), Some(ts(0)));
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("details").is_none());
        assert_eq!(value["created_at"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_record_serializes_without_wrapper() {
        let issue = Issue {
            number: 7,
            title: "Crash".to_string(),
            body: String::new(),
            state: "OPEN".to_string(),
            author: Actor::ghost(),
            created_at: ts(10),
            updated_at: ts(20),
            closed_at: None,
            labels: vec![],
            comments: vec![],
            events: vec![],
        };
        let record = Record::from(issue);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["number"], 7);
        assert_eq!(value["author"]["login"], "ghost");
        assert!(value.get("closed_at").is_none());
        assert_eq!(value["labels"], serde_json::json!([]));
        assert_eq!(record.kind(), ResourceKind::Issues);
        assert_eq!(record.updated_at(), ts(20));
    }
}
