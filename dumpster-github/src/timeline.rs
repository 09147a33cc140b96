//! Timeline event normalization
//!
//! GraphQL returns timeline entries as a union discriminated by
//! `__typename`. Issues and pull requests select different members of that
//! union, so each has its own closed enum; both reduce to the flat
//! [`Event`] record. Typenames neither enum knows deserialize to
//! `Unrecognized` and produce no event.

use chrono::{DateTime, Utc};
use dumpster_core::{Actor, Event, EventKind};
use serde::Deserialize;

use crate::graphql::{actor, ActorNode};

/// Timeline selection shared by both issue and pull request queries
macro_rules! common_timeline_fragments {
    () => {
        r#"
            __typename
            ... on ClosedEvent { actor { login } createdAt }
            ... on ReopenedEvent { actor { login } createdAt }
            ... on LabeledEvent { actor { login } createdAt label { name } }
            ... on UnlabeledEvent { actor { login } createdAt label { name } }
            ... on AssignedEvent { actor { login } createdAt assignee { ... on Actor { login } } }
            ... on UnassignedEvent { actor { login } createdAt assignee { ... on Actor { login } } }
            ... on CrossReferencedEvent {
                actor { login } createdAt
                source { ... on Issue { number } ... on PullRequest { number } }
            }
        "#
    };
}

/// Selection for `timelineItems { nodes { ... } }` on an issue
macro_rules! issue_timeline_fragments {
    () => {
        $crate::timeline::common_timeline_fragments!()
    };
}

/// Selection for `timelineItems { nodes { ... } }` on a pull request
macro_rules! pull_request_timeline_fragments {
    () => {
        concat!(
            $crate::timeline::common_timeline_fragments!(),
            r#"
            ... on MergedEvent { actor { login } createdAt }
            ... on ReviewRequestedEvent {
                actor { login } createdAt
                requestedReviewer { ... on Actor { login } ... on Team { slug } }
            }
            ... on PullRequestCommit { commit { oid message author { name } } }
        "#
        )
    };
}

pub(crate) use {
    common_timeline_fragments, issue_timeline_fragments, pull_request_timeline_fragments,
};

/// Event that only records who did it and when
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorEvent {
    actor: Option<ActorNode>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct LabelRef {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelEvent {
    actor: Option<ActorNode>,
    created_at: DateTime<Utc>,
    label: LabelRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentEvent {
    actor: Option<ActorNode>,
    created_at: DateTime<Utc>,
    assignee: Option<ActorNode>,
}

#[derive(Debug, Deserialize)]
struct SourceRef {
    number: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReferenceEvent {
    actor: Option<ActorNode>,
    created_at: DateTime<Utc>,
    source: Option<SourceRef>,
}

/// Requested reviewer is either an account (login) or a team (slug)
#[derive(Debug, Deserialize)]
struct ReviewerRef {
    login: Option<String>,
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestEvent {
    actor: Option<ActorNode>,
    created_at: DateTime<Utc>,
    requested_reviewer: Option<ReviewerRef>,
}

#[derive(Debug, Deserialize)]
struct GitActorRef {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    oid: String,
    message: String,
    author: Option<GitActorRef>,
}

#[derive(Debug, Deserialize)]
pub struct CommitItem {
    commit: CommitRef,
}

impl ActorEvent {
    fn into_event(self, kind: EventKind) -> Event {
        Event::new(kind, actor(self.actor), Some(self.created_at))
    }
}

impl LabelEvent {
    fn into_event(self, kind: EventKind) -> Event {
        Event::new(kind, actor(self.actor), Some(self.created_at))
            .with_detail("label", self.label.name)
    }
}

impl AssignmentEvent {
    fn into_event(self, kind: EventKind) -> Event {
        let assignee = self.assignee.and_then(|a| a.login).unwrap_or_default();
        Event::new(kind, actor(self.actor), Some(self.created_at)).with_detail("assignee", assignee)
    }
}

impl CrossReferenceEvent {
    fn into_event(self) -> Event {
        let event = Event::new(
            EventKind::CrossReferenced,
            actor(self.actor),
            Some(self.created_at),
        );
        match self.source.and_then(|s| s.number) {
            Some(number) => event.with_detail("source", number.to_string()),
            None => event,
        }
    }
}

impl ReviewRequestEvent {
    fn into_event(self) -> Event {
        let reviewer = self
            .requested_reviewer
            .and_then(|r| r.login.or(r.slug))
            .unwrap_or_default();
        Event::new(
            EventKind::ReviewRequested,
            actor(self.actor),
            Some(self.created_at),
        )
        .with_detail("reviewer", reviewer)
    }
}

impl CommitItem {
    fn into_event(self) -> Event {
        let author = self
            .commit
            .author
            .and_then(|a| a.name)
            .filter(|n| !n.is_empty())
            .map(Actor::new)
            .unwrap_or_else(Actor::ghost);
        Event::new(EventKind::Commit, author, None)
            .with_detail("sha", self.commit.oid)
            .with_detail("message", self.commit.message)
    }
}

/// Timeline entry on an issue
#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub enum IssueTimelineItem {
    ClosedEvent(ActorEvent),
    ReopenedEvent(ActorEvent),
    LabeledEvent(LabelEvent),
    UnlabeledEvent(LabelEvent),
    AssignedEvent(AssignmentEvent),
    UnassignedEvent(AssignmentEvent),
    CrossReferencedEvent(CrossReferenceEvent),
    #[serde(other)]
    Unrecognized,
}

impl IssueTimelineItem {
    pub fn normalize(self) -> Option<Event> {
        match self {
            IssueTimelineItem::ClosedEvent(e) => Some(e.into_event(EventKind::Closed)),
            IssueTimelineItem::ReopenedEvent(e) => Some(e.into_event(EventKind::Reopened)),
            IssueTimelineItem::LabeledEvent(e) => Some(e.into_event(EventKind::Labeled)),
            IssueTimelineItem::UnlabeledEvent(e) => Some(e.into_event(EventKind::Unlabeled)),
            IssueTimelineItem::AssignedEvent(e) => Some(e.into_event(EventKind::Assigned)),
            IssueTimelineItem::UnassignedEvent(e) => Some(e.into_event(EventKind::Unassigned)),
            IssueTimelineItem::CrossReferencedEvent(e) => Some(e.into_event()),
            IssueTimelineItem::Unrecognized => None,
        }
    }
}

/// Timeline entry on a pull request
#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub enum PullRequestTimelineItem {
    ClosedEvent(ActorEvent),
    ReopenedEvent(ActorEvent),
    MergedEvent(ActorEvent),
    LabeledEvent(LabelEvent),
    UnlabeledEvent(LabelEvent),
    AssignedEvent(AssignmentEvent),
    UnassignedEvent(AssignmentEvent),
    CrossReferencedEvent(CrossReferenceEvent),
    ReviewRequestedEvent(ReviewRequestEvent),
    PullRequestCommit(CommitItem),
    #[serde(other)]
    Unrecognized,
}

impl PullRequestTimelineItem {
    pub fn normalize(self) -> Option<Event> {
        match self {
            PullRequestTimelineItem::ClosedEvent(e) => Some(e.into_event(EventKind::Closed)),
            PullRequestTimelineItem::ReopenedEvent(e) => Some(e.into_event(EventKind::Reopened)),
            PullRequestTimelineItem::MergedEvent(e) => Some(e.into_event(EventKind::Merged)),
            PullRequestTimelineItem::LabeledEvent(e) => Some(e.into_event(EventKind::Labeled)),
            PullRequestTimelineItem::UnlabeledEvent(e) => {
                Some(e.into_event(EventKind::Unlabeled))
            }
            PullRequestTimelineItem::AssignedEvent(e) => Some(e.into_event(EventKind::Assigned)),
            PullRequestTimelineItem::UnassignedEvent(e) => {
                Some(e.into_event(EventKind::Unassigned))
            }
            PullRequestTimelineItem::CrossReferencedEvent(e) => Some(e.into_event()),
            PullRequestTimelineItem::ReviewRequestedEvent(e) => Some(e.into_event()),
            PullRequestTimelineItem::PullRequestCommit(e) => Some(e.into_event()),
            PullRequestTimelineItem::Unrecognized => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    const AT: &str = "2024-02-03T04:05:06Z";

    fn issue_event(raw: Value) -> Option<Event> {
        serde_json::from_value::<IssueTimelineItem>(raw)
            .unwrap()
            .normalize()
    }

    fn pr_event(raw: Value) -> Option<Event> {
        serde_json::from_value::<PullRequestTimelineItem>(raw)
            .unwrap()
            .normalize()
    }

    fn details(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_closed_and_reopened() {
        let closed = issue_event(json!({
            "__typename": "ClosedEvent", "actor": {"login": "octocat"}, "createdAt": AT
        }))
        .unwrap();
        assert_eq!(closed.kind, EventKind::Closed);
        assert_eq!(closed.actor.login, "octocat");
        assert_eq!(closed.created_at.unwrap().to_rfc3339(), "2024-02-03T04:05:06+00:00");
        assert!(closed.details.is_empty());

        let reopened = pr_event(json!({
            "__typename": "ReopenedEvent", "actor": null, "createdAt": AT
        }))
        .unwrap();
        assert_eq!(reopened.kind, EventKind::Reopened);
        assert_eq!(reopened.actor.login, "ghost");
    }

    #[test]
    fn test_label_events() {
        for (typename, kind) in [
            ("LabeledEvent", EventKind::Labeled),
            ("UnlabeledEvent", EventKind::Unlabeled),
        ] {
            let raw = json!({
                "__typename": typename,
                "actor": {"login": "octocat"},
                "createdAt": AT,
                "label": {"name": "bug"}
            });
            let event = issue_event(raw.clone()).unwrap();
            assert_eq!(event.kind, kind);
            assert_eq!(event.details, details(&[("label", "bug")]));
            assert_eq!(pr_event(raw).unwrap(), event);
        }
    }

    #[test]
    fn test_assignment_events() {
        let assigned = issue_event(json!({
            "__typename": "AssignedEvent",
            "actor": {"login": "octocat"},
            "createdAt": AT,
            "assignee": {"login": "hubot"}
        }))
        .unwrap();
        assert_eq!(assigned.kind, EventKind::Assigned);
        assert_eq!(assigned.details, details(&[("assignee", "hubot")]));

        let unassigned = pr_event(json!({
            "__typename": "UnassignedEvent",
            "actor": {"login": "octocat"},
            "createdAt": AT,
            "assignee": {}
        }))
        .unwrap();
        assert_eq!(unassigned.kind, EventKind::Unassigned);
        assert_eq!(unassigned.details, details(&[("assignee", "")]));
    }

    #[test]
    fn test_cross_referenced() {
        let event = issue_event(json!({
            "__typename": "CrossReferencedEvent",
            "actor": {"login": "octocat"},
            "createdAt": AT,
            "source": {"number": 812}
        }))
        .unwrap();
        assert_eq!(event.kind, EventKind::CrossReferenced);
        assert_eq!(event.details, details(&[("source", "812")]));

        let hidden = issue_event(json!({
            "__typename": "CrossReferencedEvent",
            "actor": {"login": "octocat"},
            "createdAt": AT,
            "source": {}
        }))
        .unwrap();
        assert!(hidden.details.is_empty());
    }

    #[test]
    fn test_pull_request_only_events() {
        let merged = pr_event(json!({
            "__typename": "MergedEvent", "actor": {"login": "octocat"}, "createdAt": AT
        }))
        .unwrap();
        assert_eq!(merged.kind, EventKind::Merged);
        assert!(merged.details.is_empty());

        let requested = pr_event(json!({
            "__typename": "ReviewRequestedEvent",
            "actor": {"login": "octocat"},
            "createdAt": AT,
            "requestedReviewer": {"login": "hubot"}
        }))
        .unwrap();
        assert_eq!(requested.kind, EventKind::ReviewRequested);
        assert_eq!(requested.details, details(&[("reviewer", "hubot")]));

        let team = pr_event(json!({
            "__typename": "ReviewRequestedEvent",
            "actor": {"login": "octocat"},
            "createdAt": AT,
            "requestedReviewer": {"slug": "core-team"}
        }))
        .unwrap();
        assert_eq!(team.details, details(&[("reviewer", "core-team")]));
    }

    #[test]
    fn test_commit_event() {
        let commit = pr_event(json!({
            "__typename": "PullRequestCommit",
            "commit": {
                "oid": "0123abcd",
                "message": "Fix the widget",
                "author": {"name": "Mona Lisa"}
            }
        }))
        .unwrap();
        assert_eq!(commit.kind, EventKind::Commit);
        assert_eq!(commit.actor.login, "Mona Lisa");
        assert!(commit.created_at.is_none());
        assert_eq!(
            commit.details,
            details(&[("sha", "0123abcd"), ("message", "Fix the widget")])
        );
    }

    #[test]
    fn test_unrecognized_typenames_are_dropped() {
        assert!(issue_event(json!({"__typename": "SubscribedEvent"})).is_none());
        assert!(pr_event(json!({"__typename": "HeadRefForcePushedEvent"})).is_none());
    }

    #[test]
    fn test_pull_request_only_typenames_unknown_on_issues() {
        // Issue timelines do not select these, so they reduce to typename only
        assert!(issue_event(json!({"__typename": "MergedEvent"})).is_none());
        assert!(issue_event(json!({"__typename": "PullRequestCommit"})).is_none());
    }

    #[test]
    fn test_fragment_selections() {
        let issue = issue_timeline_fragments!();
        let pr = pull_request_timeline_fragments!();
        assert!(issue.contains("... on CrossReferencedEvent"));
        assert!(!issue.contains("MergedEvent"));
        assert!(pr.starts_with(issue));
        assert!(pr.contains("... on PullRequestCommit"));
    }
}
