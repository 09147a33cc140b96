//! Issue fetching

use chrono::{DateTime, Utc};
use dumpster_core::{Issue, Repository, ResourceKind};
use serde::Deserialize;
use serde_json::{json, Map};
use tracing::info;

use crate::cutoff::{Cutoff, Updated};
use crate::graphql::{
    actor, comments, labels, ActorNode, CommentNode, Connection, LabelNode, Listing, Nodes,
};
use crate::timeline::{issue_timeline_fragments, IssueTimelineItem};
use crate::{GitHubClient, Result};

/// Issues support a server-side `since` filter, so no client cutoff applies
pub const ISSUE_CUTOFF: Cutoff = Cutoff::ServerFiltered;

const ISSUES_QUERY: &str = concat!(
    r#"
query($owner: String!, $repo: String!, $pageSize: Int!, $cursor: String, $since: DateTime) {
    repository(owner: $owner, name: $repo) {
        issues(
            first: $pageSize
            after: $cursor
            orderBy: {field: UPDATED_AT, direction: DESC}
            filterBy: {since: $since}
        ) {
            pageInfo { hasNextPage endCursor }
            nodes {
                number
                title
                body
                state
                createdAt
                updatedAt
                closedAt
                author { login }
                labels(first: 50) { nodes { name color } }
                comments(first: 50) { nodes { author { login } body createdAt updatedAt } }
                timelineItems(first: 50) {
                    nodes {"#,
    issue_timeline_fragments!(),
    r#"
                    }
                }
            }
        }
    }
}
"#
);

#[derive(Debug, Deserialize)]
struct IssuesRepository {
    issues: Connection<IssueNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    number: u64,
    title: String,
    body: String,
    state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    author: Option<ActorNode>,
    #[serde(default)]
    labels: Nodes<LabelNode>,
    #[serde(default)]
    comments: Nodes<CommentNode>,
    #[serde(default)]
    timeline_items: Nodes<IssueTimelineItem>,
}

impl Updated for IssueNode {
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl From<IssueNode> for Issue {
    fn from(node: IssueNode) -> Self {
        Issue {
            number: node.number,
            title: node.title,
            body: node.body,
            state: node.state,
            author: actor(node.author),
            created_at: node.created_at,
            updated_at: node.updated_at,
            closed_at: node.closed_at,
            labels: labels(node.labels),
            comments: comments(node.comments),
            events: node
                .timeline_items
                .nodes
                .into_iter()
                .filter_map(IssueTimelineItem::normalize)
                .collect(),
        }
    }
}

impl GitHubClient {
    /// Fetch issues updated at or after `since` (all issues when `None`),
    /// newest-updated first
    pub async fn fetch_issues(
        &self,
        repo: &Repository,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Issue>> {
        let mut extra = Map::new();
        extra.insert(
            "since".to_string(),
            json!(since.map(|t| t.to_rfc3339())),
        );

        let nodes = self
            .paginate(Listing {
                query: ISSUES_QUERY,
                page_size: self.page_size(ResourceKind::Issues),
                cutoff: ISSUE_CUTOFF,
                since,
                extra,
                connection: |r: IssuesRepository| r.issues,
                repo,
            })
            .await?;

        let issues: Vec<Issue> = nodes.into_iter().map(Issue::from).collect();
        info!(%repo, count = issues.len(), "Fetched issues");
        Ok(issues)
    }
}
