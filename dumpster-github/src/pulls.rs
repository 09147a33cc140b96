//! Pull request fetching

use chrono::{DateTime, Utc};
use dumpster_core::{PullRequest, Repository, ResourceKind, Review, ReviewComment};
use serde::Deserialize;
use serde_json::Map;
use tracing::info;

use crate::cutoff::{Cutoff, Updated};
use crate::graphql::{
    actor, comments, labels, ActorNode, CommentNode, Connection, LabelNode, Listing, Nodes,
};
use crate::timeline::{pull_request_timeline_fragments, PullRequestTimelineItem};
use crate::{GitHubClient, Result};

/// The pull request connection has no `since` filter: stale nodes are
/// skipped client-side and a stale page tail ends the listing
pub const PULL_REQUEST_CUTOFF: Cutoff = Cutoff::TrailingNodeStop;

const PULL_REQUESTS_QUERY: &str = concat!(
    r#"
query($owner: String!, $repo: String!, $pageSize: Int!, $cursor: String) {
    repository(owner: $owner, name: $repo) {
        pullRequests(
            first: $pageSize
            after: $cursor
            orderBy: {field: UPDATED_AT, direction: DESC}
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
                mergedAt
                author { login }
                labels(first: 50) { nodes { name color } }
                comments(first: 50) { nodes { author { login } body createdAt updatedAt } }
                reviews(first: 50) {
                    nodes {
                        author { login }
                        body
                        state
                        submittedAt
                        comments(first: 50) { nodes { author { login } body path createdAt } }
                    }
                }
                timelineItems(first: 50) {
                    nodes {"#,
    pull_request_timeline_fragments!(),
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
#[serde(rename_all = "camelCase")]
struct PullRequestsRepository {
    pull_requests: Connection<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewCommentNode {
    author: Option<ActorNode>,
    body: String,
    path: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewNode {
    author: Option<ActorNode>,
    body: String,
    state: String,
    submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    comments: Nodes<ReviewCommentNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    number: u64,
    title: String,
    body: String,
    state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    merged_at: Option<DateTime<Utc>>,
    author: Option<ActorNode>,
    #[serde(default)]
    labels: Nodes<LabelNode>,
    #[serde(default)]
    comments: Nodes<CommentNode>,
    #[serde(default)]
    reviews: Nodes<ReviewNode>,
    #[serde(default)]
    timeline_items: Nodes<PullRequestTimelineItem>,
}

impl Updated for PullRequestNode {
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl From<ReviewNode> for Review {
    fn from(node: ReviewNode) -> Self {
        Review {
            author: actor(node.author),
            body: node.body,
            state: node.state,
            submitted_at: node.submitted_at,
            comments: node
                .comments
                .nodes
                .into_iter()
                .map(|c| ReviewComment {
                    author: actor(c.author),
                    body: c.body,
                    path: c.path,
                    created_at: c.created_at,
                })
                .collect(),
        }
    }
}

impl From<PullRequestNode> for PullRequest {
    fn from(node: PullRequestNode) -> Self {
        PullRequest {
            number: node.number,
            title: node.title,
            body: node.body,
            state: node.state,
            author: actor(node.author),
            created_at: node.created_at,
            updated_at: node.updated_at,
            closed_at: node.closed_at,
            merged_at: node.merged_at,
            labels: labels(node.labels),
            comments: comments(node.comments),
            reviews: node.reviews.nodes.into_iter().map(Review::from).collect(),
            events: node
                .timeline_items
                .nodes
                .into_iter()
                .filter_map(PullRequestTimelineItem::normalize)
                .collect(),
        }
    }
}

impl GitHubClient {
    /// Fetch pull requests updated at or after `since` (all when `None`),
    /// newest-updated first
    pub async fn fetch_pull_requests(
        &self,
        repo: &Repository,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PullRequest>> {
        let nodes = self
            .paginate(Listing {
                query: PULL_REQUESTS_QUERY,
                page_size: self.page_size(ResourceKind::PullRequests),
                cutoff: PULL_REQUEST_CUTOFF,
                since,
                extra: Map::new(),
                connection: |r: PullRequestsRepository| r.pull_requests,
                repo,
            })
            .await?;

        let prs: Vec<PullRequest> = nodes.into_iter().map(PullRequest::from).collect();
        info!(%repo, count = prs.len(), "Fetched pull requests");
        Ok(prs)
    }
}
