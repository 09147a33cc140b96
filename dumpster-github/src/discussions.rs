//! Discussion fetching

use chrono::{DateTime, Utc};
use dumpster_core::{Discussion, DiscussionComment, DiscussionReply, Repository, ResourceKind};
use serde::Deserialize;
use serde_json::Map;
use tracing::info;

use crate::cutoff::{Cutoff, Updated};
use crate::graphql::{actor, labels, ActorNode, Connection, LabelNode, Listing, Nodes};
use crate::{GitHubClient, Result};

/// Discussions are filtered client-side and the listing ends at the first
/// stale node, mid-page
pub const DISCUSSION_CUTOFF: Cutoff = Cutoff::FirstStaleStop;

// Replies only nest one level below a comment
const DISCUSSIONS_QUERY: &str = r#"
query($owner: String!, $repo: String!, $pageSize: Int!, $cursor: String) {
    repository(owner: $owner, name: $repo) {
        discussions(
            first: $pageSize
            after: $cursor
            orderBy: {field: UPDATED_AT, direction: DESC}
        ) {
            pageInfo { hasNextPage endCursor }
            nodes {
                number
                title
                body
                closed
                closedAt
                answerChosenAt
                createdAt
                updatedAt
                author { login }
                category { name }
                labels(first: 50) { nodes { name color } }
                comments(first: 50) {
                    nodes {
                        author { login }
                        body
                        createdAt
                        updatedAt
                        replies(first: 20) { nodes { author { login } body createdAt updatedAt } }
                    }
                }
            }
        }
    }
}
"#;

#[derive(Debug, Deserialize)]
struct DiscussionsRepository {
    discussions: Connection<DiscussionNode>,
}

#[derive(Debug, Deserialize)]
struct CategoryNode {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyNode {
    author: Option<ActorNode>,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionCommentNode {
    author: Option<ActorNode>,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    replies: Nodes<ReplyNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionNode {
    number: u64,
    title: String,
    body: String,
    #[serde(default)]
    closed: bool,
    closed_at: Option<DateTime<Utc>>,
    answer_chosen_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author: Option<ActorNode>,
    category: Option<CategoryNode>,
    #[serde(default)]
    labels: Nodes<LabelNode>,
    #[serde(default)]
    comments: Nodes<DiscussionCommentNode>,
}

impl Updated for DiscussionNode {
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl From<DiscussionCommentNode> for DiscussionComment {
    fn from(node: DiscussionCommentNode) -> Self {
        DiscussionComment {
            author: actor(node.author),
            body: node.body,
            created_at: node.created_at,
            updated_at: node.updated_at,
            replies: node
                .replies
                .nodes
                .into_iter()
                .map(|r| DiscussionReply {
                    author: actor(r.author),
                    body: r.body,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                })
                .collect(),
        }
    }
}

impl From<DiscussionNode> for Discussion {
    fn from(node: DiscussionNode) -> Self {
        let state = if node.closed { "CLOSED" } else { "OPEN" };
        Discussion {
            number: node.number,
            title: node.title,
            body: node.body,
            state: state.to_string(),
            author: actor(node.author),
            category: node.category.map(|c| c.name).unwrap_or_default(),
            created_at: node.created_at,
            updated_at: node.updated_at,
            closed_at: node.closed_at,
            answer_chosen_at: node.answer_chosen_at,
            labels: labels(node.labels),
            comments: node
                .comments
                .nodes
                .into_iter()
                .map(DiscussionComment::from)
                .collect(),
        }
    }
}

impl GitHubClient {
    /// Fetch discussions updated at or after `since` (all when `None`),
    /// newest-updated first
    pub async fn fetch_discussions(
        &self,
        repo: &Repository,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Discussion>> {
        let nodes = self
            .paginate(Listing {
                query: DISCUSSIONS_QUERY,
                page_size: self.page_size(ResourceKind::Discussions),
                cutoff: DISCUSSION_CUTOFF,
                since,
                extra: Map::new(),
                connection: |r: DiscussionsRepository| r.discussions,
                repo,
            })
            .await?;

        let discussions: Vec<Discussion> = nodes.into_iter().map(Discussion::from).collect();
        info!(%repo, count = discussions.len(), "Fetched discussions");
        Ok(discussions)
    }
}
