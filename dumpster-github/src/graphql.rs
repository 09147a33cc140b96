//! GraphQL envelope handling, shared node shapes and the cursor loop

use chrono::{DateTime, Utc};
use dumpster_core::{Actor, Comment, Label, Repository};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::cutoff::{Cutoff, Updated};
use crate::{Error, GitHubClient, Result};

/// GraphQL query response wrapper
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

/// GraphQL error
#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// `{ nodes: [...] }` wrapper used by nested connections
#[derive(Debug, Deserialize)]
pub(crate) struct Nodes<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

impl<T> Default for Nodes<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// Top-level paginated connection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Connection<N> {
    pub page_info: PageInfo,
    #[serde(default = "Vec::new")]
    pub nodes: Vec<N>,
}

#[derive(Debug, Deserialize)]
struct RepositoryData<R> {
    repository: Option<R>,
}

/// Anything exposing a `login`; null for deleted accounts
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ActorNode {
    #[serde(default)]
    pub login: Option<String>,
}

/// Convert a nullable actor, substituting the ghost account
pub(crate) fn actor(node: Option<ActorNode>) -> Actor {
    match node.and_then(|n| n.login) {
        Some(login) if !login.is_empty() => Actor::new(login),
        _ => Actor::ghost(),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelNode {
    pub name: String,
    pub color: String,
}

pub(crate) fn labels(labels: Nodes<LabelNode>) -> Vec<Label> {
    labels
        .nodes
        .into_iter()
        .map(|l| Label {
            name: l.name,
            color: l.color,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentNode {
    pub author: Option<ActorNode>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn comments(comments: Nodes<CommentNode>) -> Vec<Comment> {
    comments
        .nodes
        .into_iter()
        .map(|c| Comment {
            author: actor(c.author),
            body: c.body,
            created_at: c.created_at,
            updated_at: c.updated_at,
        })
        .collect()
}

/// One paginated listing: which query, how to reach its connection, and
/// which cutoff applies
pub(crate) struct Listing<'a, R, N> {
    pub query: &'static str,
    pub page_size: u32,
    pub cutoff: Cutoff,
    pub since: Option<DateTime<Utc>>,
    /// Variables beyond owner/repo/pageSize/cursor
    pub extra: Map<String, Value>,
    pub connection: fn(R) -> Connection<N>,
    pub repo: &'a Repository,
}

impl GitHubClient {
    /// Follow cursors until the cutoff says stop or the server runs out of
    /// pages. Any page failure fails the whole listing.
    pub(crate) async fn paginate<R, N>(&self, listing: Listing<'_, R, N>) -> Result<Vec<N>>
    where
        R: DeserializeOwned,
        N: DeserializeOwned + Updated,
    {
        let mut variables = listing.extra;
        variables.insert("owner".to_string(), json!(listing.repo.owner));
        variables.insert("repo".to_string(), json!(listing.repo.name));
        variables.insert("pageSize".to_string(), json!(listing.page_size));

        let mut cursor: Option<String> = None;
        let mut kept = Vec::new();
        let mut page = 0u32;

        loop {
            page += 1;
            variables.insert("cursor".to_string(), json!(cursor));

            let data: RepositoryData<R> = self
                .graphql_query(listing.query, &Value::Object(variables.clone()))
                .await?;
            let repository = data
                .repository
                .ok_or_else(|| Error::RepositoryNotFound(listing.repo.to_string()))?;
            let connection = (listing.connection)(repository);

            let received = connection.nodes.len();
            let filtered = listing.cutoff.apply(connection.nodes, listing.since);
            debug!(
                page,
                received,
                kept = filtered.kept.len(),
                has_next_page = connection.page_info.has_next_page,
                "Fetched page"
            );
            kept.extend(filtered.kept);

            if filtered.stop || !connection.page_info.has_next_page {
                break;
            }

            cursor = match connection.page_info.end_cursor {
                Some(next) => Some(next),
                None => {
                    return Err(Error::Parse(
                        "page reports more results but no end cursor".to_string(),
                    ))
                }
            };
        }

        Ok(kept)
    }

    /// Execute a GraphQL query and unwrap its `data`
    pub(crate) async fn graphql_query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: &Value,
    ) -> Result<T> {
        let request_body = json!({
            "query": query,
            "variables": variables,
        });

        let raw = self.transport().post(&request_body).await?;
        let response: GraphQLResponse<Value> = serde_json::from_value(raw)
            .map_err(|e| Error::Parse(format!("Failed to parse GraphQL response: {}", e)))?;

        if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
            if errors.iter().any(|e| e.kind.as_deref() == Some("NOT_FOUND")) {
                let repo = format!(
                    "{}/{}",
                    variables["owner"].as_str().unwrap_or_default(),
                    variables["repo"].as_str().unwrap_or_default()
                );
                return Err(Error::RepositoryNotFound(repo));
            }
            return Err(Error::GraphQl(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        let data = response.data.ok_or(Error::MissingData)?;
        serde_json::from_value(data)
            .map_err(|e| Error::Parse(format!("Failed to decode GraphQL data: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use dumpster_core::Config;

    #[derive(Debug, Deserialize)]
    struct Viewer {
        login: String,
    }

    fn client(transport: ScriptedTransport) -> GitHubClient {
        GitHubClient::with_transport(transport, Config::default().github)
    }

    #[test]
    fn test_actor_falls_back_to_ghost() {
        assert_eq!(actor(None).login, "ghost");
        assert_eq!(actor(Some(ActorNode::default())).login, "ghost");
        assert_eq!(
            actor(Some(ActorNode {
                login: Some("octocat".to_string())
            }))
            .login,
            "octocat"
        );
    }

    #[test]
    fn test_missing_nodes_decode_as_empty() {
        let nested: Nodes<LabelNode> = serde_json::from_value(json!({})).unwrap();
        assert!(nested.nodes.is_empty());

        let connection: Connection<CommentNode> = serde_json::from_value(json!({
            "pageInfo": {"hasNextPage": false, "endCursor": null}
        }))
        .unwrap();
        assert!(connection.nodes.is_empty());
        assert!(!connection.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_graphql_query_unwraps_data() {
        let transport = ScriptedTransport::new(vec![json!({"data": {"login": "octocat"}})]);
        let viewer: Viewer = client(transport)
            .graphql_query("query { viewer { login } }", &json!({}))
            .await
            .unwrap();
        assert_eq!(viewer.login, "octocat");
    }

    #[tokio::test]
    async fn test_graphql_errors_are_reported() {
        let transport = ScriptedTransport::new(vec![json!({
            "data": null,
            "errors": [{"message": "Field 'x' doesn't exist"}, {"message": "second"}]
        })]);
        let err = client(transport)
            .graphql_query::<Viewer>("query { x }", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "GraphQL errors: Field 'x' doesn't exist, second");
    }

    #[tokio::test]
    async fn test_not_found_maps_to_repository_error() {
        let transport = ScriptedTransport::new(vec![json!({
            "data": {"repository": null},
            "errors": [{"type": "NOT_FOUND", "message": "Could not resolve to a Repository"}]
        })]);
        let err = client(transport)
            .graphql_query::<Viewer>("query", &json!({"owner": "octo", "repo": "nope"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RepositoryNotFound(ref r) if r == "octo/nope"));
    }

    #[tokio::test]
    async fn test_missing_data() {
        let transport = ScriptedTransport::new(vec![json!({})]);
        let err = client(transport)
            .graphql_query::<Viewer>("query", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingData));
    }
}
