//! GitHub GraphQL client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dumpster_core::{GitHubConfig, Record, RecordSource, Repository, ResourceKind, SourceError};
use tracing::info;

use crate::transport::{HttpTransport, Transport};
use crate::{Error, Result};

/// GitHub API client for fetching repository history
pub struct GitHubClient {
    transport: Box<dyn Transport>,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Create a client talking to the configured endpoint with `token`
    pub fn new(config: &GitHubConfig, token: impl Into<String>) -> Result<Self> {
        let transport = HttpTransport::new(&config.endpoint, token, config.timeout)?;
        info!(endpoint = %config.endpoint, "Created GitHub client");
        Ok(Self::with_transport(transport, config.clone()))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(transport: impl Transport + 'static, config: GitHubConfig) -> Self {
        Self {
            transport: Box::new(transport),
            config,
        }
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn page_size(&self, kind: ResourceKind) -> u32 {
        self.config.page_size(kind)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("endpoint", &self.config.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RecordSource for GitHubClient {
    async fn fetch(
        &self,
        kind: ResourceKind,
        repo: &Repository,
        since: Option<DateTime<Utc>>,
    ) -> std::result::Result<Vec<Record>, SourceError> {
        let records = match kind {
            ResourceKind::Issues => into_records(self.fetch_issues(repo, since).await?),
            ResourceKind::PullRequests => {
                into_records(self.fetch_pull_requests(repo, since).await?)
            }
            ResourceKind::Discussions => into_records(self.fetch_discussions(repo, since).await?),
        };
        Ok(records)
    }
}

fn into_records<T: Into<Record>>(items: Vec<T>) -> Vec<Record> {
    items.into_iter().map(Into::into).collect()
}

/// Parse a repository identifier
///
/// Supports formats:
/// - owner/repo
/// - https://github.com/owner/repo
/// - git@github.com:owner/repo.git
pub fn parse_repository(input: &str) -> Result<Repository> {
    let input = input.trim();

    let path = if input.starts_with("https://") || input.starts_with("http://") {
        let url = url::Url::parse(input).map_err(|e| Error::Parse(e.to_string()))?;
        url.path().trim_matches('/').to_string()
    } else if let Some(rest) = input.strip_prefix("git@") {
        match rest.split_once(':') {
            Some((_, path)) => path.to_string(),
            None => return Err(Error::Parse(format!("Invalid SSH URL: {}", input))),
        }
    } else if input.contains("://") {
        return Err(Error::Parse(format!("Unrecognized URL format: {}", input)));
    } else {
        input.to_string()
    };

    let path = path.trim_end_matches(".git");
    let mut parts = path.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
            Ok(Repository::new(owner, name))
        }
        _ => Err(Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            input
        ))),
    }
}
