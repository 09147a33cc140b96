//! HTTP transport for GraphQL documents

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{Error, Result};

const USER_AGENT: &str = concat!("gh-dumpster/", env!("CARGO_PKG_VERSION"));

/// Sends one GraphQL request body and returns the raw response envelope
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, body: &Value) -> Result<Value>;
}

/// Bearer-token authenticated transport over HTTPS
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Parse(format!("Invalid GraphQL endpoint {}: {}", endpoint, e)))?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            token: token.into(),
        })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, body: &Value) -> Result<Value> {
        debug!(endpoint = %self.endpoint, "Posting GraphQL request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let remaining = header(&response, "x-ratelimit-remaining");
        let reset = header(&response, "x-ratelimit-reset");
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());

        let code = status.as_u16();
        if code == 401 {
            return Err(Error::Auth("Invalid GitHub token".to_string()));
        }
        if code == 429 || (code == 403 && remaining.as_deref() == Some("0")) {
            return Err(Error::RateLimited(
                reset.unwrap_or_else(|| "unknown".to_string()),
            ));
        }
        Err(Error::Status {
            status: code,
            body: text,
        })
    }
}

fn header(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        let err = HttpTransport::new("not a url", "token", Duration::from_secs(1)).unwrap_err();
        assert!(err.to_string().contains("Invalid GraphQL endpoint"));
    }

    #[test]
    fn test_debug_hides_token() {
        let transport = HttpTransport::new(
            "https://api.github.com/graphql",
            "ghp_secret",
            Duration::from_secs(1),
        )
        .unwrap();
        let debug = format!("{:?}", transport);
        assert!(debug.contains("api.github.com"));
        assert!(!debug.contains("ghp_secret"));
    }
}
