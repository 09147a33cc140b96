//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// Request could not be sent or its body could not be read
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("GitHub request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Rate limit exceeded
    #[error("GitHub rate limit exceeded, resets at {0}")]
    RateLimited(String),

    /// The response carried a GraphQL `errors` array
    #[error("GraphQL errors: {}", .0.join(", "))]
    GraphQl(Vec<String>),

    /// Repository missing or not visible to the token
    #[error("Repository {0} not found or not accessible")]
    RepositoryNotFound(String),

    /// The response had neither data nor errors
    #[error("GraphQL response missing data")]
    MissingData,

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
