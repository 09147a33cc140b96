//! Configuration management for gh-dumpster
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (DUMPSTER_*)
//! 3. Config file (~/.config/gh-dumpster/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::kind::ResourceKind;
use crate::{Error, Result};

/// Name of the per-user config directory
pub const APP_DIR: &str = "gh-dumpster";

/// Largest page the GraphQL API accepts for a connection
pub const MAX_PAGE_SIZE: u32 = 100;

/// Output-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory records and the sync state are written to
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("out"),
        }
    }
}

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GraphQL endpoint
    pub endpoint: String,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    pub issues_page_size: u32,
    pub pull_requests_page_size: u32,
    pub discussions_page_size: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.github.com/graphql".to_string(),
            timeout: Duration::from_secs(30),
            // Nodes embed nested connections of up to 50 items; larger
            // pages exceed the API's per-query node limit.
            issues_page_size: 20,
            pull_requests_page_size: 20,
            discussions_page_size: 10,
        }
    }
}

impl GitHubConfig {
    /// Page size for `kind`, clamped to what the API accepts
    pub fn page_size(&self, kind: ResourceKind) -> u32 {
        let size = match kind {
            ResourceKind::Issues => self.issues_page_size,
            ResourceKind::PullRequests => self.pull_requests_page_size,
            ResourceKind::Discussions => self.discussions_page_size,
        };
        size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub github: GitHubConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/gh-dumpster/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - DUMPSTER_OUTPUT_DIR: Output directory
    /// - DUMPSTER_GRAPHQL_ENDPOINT: GraphQL endpoint URL
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("DUMPSTER_OUTPUT_DIR") {
            if !dir.is_empty() {
                self.output.dir = PathBuf::from(dir);
            }
        }

        if let Ok(endpoint) = std::env::var("DUMPSTER_GRAPHQL_ENDPOINT") {
            if !endpoint.is_empty() {
                self.github.endpoint = endpoint;
            }
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, output_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = output_dir {
            self.output.dir = dir;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(output_dir: Option<PathBuf>) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(output_dir))
    }
}
