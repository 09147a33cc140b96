//! GitHub token resolution
//!
//! The token is taken from `GITHUB_TOKEN` when it is set to something other
//! than whitespace, else from `[github] token` in
//! `~/.config/gh-dumpster/secrets.toml`. The secrets file is kept apart from
//! `config.toml` and, on Unix, must not be accessible to group or other.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::APP_DIR;
use crate::{Error, Result};

/// Environment variable consulted before the secrets file
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const SECRETS_FILE: &str = "secrets.toml";

/// Where a resolved token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    SecretsFile,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Environment => write!(f, "{} environment variable", TOKEN_ENV),
            TokenSource::SecretsFile => write!(f, "secrets file"),
        }
    }
}

/// Contents of the secrets file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    pub github: GitHubSecrets,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// Personal access token with read access to the repository
    pub token: Option<String>,
}

impl Secrets {
    /// Token for API requests, failing before any work when none is configured
    pub fn require_github_token(&self) -> Result<String> {
        let env = std::env::var(TOKEN_ENV).ok();
        let (token, source) = self.resolve_token(env.as_deref()).ok_or_else(|| {
            Error::Config(format!(
                "GitHub token not found. Set the {} environment variable \
                 or add a token to ~/.config/{}/{}",
                TOKEN_ENV, APP_DIR, SECRETS_FILE
            ))
        })?;
        debug!(%source, "Resolved GitHub token");
        Ok(token)
    }

    /// Token for API requests, if one is configured
    pub fn github_token(&self) -> Option<String> {
        let env = std::env::var(TOKEN_ENV).ok();
        self.resolve_token(env.as_deref()).map(|(token, _)| token)
    }

    /// Pick between an environment value and the file token
    ///
    /// Both are trimmed; a blank value counts as unset.
    pub fn resolve_token(&self, env: Option<&str>) -> Option<(String, TokenSource)> {
        if let Some(token) = env.and_then(non_blank) {
            return Some((token, TokenSource::Environment));
        }
        self.github
            .token
            .as_deref()
            .and_then(non_blank)
            .map(|token| (token, TokenSource::SecretsFile))
    }

    /// Load the secrets file from its default location; absent means empty
    pub fn load() -> Result<Self> {
        match Self::default_secrets_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load a secrets file after checking it is private to its owner
    pub fn load_from_file(path: &Path) -> Result<Self> {
        ensure_private(path)?;
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse secrets {}: {}", path.display(), e))
        })
    }

    /// `~/.config/gh-dumpster/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join(SECRETS_FILE))
    }
}

fn non_blank(token: &str) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(unix)]
fn ensure_private(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(path)?.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(Error::Config(format!(
            "Secrets file {} is accessible to other users (mode {:o}); run: chmod 600 {}",
            path.display(),
            mode,
            path.display()
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_private(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_file_token(token: &str) -> Secrets {
        Secrets {
            github: GitHubSecrets {
                token: Some(token.to_string()),
            },
        }
    }

    #[test]
    fn test_environment_wins_over_file() {
        let secrets = with_file_token("from_file");
        assert_eq!(
            secrets.resolve_token(Some(" from_env\n")),
            Some(("from_env".to_string(), TokenSource::Environment))
        );
    }

    #[test]
    fn test_blank_environment_falls_back_to_file() {
        let secrets = with_file_token("  from_file ");
        assert_eq!(
            secrets.resolve_token(Some("   ")),
            Some(("from_file".to_string(), TokenSource::SecretsFile))
        );
        assert_eq!(
            secrets.resolve_token(None),
            Some(("from_file".to_string(), TokenSource::SecretsFile))
        );
    }

    #[test]
    fn test_no_token_anywhere() {
        assert!(Secrets::default().resolve_token(None).is_none());
        assert!(with_file_token("").resolve_token(Some("")).is_none());
    }

    #[test]
    fn test_source_display_names_variable() {
        assert_eq!(
            TokenSource::Environment.to_string(),
            "GITHUB_TOKEN environment variable"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_load_from_file_checks_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(SECRETS_FILE);
        fs::write(&path, "[github]\ntoken = \" ghp_test \"\n").unwrap();

        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        let err = Secrets::load_from_file(&path).unwrap_err().to_string();
        assert!(err.contains("mode 640"), "{err}");

        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        let secrets = Secrets::load_from_file(&path).unwrap();
        assert_eq!(
            secrets.resolve_token(None),
            Some(("ghp_test".to_string(), TokenSource::SecretsFile))
        );
    }

    #[test]
    fn test_unparsable_file_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(SECRETS_FILE);
        fs::write(&path, "[github\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        }

        assert!(matches!(
            Secrets::load_from_file(&path),
            Err(Error::Config(_))
        ));
    }
}
