//! Sync command - fetch updated records and advance the watermarks

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use dumpster_core::{
    Config, KindSet, RecordStore, ResourceKind, Secrets, SyncOptions, SyncReport, Tracker,
};
use dumpster_github::{parse_repository, GitHubClient};

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Repository as owner/repo, an HTTPS URL or an SSH URL
    #[arg(required = true)]
    pub repository: String,

    /// Kinds to sync: issue, pr, discussion (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub kinds: Vec<ResourceKind>,

    /// Only fetch records updated at or after this instant, ignoring the
    /// stored watermarks (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_since)]
    pub since: Option<DateTime<Utc>>,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let repository = parse_repository(&self.repository)?;
        let token = Secrets::load()?.require_github_token()?;
        let client = GitHubClient::new(&config.github, token)?;
        let store = RecordStore::new(&config.output.dir);

        let options = SyncOptions::new(repository)
            .with_kinds(KindSet::from_selection(self.kinds.iter().copied()))
            .with_since(self.since);

        let report = Tracker::new(client, store).run(&options).await?;

        tracing::info!(
            repo = %options.repository,
            written = report.total_written(),
            started_at = %report.started_at.to_rfc3339(),
            "Sync complete"
        );
        print!("{}", render_report(&options, &report));
        Ok(())
    }
}

/// Parse `--since` as RFC 3339 or a bare date at midnight UTC
pub fn parse_since(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| {
            format!(
                "invalid timestamp '{}': expected RFC 3339 (2024-05-01T12:00:00Z) or YYYY-MM-DD",
                value
            )
        })
}

fn render_report(options: &SyncOptions, report: &SyncReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Synced {}", options.repository);
    for kind in &report.kinds {
        let since = kind
            .since
            .map(|s| s.to_rfc3339())
            .unwrap_or_else(|| "beginning".to_string());
        let _ = write!(
            out,
            "  {:<14} {:>6} written (since {})",
            kind.kind.to_string(),
            kind.written,
            since
        );
        match kind.newest {
            Some(newest) => {
                let _ = writeln!(out, ", newest update {}", newest.to_rfc3339());
            }
            None => {
                let _ = writeln!(out);
            }
        }
    }
    let _ = writeln!(out, "Watermark: {}", report.started_at.to_rfc3339());
    out
}
