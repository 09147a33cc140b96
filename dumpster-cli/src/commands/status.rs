//! Status command - show stored watermarks and record counts

use std::fmt::Write as _;

use clap::Args;
use dumpster_core::{Config, RecordStore, ResourceKind};

/// Show what has been synced into the output directory
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = RecordStore::new(&config.output.dir);
        print!("{}", render_status(&store)?);
        Ok(())
    }
}

fn render_status(store: &RecordStore) -> anyhow::Result<String> {
    let state = store.load_state()?;
    let mut out = String::new();

    let _ = writeln!(out, "Output directory: {}", store.base_dir().display());
    let _ = writeln!(out);
    for kind in ResourceKind::ALL {
        let watermark = state
            .watermark(kind)
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "never synced".to_string());
        let _ = writeln!(
            out,
            "  {:<14} {:>6} records   last sync: {}",
            kind.to_string(),
            store.count_records(kind)?,
            watermark
        );
    }
    Ok(out)
}
