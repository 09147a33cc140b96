//! gh-dumpster CLI - incremental dumps of GitHub repository history
//!
//! Mirrors a repository's issues, pull requests and discussions into a
//! sharded tree of JSON files, resuming from per-kind watermarks.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dumpster_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{StatusArgs, SyncArgs};

/// gh-dumpster: incremental sync of GitHub issues, pull requests and discussions
#[derive(Parser, Debug)]
#[command(name = "gh-dumpster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output directory (overrides config and env)
    #[arg(short, long, global = true, env = "DUMPSTER_OUTPUT_DIR")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Fetch records updated since the last sync and write them out
    #[command(visible_alias = "s")]
    Sync(SyncArgs),

    /// Show stored watermarks and record counts
    Status(StatusArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = Config::load_with_overrides(cli.output.clone())?;

    if cli.verbose {
        tracing::info!(
            output = %config.output.dir.display(),
            endpoint = %config.github.endpoint,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("gh-dumpster {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Sync(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Status(args)) => {
            args.execute(&config)?;
        }
        Some(Commands::Config) => {
            println!("gh-dumpster Configuration");
            println!("=========================");
            println!();
            println!("Output Settings:");
            println!("  dir: {}", config.output.dir.display());
            println!();
            println!("GitHub Settings:");
            println!("  endpoint: {}", config.github.endpoint);
            println!("  timeout: {:?}", config.github.timeout);
            println!("  issues_page_size: {}", config.github.issues_page_size);
            println!(
                "  pull_requests_page_size: {}",
                config.github.pull_requests_page_size
            );
            println!(
                "  discussions_page_size: {}",
                config.github.discussions_page_size
            );
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("gh-dumpster - incremental GitHub history sync");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
