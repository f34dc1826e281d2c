//! CLI entry point for the illustration downloader.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use illustfetch_core::{BatchStats, BookmarkVisibility, DownloadConfig, ManifestSource};
use tracing::{debug, info};

mod app;
mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("illustfetch starting");

    let mut config = DownloadConfig::new(&args.dir);
    config.workers = usize::from(args.workers);
    config.max_attempts = u32::from(args.max_attempts);
    config.auto_rename = !args.no_auto_rename;
    config.fetch.referer = args.referer.clone();
    config.fetch.timeout = Duration::from_secs(args.timeout);
    config.fetch.proxy = args.proxy.clone();

    let source = ManifestSource::load(&args.catalog)
        .await
        .with_context(|| format!("failed to load catalog {}", args.catalog.display()))?;

    match &args.command {
        Command::Authors { ids } => {
            let total = ids.len();
            let mut on_done = |position: usize, stats: &BatchStats| {
                info!(
                    finished = position + 1,
                    total,
                    completed = stats.completed(),
                    abandoned = stats.abandoned(),
                    "author progress"
                );
            };
            app::download_authors(&source, &config, ids, Some(&mut on_done)).await?;
            info!(authors = total, "all requested authors processed");
        }
        Command::Bookmarks { private } => {
            let visibility = if *private {
                BookmarkVisibility::Private
            } else {
                BookmarkVisibility::Public
            };
            let stats = app::download_bookmarks(&source, &config, visibility).await?;
            info!(
                completed = stats.completed(),
                abandoned = stats.abandoned(),
                retried = stats.retried(),
                total = stats.total(),
                "Download complete"
            );
        }
    }

    Ok(())
}
