//! Orchestration for author and bookmark download runs.
//!
//! Builds the HTTP fetcher and worker pool once, then walks each requested
//! collection: list the works, resolve the target directory, plan the
//! missing jobs, and hand the batch to the pool. Maps component errors to
//! anyhow with context for CLI diagnostics.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use illustfetch_core::download::constants::STAGING_DIR_NAME;
use illustfetch_core::{
    BatchStats, BookmarkVisibility, DownloadConfig, GallerySource, HttpFetcher, WorkerPool, dirs,
    plan,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Downloads each author's missing works in order.
///
/// `on_author_done` is invoked after each author's batch with the author's
/// position in `author_ids` and that batch's statistics.
pub(crate) async fn download_authors(
    source: &dyn GallerySource,
    config: &DownloadConfig,
    author_ids: &[u64],
    mut on_author_done: Option<&mut dyn FnMut(usize, &BatchStats)>,
) -> Result<()> {
    let pool = build_pool(config)?;

    for (position, &author_id) in author_ids.iter().enumerate() {
        let spinner = collecting_spinner(format!("Collecting works of author {author_id}..."));
        let collected = async {
            let profile = source
                .author_profile(author_id)
                .await
                .with_context(|| format!("failed to look up author {author_id}"))?;
            let target = dirs::resolve_author_dir(
                &config.base_dir,
                profile.id,
                &profile.name,
                config.auto_rename,
            )
            .await
            .with_context(|| format!("failed to resolve directory for author {author_id}"))?;
            let jobs = plan::author_jobs(source, &profile, &target)
                .await
                .with_context(|| format!("failed to list works of author {author_id}"))?;
            Ok::<_, anyhow::Error>((profile, target, jobs))
        }
        .await;
        spinner.finish_and_clear();
        let (profile, target, jobs) = collected?;

        info!(
            author = %profile.name,
            id = profile.id,
            position = position + 1,
            total = author_ids.len(),
            jobs = jobs.len(),
            "collection complete"
        );

        tokio::fs::create_dir_all(&target)
            .await
            .with_context(|| format!("failed to create {}", target.display()))?;

        let staging = target.join(STAGING_DIR_NAME);
        let stats = pool
            .run(jobs, &target, &staging)
            .await
            .with_context(|| format!("batch failed for author {author_id}"))?;

        info!(
            author = %profile.name,
            completed = stats.completed(),
            abandoned = stats.abandoned(),
            retried = stats.retried(),
            "author batch finished"
        );

        if let Some(on_done) = on_author_done.as_mut() {
            on_done(position, &stats);
        }
    }

    Ok(())
}

/// Downloads the missing works of one bookmark collection.
pub(crate) async fn download_bookmarks(
    source: &dyn GallerySource,
    config: &DownloadConfig,
    visibility: BookmarkVisibility,
) -> Result<BatchStats> {
    let pool = build_pool(config)?;
    let target = config.base_dir.join(dirs::bookmark_dir_name(visibility));

    let spinner = collecting_spinner(format!("Collecting {visibility} bookmarks..."));
    let collected = plan::bookmark_jobs(source, visibility, &target).await;
    spinner.finish_and_clear();
    let jobs = collected.with_context(|| format!("failed to list {visibility} bookmarks"))?;

    info!(visibility = %visibility, jobs = jobs.len(), "collection complete");

    tokio::fs::create_dir_all(&target)
        .await
        .with_context(|| format!("failed to create {}", target.display()))?;

    let stats = pool
        .run(jobs, &target, &target.join(STAGING_DIR_NAME))
        .await
        .with_context(|| format!("{visibility} bookmark batch failed"))?;

    info!(
        visibility = %visibility,
        completed = stats.completed(),
        abandoned = stats.abandoned(),
        retried = stats.retried(),
        "bookmark batch finished"
    );

    Ok(stats)
}

/// Builds client and pool from the run configuration.
fn build_pool(config: &DownloadConfig) -> Result<WorkerPool> {
    let fetcher = HttpFetcher::new(&config.fetch).context("invalid HTTP client configuration")?;
    WorkerPool::new(config.workers, Arc::new(fetcher), config.max_attempts)
        .context("invalid worker pool configuration")
}

/// Spinner shown while a collection listing is being walked.
/// indicatif skips drawing when stderr is not a terminal.
fn collecting_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    spinner
}
